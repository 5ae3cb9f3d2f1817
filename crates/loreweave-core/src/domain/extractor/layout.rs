//! Logical lines of a model source file.
//!
//! A logical line is one statement: physical lines joined across open
//! brackets and trailing backslashes. Blank and comment-only lines are
//! dropped. Block structure is recovered later from the recorded indent.

use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::domain::error::DomainError;

/// Width a tab advances indentation to (next multiple of).
const TAB_WIDTH: usize = 8;

#[derive(Parser)]
#[grammar = "domain/extractor/layout.pest"]
struct LayoutParser;

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLine<'s> {
    pub indent: usize,
    /// 1-based line of the first character.
    pub line: usize,
    /// Byte offset of `text` in the source.
    pub offset: usize,
    pub text: &'s str,
}

/// Split `source` into logical lines.
///
/// # Errors
///
/// `DomainError::Parse` for unterminated strings, unbalanced brackets and
/// dedents that match no outer level.
pub fn logical_lines(source: &str) -> Result<Vec<LogicalLine<'_>>, DomainError> {
    let Some(file) = LayoutParser::parse(Rule::file, source)
        .map_err(|err| {
            let (line, column) = match err.line_col {
                LineColLocation::Pos(at) | LineColLocation::Span(at, _) => at,
            };
            DomainError::parse(err.variant.message().into_owned(), line, column)
        })?
        .next()
    else {
        return Ok(Vec::new());
    };

    let mut lines = Vec::new();
    let mut levels = vec![0];

    for logical in file.into_inner().filter(|p| p.as_rule() == Rule::logical_line) {
        let mut indent = 0;
        let mut content = None;
        for part in logical.into_inner() {
            match part.as_rule() {
                Rule::indent => indent = indent_width(part.as_str()),
                Rule::content => content = Some(part),
                _ => {}
            }
        }
        let Some(content) = content else { continue };

        if let Some(err) = malformed(&content) {
            return Err(err);
        }

        let (line, column) = content.as_span().start_pos().line_col();
        check_indent(&mut levels, indent, line, column)?;

        lines.push(LogicalLine {
            indent,
            line,
            offset: content.as_span().start(),
            text: content.as_str(),
        });
    }

    Ok(lines)
}

fn indent_width(indent: &str) -> usize {
    indent.chars().fold(0, |width, c| match c {
        '\t' => (width / TAB_WIDTH + 1) * TAB_WIDTH,
        '\x0c' => 0,
        _ => width + 1,
    })
}

fn check_indent(
    levels: &mut Vec<usize>,
    indent: usize,
    line: usize,
    column: usize,
) -> Result<(), DomainError> {
    let top = levels.last().copied().unwrap_or(0);
    if indent > top {
        levels.push(indent);
    } else if indent < top {
        while levels.last().is_some_and(|&level| level > indent) {
            levels.pop();
        }
        if levels.last().copied() != Some(indent) {
            return Err(DomainError::parse(
                "unindent does not match any outer indentation level",
                line,
                column,
            ));
        }
    }
    Ok(())
}

fn is_error(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::unterminated_string | Rule::unclosed_group | Rule::stray_closer
    )
}

/// The first broken string or bracket in `content` that contains no other
/// broken construct.
fn malformed(content: &Pair<'_, Rule>) -> Option<DomainError> {
    let culprit = content
        .clone()
        .into_inner()
        .flatten()
        .filter(|p| is_error(p.as_rule()))
        .find(|p| !p.clone().into_inner().flatten().any(|q| is_error(q.as_rule())))?;

    let (line, column) = culprit.as_span().start_pos().line_col();
    let opener = culprit.as_str().chars().next().unwrap_or_default();
    let message = match culprit.as_rule() {
        Rule::unterminated_string => "unterminated string literal".to_string(),
        Rule::unclosed_group => format!("'{opener}' was never closed"),
        _ => format!("unmatched '{opener}'"),
    };
    Some(DomainError::parse(message, line, column))
}

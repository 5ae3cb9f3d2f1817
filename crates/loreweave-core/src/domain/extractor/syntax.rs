//! Statement parsing for one logical line.
//!
//! The parse tree is folded into a small expression IR that keeps only the
//! shapes annotations and `Field(...)` initializers need. Everything else
//! becomes [`Expr::Other`], so an unusual default never derails the field.

use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "domain/extractor/statement.pest"]
struct StatementParser;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Attribute(Box<Expr>, String),
    Str(String),
    /// Bytes or formatted string: never a literal default.
    OpaqueStr,
    Number(String),
    Ellipsis,
    Neg(Box<Expr>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<(String, Expr)>,
    },
    Subscript {
        value: Box<Expr>,
        index: Vec<Expr>,
    },
    BitOr(Box<Expr>, Box<Expr>),
    Other,
}

impl Expr {
    /// `a.b.c` as a dotted string, when the expression is a plain name chain.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Self::Name(name) => Some(name.clone()),
            Self::Attribute(base, attr) => base.dotted_name().map(|b| format!("{b}.{attr}")),
            _ => None,
        }
    }
}

/// A statement that could not be parsed, located by byte offset into the
/// statement text.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
    pub model: Option<String>,
}

impl SyntaxError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
            model: None,
        }
    }
}

impl From<pest::error::Error<Rule>> for SyntaxError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let offset = match err.location {
            InputLocation::Pos(at) | InputLocation::Span((at, _)) => at,
        };
        Self::new(err.variant.message().into_owned(), offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader<'t> {
    pub name: &'t str,
    /// Plain-name bases only; attributes, subscripts and keywords are dropped.
    pub bases: Vec<String>,
    /// Statement following the colon, with its byte offset.
    pub inline_body: Option<(usize, &'t str)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl<'t> {
    pub name: &'t str,
    pub annotation: Expr,
    pub annotation_text: &'t str,
    /// Comma-separated values after `=`; empty when there is no initializer.
    pub initializer: Vec<Expr>,
}

pub fn is_class_header(text: &str) -> bool {
    StatementParser::parse(Rule::class_start, text).is_ok()
}

/// Parse a `class Name[...](...):` header.
///
/// # Errors
///
/// A [`SyntaxError`] when the class name or the colon is missing; the model
/// name is attached when it is known.
pub fn class_header(text: &str) -> Result<ClassHeader<'_>, SyntaxError> {
    let mut header = ClassHeader {
        name: "",
        bases: Vec::new(),
        inline_body: None,
    };

    let parsed = StatementParser::parse(Rule::class_header, text)?;
    for part in parsed.flat_map(Pair::into_inner) {
        match part.as_rule() {
            Rule::class_name if part.as_str().is_empty() => {
                return Err(SyntaxError::new("expected class name", part.as_span().start()));
            }
            Rule::class_name => header.name = part.as_str(),
            Rule::class_bases => header.bases = base_names(part),
            Rule::inline_body if !part.as_str().trim().is_empty() => {
                header.inline_body = Some((part.as_span().start(), part.as_str()));
            }
            Rule::missing_colon => {
                return Err(SyntaxError {
                    model: Some(header.name.to_string()),
                    ..SyntaxError::new("expected ':' after class header", part.as_span().start())
                });
            }
            _ => {}
        }
    }
    Ok(header)
}

fn base_names(bases: Pair<'_, Rule>) -> Vec<String> {
    bases
        .into_inner()
        .filter_map(|argument| argument.into_inner().next())
        .filter(|value| value.as_rule() == Rule::expr)
        .filter_map(|value| match build(value) {
            Expr::Name(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// `name` when the statement starts like an annotated field, `name: ...`.
pub fn field_name(text: &str) -> Option<&str> {
    let start = StatementParser::parse(Rule::field_start, text).ok()?.next()?;
    start.into_inner().next().map(|name| name.as_str())
}

/// Parse `name: annotation [= initializer]`; `None` when the statement does
/// not have that shape.
pub fn field(text: &str) -> Option<FieldDecl<'_>> {
    let decl = StatementParser::parse(Rule::field, text).ok()?.next()?;

    let mut name = "";
    let mut annotation = None;
    let mut initializer = Vec::new();
    for part in decl.into_inner() {
        match part.as_rule() {
            Rule::identifier => name = part.as_str(),
            Rule::annotation => annotation = Some(part),
            Rule::initializer => initializer = part.into_inner().map(build).collect(),
            _ => {}
        }
    }

    let annotation = annotation?;
    Some(FieldDecl {
        name,
        annotation_text: tight_text(text, &annotation),
        annotation: annotation.into_inner().next().map_or(Expr::Other, build),
        initializer,
    })
}

/// Text of `pair` without the whitespace and comments skipped after its last
/// token. Some descendant always ends exactly at the last token.
fn tight_text<'t>(text: &'t str, pair: &Pair<'t, Rule>) -> &'t str {
    let span = pair.as_span();
    let mut ends: Vec<usize> = pair
        .clone()
        .into_inner()
        .flatten()
        .map(|token| token.as_span().end())
        .collect();
    ends.sort_unstable();

    let end = ends
        .into_iter()
        .find(|&end| text.get(end..span.end()).is_some_and(is_blank))
        .unwrap_or(span.end());
    text.get(span.start()..end).unwrap_or(span.as_str())
}

fn is_blank(text: &str) -> bool {
    StatementParser::parse(Rule::blank, text).is_ok()
}

/// Text of a statement made only of plain string literals.
pub fn docstring(text: &str) -> Option<String> {
    let doc = StatementParser::parse(Rule::docstring, text).ok()?.next()?;
    match doc.into_inner().next().map(string_concat)? {
        Expr::Str(value) => Some(value),
        _ => None,
    }
}

/// Parse `text` as one complete expression.
pub fn expression(text: &str) -> Option<Expr> {
    let parsed = StatementParser::parse(Rule::expression, text).ok()?.next()?;
    parsed.into_inner().next().map(build)
}

fn build(pair: Pair<'_, Rule>) -> Expr {
    match pair.as_rule() {
        Rule::expr | Rule::paren_expr | Rule::argument | Rule::subscript_item => {
            pair.into_inner().next().map_or(Expr::Other, build)
        }
        Rule::binary => binary(pair),
        Rule::unary => unary(pair),
        Rule::postfix => postfix(pair),
        Rule::identifier | Rule::constant => Expr::Name(pair.as_str().to_string()),
        Rule::number => Expr::Number(pair.as_str().to_string()),
        Rule::ellipsis => Expr::Ellipsis,
        Rule::string_concat => string_concat(pair),
        _ => Expr::Other,
    }
}

/// Left fold; only `|` keeps its structure.
fn binary(pair: Pair<'_, Rule>) -> Expr {
    let mut parts = pair.into_inner();
    let mut lhs = parts.next().map_or(Expr::Other, build);
    while let (Some(op), Some(rhs)) = (parts.next(), parts.next()) {
        let rhs = build(rhs);
        lhs = match op.as_str() {
            "|" => Expr::BitOr(Box::new(lhs), Box::new(rhs)),
            _ => Expr::Other,
        };
    }
    lhs
}

fn unary(pair: Pair<'_, Rule>) -> Expr {
    let mut operators = Vec::new();
    let mut operand = Expr::Other;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::unary_op => operators.push(part.as_str()),
            _ => operand = build(part),
        }
    }
    operators
        .into_iter()
        .rev()
        .fold(operand, |inner, op| match op {
            "-" => Expr::Neg(Box::new(inner)),
            _ => Expr::Other,
        })
}

fn postfix(pair: Pair<'_, Rule>) -> Expr {
    let mut parts = pair.into_inner();
    let mut expr = parts.next().map_or(Expr::Other, build);
    for trailer in parts {
        expr = match trailer.as_rule() {
            Rule::attribute => match trailer.into_inner().next() {
                Some(attr) => Expr::Attribute(Box::new(expr), attr.as_str().to_string()),
                None => Expr::Other,
            },
            Rule::call => call(expr, trailer),
            Rule::subscript => Expr::Subscript {
                value: Box::new(expr),
                index: trailer.into_inner().map(build).collect(),
            },
            _ => Expr::Other,
        };
    }
    expr
}

fn call(func: Expr, pair: Pair<'_, Rule>) -> Expr {
    let mut args = Vec::new();
    let mut keywords = Vec::new();
    for argument in pair.into_inner().filter_map(|a| a.into_inner().next()) {
        if argument.as_rule() == Rule::keyword_argument {
            let mut parts = argument.into_inner();
            if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                keywords.push((name.as_str().to_string(), build(value)));
            }
        } else {
            args.push(build(argument));
        }
    }
    Expr::Call {
        func: Box::new(func),
        args,
        keywords,
    }
}

/// Adjacent literals concatenate; any bytes or f-string part makes the
/// whole value opaque.
fn string_concat(pair: Pair<'_, Rule>) -> Expr {
    let mut value = String::new();
    let mut opaque = false;

    for string in pair.into_inner() {
        let mut raw = false;
        for part in string.into_inner() {
            match part.as_rule() {
                Rule::string_prefix => {
                    let prefix = part.as_str().to_ascii_lowercase();
                    raw = prefix.contains('r');
                    opaque |= prefix.contains('b') || prefix.contains('f');
                }
                Rule::triple_double | Rule::triple_single => {
                    push_body(&mut value, part.as_str(), 3, raw);
                }
                _ => push_body(&mut value, part.as_str(), 1, raw),
            }
        }
    }

    if opaque {
        Expr::OpaqueStr
    } else {
        Expr::Str(value)
    }
}

fn push_body(value: &mut String, quoted: &str, quotes: usize, raw: bool) {
    let body = quoted
        .get(quotes..quoted.len().saturating_sub(quotes))
        .unwrap_or_default();
    if raw {
        value.push_str(body);
        return;
    }

    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped) => push_escape(value, escaped),
            None => value.push('\\'),
        }
    }
}

fn push_escape(value: &mut String, escaped: char) {
    match escaped {
        'n' => value.push('\n'),
        't' => value.push('\t'),
        'r' => value.push('\r'),
        '0' => value.push('\0'),
        '\\' => value.push('\\'),
        '\'' => value.push('\''),
        '"' => value.push('"'),
        // Escaped newline continues the literal.
        '\n' => {}
        other => {
            value.push('\\');
            value.push(other);
        }
    }
}

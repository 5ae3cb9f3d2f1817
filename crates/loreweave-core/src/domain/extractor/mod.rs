//! Schema extraction from class-based model definitions.
//!
//! The accepted grammar is the declarative subset used by model files:
//! top-level `class Name(Base, ...):` blocks whose annotated members
//! (`name: Type = Field(...)`) become fields. Everything else in the file
//! (imports, functions, methods, constants, nested classes) is ignored.
//!
//! Parsing runs in two pest passes. [`layout`] splits the file into logical
//! lines with their indentation, and [`syntax`] parses each statement.

mod layout;
mod syntax;

use tracing::{debug, warn};

use self::layout::LogicalLine;
use self::syntax::{Expr, SyntaxError};
use super::error::DomainError;
use super::schema::{DefaultValue, FieldSchema, Literal, ModelSchema, SchemaSet, TypeDescriptor};

/// A field declaration that was dropped during extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedField {
    pub model: String,
    pub field: String,
    pub line: usize,
    pub reason: String,
}

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub schema: SchemaSet,
    pub skipped: Vec<SkippedField>,
}

/// Parses model-definition source into a [`SchemaSet`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaExtractor;

impl SchemaExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every top-level model from `source`, in declaration order.
    ///
    /// Malformed field declarations are skipped and reported in
    /// [`Extraction::skipped`]; the enclosing model survives.
    ///
    /// # Errors
    ///
    /// `DomainError::Parse` when a string or bracket is left open, the
    /// indentation is inconsistent, or a class header is malformed.
    pub fn extract(&self, source: &str) -> Result<Extraction, DomainError> {
        let lines = layout::logical_lines(source)?;
        let mut extraction = Extraction::default();

        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            if line.indent != 0 || !syntax::is_class_header(line.text) {
                i += 1;
                continue;
            }

            let header = syntax::class_header(line.text)
                .map_err(|err| located(source, line, err))?;
            let body_end = lines[i + 1..]
                .iter()
                .position(|l| l.indent == 0)
                .map_or(lines.len(), |offset| i + 1 + offset);

            let mut statements = Vec::new();
            if let Some((offset, body)) = header.inline_body {
                let line_no = line.line + line.text[..offset].matches('\n').count();
                statements.push((line_no, body));
            }
            if let Some(first) = lines[i + 1..body_end].first() {
                statements.extend(
                    lines[i + 1..body_end]
                        .iter()
                        .filter(|l| l.indent == first.indent)
                        .map(|l| (l.line, l.text)),
                );
            }

            let mut model = ModelSchema::new(header.name);
            model.bases = header.bases;
            build_model(&mut model, &statements, &mut extraction.skipped);
            debug!(model = %model.name, fields = model.fields.len(), "extracted model");
            extraction.schema.insert(model);
            i = body_end;
        }

        Ok(extraction)
    }
}

/// Place a statement-relative error in the source file.
fn located(source: &str, line: &LogicalLine<'_>, err: SyntaxError) -> DomainError {
    let (row, column) = pest::Position::new(source, line.offset + err.offset)
        .map_or((line.line, 1), |position| position.line_col());
    let located = DomainError::parse(err.message, row, column);
    match err.model {
        Some(model) => located.in_model(&model),
        None => located,
    }
}

fn build_model(
    model: &mut ModelSchema,
    statements: &[(usize, &str)],
    skipped: &mut Vec<SkippedField>,
) {
    let mut statements = statements.iter().peekable();
    if let Some(doc) = statements.peek().and_then(|(_, text)| syntax::docstring(text)) {
        model.description = Some(clean_docstring(&doc));
        statements.next();
    }

    for &(line, text) in statements {
        let Some(name) = syntax::field_name(text) else {
            continue;
        };
        match syntax::field(text) {
            Some(decl) => model.push_field(field_schema(&decl)),
            None => {
                let reason = skip_reason(text);
                warn!(model = %model.name, field = name, %reason, "skipping malformed field");
                skipped.push(SkippedField {
                    model: model.name.clone(),
                    field: name.to_string(),
                    line,
                    reason,
                });
            }
        }
    }
}

fn skip_reason(text: &str) -> String {
    let after_colon = text.split_once(':').map_or("", |(_, rest)| rest.trim_start());
    if after_colon.is_empty() || after_colon.starts_with(['=', '#']) {
        "missing type annotation".into()
    } else {
        "unparseable field declaration".into()
    }
}

fn field_schema(decl: &syntax::FieldDecl<'_>) -> FieldSchema {
    let ty = type_descriptor(&decl.annotation)
        .unwrap_or_else(|| TypeDescriptor::Raw(collapse_whitespace(decl.annotation_text)));
    let mut field = FieldSchema::new(decl.name, ty);
    if let [value] = decl.initializer.as_slice() {
        apply_initializer(&mut field, value);
    }
    field
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Structured descriptor for `expr`; `None` when some part of it has no
/// descriptor shape, such as a nested list or a call.
fn type_descriptor(expr: &Expr) -> Option<TypeDescriptor> {
    match expr {
        Expr::Name(_) | Expr::Attribute(..) => expr.dotted_name().map(TypeDescriptor::Named),
        Expr::Str(forward) => Some(forward_reference(forward)),
        Expr::Number(raw) => Some(TypeDescriptor::Named(raw.clone())),
        Expr::Ellipsis => Some(TypeDescriptor::named("...")),
        Expr::Subscript { value, index } => {
            let container = value.dotted_name()?;
            if is_annotated(&container) {
                return index.first().and_then(type_descriptor);
            }
            let arguments = index
                .iter()
                .map(type_descriptor)
                .collect::<Option<Vec<_>>>()?;
            Some(TypeDescriptor::Generic {
                container,
                arguments,
            })
        }
        Expr::BitOr(lhs, rhs) => {
            let mut members = Vec::new();
            for side in [lhs, rhs] {
                match type_descriptor(side)? {
                    TypeDescriptor::Union(inner) => members.extend(inner),
                    other => members.push(other),
                }
            }
            Some(TypeDescriptor::Union(members))
        }
        _ => None,
    }
}

/// `Annotated[T, ...]` carries validation metadata around `T`.
fn is_annotated(container: &str) -> bool {
    container == "Annotated" || container.ends_with(".Annotated")
}

/// Re-parse a quoted annotation; text that does not parse is kept verbatim.
fn forward_reference(text: &str) -> TypeDescriptor {
    let text = text.trim();
    syntax::expression(text)
        .as_ref()
        .and_then(type_descriptor)
        .unwrap_or_else(|| TypeDescriptor::Raw(text.to_string()))
}

fn apply_initializer(field: &mut FieldSchema, value: &Expr) {
    let Expr::Call { func, keywords, .. } = value else {
        return;
    };
    if func.dotted_name().as_deref() != Some("Field") {
        return;
    }

    if let Some((_, default)) = keywords
        .iter()
        .find(|(k, _)| k == "default" || k == "default_factory")
    {
        field.default = default_value(default);
    }
    if let Some((_, Expr::Str(description))) = keywords.iter().find(|(k, _)| k == "description")
    {
        field.description = Some(description.clone());
    }
}

fn default_value(expr: &Expr) -> Option<DefaultValue> {
    match expr {
        Expr::Name(name) => match name.as_str() {
            "None" => None,
            "True" => Some(DefaultValue::Literal(Literal::Bool(true))),
            "False" => Some(DefaultValue::Literal(Literal::Bool(false))),
            _ => Some(DefaultValue::Reference(name.clone())),
        },
        Expr::Attribute(_, attr) => Some(DefaultValue::Reference(attr.clone())),
        Expr::Str(text) => Some(DefaultValue::Literal(Literal::Text(text.clone()))),
        Expr::Number(raw) => Some(number_literal(raw, false)),
        Expr::Neg(inner) => match inner.as_ref() {
            Expr::Number(raw) => Some(number_literal(raw, true)),
            _ => Some(DefaultValue::Complex),
        },
        Expr::Ellipsis => None,
        _ => Some(DefaultValue::Complex),
    }
}

fn number_literal(raw: &str, negative: bool) -> DefaultValue {
    let digits = raw.replace('_', "");
    let lower = digits.to_ascii_lowercase();

    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    let integer = match radix {
        Some(radix) => i64::from_str_radix(&lower[2..], radix).ok(),
        None => lower.parse::<i64>().ok(),
    };
    if let Some(value) = integer {
        let value = if negative { value.checked_neg() } else { Some(value) };
        return value.map_or(DefaultValue::Complex, |v| {
            DefaultValue::Literal(Literal::Integer(v))
        });
    }

    if radix.is_none() && !lower.ends_with('j') {
        if let Ok(value) = lower.parse::<f64>() {
            let value = if negative { -value } else { value };
            return DefaultValue::Literal(Literal::Float(value));
        }
    }
    DefaultValue::Complex
}

/// Normalize docstring indentation the way documentation tools expect:
/// strip the first line, remove the common indent of the rest, and drop
/// leading and trailing blank lines.
fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            cleaned.push(line.trim());
        } else {
            cleaned.push(line.get(margin..).unwrap_or("").trim_end());
        }
    }

    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

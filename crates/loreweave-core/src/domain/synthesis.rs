//! Template synthesis: flattened fields to placeholder documents.

use std::fmt;
use std::str::FromStr;

use super::document::{TemplateMap, TemplateValue};
use super::error::DomainError;
use super::schema::{FieldSchema, ModelSchema, TypeDescriptor};

/// Type names rendered as `<name>` placeholders.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "str",
    "int",
    "float",
    "bool",
    "UUID",
    "datetime",
    "LocalizedString",
];

/// Containers rendered as an empty sequence.
pub const SEQUENCE_CONTAINERS: &[&str] = &[
    "List",
    "list",
    "Sequence",
    "Set",
    "set",
    "FrozenSet",
    "frozenset",
    "Tuple",
    "tuple",
];

/// Containers rendered as an empty mapping.
pub const MAPPING_CONTAINERS: &[&str] = &[
    "Dict",
    "dict",
    "Mapping",
    "MutableMapping",
    "OrderedDict",
    "DefaultDict",
];

/// Key suffix for per-field descriptions, and the per-model description key.
pub const DESCRIPTION_KEY: &str = "__description__";

/// Shape of the synthesized template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingMode {
    /// Placeholders only.
    Structural,
    /// Placeholders plus model and field descriptions.
    Annotated,
}

impl ProcessingMode {
    pub const ALL: [ProcessingMode; 2] = [Self::Structural, Self::Annotated];

    /// Directory name used in the output layout.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Annotated => "annotated",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ProcessingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "structural" => Ok(Self::Structural),
            "annotated" => Ok(Self::Annotated),
            _ => Err(DomainError::UnsupportedFormat {
                format: s.to_string(),
                supported: vec!["structural", "annotated"],
            }),
        }
    }
}

/// Converts flattened field lists into template fragments.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSynthesizer {
    mode: ProcessingMode,
}

impl TemplateSynthesizer {
    pub fn new(mode: ProcessingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Build the fragment `{model: {...}}` for one model.
    pub fn synthesize(&self, model: &ModelSchema, fields: &[FieldSchema]) -> TemplateMap {
        TemplateMap::new().with(model.name.clone(), self.body(model, fields))
    }

    /// Build the merged document for a list of flattened models.
    pub fn synthesize_all<'a, I>(&self, models: I) -> TemplateMap
    where
        I: IntoIterator<Item = (&'a ModelSchema, &'a [FieldSchema])>,
    {
        let mut merged = TemplateMap::new();
        for (model, fields) in models {
            merged.insert(model.name.clone(), self.body(model, fields));
        }
        merged
    }

    fn body(&self, model: &ModelSchema, fields: &[FieldSchema]) -> TemplateMap {
        let annotated = self.mode == ProcessingMode::Annotated;
        let mut body = TemplateMap::new();

        if let Some(description) = model.description.as_deref().filter(|_| annotated) {
            body.insert(DESCRIPTION_KEY, description);
        }

        for field in fields {
            body.insert(field.name.clone(), placeholder(field));
            if let Some(description) = field.description.as_deref().filter(|_| annotated) {
                body.insert(format!("{}{DESCRIPTION_KEY}", field.name), description);
            }
        }
        body
    }
}

/// Placeholder value for a single field.
pub fn placeholder(field: &FieldSchema) -> TemplateValue {
    if let Some(default) = &field.default {
        return default.placeholder();
    }

    let head = field.ty.head().unwrap_or_default();
    match &field.ty {
        TypeDescriptor::Named(name) if PRIMITIVE_TYPES.contains(&name.as_str()) => {
            TemplateValue::Text(format!("<{name}>"))
        }
        TypeDescriptor::Named(_) | TypeDescriptor::Generic { .. }
            if SEQUENCE_CONTAINERS.contains(&head) =>
        {
            TemplateValue::empty_sequence()
        }
        TypeDescriptor::Named(_) | TypeDescriptor::Generic { .. }
            if MAPPING_CONTAINERS.contains(&head) =>
        {
            TemplateValue::empty_mapping()
        }
        other => TemplateValue::Text(format!("<{other}>")),
    }
}

//! Schema intermediate representation.
//!
//! The extractor turns model-definition source into these types; every later
//! stage (flattening, synthesis, inspection) works only on them. They are
//! plain data: built once per extraction pass and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;

use super::document::TemplateValue;

/// Declared type of a field, as written in its annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A bare or dotted name: `str`, `Rarity`, `uuid.UUID`.
    Named(String),
    /// A parameterized container: `List[str]`, `Dict[str, Any]`.
    Generic {
        container: String,
        arguments: Vec<TypeDescriptor>,
    },
    /// A `|` union: `str | None`.
    Union(Vec<TypeDescriptor>),
    /// Annotation text kept verbatim when it is not built from names,
    /// subscripts and unions: `Callable[[int], str]`.
    Raw(String),
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn generic(container: impl Into<String>, arguments: Vec<TypeDescriptor>) -> Self {
        Self::Generic {
            container: container.into(),
            arguments,
        }
    }

    /// The outermost name: the container for generics, the name itself for
    /// named types. Unions and raw text have no head.
    pub fn head(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Generic { container, .. } => Some(container),
            Self::Union(_) | Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Generic {
                container,
                arguments,
            } => {
                write!(f, "{container}[")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
            Self::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Self::Raw(text) => write!(f, "{text}"),
        }
    }
}

/// A literal constant taken verbatim from a field initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Pre-resolved default of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// `default=0`, `default="x"`: rendered as the literal itself.
    Literal(Literal),
    /// `default_factory=list`, `default_factory=uuid.uuid4`: rendered `<list>`, `<uuid4>`.
    Reference(String),
    /// Any other expression: rendered `<complex value>`.
    Complex,
}

impl DefaultValue {
    pub const COMPLEX_PLACEHOLDER: &'static str = "<complex value>";

    /// The value a template shows for this default.
    pub fn placeholder(&self) -> TemplateValue {
        match self {
            Self::Literal(Literal::Bool(b)) => TemplateValue::Bool(*b),
            Self::Literal(Literal::Integer(i)) => TemplateValue::Integer(*i),
            Self::Literal(Literal::Float(x)) => TemplateValue::Float(*x),
            Self::Literal(Literal::Text(s)) => TemplateValue::Text(s.clone()),
            Self::Reference(name) => TemplateValue::Text(format!("<{name}>")),
            Self::Complex => TemplateValue::Text(Self::COMPLEX_PLACEHOLDER.to_string()),
        }
    }
}

/// One annotated member of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub ty: TypeDescriptor,
    pub default: Option<DefaultValue>,
    pub description: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
        }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One declared model: its own fields, direct bases and docstring.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
    pub bases: Vec<String>,
    pub description: Option<String>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            bases: Vec::new(),
            description: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field; a field with the same name is replaced where it stands.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.push_field(field);
        self
    }

    pub fn push_field(&mut self, field: FieldSchema) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// All models from one extraction pass, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSet {
    models: Vec<ModelSchema>,
    index: HashMap<String, usize>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a model. A redefinition keeps the original position.
    pub fn insert(&mut self, model: ModelSchema) {
        match self.index.get(&model.name) {
            Some(&slot) => self.models[slot] = model,
            None => {
                self.index.insert(model.name.clone(), self.models.len());
                self.models.push(model);
            }
        }
    }

    pub fn with_model(mut self, model: ModelSchema) -> Self {
        self.insert(model);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ModelSchema> {
        self.index.get(name).map(|&slot| &self.models[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Models in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelSchema> {
        self.models.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<ModelSchema> for SchemaSet {
    fn from_iter<I: IntoIterator<Item = ModelSchema>>(iter: I) -> Self {
        let mut set = Self::new();
        for model in iter {
            set.insert(model);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_descriptor_display_is_canonical() {
        let ty = TypeDescriptor::generic(
            "Dict",
            vec![
                TypeDescriptor::named("str"),
                TypeDescriptor::generic("List", vec![TypeDescriptor::named("uuid.UUID")]),
            ],
        );
        assert_eq!(ty.to_string(), "Dict[str, List[uuid.UUID]]");

        let union = TypeDescriptor::Union(vec![
            TypeDescriptor::named("str"),
            TypeDescriptor::named("None"),
        ]);
        assert_eq!(union.to_string(), "str | None");
        assert_eq!(union.head(), None);

        let raw = TypeDescriptor::Raw("Callable[[int], str]".into());
        assert_eq!(raw.to_string(), "Callable[[int], str]");
        assert_eq!(raw.head(), None);
    }

    #[test]
    fn default_placeholders() {
        assert_eq!(
            DefaultValue::Literal(Literal::Integer(0)).placeholder(),
            TemplateValue::Integer(0)
        );
        assert_eq!(
            DefaultValue::Reference("uuid4".into()).placeholder(),
            TemplateValue::Text("<uuid4>".into())
        );
        assert_eq!(
            DefaultValue::Complex.placeholder(),
            TemplateValue::Text("<complex value>".into())
        );
    }

    #[test]
    fn redefined_field_keeps_position() {
        let model = ModelSchema::new("M")
            .with_field(FieldSchema::new("a", TypeDescriptor::named("int")))
            .with_field(FieldSchema::new("b", TypeDescriptor::named("int")))
            .with_field(FieldSchema::new("a", TypeDescriptor::named("str")));

        let names: Vec<_> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(model.field("a").unwrap().ty, TypeDescriptor::named("str"));
    }

    #[test]
    fn schema_set_keeps_declaration_order() {
        let set: SchemaSet = ["Zeta", "Alpha", "Mid"]
            .into_iter()
            .map(ModelSchema::new)
            .collect();
        assert_eq!(set.names().collect::<Vec<_>>(), ["Zeta", "Alpha", "Mid"]);

        let set = set.with_model(ModelSchema::new("Zeta").with_description("again"));
        assert_eq!(set.len(), 3);
        assert_eq!(set.names().next(), Some("Zeta"));
        assert_eq!(set.get("Zeta").unwrap().description.as_deref(), Some("again"));
    }
}

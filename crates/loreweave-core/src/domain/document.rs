//! Ordered template documents.
//!
//! A [`TemplateMap`] keeps keys in insertion order and never reorders them:
//! inserting an existing key replaces the value where the key already stands.
//! That single rule gives both the inheritance override semantics of the
//! synthesizer and byte-stable output from every codec, without depending on
//! how a serializer orders its maps.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A node of a template document.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<TemplateValue>),
    Mapping(TemplateMap),
}

impl TemplateValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn empty_sequence() -> Self {
        Self::Sequence(Vec::new())
    }

    pub fn empty_mapping() -> Self {
        Self::Mapping(TemplateMap::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&TemplateMap> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Human name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<TemplateMap> for TemplateValue {
    fn from(value: TemplateMap) -> Self {
        Self::Mapping(value)
    }
}

/// Scalars print the way a reader expects to see them in prose.
impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => f.write_str(s),
            Self::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Mapping(map) => {
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Insertion-ordered string-keyed map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateMap {
    entries: Vec<(String, TemplateValue)>,
}

impl TemplateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace in place. Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<TemplateValue>,
    ) -> Option<TemplateValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge `other` into `self` with override-in-place semantics.
    pub fn extend(&mut self, other: TemplateMap) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as Markdown: one heading per key, `#` repeated per nesting level.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        write_markdown(self, 0, &mut out);
        out
    }
}

impl IntoIterator for TemplateMap {
    type Item = (String, TemplateValue);
    type IntoIter = std::vec::IntoIter<(String, TemplateValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, TemplateValue)> for TemplateMap {
    fn from_iter<I: IntoIterator<Item = (String, TemplateValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

fn write_markdown(map: &TemplateMap, level: usize, out: &mut String) {
    for (key, value) in map.iter() {
        out.push_str(&"#".repeat(level + 1));
        out.push(' ');
        out.push_str(key);
        out.push_str("\n\n");

        match value {
            TemplateValue::Mapping(nested) => write_markdown(nested, level + 1, out),
            TemplateValue::Sequence(items) => {
                for item in items {
                    match item {
                        TemplateValue::Mapping(nested) => write_markdown(nested, level + 1, out),
                        scalar => {
                            out.push_str("- ");
                            out.push_str(&scalar.to_string());
                            out.push('\n');
                        }
                    }
                }
                out.push('\n');
            }
            scalar => {
                out.push_str(&scalar.to_string());
                out.push_str("\n\n");
            }
        }
    }
}

// ── serde ─────────────────────────────────────────────────────────────────────

impl Serialize for TemplateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for TemplateMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            out.serialize_entry(key, value)?;
        }
        out.end()
    }
}

impl<'de> Deserialize<'de> for TemplateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for TemplateMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TemplateValue::deserialize(deserializer)? {
            TemplateValue::Mapping(map) => Ok(map),
            other => Err(de::Error::invalid_type(
                de::Unexpected::Other(other.kind()),
                &"a mapping",
            )),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = TemplateValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a template value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(TemplateValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(TemplateValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v)
            .map(TemplateValue::Integer)
            .unwrap_or(TemplateValue::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(TemplateValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(TemplateValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(TemplateValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(TemplateValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(TemplateValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        TemplateValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(TemplateValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = TemplateMap::new();
        while let Some((MapKey(key), value)) = access.next_entry::<MapKey, TemplateValue>()? {
            map.insert(key, value);
        }
        Ok(TemplateValue::Mapping(map))
    }
}

/// Mapping keys in YAML may be any scalar; they are kept as their text.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = MapKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar mapping key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<MapKey, E> {
                Ok(MapKey(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<MapKey, E> {
                Ok(MapKey("null".into()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut map = TemplateMap::new().with("a", "1").with("b", "2");
        let previous = map.insert("a", "3");

        assert_eq!(previous, Some(TemplateValue::text("1")));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(map.get("a"), Some(&TemplateValue::text("3")));
    }

    #[test]
    fn extend_overrides_without_reordering() {
        let mut base = TemplateMap::new().with("x", "base").with("y", "base");
        base.extend(TemplateMap::new().with("z", "child").with("x", "child"));

        assert_eq!(base.keys().collect::<Vec<_>>(), ["x", "y", "z"]);
        assert_eq!(base.get("x").and_then(TemplateValue::as_str), Some("child"));
    }

    #[test]
    fn serializes_in_insertion_order() {
        let map = TemplateMap::new()
            .with("zeta", TemplateValue::Integer(0))
            .with("alpha", TemplateValue::empty_sequence())
            .with("mid", TemplateValue::empty_mapping());

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"zeta":0,"alpha":[],"mid":{}}"#);
    }

    #[test]
    fn deserializes_preserving_order() {
        let map: TemplateMap =
            serde_json::from_str(r#"{"b": 1, "a": [true, null, 2.5], "c": {"k": "v"}}"#).unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(
            map.get("a"),
            Some(&TemplateValue::Sequence(vec![
                TemplateValue::Bool(true),
                TemplateValue::Null,
                TemplateValue::Float(2.5),
            ]))
        );
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        assert!(serde_json::from_str::<TemplateMap>("[1, 2]").is_err());
    }

    #[test]
    fn markdown_uses_heading_levels() {
        let doc = TemplateMap::new().with(
            "Item",
            TemplateMap::new()
                .with("name", "Sword")
                .with(
                    "tags",
                    TemplateValue::Sequence(vec!["sharp".into(), "old".into()]),
                ),
        );

        assert_eq!(
            doc.to_markdown(),
            "# Item\n\n## name\n\nSword\n\n## tags\n\n- sharp\n- old\n\n"
        );
    }
}

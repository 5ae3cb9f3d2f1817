//! Document codec backed by `serde_json` and `serde_yaml`.
//!
//! JSON is pretty-printed with two-space indentation and a trailing newline.
//! YAML is block style. Both keep keys in insertion order.

use loreweave_core::{
    application::{ApplicationError, ports::DocumentCodec},
    domain::{TemplateFormat, TemplateMap},
    error::LoreResult,
};

/// Production codec for template documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeCodec;

impl SerdeCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCodec for SerdeCodec {
    fn encode(&self, document: &TemplateMap, format: TemplateFormat) -> LoreResult<String> {
        let encoded = match format {
            TemplateFormat::Json => serde_json::to_string_pretty(document)
                .map(|mut text| {
                    text.push('\n');
                    text
                })
                .map_err(|e| e.to_string()),
            TemplateFormat::Yaml => serde_yaml::to_string(document).map_err(|e| e.to_string()),
        };

        encoded.map_err(|reason| {
            ApplicationError::EncodingFailed {
                format: format.to_string(),
                reason,
            }
            .into()
        })
    }

    fn decode(&self, text: &str, format: TemplateFormat) -> LoreResult<TemplateMap> {
        let decoded = match format {
            TemplateFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            TemplateFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        };

        decoded.map_err(|reason| {
            ApplicationError::DecodingFailed {
                format: format.to_string(),
                path: None,
                reason,
            }
            .into()
        })
    }
}

//! Content Service - fills a generated template through a text generator.

use std::path::Path;

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{ContentGenerator, DocumentCodec, Filesystem, GenerationRequest},
    },
    domain::{TemplateFormat, TemplateMap},
    error::LoreResult,
};

/// Content-fill service.
pub struct ContentService {
    generator: Box<dyn ContentGenerator>,
    filesystem: Box<dyn Filesystem>,
    codec: Box<dyn DocumentCodec>,
}

impl ContentService {
    pub fn new(
        generator: Box<dyn ContentGenerator>,
        filesystem: Box<dyn Filesystem>,
        codec: Box<dyn DocumentCodec>,
    ) -> Self {
        Self {
            generator,
            filesystem,
            codec,
        }
    }

    /// Fill `template` according to `prompt` and write the result to `output`.
    ///
    /// The response must parse as `format`; a single surrounding code fence
    /// is removed first. Nothing is written when it does not parse.
    #[instrument(
        skip_all,
        fields(template = %template.display(), output = %output.display(), format = %format)
    )]
    pub fn fill(
        &self,
        template: &Path,
        format: TemplateFormat,
        prompt: &str,
        output: &Path,
    ) -> LoreResult<TemplateMap> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ApplicationError::GenerationFailed {
                reason: "the prompt is empty".into(),
            }
            .into());
        }

        let template_text = self.filesystem.read_to_string(template)?;
        let request = GenerationRequest {
            system: system_prompt(&template_text),
            prompt: prompt.to_string(),
        };

        let response = self.generator.generate(&request)?;
        let document = self
            .codec
            .decode(strip_code_fence(&response), format)
            .map_err(|e| ApplicationError::GenerationFailed {
                reason: format!("response is not a valid {format} document: {e}"),
            })?;

        if let Some(parent) = output.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        let encoded = self.codec.encode(&document, format)?;
        self.filesystem.write_file(output, &encoded)?;

        info!(keys = document.len(), "Generated content saved");
        Ok(document)
    }
}

/// Instructions sent alongside the user's prompt.
pub fn system_prompt(template: &str) -> String {
    format!(
        "You are a creative worldbuilding assistant. Your task is to fill out the \
         following template with rich, imaginative content based on the user's prompt. \
         Ensure that the content is consistent and fits within the specified data \
         structure. Here's the template:\n\n{template}\n\nPlease fill out this template \
         with creative content that matches the user's prompt. Maintain the structure of \
         the template, replacing placeholder values with appropriate content. Ensure \
         consistency throughout the generated world. Respond with the filled template only."
    )
}

/// Remove one surrounding Markdown code fence, if present.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`yaml`, `json`) on the opening line.
    match body.split_once('\n') {
        Some((_info, inner)) => inner.trim(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::ports::MockContentGenerator;
    use crate::domain::TemplateValue;
    use crate::error::LoreError;

    /// In-test filesystem; clones share state.
    #[derive(Clone, Default)]
    struct FakeFs(Arc<Mutex<HashMap<PathBuf, String>>>);

    impl Filesystem for FakeFs {
        fn create_dir_all(&self, _path: &Path) -> LoreResult<()> {
            Ok(())
        }
        fn write_file(&self, path: &Path, content: &str) -> LoreResult<()> {
            self.0.lock().unwrap().insert(path.to_path_buf(), content.to_string());
            Ok(())
        }
        fn read_to_string(&self, path: &Path) -> LoreResult<String> {
            self.0.lock().unwrap().get(path).cloned().ok_or_else(|| {
                ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "not found".into(),
                }
                .into()
            })
        }
        fn exists(&self, path: &Path) -> bool {
            self.0.lock().unwrap().contains_key(path)
        }
        fn is_dir(&self, _path: &Path) -> bool {
            false
        }
        fn list_files(&self, _root: &Path) -> LoreResult<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    /// Line-based `key: value` codec, enough to exercise the service.
    struct LineCodec;

    impl DocumentCodec for LineCodec {
        fn encode(&self, document: &TemplateMap, _format: TemplateFormat) -> LoreResult<String> {
            Ok(document.iter().map(|(k, v)| format!("{k}: {v}\n")).collect())
        }
        fn decode(&self, text: &str, format: TemplateFormat) -> LoreResult<TemplateMap> {
            text.lines()
                .map(|line| {
                    line.split_once(": ")
                        .map(|(k, v)| (k.to_string(), TemplateValue::text(v)))
                        .ok_or_else(|| {
                            LoreError::from(ApplicationError::DecodingFailed {
                                format: format.to_string(),
                                path: None,
                                reason: format!("no separator in '{line}'"),
                            })
                        })
                })
                .collect()
        }
    }

    fn service(generator: MockContentGenerator, fs: &FakeFs) -> ContentService {
        ContentService::new(Box::new(generator), Box::new(fs.clone()), Box::new(LineCodec))
    }

    fn seeded_fs() -> FakeFs {
        let fs = FakeFs::default();
        fs.write_file(Path::new("t/all.yaml"), "name: <str>\n").unwrap();
        fs
    }

    #[test]
    fn fills_template_and_writes_result() {
        let fs = seeded_fs();
        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .withf(|req| req.prompt == "a desert city" && req.system.contains("name: <str>"))
            .times(1)
            .returning(|_| Ok("```yaml\nname: Qadesh\n```".to_string()));

        let doc = service(generator, &fs)
            .fill(
                Path::new("t/all.yaml"),
                TemplateFormat::Yaml,
                "  a desert city ",
                Path::new("t/generated_content.yaml"),
            )
            .unwrap();

        assert_eq!(doc.get("name"), Some(&TemplateValue::text("Qadesh")));
        assert_eq!(
            fs.read_to_string(Path::new("t/generated_content.yaml")).unwrap(),
            "name: Qadesh\n"
        );
    }

    #[test]
    fn unparseable_response_fails_without_writing() {
        let fs = seeded_fs();
        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Ok("Sorry, I cannot help with that".to_string()));

        let err = service(generator, &fs)
            .fill(
                Path::new("t/all.yaml"),
                TemplateFormat::Yaml,
                "anything",
                Path::new("t/out.yaml"),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            LoreError::Application(ApplicationError::GenerationFailed { .. })
        ));
        assert!(!fs.exists(Path::new("t/out.yaml")));
    }

    #[test]
    fn generator_errors_propagate() {
        let fs = seeded_fs();
        let mut generator = MockContentGenerator::new();
        generator.expect_generate().returning(|_| {
            Err(ApplicationError::GenerationFailed {
                reason: "timed out".into(),
            }
            .into())
        });

        let err = service(generator, &fs)
            .fill(
                Path::new("t/all.yaml"),
                TemplateFormat::Json,
                "x",
                Path::new("t/out.json"),
            )
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn empty_prompt_is_rejected_before_calling_out() {
        let fs = seeded_fs();
        let mut generator = MockContentGenerator::new();
        generator.expect_generate().never();

        let result = service(generator, &fs).fill(
            Path::new("t/all.yaml"),
            TemplateFormat::Yaml,
            "   ",
            Path::new("t/out.yaml"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn strips_single_fence_only() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\na: 1\n```\n"), "a: 1");
        assert_eq!(strip_code_fence("  a: 1  "), "a: 1");
        assert_eq!(strip_code_fence("```a: 1"), "```a: 1");
    }

    #[test]
    fn system_prompt_embeds_template() {
        let prompt = system_prompt("Hero:\n  name: <str>");
        assert!(prompt.contains("Hero:\n  name: <str>"));
        assert!(prompt.starts_with("You are a creative worldbuilding assistant."));
    }
}

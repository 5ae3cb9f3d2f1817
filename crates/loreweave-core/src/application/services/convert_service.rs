//! Convert Service - YAML content sheets to JSON or Markdown.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::{
    application::ports::{DocumentCodec, Filesystem},
    domain::{ConvertFormat, DomainError, TemplateFormat, TemplateMap, TemplateValue},
    error::LoreResult,
};

/// Version written by [`stamp_document`].
pub const SHEET_VERSION: &str = "1.0";

/// One file the converter could not handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertReport {
    /// `(input, output)` pairs, in processing order.
    pub converted: Vec<(PathBuf, PathBuf)>,
    pub failures: Vec<ConvertFailure>,
    /// Inputs that are not YAML files.
    pub skipped: Vec<PathBuf>,
}

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub format: ConvertFormat,
    /// Timestamp for `last_modified`; `None` leaves documents unstamped.
    pub stamp: Option<String>,
}

/// Document conversion service.
pub struct ConvertService {
    filesystem: Box<dyn Filesystem>,
    codec: Box<dyn DocumentCodec>,
}

impl ConvertService {
    pub fn new(filesystem: Box<dyn Filesystem>, codec: Box<dyn DocumentCodec>) -> Self {
        Self { filesystem, codec }
    }

    /// Convert a YAML file, or every YAML file below a directory.
    ///
    /// A file that fails to parse or write is recorded and the run goes on.
    #[instrument(
        skip_all,
        fields(input = %input.display(), output = %output_dir.display(), format = %options.format)
    )]
    pub fn convert(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &ConvertOptions,
    ) -> LoreResult<ConvertReport> {
        let mut report = ConvertReport::default();

        let candidates = if self.filesystem.is_dir(input) {
            self.filesystem.list_files(input)?
        } else if self.filesystem.exists(input) {
            vec![input.to_path_buf()]
        } else {
            return Err(DomainError::SourceUnreadable {
                path: input.display().to_string(),
                reason: "no such file or directory".into(),
            }
            .into());
        };

        let (inputs, skipped): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|p| is_yaml(p));
        for path in &skipped {
            warn!(path = %path.display(), "Not a YAML file, skipping");
        }
        report.skipped = skipped;

        if inputs.is_empty() {
            return Ok(report);
        }
        self.filesystem.create_dir_all(output_dir)?;

        for path in inputs {
            let target = output_path(output_dir, &path, options.format);
            match self.convert_one(&path, &target, options) {
                Ok(()) => {
                    info!(from = %path.display(), to = %target.display(), "Converted");
                    report.converted.push((path, target));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Conversion failed");
                    report.failures.push(ConvertFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn convert_one(&self, path: &Path, target: &Path, options: &ConvertOptions) -> LoreResult<()> {
        let text = self.filesystem.read_to_string(path)?;
        let mut document = self.codec.decode(&text, TemplateFormat::Yaml)?;
        if let Some(timestamp) = &options.stamp {
            document = stamp_document(document, timestamp);
        }

        let rendered = match options.format {
            ConvertFormat::Json => self.codec.encode(&document, TemplateFormat::Json)?,
            ConvertFormat::Markdown => document.to_markdown(),
        };
        self.filesystem.write_file(target, &rendered)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

fn output_path(output_dir: &Path, input: &Path, format: ConvertFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{stem}.{}", format.extension()))
}

/// Prefix a document with sheet metadata.
///
/// Keys already in the document keep their value; `sheet_type` falls back
/// to `"unknown"`.
pub fn stamp_document(document: TemplateMap, timestamp: &str) -> TemplateMap {
    let sheet_type = match document.get("sheet_type") {
        Some(TemplateValue::Text(kind)) => kind.clone(),
        _ => "unknown".to_string(),
    };

    let mut stamped = TemplateMap::new()
        .with("version", SHEET_VERSION)
        .with("sheet_type", sheet_type)
        .with("last_modified", timestamp);
    stamped.extend(document);
    stamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_prefixes_metadata_and_keeps_document_values() {
        let doc = TemplateMap::new()
            .with("name", "Mira")
            .with("version", "2.3");
        let stamped = stamp_document(doc, "2026-01-01T00:00:00Z");

        assert_eq!(
            stamped.keys().collect::<Vec<_>>(),
            ["version", "sheet_type", "last_modified", "name"]
        );
        assert_eq!(stamped.get("version").and_then(TemplateValue::as_str), Some("2.3"));
        assert_eq!(stamped.get("sheet_type").and_then(TemplateValue::as_str), Some("unknown"));
    }

    #[test]
    fn stamp_uses_document_sheet_type() {
        let doc = TemplateMap::new().with("sheet_type", "character");
        let stamped = stamp_document(doc, "t");
        assert_eq!(
            stamped.get("sheet_type").and_then(TemplateValue::as_str),
            Some("character")
        );
    }

    #[test]
    fn output_paths_use_stem_and_format_extension() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("lore/hero.yml"), ConvertFormat::Markdown),
            PathBuf::from("out/hero.md")
        );
        assert!(is_yaml(Path::new("a/B.YAML")));
        assert!(!is_yaml(Path::new("a/notes.txt")));
    }
}

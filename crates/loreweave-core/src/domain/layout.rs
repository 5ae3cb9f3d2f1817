//! Output formats and the on-disk template layout.
//!
//! ```text
//! <root>/<format>/<mode>/<stem>_all.<ext>
//! <root>/<format>/<mode>/sheets/<model>.<ext>
//! <root>/generated_content.<ext>
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::DomainError;
use super::synthesis::ProcessingMode;

/// Serialization format of generated templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateFormat {
    Yaml,
    Json,
}

impl TemplateFormat {
    pub const ALL: [TemplateFormat; 2] = [Self::Yaml, Self::Json];
    pub const NAMES: &'static [&'static str] = &["yaml", "json"];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    pub fn dir_name(self) -> &'static str {
        self.extension()
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TemplateFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(DomainError::UnsupportedFormat {
                format: s.to_string(),
                supported: Self::NAMES.to_vec(),
            }),
        }
    }
}

/// Target format of the document converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertFormat {
    Json,
    Markdown,
}

impl ConvertFormat {
    pub const NAMES: &'static [&'static str] = &["json", "markdown", "md"];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for ConvertFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Markdown => f.write_str("markdown"),
        }
    }
}

impl FromStr for ConvertFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(DomainError::UnsupportedFormat {
                format: s.to_string(),
                supported: Self::NAMES.to_vec(),
            }),
        }
    }
}

/// Parse and de-duplicate requested formats, keeping request order.
///
/// An empty request means every format. Fails on the first unknown name
/// so that nothing is written for a bad invocation.
pub fn parse_formats<S: AsRef<str>>(requested: &[S]) -> Result<Vec<TemplateFormat>, DomainError> {
    if requested.is_empty() {
        return Ok(TemplateFormat::ALL.to_vec());
    }
    let mut formats = Vec::new();
    for name in requested {
        let format: TemplateFormat = name.as_ref().parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

/// Paths of generated files under one output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    stem: String,
}

impl OutputLayout {
    pub const SHEETS_DIR: &'static str = "sheets";
    pub const GENERATED_STEM: &'static str = "generated_content";

    pub fn new(root: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            stem: stem.into(),
        }
    }

    /// Layout named after the model source file (`lorecore.py` → `lorecore`).
    pub fn for_source(root: impl Into<PathBuf>, source: &Path) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "models".to_string());
        Self::new(root, stem)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn mode_dir(&self, format: TemplateFormat, mode: ProcessingMode) -> PathBuf {
        self.root.join(format.dir_name()).join(mode.dir_name())
    }

    pub fn sheets_dir(&self, format: TemplateFormat, mode: ProcessingMode) -> PathBuf {
        self.mode_dir(format, mode).join(Self::SHEETS_DIR)
    }

    pub fn merged_path(&self, format: TemplateFormat, mode: ProcessingMode) -> PathBuf {
        self.mode_dir(format, mode)
            .join(format!("{}_all.{}", self.stem, format.extension()))
    }

    pub fn sheet_path(&self, format: TemplateFormat, mode: ProcessingMode, model: &str) -> PathBuf {
        self.sheets_dir(format, mode)
            .join(format!("{}.{}", model.to_lowercase(), format.extension()))
    }

    pub fn generated_path(&self, format: TemplateFormat) -> PathBuf {
        self.root
            .join(format!("{}.{}", Self::GENERATED_STEM, format.extension()))
    }
}

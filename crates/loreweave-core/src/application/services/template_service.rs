//! Template Service - main application orchestrator.
//!
//! This service coordinates the template workflow:
//! 1. Read and extract the model source
//! 2. Flatten every model (a cycle stops the run before any write)
//! 3. Synthesize each mode's templates
//! 4. Encode and write them in every requested format

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        error::WriteFailure,
        ports::{DocumentCodec, Filesystem},
    },
    domain::{
        DomainError, Extraction, FieldSchema, InheritanceResolver, ModelSchema, OutputLayout,
        ProcessingMode, SchemaExtractor, SkippedField, TemplateFormat, TemplateMap,
        TemplateSynthesizer,
    },
    error::LoreResult,
};

/// A model with its flattened field list, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub name: String,
    pub bases: Vec<String>,
    pub description: Option<String>,
    pub own_fields: usize,
    pub fields: Vec<FieldSchema>,
}

/// Templates for one mode: the merged document and one sheet per model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTemplates {
    pub mode: ProcessingMode,
    pub merged: TemplateMap,
    pub sheets: Vec<(String, TemplateMap)>,
}

/// Outcome of one materialization run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializeReport {
    pub models: usize,
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
    pub skipped_fields: Vec<SkippedField>,
}

impl MaterializeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn recorded write failures into an error.
    pub fn into_result(self) -> LoreResult<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(ApplicationError::WriteFailures {
                failures: self.failures,
            }
            .into())
        }
    }
}

/// Template generation service.
pub struct TemplateService {
    filesystem: Box<dyn Filesystem>,
    codec: Box<dyn DocumentCodec>,
    extractor: SchemaExtractor,
}

impl TemplateService {
    /// Create a new template service with the given adapters.
    pub fn new(filesystem: Box<dyn Filesystem>, codec: Box<dyn DocumentCodec>) -> Self {
        Self {
            filesystem,
            codec,
            extractor: SchemaExtractor::new(),
        }
    }

    /// Read and extract a model source file.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub fn load(&self, source: &Path) -> LoreResult<Extraction> {
        let text = self.filesystem.read_to_string(source).map_err(|e| {
            DomainError::SourceUnreadable {
                path: source.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let extraction = self.extractor.extract(&text)?;
        info!(
            models = extraction.schema.len(),
            skipped = extraction.skipped.len(),
            "Extracted model schema"
        );
        Ok(extraction)
    }

    /// Flattened view of every model, or of `only` when given.
    pub fn inspect(&self, source: &Path, only: Option<&str>) -> LoreResult<Vec<ModelSummary>> {
        let extraction = self.load(source)?;
        let schema = &extraction.schema;
        let mut resolver = InheritanceResolver::new(schema);

        let models: Vec<&ModelSchema> = match only {
            Some(name) => vec![schema.get(name).ok_or_else(|| DomainError::UnknownModel {
                name: name.to_string(),
            })?],
            None => schema.iter().collect(),
        };

        models
            .into_iter()
            .map(|model| -> LoreResult<ModelSummary> {
                Ok(ModelSummary {
                    name: model.name.clone(),
                    bases: model.bases.clone(),
                    description: model.description.clone(),
                    own_fields: model.fields.len(),
                    fields: resolver.flatten(&model.name)?.to_vec(),
                })
            })
            .collect()
    }

    /// Synthesize templates for every mode.
    ///
    /// All models are flattened first, so an inheritance cycle anywhere
    /// fails the whole call.
    pub fn synthesize(&self, extraction: &Extraction) -> LoreResult<Vec<ModeTemplates>> {
        let flattened = InheritanceResolver::new(&extraction.schema).flatten_all()?;

        Ok(ProcessingMode::ALL
            .into_iter()
            .map(|mode| {
                let synthesizer = TemplateSynthesizer::new(mode);
                let merged = synthesizer
                    .synthesize_all(flattened.iter().map(|(m, f)| (*m, f.as_slice())));
                let sheets = flattened
                    .iter()
                    .map(|(model, fields)| {
                        (model.name.clone(), synthesizer.synthesize(model, fields))
                    })
                    .collect();
                ModeTemplates {
                    mode,
                    merged,
                    sheets,
                }
            })
            .collect())
    }

    /// Generate and write every template for `source`.
    ///
    /// Files that cannot be written are recorded in the report and the run
    /// carries on; use [`MaterializeReport::into_result`] to fail on them.
    #[instrument(
        skip_all,
        fields(source = %source.display(), root = %layout.root().display())
    )]
    pub fn materialize(
        &self,
        source: &Path,
        layout: &OutputLayout,
        formats: &[TemplateFormat],
    ) -> LoreResult<MaterializeReport> {
        let extraction = self.load(source)?;
        let templates = self.synthesize(&extraction)?;

        let mut report = MaterializeReport {
            models: extraction.schema.len(),
            skipped_fields: extraction.skipped,
            ..MaterializeReport::default()
        };

        for &format in formats {
            for set in &templates {
                self.write_mode(layout, format, set, &mut report)?;
            }
            info!(format = %format, root = %layout.root().display(), "Templates generated");
        }

        if !report.failures.is_empty() {
            warn!(failed = report.failures.len(), "Some templates could not be written");
        }
        Ok(report)
    }

    fn write_mode(
        &self,
        layout: &OutputLayout,
        format: TemplateFormat,
        set: &ModeTemplates,
        report: &mut MaterializeReport,
    ) -> LoreResult<()> {
        let mode = set.mode;

        let mut files = Vec::with_capacity(set.sheets.len() + 1);
        files.push((
            layout.merged_path(format, mode),
            self.codec.encode(&set.merged, format)?,
        ));
        for (model, sheet) in &set.sheets {
            files.push((
                layout.sheet_path(format, mode, model),
                self.codec.encode(sheet, format)?,
            ));
        }

        let sheets_dir = layout.sheets_dir(format, mode);
        if let Err(e) = self.filesystem.create_dir_all(&sheets_dir) {
            warn!(path = %sheets_dir.display(), error = %e, "Cannot create output directory");
            report
                .failures
                .extend(files.into_iter().map(|(path, _)| WriteFailure {
                    path,
                    reason: e.to_string(),
                }));
            return Ok(());
        }

        for (path, content) in files {
            match self.filesystem.write_file(&path, &content) {
                Ok(()) => {
                    debug!(path = %path.display(), "Wrote template");
                    report.written.push(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to write template");
                    report.failures.push(WriteFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

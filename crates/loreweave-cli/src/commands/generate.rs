//! Implementation of the `loreweave generate` command.
//!
//! Responsibility: resolve formats and paths, run the template service,
//! and optionally fill one template through the content service.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use loreweave_adapters::{GeneratorConfig, LocalFilesystem, OpenAiGenerator, SerdeCodec};
use loreweave_core::{
    application::{ContentService, MaterializeReport, TemplateService},
    domain::{DomainError, OutputLayout, ProcessingMode, TemplateFormat, parse_formats},
    error::LoreError,
};

use crate::{
    cli::{GenerateArgs, Mode},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `loreweave generate` command.
///
/// 1. Resolve formats (an unknown format stops here, before any I/O)
/// 2. Materialize every template in every format
/// 3. Report skipped fields and write failures
/// 4. With `--prompt`, fill the chosen template and save the result
#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let formats = resolve_formats(&args, &config)?;
    let root = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.templates_dir.clone());
    let layout = OutputLayout::for_source(root, &args.input);

    debug!(
        formats = ?formats,
        root = %layout.root().display(),
        stem = layout.stem(),
        "Generation plan resolved"
    );

    let service = TemplateService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(SerdeCodec::new()),
    );
    let report = service.materialize(&args.input, &layout, &formats)?;
    show_report(&report, &layout, &output)?;
    let report = report.into_result()?;

    let prompt = args.prompt.join(" ");
    if prompt.trim().is_empty() {
        return Ok(());
    }

    let format = formats[0];
    let mode = convert_mode(args.mode);
    let template = template_path(&layout, format, mode, args.sheet.as_deref(), &report)?;
    let destination = layout.generated_path(format);

    let generator = OpenAiGenerator::new(generator_config(&args, &config))?;
    info!(
        endpoint = %generator.config().endpoint,
        model = %generator.config().model,
        template = %template.display(),
        "Requesting content"
    );
    let content = ContentService::new(
        Box::new(generator),
        Box::new(LocalFilesystem::new()),
        Box::new(SerdeCodec::new()),
    );

    let spinner = output.spinner(format!("Filling {}", file_name(&template)));
    let filled = content.fill(&template, format, &prompt, &destination);
    spinner.finish_and_clear();
    filled?;

    output.success(&format!(
        "Generated content saved to {}",
        destination.display()
    ))?;
    Ok(())
}

/// `--format` values, then `--yaml`/`--json`, else the configured default.
fn resolve_formats(args: &GenerateArgs, config: &AppConfig) -> CliResult<Vec<TemplateFormat>> {
    let mut requested: Vec<String> = args.formats.clone();
    if args.yaml {
        requested.push("yaml".into());
    }
    if args.json {
        requested.push("json".into());
    }
    if requested.is_empty() {
        requested = config.output.formats.clone();
    }
    Ok(parse_formats(&requested).map_err(LoreError::from)?)
}

fn convert_mode(mode: Mode) -> ProcessingMode {
    match mode {
        Mode::Structural => ProcessingMode::Structural,
        Mode::Annotated => ProcessingMode::Annotated,
    }
}

/// The merged template, or one model's sheet, as written by this run.
fn template_path(
    layout: &OutputLayout,
    format: TemplateFormat,
    mode: ProcessingMode,
    sheet: Option<&str>,
    report: &MaterializeReport,
) -> CliResult<PathBuf> {
    let Some(model) = sheet else {
        return Ok(layout.merged_path(format, mode));
    };
    let path = layout.sheet_path(format, mode, model);
    if report.written.contains(&path) {
        Ok(path)
    } else {
        Err(LoreError::from(DomainError::UnknownModel {
            name: model.to_string(),
        })
        .into())
    }
}

/// Configured generator settings with CLI (and `VLLM_*`) overrides.
fn generator_config(args: &GenerateArgs, config: &AppConfig) -> GeneratorConfig {
    let mut settings = config.generator.to_generator_config();
    if let Some(endpoint) = &args.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(key) = args.api_key.as_ref().filter(|k| !k.is_empty()) {
        settings.api_key = Some(key.clone());
    }
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(secs) = args.timeout {
        settings.timeout = std::time::Duration::from_secs(secs);
    }
    settings
}

fn show_report(
    report: &MaterializeReport,
    layout: &OutputLayout,
    output: &OutputManager,
) -> CliResult<()> {
    for skipped in &report.skipped_fields {
        output.warning(&format!(
            "Skipped {}.{} (line {}): {}",
            skipped.model, skipped.field, skipped.line, skipped.reason
        ))?;
    }
    if report.written.is_empty() && report.failures.is_empty() {
        output.warning("No models found; nothing was written")?;
        return Ok(());
    }
    for failure in &report.failures {
        output.warning(&format!("Could not write {failure}"))?;
    }
    output.success(&format!(
        "Generated {} template(s) for {} model(s) in {}",
        report.written.len(),
        report.models,
        layout.root().display()
    ))?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["loreweave", "generate", "lorecore.py"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Generate(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_request_uses_configured_formats() {
        let formats = resolve_formats(&generate_args(&[]), &AppConfig::default()).unwrap();
        assert_eq!(formats, [TemplateFormat::Yaml, TemplateFormat::Json]);
    }

    #[test]
    fn flags_and_formats_combine_without_duplicates() {
        let args = generate_args(&["--json", "-f", "json", "--yaml"]);
        let formats = resolve_formats(&args, &AppConfig::default()).unwrap();
        assert_eq!(formats, [TemplateFormat::Json, TemplateFormat::Yaml]);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let args = generate_args(&["-f", "xml"]);
        let err = resolve_formats(&args, &AppConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn flags_override_configured_generator() {
        let args = generate_args(&[
            "--endpoint",
            "http://gpu:9000/v1",
            "--model",
            "small",
            "--timeout",
            "7",
        ]);
        let settings = generator_config(&args, &AppConfig::default());
        assert_eq!(settings.endpoint, "http://gpu:9000/v1");
        assert_eq!(settings.model, "small");
        assert_eq!(settings.timeout, Duration::from_secs(7));
        assert_eq!(settings.max_tokens, 4000);
    }

    #[test]
    fn sheet_must_have_been_written() {
        let layout = OutputLayout::new("lore", "lorecore");
        let mode = ProcessingMode::Annotated;
        let report = MaterializeReport {
            written: vec![layout.sheet_path(TemplateFormat::Yaml, mode, "Item")],
            ..MaterializeReport::default()
        };

        let path =
            template_path(&layout, TemplateFormat::Yaml, mode, Some("Item"), &report).unwrap();
        assert_eq!(path, PathBuf::from("lore/yaml/annotated/sheets/item.yaml"));

        let err = template_path(&layout, TemplateFormat::Yaml, mode, Some("Ghost"), &report)
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn merged_template_is_the_default() {
        let layout = OutputLayout::new("lore", "lorecore");
        let path = template_path(
            &layout,
            TemplateFormat::Json,
            ProcessingMode::Structural,
            None,
            &MaterializeReport::default(),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("lore/json/structural/lorecore_all.json"));
    }
}

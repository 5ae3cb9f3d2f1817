//! Implementation of the `loreweave convert` command.

use chrono::{SecondsFormat, Utc};
use tracing::instrument;

use loreweave_adapters::{LocalFilesystem, SerdeCodec};
use loreweave_core::{
    application::{ConvertOptions, ConvertReport, ConvertService},
    domain::ConvertFormat,
    error::LoreError,
};

use crate::{
    cli::ConvertArgs,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn execute(args: ConvertArgs, output: OutputManager) -> CliResult<()> {
    let format: ConvertFormat = args.format.parse().map_err(LoreError::from)?;
    let options = ConvertOptions {
        format,
        stamp: args.stamp.then(timestamp),
    };

    let service = ConvertService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(SerdeCodec::new()),
    );
    let report = service.convert(&args.input, &args.output, &options)?;
    show_report(&report, &output)?;

    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::ConversionIncomplete {
            failed: report.failures.len(),
            total: report.failures.len() + report.converted.len(),
        })
    }
}

/// Current UTC time, RFC 3339 with second precision.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn show_report(report: &ConvertReport, output: &OutputManager) -> CliResult<()> {
    for path in &report.skipped {
        output.warning(&format!("Skipped {} (not a YAML file)", path.display()))?;
    }
    for (from, to) in &report.converted {
        output.row(&from.display().to_string(), &format!("-> {}", to.display()))?;
    }
    for failure in &report.failures {
        output.warning(&format!("{}: {}", failure.path.display(), failure.reason))?;
    }
    if !report.converted.is_empty() {
        output.success(&format!("Converted {} document(s)", report.converted.len()))?;
    } else if report.failures.is_empty() {
        output.info("No YAML documents to convert")?;
    }
    Ok(())
}

use super::CliError;
use anyhow::Context;
use coincell_core::common::ClusterConfig;
use coincell_core::domain::{CoincError, CoincResult, ParameterMinima};
use coincell_core::modules::ingest::CandidateFiles;
use coincell_core::modules::report::RunSummary;
use coincell_core::modules::{RunOutcome, RunRequest};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Machine-readable record of one run, written by `--report`.
#[derive(Debug, Serialize)]
pub(super) struct CliRunReport<'a> {
    pub(super) config: &'a ClusterConfig,
    pub(super) input_files: Vec<String>,
    pub(super) output: &'a Path,
    pub(super) output_dir: &'a Path,
    pub(super) file_count: usize,
    pub(super) ingested_candidates: usize,
    pub(super) minima: ParameterMinima,
    pub(super) artifacts: Vec<PathBuf>,
    pub(super) summary: &'a RunSummary,
}

impl<'a> CliRunReport<'a> {
    pub(super) fn new(request: &'a RunRequest, inputs: &[PathBuf], outcome: &'a RunOutcome) -> Self {
        Self {
            config: &request.config,
            input_files: inputs
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            output: &request.output_path,
            output_dir: &request.output_dir,
            file_count: outcome.file_count,
            ingested_candidates: outcome.ingested_candidates,
            minima: outcome.minima,
            artifacts: outcome
                .artifacts
                .iter()
                .map(|artifact| artifact.path.clone())
                .collect(),
            summary: &outcome.summary,
        }
    }
}

/// Explicit files win; otherwise the directory is scanned for `base_name`.
pub(super) fn build_source(
    inputs: &[PathBuf],
    input_dir: Option<&Path>,
    base_name: &str,
) -> CoincResult<CandidateFiles> {
    if !inputs.is_empty() {
        return Ok(CandidateFiles::new(inputs.iter().cloned()));
    }
    match input_dir {
        Some(directory) => CandidateFiles::from_directory(directory, base_name),
        None => Err(CoincError::configuration(
            "CONFIG.NO_INPUT",
            "either --input or --input-dir must be given",
        )),
    }
}

pub(super) fn write_report_file(report_path: &Path, report: &CliRunReport<'_>) -> Result<(), CliError> {
    if let Some(parent_dir) = report_path.parent() {
        if !parent_dir.as_os_str().is_empty() {
            fs::create_dir_all(parent_dir).with_context(|| {
                format!("failed to create report directory '{}'", parent_dir.display())
            })?;
        }
    }

    let report_json = serde_json::to_string_pretty(report)
        .with_context(|| format!("failed to serialize run report '{}'", report_path.display()))?;
    fs::write(report_path, report_json)
        .with_context(|| format!("failed to write run report '{}'", report_path.display()))?;
    Ok(())
}

use super::cluster::cluster;
use super::grid::{GridSpec, replicate};
use super::ingest::ingest;
use super::report::{RunSummary, build_report};
use super::serialization::{StageError, StagedArtifacts};
use super::traits::CandidateSource;
use crate::common::ClusterConfig;
use crate::domain::{CoincError, CoincResult, ParameterMinima, RunArtifact};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub config: ClusterConfig,
    /// Destination of the all-cells dump.
    pub output_path: PathBuf,
    /// Directory receiving the auxiliary outlier and sky-maximum files.
    pub output_dir: PathBuf,
}

impl RunRequest {
    /// Auxiliary files go next to `output_path`.
    pub fn new(config: ClusterConfig, output_path: impl Into<PathBuf>) -> Self {
        let output_path = output_path.into();
        let output_dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            config,
            output_path,
            output_dir,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Written files, the all-cells dump first.
    pub artifacts: Vec<RunArtifact>,
    pub summary: RunSummary,
    pub minima: ParameterMinima,
    pub file_count: usize,
    pub ingested_candidates: usize,
}

/// Ingests, replicates, clusters and reports in one batch.
///
/// The configuration is validated before any source is read. Artifacts are
/// only written once every one of them has been staged.
pub fn run_clustering(
    source: &dyn CandidateSource,
    request: &RunRequest,
) -> CoincResult<RunOutcome> {
    let config = &request.config;
    config.validate()?;

    let ingested = ingest(source, config.max_candidates)?;
    let ingested_candidates = ingested.records.len();
    let file_count = ingested.file_count;
    let minima = ingested.minima;

    let spec = GridSpec::new(config.widths, config.shift, config.kappa, &minima);
    let replicas = replicate(ingested.records, &spec)?;
    let outcome = cluster(replicas, config.two_f_threshold)?;
    let report = build_report(&outcome, config.selection);
    drop(outcome);

    let mut stage = StagedArtifacts::new();
    stage
        .stage_text(&request.output_path, &report.primary)
        .map_err(output_error)?;
    for artifact in &report.auxiliary {
        stage
            .stage_text(&request.output_dir.join(artifact.file_name), &artifact.content)
            .map_err(output_error)?;
    }
    let written = stage.persist_all().map_err(output_error)?;
    info!(
        artifacts = written.len(),
        output = %request.output_path.display(),
        "run complete"
    );

    Ok(RunOutcome {
        artifacts: written.into_iter().map(RunArtifact::new).collect(),
        summary: report.summary,
        minima,
        file_count,
        ingested_candidates,
    })
}

fn output_error(error: StageError) -> CoincError {
    let placeholder = match error {
        StageError::Persist { .. } => "OUTPUT.PERSIST",
        StageError::Create { .. } | StageError::Write { .. } | StageError::Blocked { .. } => {
            "OUTPUT.WRITE"
        }
    };
    CoincError::io_system(placeholder, error.to_string())
}

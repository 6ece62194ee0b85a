mod parser;

use super::traits::{CandidateSource, NamedSource};
use crate::domain::{CandidateRecord, CoincError, IngestResult, ParameterMinima};
use globset::Glob;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use parser::parse_candidate_source;

/// Flat record list plus the per-parameter minima that anchor the grid origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub records: Vec<CandidateRecord>,
    pub minima: ParameterMinima,
    pub file_count: usize,
}

/// Candidate files on disk, read in the given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFiles {
    paths: Vec<PathBuf>,
}

impl CandidateFiles {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Every regular file in `directory` whose name contains `base_name`,
    /// sorted by path.
    pub fn from_directory(directory: &Path, base_name: &str) -> IngestResult<Self> {
        let pattern = format!("*{}*", base_name);
        let matcher = Glob::new(&pattern)
            .map_err(|source| {
                CoincError::configuration(
                    "CONFIG.BASE_NAME",
                    format!("invalid input base name '{}': {}", base_name, source),
                )
            })?
            .compile_matcher();

        let entries = fs::read_dir(directory).map_err(|source| {
            CoincError::ingestion(
                "INPUT.DIRECTORY",
                format!(
                    "failed to list input directory '{}': {}",
                    directory.display(),
                    source
                ),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| {
                CoincError::ingestion(
                    "INPUT.DIRECTORY",
                    format!(
                        "failed to read an entry of input directory '{}': {}",
                        directory.display(),
                        source
                    ),
                )
            })?;
            let path = entry.path();
            let matches = path
                .file_name()
                .is_some_and(|file_name| matcher.is_match(file_name));
            if matches && path.is_file() {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(CoincError::ingestion(
                "INPUT.NO_FILES",
                format!(
                    "no input files matching '{}' in directory '{}'",
                    pattern,
                    directory.display()
                ),
            ));
        }

        paths.sort();
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl CandidateSource for CandidateFiles {
    fn source_count(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, position: usize) -> IngestResult<NamedSource> {
        let path = self.paths.get(position).ok_or_else(|| {
            CoincError::internal(
                "SYS.SOURCE_POSITION",
                format!(
                    "candidate file position {} is out of range for {} files",
                    position,
                    self.paths.len()
                ),
            )
        })?;
        let bytes = fs::read(path).map_err(|source| {
            CoincError::ingestion(
                "INPUT.READ",
                format!("failed to read candidate file '{}': {}", path.display(), source),
            )
        })?;
        Ok(NamedSource {
            name: path.display().to_string(),
            bytes,
        })
    }
}

/// Candidate file contents held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InMemoryCandidates {
    sources: Vec<NamedSource>,
}

impl InMemoryCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.sources.push(NamedSource {
            name: name.into(),
            bytes: content.into().into_bytes(),
        });
        self
    }
}

impl CandidateSource for InMemoryCandidates {
    fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn load(&self, position: usize) -> IngestResult<NamedSource> {
        self.sources.get(position).cloned().ok_or_else(|| {
            CoincError::internal(
                "SYS.SOURCE_POSITION",
                format!(
                    "in-memory source position {} is out of range for {} sources",
                    position,
                    self.sources.len()
                ),
            )
        })
    }
}

/// Reads every source into one flat list.
///
/// Records at or below the detection threshold are kept; thresholding
/// happens during the clustering scan.
pub fn ingest(source: &dyn CandidateSource, max_candidates: usize) -> IngestResult<Ingested> {
    let mut records = Vec::new();
    let mut minima = ParameterMinima::default();

    for position in 0..source.source_count() {
        let named = source.load(position)?;
        let parsed = parse_candidate_source(&named.name, &named.bytes)?;
        info!(
            file = %named.name,
            bytecount = parsed.byte_count,
            checksum = parsed.checksum,
            "read candidate file"
        );

        let total = records.len() + parsed.records.len();
        if total > max_candidates {
            return Err(CoincError::resource(
                "RESOURCE.MAX_CANDIDATES",
                format!(
                    "candidate count {} after '{}' exceeds the ceiling of {}",
                    total, named.name, max_candidates
                ),
            ));
        }

        if parsed.records.is_empty() {
            debug!(file = %named.name, "no candidate events in file");
            continue;
        }

        records.try_reserve(parsed.records.len()).map_err(|source| {
            CoincError::resource(
                "RESOURCE.CANDIDATE_ALLOC",
                format!(
                    "could not allocate memory for candidate file '{}': {}",
                    named.name, source
                ),
            )
        })?;
        debug!(file = %named.name, records = parsed.records.len(), "appending candidates");
        records.extend_from_slice(&parsed.records);
        minima.merge(&parsed.minima);
    }

    info!(
        files = source.source_count(),
        candidates = records.len(),
        "ingestion complete"
    );

    Ok(Ingested {
        records,
        minima,
        file_count: source.source_count(),
    })
}

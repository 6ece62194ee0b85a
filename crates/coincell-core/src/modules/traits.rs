use crate::domain::IngestResult;

/// Raw contents of one candidate file together with the name used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Supplier of candidate files, read one at a time so only one raw file is
/// held in memory during ingestion.
pub trait CandidateSource {
    fn source_count(&self) -> usize;

    fn load(&self, position: usize) -> IngestResult<NamedSource>;
}

#[cfg(test)]
mod tests {
    use super::{CandidateSource, NamedSource};
    use crate::domain::{CoincError, CoincErrorCategory, IngestResult};

    struct UnreadableSource;

    impl CandidateSource for UnreadableSource {
        fn source_count(&self) -> usize {
            1
        }

        fn load(&self, position: usize) -> IngestResult<NamedSource> {
            Err(CoincError::ingestion(
                "INPUT.READ",
                format!("source {} could not be read", position),
            ))
        }
    }

    #[test]
    fn candidate_source_uses_shared_error_types() {
        let error = UnreadableSource
            .load(0)
            .expect_err("source should fail");
        assert_eq!(error.category(), CoincErrorCategory::IngestionError);
        assert_eq!(error.exit_code(), 3);
        assert_eq!(error.placeholder(), "INPUT.READ");
    }
}

pub mod cluster;
pub mod grid;
pub mod ingest;
pub mod report;
pub mod serialization;

mod run;
mod traits;

pub use run::{RunOutcome, RunRequest, run_clustering};
pub use traits::{CandidateSource, NamedSource};

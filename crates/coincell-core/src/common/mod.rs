pub mod config;
pub mod constants;

pub use config::{CellWidths, ClusterConfig, GridShift, OutputSelection};

//! Output and reporting

mod stats;

pub use stats::{load_statistics, print_run_summary, print_statistics, DatasetStatistics};

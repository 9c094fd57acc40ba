//! Run configuration and target list loading

mod file;
mod run;
mod targets;


pub use file::{RefreshFile, RunSection};
pub use run::{RunConfig, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_OPERATION_TIMEOUT};
pub use targets::{load_target_file, parse_target_list};

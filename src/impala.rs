//! Impala table metadata refresh
//!
//! Refreshing runs `impala-shell` against each daemon with a `refresh`
//! statement followed by `DESCRIBE`, which makes the shell wait for the
//! catalog to actually serve the new metadata. A zero exit is not enough on
//! its own: the shell only prints [`REFRESH_CONFIRMATION`] when the refresh
//! went through, so that text is required in the output.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::process::{CommandOperation, TARGET_PLACEHOLDER};

/// Default name of the Impala shell program
pub const DEFAULT_IMPALA_SHELL: &str = "impala-shell";

/// Printed by impala-shell after a successful `refresh`
pub const REFRESH_CONFIRMATION: &str = "Successfully refreshed table";

/// Query executed on every daemon
pub fn refresh_query(table: &str) -> String {
    format!("refresh {table}; DESCRIBE {table}")
}

/// Build the per-node refresh operation for `table`.
///
/// The table name is interpolated into the query as-is, so callers must
/// validate it first (see [`crate::validation::validate_table_name`]).
pub fn refresh_operation(shell: &str, table: &str) -> CommandOperation {
    CommandOperation::new(shell)
        .args(["-i", TARGET_PLACEHOLDER, "-q"])
        .arg(refresh_query(table))
        .with_confirmation_marker(REFRESH_CONFIRMATION)
}

/// Resolve the shell program on `PATH`
pub fn locate_shell(shell: &str) -> Result<PathBuf> {
    which::which(shell).with_context(|| format!("Impala shell ({shell}) is required!"))
}

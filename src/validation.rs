//! Input validation for command-line and config file values.
//!
//! The table name ends up inside a SQL statement and the node address ends up
//! as a program argument, so both are checked before anything is spawned.

use anyhow::{bail, Context, Result};
use regex::Regex;

/// Maximum allowed length for a table name, including the database prefix.
pub const MAX_TABLE_NAME_LENGTH: usize = 256;

/// Maximum allowed length for a node address, including the port.
pub const MAX_TARGET_LENGTH: usize = 255;

/// `table` or `database.table`, identifier characters only.
const TABLE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?$";

/// Hostname, IPv4 or bracketed IPv6 address with an optional port.
const TARGET_PATTERN: &str = r"^(?:[A-Za-z0-9_][A-Za-z0-9._-]*|\[[0-9A-Fa-f:.]+\])(?::[0-9]{1,5})?$";

/// Validates a table name before it is interpolated into the refresh query.
///
/// # Examples
///
/// ```
/// use refresher::validation::validate_table_name;
///
/// assert!(validate_table_name("orders").is_ok());
/// assert!(validate_table_name("sales.orders").is_ok());
/// assert!(validate_table_name("orders; DROP TABLE x").is_err());
/// ```
pub fn validate_table_name(table: &str) -> Result<()> {
    if table.is_empty() {
        bail!("Table name cannot be empty");
    }

    if table.len() > MAX_TABLE_NAME_LENGTH {
        bail!(
            "Table name too long: {} characters (max {})",
            table.len(),
            MAX_TABLE_NAME_LENGTH
        );
    }

    let pattern = Regex::new(TABLE_NAME_PATTERN).context("Invalid table name pattern")?;
    if !pattern.is_match(table) {
        bail!("Table name '{table}' is invalid. Use `table` or `database.table` with alphanumeric characters and underscores");
    }

    Ok(())
}

/// Validates a node address.
///
/// Rejects whitespace and a leading dash, which the shell program would
/// otherwise parse as a flag.
pub fn validate_target(target: &str) -> Result<()> {
    if target.is_empty() {
        bail!("Node address cannot be empty");
    }

    if target.len() > MAX_TARGET_LENGTH {
        bail!(
            "Node address too long: {} characters (max {})",
            target.len(),
            MAX_TARGET_LENGTH
        );
    }

    let pattern = Regex::new(TARGET_PATTERN).context("Invalid node address pattern")?;
    if !pattern.is_match(target) {
        bail!("Node address '{target}' is invalid. Use host, host:port or [ipv6]:port");
    }

    Ok(())
}

/// Clap value parser for table name arguments.
pub fn clap_table_validator(s: &str) -> Result<String, String> {
    validate_table_name(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Clap value parser for node address arguments.
pub fn clap_target_validator(s: &str) -> Result<String, String> {
    validate_target(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

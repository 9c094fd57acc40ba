//! Target list parsing

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::dispatch::Target;

/// Parse a node list.
///
/// Targets are separated by whitespace, commas or newlines. `#` starts a
/// comment running to the end of the line. Repeated targets are dropped,
/// keeping the first occurrence so dispatch order follows the file.
pub fn parse_target_list(content: &str) -> Vec<Target> {
    let mut seen = HashSet::new();

    content
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(token.to_string()))
        .map(Target::new)
        .collect()
}

/// Read a node list file, see [`parse_target_list`]
pub fn load_target_file(path: &Path) -> Result<Vec<Target>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read nodes file: {}", path.display()))?;
    Ok(parse_target_list(&content))
}

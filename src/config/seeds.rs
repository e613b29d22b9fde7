use crate::ConfigResult;
use std::collections::HashSet;
use std::path::Path;

/// Reads a newline-delimited seed list
///
/// Lines are trimmed; blank lines and `#` comments are skipped, and repeated
/// entries are dropped keeping the first occurrence. Seeds are returned as
/// written; validation happens when they are enqueued.
pub fn load_seeds(path: &Path) -> ConfigResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_seeds(&content))
}

/// Parses seed list content (see [`load_seeds`])
pub fn parse_seeds(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

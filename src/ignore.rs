//! Loading the ignore list of intentionally uncovered methods.
//!
//! One exact qualified method name per line. Blank lines and lines
//! starting with `#` are comments. Entries match catalog entries by
//! string equality only; no pattern syntax.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context;

/// Load an ignore list. Unreadable files are fatal; the checker never
/// starts with a partially loaded whitelist.
pub fn load(path: &Path) -> anyhow::Result<BTreeSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read ignore list {}", path.display()))?;
    Ok(parse(&content))
}

/// Parse ignore-list content into a set of qualified names.
pub fn parse(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect()
}

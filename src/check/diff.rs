//! Set-subtracting observed calls and the ignore list from the catalog.

use std::collections::BTreeSet;

/// `catalog - observed - ignored`, as a lexicographically sorted sequence.
///
/// Sorted output keeps runs byte-identical so CI logs diff cleanly.
pub fn diff(
    catalog: &BTreeSet<String>,
    observed: &BTreeSet<String>,
    ignored: &BTreeSet<String>,
) -> Vec<String> {
    catalog
        .iter()
        .filter(|name| !observed.contains(*name) && !ignored.contains(*name))
        .cloned()
        .collect()
}

//! Building the catalog of candidate accessor methods.
//!
//! A method is a candidate iff it is instance-level, public and
//! const-qualified, and neither its return type nor its qualified name
//! matches an exclusion filter. Begin/end accessor pairs are iteration
//! primitives whose use is implied by use of the range they bound, and
//! source-location handles are orthogonal to structural content; both are
//! excluded wholesale instead of being whitelisted one by one.

use std::collections::BTreeSet;

use regex::Regex;

use crate::model::{Access, ClassDecl, MethodSig};

lazy_static::lazy_static! {
    /// Return types excluded from the catalog.
    static ref RETURN_TYPE_FILTERS: Vec<Regex> = compile_filters(&[
        r"(const )?(class )?(\w+::)*SourceLocation",
        r".*_begin.*",
        r".*_end.*",
        r".*::begin_[^:]+",
        r".*::end_[^:]+",
    ]);

    /// Qualified method names excluded from the catalog.
    static ref NAME_FILTERS: Vec<Regex> = compile_filters(&[
        r".*_begin",
        r".*_end",
        r".*::begin_[^:]+",
        r".*::end_[^:]+",
    ]);
}

/// Compile patterns anchored to the whole string.
fn compile_filters(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("^(?:{})$", p)).unwrap())
        .collect()
}

fn matches_any(input: &str, filters: &[Regex]) -> bool {
    filters.iter().any(|f| f.is_match(input))
}

/// Whether a method belongs in the catalog.
pub fn should_check(method: &MethodSig) -> bool {
    method.is_instance()
        && method.access == Access::Public
        && method.is_const
        && !matches_any(&method.return_type, &RETURN_TYPE_FILTERS)
        && !matches_any(&method.qualified_name, &NAME_FILTERS)
}

/// The deduplicated union of all per-class filtered method sets, keyed by
/// qualified name.
pub fn build_catalog(classes: &[&ClassDecl]) -> BTreeSet<String> {
    let mut catalog = BTreeSet::new();
    for class in classes {
        for method in &class.methods {
            if should_check(method) {
                catalog.insert(method.qualified_name.clone());
            }
        }
    }
    catalog
}

//! Checker that orchestrates the full coverage pass.

use std::collections::BTreeSet;

use crate::model::ProgramModel;

use super::{build_catalog, collect_calls, diff, locate};

/// Executes one coverage check over a program model.
pub struct Checker {
    marker: String,
}

/// Outcome of a coverage check.
///
/// The counts exist so callers can tell a genuine full-coverage pass from
/// the silent no-op where the marker matched nothing at all.
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    /// Uncovered catalog methods, lexicographically sorted.
    pub violations: Vec<String>,
    /// Functions that matched the visitor marker.
    pub visitor_count: usize,
    /// Distinct API classes inferred from visitor parameters.
    pub api_class_count: usize,
    /// Distinct methods observed as called on a target class.
    pub observed_count: usize,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

impl Checker {
    /// Create a checker for the given visitor marker substring.
    pub fn new<S: Into<String>>(marker: S) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Run the pass: locate visitors, collect their calls, build the
    /// catalog over all inferred API classes, and diff against `ignored`.
    pub fn run(&self, model: &ProgramModel, ignored: &BTreeSet<String>) -> CheckResult {
        let located = locate(model, &self.marker);
        let observed = collect_calls(&located.visitors);
        let catalog = build_catalog(&located.api_classes);
        let violations = diff(&catalog, &observed, ignored);

        CheckResult {
            violations,
            visitor_count: located.visitors.len(),
            api_class_count: located.api_classes.len(),
            observed_count: observed.len(),
        }
    }
}

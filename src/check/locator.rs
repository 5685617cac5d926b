//! Locating visitor functions and the API class each one targets.

use std::collections::BTreeMap;

use crate::model::{ClassDecl, FunctionDecl, ProgramModel};

/// A function matching the visitor naming convention.
///
/// `target` is the API class inferred from the single parameter, or `None`
/// when the function has zero or more than one parameter, or its parameter
/// type does not resolve to a known class. Targetless visitors stay in the
/// list but no call can ever be attributed to them.
#[derive(Debug, Clone)]
pub struct VisitorFn<'a> {
    pub func: &'a FunctionDecl,
    pub target: Option<&'a ClassDecl>,
}

/// All located visitors plus the distinct API classes they target.
#[derive(Debug, Clone, Default)]
pub struct LocatedVisitors<'a> {
    pub visitors: Vec<VisitorFn<'a>>,
    /// Distinct target classes, deduplicated by qualified name and sorted.
    pub api_classes: Vec<&'a ClassDecl>,
}

/// Scan all functions in the model and select those whose qualified name
/// contains `marker` (e.g. `StructuralHashVisitor::Visit`).
///
/// An empty result is not an error: the later stages then trivially report
/// no violations and the caller decides whether to warn.
pub fn locate<'a>(model: &'a ProgramModel, marker: &str) -> LocatedVisitors<'a> {
    let mut visitors = Vec::new();
    let mut api_classes: BTreeMap<&str, &ClassDecl> = BTreeMap::new();

    for func in &model.functions {
        if !func.qualified_name.contains(marker) {
            continue;
        }

        let target = if func.params.len() == 1 {
            model.resolve_class(&func.params[0])
        } else {
            None
        };
        if let Some(class) = target {
            api_classes.insert(class.qualified_name.as_str(), class);
        }

        visitors.push(VisitorFn { func, target });
    }

    LocatedVisitors {
        visitors,
        api_classes: api_classes.into_values().collect(),
    }
}

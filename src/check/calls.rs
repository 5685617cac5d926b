//! Collecting the member calls visitor bodies actually make.

use std::collections::BTreeSet;

use crate::model::{walk, BodyNode};

use super::VisitorFn;

/// Record the qualified names of all calls made on instances of each
/// visitor's target class.
///
/// Observations merge into one flat set across all visitors: the question
/// is whether a method is exercised by *some* visitor, not by every one.
/// A call counts only when the receiver's static type is exactly the
/// target class of the enclosing visitor - not a supertype or subtype -
/// and regardless of control-flow reachability.
pub fn collect_calls(visitors: &[VisitorFn]) -> BTreeSet<String> {
    let mut observed = BTreeSet::new();

    for visitor in visitors {
        let target = match visitor.target {
            Some(class) => class,
            None => continue,
        };

        walk(&visitor.func.body, &mut |node| {
            if let BodyNode::Call { site, .. } = node {
                if site.receiver == target.qualified_name {
                    observed.insert(site.method.clone());
                }
            }
        });
    }

    observed
}

//! Negative-example candidate selection
//!
//! Builds the set of tree nodes eligible as negative training examples
//! for a predicate: every node except function-word categories, the
//! predicate and its ancestors, and the caller's support-verb nodes.
//! The result is a set, so order carries no meaning and duplicate
//! insertion is a no-op.

use rustc_hash::FxHashSet;

use crate::tree::{NodeId, Tree};

/// Categories with no argument-bearing content: PTB punctuation tags,
/// coordinating conjunctions, symbols, interjections, list markers
pub const FUNCTION_CATEGORIES: &[&str] = &[
    "#", "$", ".", ",", ":", "``", "''", "-LRB-", "-RRB-", "CC", "SYM", "UH", "LS",
];

/// Enumerate candidate nodes for negative examples
///
/// Excludes nodes whose category is in [`FUNCTION_CATEGORIES`], the
/// predicate together with its ancestors, and everything in `support`.
pub fn candidates(
    tree: &Tree,
    predicate: NodeId,
    support: &FxHashSet<NodeId>,
) -> FxHashSet<NodeId> {
    let Some(root) = tree.root() else {
        return FxHashSet::default();
    };

    let mut excluded = support.clone();
    excluded.insert(predicate);
    excluded.extend(tree.ancestors(predicate));

    tree.descendants(root)
        .into_iter()
        .filter(|&n| !excluded.contains(&n))
        .filter(|&n| !FUNCTION_CATEGORIES.contains(&tree.nodes[n].category()))
        .collect()
}

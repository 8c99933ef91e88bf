//! Head finding over constituency trees
//!
//! Two finders share one contract (`find(tree, node) -> Option<NodeId>`),
//! dispatched through the closed [`HeadFinder`] enum:
//!
//! - the syntactic finder is Collins-style table-driven selection of one
//!   head child per constituent;
//! - the semantic finder takes the syntactic head word and applies a
//!   shift correction for function-word heads (prepositions, infinitival
//!   "to", possessive markers, determiners), replacing them with the
//!   semantic head of the nearest qualifying sibling subtree.
//!
//! The rule tables are immutable process-wide constants, safe for
//! unsynchronized concurrent reads. "No head found" is an `Option::None`
//! result, never a panic, so callers filtering by null-element status can
//! rely on the finders staying total.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

use crate::tree::{NodeId, Tree};

/// Scan direction over a child list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// Policy when no rule tier matches a constituent's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Leftmost,
    Rightmost,
}

/// One priority tier of a head rule
///
/// The category list is a priority order: each candidate category in
/// turn is searched for over the children in `direction`, and the first
/// child found wins. An empty category list matches any child, i.e. the
/// first child in scan order.
#[derive(Debug, Clone)]
pub struct Tier {
    pub direction: Direction,
    pub categories: &'static [&'static str],
}

/// Table of head rules keyed by constituent category
#[derive(Debug, Clone)]
pub struct HeadTable {
    rules: FxHashMap<&'static str, Vec<Tier>>,
    fallback: Fallback,
}

impl HeadTable {
    pub fn new(fallback: Fallback) -> Self {
        Self {
            rules: FxHashMap::default(),
            fallback,
        }
    }

    /// Append a rule tier for `category`
    pub fn tier(
        mut self,
        category: &'static str,
        direction: Direction,
        categories: &'static [&'static str],
    ) -> Self {
        self.rules.entry(category).or_default().push(Tier {
            direction,
            categories,
        });
        self
    }

    /// Select the head child of `node`, or `None` for a leaf
    pub fn head_child(&self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        let children = &tree.nodes[node].children;
        if children.is_empty() {
            return None;
        }

        if let Some(tiers) = self.rules.get(tree.nodes[node].category()) {
            for tier in tiers {
                let found = scan(tree, children, tier);
                if found.is_some() {
                    return found;
                }
            }
        }
        match self.fallback {
            Fallback::Leftmost => children.first().copied(),
            Fallback::Rightmost => children.last().copied(),
        }
    }

    /// Walk `head_child` down from `node` until a terminal word
    ///
    /// Terminates because every step moves into a strictly smaller
    /// subtree.
    pub fn head_word(&self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        let mut cur = node;
        while !tree.nodes[cur].is_leaf() {
            cur = self.head_child(tree, cur)?;
        }
        Some(cur)
    }
}

fn scan(tree: &Tree, children: &[NodeId], tier: &Tier) -> Option<NodeId> {
    let first = |category: Option<&str>| {
        let hit = |&&c: &&NodeId| category.map_or(true, |cat| tree.nodes[c].category() == cat);
        match tier.direction {
            Direction::LeftToRight => children.iter().find(hit).copied(),
            Direction::RightToLeft => children.iter().rev().find(hit).copied(),
        }
    };

    if tier.categories.is_empty() {
        return first(None);
    }
    tier.categories
        .iter()
        .find_map(|&cat| first(Some(cat)))
}

/// Collins head-percolation table for the Penn Treebank tag set
///
/// Unknown categories fall back to the rightmost child.
pub static COLLINS: LazyLock<HeadTable> = LazyLock::new(|| {
    use Direction::{LeftToRight as L, RightToLeft as R};
    HeadTable::new(Fallback::Rightmost)
        .tier("ADJP", L, &[
            "NNS", "QP", "NN", "$", "ADVP", "JJ", "VBN", "VBG", "ADJP", "JJR", "NP", "JJS",
            "DT", "FW", "RBR", "RBS", "SBAR", "RB",
        ])
        .tier("ADVP", R, &[
            "RB", "RBR", "RBS", "FW", "ADVP", "TO", "CD", "JJR", "JJ", "IN", "NP", "JJS", "NN",
        ])
        .tier("CONJP", R, &["CC", "RB", "IN"])
        .tier("FRAG", R, &[])
        .tier("INTJ", L, &[])
        .tier("LST", R, &["LS", ":"])
        .tier("NAC", L, &[
            "NN", "NNS", "NNP", "NNPS", "NP", "NAC", "EX", "$", "CD", "QP", "PRP", "VBG",
            "JJ", "JJS", "JJR", "ADJP", "FW",
        ])
        .tier("NP", R, &["POS"])
        .tier("NP", R, &["NN", "NNP", "NNPS", "NNS", "NX", "JJR"])
        .tier("NP", L, &["NP"])
        .tier("NP", R, &["$", "ADJP", "PRN"])
        .tier("NP", R, &["CD"])
        .tier("NP", R, &["JJ", "JJS", "RB", "QP"])
        .tier("NX", R, &["NN", "NNP", "NNPS", "NNS", "NX", "POS", "JJR"])
        .tier("PP", R, &["IN", "TO", "VBG", "VBN", "RP", "FW"])
        .tier("PRN", L, &[])
        .tier("PRT", R, &["RP"])
        .tier("QP", L, &[
            "$", "IN", "NNS", "NN", "JJ", "RB", "DT", "CD", "NCD", "QP", "JJR", "JJS",
        ])
        .tier("RRC", R, &["VP", "NP", "ADVP", "ADJP", "PP"])
        .tier("S", L, &["TO", "IN", "VP", "S", "SBAR", "ADJP", "UCP", "NP"])
        .tier("SBAR", L, &[
            "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT", "S", "SQ", "SINV", "SBAR", "FRAG",
        ])
        .tier("SBARQ", L, &["SQ", "S", "SINV", "SBARQ", "FRAG"])
        .tier("SINV", L, &[
            "VBZ", "VBD", "VBP", "VB", "MD", "VP", "S", "SINV", "ADJP", "NP",
        ])
        .tier("SQ", L, &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "SQ"])
        .tier("UCP", R, &[])
        .tier("VP", L, &[
            "TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "NN", "NNS", "NP",
        ])
        .tier("WHADJP", L, &["CC", "WRB", "JJ", "ADJP"])
        .tier("WHADVP", R, &["CC", "WRB"])
        .tier("WHNP", L, &["WDT", "WP", "WP$", "WHADJP", "WHPP", "WHNP"])
        .tier("WHPP", R, &["IN", "TO", "FW"])
        .tier("X", R, &[])
});

/// Function-word categories whose semantic content sits in a sibling,
/// mapped to the direction that sibling is searched in
static SHIFT: LazyLock<FxHashMap<&'static str, Direction>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    table.insert("IN", Direction::LeftToRight);
    table.insert("TO", Direction::LeftToRight);
    table.insert("DT", Direction::LeftToRight);
    table.insert("PDT", Direction::LeftToRight);
    table.insert("POS", Direction::RightToLeft);
    table
});

/// Syntactic head word of the subtree at `node`, per the Collins table
pub fn syntax_head_word(tree: &Tree, node: NodeId) -> Option<NodeId> {
    COLLINS.head_word(tree, node)
}

/// Semantic head word of the subtree at `node`
///
/// Takes the syntactic head word and, when its category is in the shift
/// table, replaces it with the semantic head of the nearest sibling in
/// the shift direction that is not a null element and has a semantic
/// head of its own. The original head is kept when it is the root, has
/// no sibling in that direction, or no sibling qualifies.
pub fn semantic_head_word(tree: &Tree, node: NodeId) -> Option<NodeId> {
    let head = syntax_head_word(tree, node)?;
    Some(shift(tree, head, &mut FxHashSet::default()))
}

/// Apply the shift correction to a head word
///
/// The shift chains: a leaf sibling that is itself a function word gets
/// shifted in turn, so `(PP (IN in) (TO to) (NP (NN france)))` resolves
/// to "france". Termination: recursing into an internal sibling confines
/// every later shift to that sibling's strictly smaller subtree, and
/// `seen` caps the chain over leaf siblings of one parent, so opposed
/// shift directions in a sibling list cannot cycle.
fn shift(tree: &Tree, head: NodeId, seen: &mut FxHashSet<NodeId>) -> NodeId {
    let Some(&direction) = SHIFT.get(tree.nodes[head].category()) else {
        return head;
    };
    if tree.nodes[head].parent.is_none() || !seen.insert(head) {
        return head;
    }

    // Nearest sibling first, in the shift direction
    let siblings = match direction {
        Direction::LeftToRight => tree
            .right_siblings(head)
            .expect("non-root node has sibling slices"),
        Direction::RightToLeft => {
            let mut left = tree
                .left_siblings(head)
                .expect("non-root node has sibling slices");
            left.reverse();
            left
        }
    };

    for sibling in siblings {
        if tree.is_null_element(sibling) {
            continue;
        }
        if tree.nodes[sibling].is_leaf() {
            // A leaf is its own syntactic head, so its semantic head is
            // just the shift applied again
            return shift(tree, sibling, seen);
        }
        if let Some(sibling_head) = semantic_head_word(tree, sibling) {
            return sibling_head;
        }
    }
    head
}

/// Closed dispatch between the two head finders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadFinder {
    Syntactic,
    Semantic,
}

impl HeadFinder {
    /// Find the designated head for `node`
    ///
    /// The syntactic variant selects one head child; the semantic
    /// variant resolves all the way to the shifted head word.
    pub fn find(self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        match self {
            Self::Syntactic => COLLINS.head_child(tree, node),
            Self::Semantic => semantic_head_word(tree, node),
        }
    }

    /// Resolve down to a terminal head word
    pub fn head_word(self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        match self {
            Self::Syntactic => syntax_head_word(tree, node),
            Self::Semantic => semantic_head_word(tree, node),
        }
    }
}

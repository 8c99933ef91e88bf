//! Production-rule extraction
//!
//! Derives the grammar production a constituent licenses: its own
//! category on the left-hand side, its children's categories in order on
//! the right. Rules are derived on demand and never stored on the tree.

use std::fmt;

use crate::tree::{NodeId, Tree};

/// An immutable production rule (`NP -> DT NN`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub head: String,
    pub children: Vec<String>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.head, self.children.join(" "))
    }
}

/// Extract the production rule for `node`
///
/// Returns `None` for terminals, which license no production.
pub fn extract(tree: &Tree, node: NodeId) -> Option<Rule> {
    let n = &tree.nodes[node];
    if n.is_leaf() {
        return None;
    }
    Some(Rule {
        head: n.category().to_string(),
        children: n
            .children
            .iter()
            .map(|&c| tree.nodes[c].category().to_string())
            .collect(),
    })
}

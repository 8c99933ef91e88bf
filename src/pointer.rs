//! Annotation pointer resolution
//!
//! NomBank refers to tree nodes with compact pointer expressions of the
//! form `POINTERS "-" LABEL ("-" FUNCTAG)*`, where each pointer is a
//! `TOKEN:STEPS` pair: a zero-based index into the tree's terminal
//! sequence (traces included) plus a count of parent links to walk
//! upward. Multiple pairs joined by `*` denote one argument shared
//! through a coreference chain; pairs joined by `,` denote one argument
//! split across non-adjacent constituents.
//!
//! Resolution is deterministic and read-only: the same expression
//! against the same tree always yields the same annotation.

use thiserror::Error;

use crate::tree::{NodeId, Tree};

/// Structural kind of a pointer expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    /// One `TOKEN:STEPS` pair
    Single,
    /// `*`-joined pairs: the same argument via coreference
    Coreference,
    /// `,`-joined pairs: a discontinuous argument
    NotAConstituent,
}

/// A fully resolved annotation: target nodes, pointer kind, role label,
/// and function tags. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub nodes: Vec<NodeId>,
    pub pointer_type: PointerType,
    pub label: String,
    pub function_tags: Vec<String>,
}

/// Resolution failure for one pointer expression
///
/// Every variant carries the offending expression text (and indices
/// where relevant) so a corrupt corpus line can be located without
/// re-parsing anything.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("pointer {text:?}: no label after the pointer spec")]
    MissingLabel { text: String },

    #[error("pointer {text:?}: malformed TOKEN:STEPS pair {pair:?}")]
    MalformedPair { text: String, pair: String },

    #[error("pointer {text:?}: mixes '*' and ',' joiners")]
    MixedJoiners { text: String },

    #[error("pointer {text:?}: token {token} out of range, tree has {leaves} leaves")]
    TokenOutOfRange {
        text: String,
        token: usize,
        leaves: usize,
    },

    #[error("pointer {text:?}: {steps} steps up from token {token} walk past the root")]
    StepsPastRoot {
        text: String,
        token: usize,
        steps: usize,
    },
}

/// Resolve a pointer expression against `tree`
pub fn resolve(tree: &Tree, expr: &str) -> Result<Annotation, PointerError> {
    let mut parts = expr.split('-');
    let spec = parts.next().unwrap_or_default();
    let label = parts
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| PointerError::MissingLabel {
            text: expr.to_string(),
        })?
        .to_string();
    let function_tags: Vec<String> = parts.map(str::to_string).collect();

    let (pointer_type, joiner) = match (spec.contains('*'), spec.contains(',')) {
        (true, true) => {
            return Err(PointerError::MixedJoiners {
                text: expr.to_string(),
            })
        }
        (true, false) => (PointerType::Coreference, Some('*')),
        (false, true) => (PointerType::NotAConstituent, Some(',')),
        (false, false) => (PointerType::Single, None),
    };

    let leaves = match tree.root() {
        Some(root) => tree.leaves(root),
        None => Vec::new(),
    };

    let pairs: Vec<&str> = match joiner {
        Some(j) => spec.split(j).collect(),
        None => vec![spec],
    };

    let mut nodes = Vec::with_capacity(pairs.len());
    for pair in pairs {
        nodes.push(resolve_pair(tree, &leaves, expr, pair)?);
    }

    Ok(Annotation {
        nodes,
        pointer_type,
        label,
        function_tags,
    })
}

/// Resolve one `TOKEN:STEPS` pair to a node
fn resolve_pair(
    tree: &Tree,
    leaves: &[NodeId],
    expr: &str,
    pair: &str,
) -> Result<NodeId, PointerError> {
    let malformed = || PointerError::MalformedPair {
        text: expr.to_string(),
        pair: pair.to_string(),
    };
    let (token_text, steps_text) = pair.split_once(':').ok_or_else(malformed)?;
    let token: usize = token_text.parse().map_err(|_| malformed())?;
    let steps: usize = steps_text.parse().map_err(|_| malformed())?;

    let mut node = *leaves.get(token).ok_or(PointerError::TokenOutOfRange {
        text: expr.to_string(),
        token,
        leaves: leaves.len(),
    })?;

    for _ in 0..steps {
        node = tree.nodes[node]
            .parent
            .ok_or(PointerError::StepsPastRoot {
                text: expr.to_string(),
                token,
                steps,
            })?;
    }
    Ok(node)
}

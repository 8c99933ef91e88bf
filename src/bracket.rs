//! Bracketed parse-tree reader
//!
//! Parses Penn Treebank bracketed strings into `Tree` structures using a
//! pest grammar. Category labels are split into the bare category and its
//! function tags (`NP-SBJ-1` becomes content `NP`, labels `["SBJ", "1"]`);
//! part-of-speech tags on terminals are kept verbatim, so trace leaves
//! under `-NONE-` survive intact.

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::tree::{NodeId, StructuralError, Tree};

#[derive(Parser)]
#[grammar = "bracket.pest"]
struct BracketParser;

/// Error while reading a bracketed tree
#[derive(Debug, Error)]
pub enum BracketError {
    #[error("bracket syntax: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("expected one tree, found {0}")]
    TreeCount(usize),

    #[error("constituent with no category label")]
    MissingLabel,

    #[error("constituent {0} mixes words and child constituents")]
    MixedChildren(String),

    #[error("terminal {0} carries more than one token")]
    MultiWord(String),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Parse a single bracketed tree
///
/// The treebank's extra wrapping parens (`( (S ...))`) are unwrapped, so
/// the resulting root is the outermost labeled constituent.
pub fn parse(input: &str) -> Result<Tree, BracketError> {
    let mut trees = parse_forest(input)?;
    if trees.len() != 1 {
        return Err(BracketError::TreeCount(trees.len()));
    }
    Ok(trees.remove(0))
}

/// Parse a whole file's worth of trees, in order
pub fn parse_forest(input: &str) -> Result<Vec<Tree>, BracketError> {
    let mut pairs = BracketParser::parse(Rule::forest, input).map_err(Box::new)?;
    let forest = pairs.next().ok_or(BracketError::TreeCount(0))?;

    let mut trees = Vec::new();
    for pair in forest.into_inner() {
        if pair.as_rule() != Rule::node {
            continue; // EOI
        }
        let mut tree = Tree::new();
        build(unwrap_outer(pair), &mut tree, None)?;
        trees.push(tree);
    }
    Ok(trees)
}

/// Drop the treebank's unlabeled wrapping node, if present
fn unwrap_outer(pair: pest::iterators::Pair<'_, Rule>) -> pest::iterators::Pair<'_, Rule> {
    let inner: Vec<_> = pair.clone().into_inner().collect();
    match inner.as_slice() {
        [only] if only.as_rule() == Rule::node => only.clone(),
        _ => pair,
    }
}

/// Recursively add the constituent `pair` to `tree` under `parent`
fn build(
    pair: pest::iterators::Pair<'_, Rule>,
    tree: &mut Tree,
    parent: Option<NodeId>,
) -> Result<NodeId, BracketError> {
    let mut inner = pair.into_inner();

    let label = match inner.next() {
        Some(p) if p.as_rule() == Rule::symbol => p.as_str().to_string(),
        _ => return Err(BracketError::MissingLabel),
    };

    let mut words: Vec<&str> = Vec::new();
    let mut constituents = Vec::new();
    for p in inner {
        match p.as_rule() {
            Rule::symbol => words.push(p.as_str()),
            Rule::node => constituents.push(p),
            Rule::forest | Rule::WHITESPACE | Rule::EOI => {}
        }
    }

    if !words.is_empty() && !constituents.is_empty() {
        return Err(BracketError::MixedChildren(label));
    }

    if constituents.is_empty() && !words.is_empty() {
        if words.len() > 1 {
            return Err(BracketError::MultiWord(label));
        }
        // Terminal: label is the POS tag, kept verbatim
        let parent = parent.ok_or(BracketError::MissingLabel)?;
        return Ok(tree.add_leaf(parent, words[0], &label)?);
    }

    let (category, labels) = split_label(&label);
    let id = match parent {
        None => tree.add_root(&category, labels)?,
        Some(parent) => tree.add_internal(parent, &category, labels)?,
    };
    for child in constituents {
        build(child, tree, Some(id))?;
    }
    Ok(id)
}

/// Split a category label into the bare category and its function tags
///
/// Handles both `-`-joined function tags and `=`-joined gap indices:
/// `NP-SBJ-1` → (`NP`, `["SBJ", "1"]`), `NP=2` → (`NP`, `["2"]`).
fn split_label(label: &str) -> (String, Vec<String>) {
    let mut parts = label.split('-');
    let head = parts.next().unwrap_or(label);
    let mut labels: Vec<String> = Vec::new();

    let (category, gap) = match head.split_once('=') {
        Some((cat, idx)) => (cat.to_string(), Some(idx.to_string())),
        None => (head.to_string(), None),
    };
    labels.extend(parts.map(str::to_string));
    if let Some(idx) = gap {
        labels.push(idx);
    }
    (category, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NULL_ELEMENT;

    const SIMPLE: &str = "(S (NP-SBJ (DT The) (NN dog)) (VP (VBZ runs)) (. .))";

    #[test]
    fn simple_sentence() {
        let tree = parse(SIMPLE).unwrap();
        let root = tree.root().unwrap();

        assert_eq!(tree.nodes[root].category(), "S");
        assert_eq!(tree.text(root), "The dog runs .");

        let np = tree.nodes[root].children[0];
        assert_eq!(tree.nodes[np].content, "NP");
        assert_eq!(tree.nodes[np].labels, vec!["SBJ".to_string()]);

        let the = tree.first_word(root).unwrap();
        assert_eq!(tree.nodes[the].content, "The");
        assert_eq!(tree.nodes[the].pos.as_deref(), Some("DT"));
        assert_eq!(tree.nodes[the].depth, 2);
    }

    #[test]
    fn wrapping_parens_unwrapped() {
        let tree = parse("( (S (NP (NNP Alice)) (VP (VBD slept))) )").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.nodes[root].category(), "S");
        assert!(tree.nodes[root].parent.is_none());
    }

    #[test]
    fn trace_leaves_keep_their_tag() {
        let tree = parse("(S (NP-SBJ-1 (NNP Bo)) (VP (VBD fell) (NP (-NONE- *-1))))").unwrap();
        let root = tree.root().unwrap();
        let leaves = tree.leaves(root);
        let trace = *leaves.last().unwrap();
        assert_eq!(tree.nodes[trace].pos.as_deref(), Some(NULL_ELEMENT));
        assert_eq!(tree.nodes[trace].content, "*-1");
        assert!(tree.is_null_element(trace));
        // Coindex digit on the subject survives as a label
        let np = tree.nodes[root].children[0];
        assert_eq!(tree.nodes[np].labels, vec!["SBJ".to_string(), "1".to_string()]);
    }

    #[test]
    fn gap_index_label() {
        assert_eq!(
            split_label("NP=2"),
            ("NP".to_string(), vec!["2".to_string()])
        );
        assert_eq!(split_label("VP"), ("VP".to_string(), vec![]));
        assert_eq!(
            split_label("PP-LOC-CLR"),
            ("PP".to_string(), vec!["LOC".to_string(), "CLR".to_string()])
        );
    }

    #[test]
    fn forest_of_two() {
        let trees = parse_forest("( (S (NP (NNP A)) (VP (VBD b))))\n( (S (NP (NNP C)) (VP (VBD d))))").unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].text(trees[0].root().unwrap()), "A b");
        assert_eq!(trees[1].text(trees[1].root().unwrap()), "C d");
    }

    #[test]
    fn single_parse_rejects_forest() {
        let err = parse("(S (NN a)) (S (NN b))").unwrap_err();
        assert!(matches!(err, BracketError::TreeCount(2)));
    }

    #[test]
    fn unbalanced_is_a_syntax_error() {
        assert!(matches!(
            parse("(S (NP (DT the)"),
            Err(BracketError::Syntax(_))
        ));
    }

    #[test]
    fn multiword_terminal_rejected() {
        assert!(matches!(
            parse("(NP the dog)"),
            Err(BracketError::MultiWord(_))
        ));
    }

    #[test]
    fn mixed_children_rejected() {
        assert!(matches!(
            parse("(S word (NP (DT the)))"),
            Err(BracketError::MixedChildren(_))
        ));
    }
}

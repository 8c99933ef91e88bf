//! Arena-based constituency trees
//!
//! A `Tree` owns all of its nodes in a flat arena; parents and children
//! refer to each other through `NodeId` handles resolved against that
//! arena, so the parent back-reference can never keep a node alive or
//! form an ownership cycle. Topology is fixed once construction is done:
//! `add_root`/`add_leaf`/`add_internal` are the only mutating operations,
//! and none of them can make a node its own ancestor.
//!
//! Traversal entry points (`traverse`, `leaves`, `ancestors`, ...) take
//! raw `NodeId`s and assume ids minted by this tree, like direct `nodes`
//! indexing; an id from another tree panics. `get` and `index` are the
//! checked lookups for ids of unknown provenance.

use thiserror::Error;

/// Unique identifier for a node within one tree's arena
pub type NodeId = usize;

/// Category label of Penn Treebank empty elements (traces)
pub const NULL_ELEMENT: &str = "-NONE-";

/// Structural precondition failures
///
/// These indicate a malformed tree or a query that is undefined for the
/// node it was asked about (e.g. sibling slices of the root). They are
/// fatal for the affected tree but carry no global state, so other trees
/// in the same batch are unaffected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),

    #[error("tree already has a root")]
    DuplicateRoot,

    #[error("node {0} is the root: sibling position is undefined")]
    RootHasNoSiblings(NodeId),

    #[error("node {0} is missing from its parent's child list")]
    Detached(NodeId),
}

/// A node in a constituency tree
///
/// `content` holds the surface form for leaves and the category label for
/// internal nodes; `pos` is set only for leaves. `labels` carries the
/// function tags attached to the category (`NP-SBJ` gives `["SBJ"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub content: String,
    pub labels: Vec<String>,
    pub pos: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: usize,
}

impl Node {
    /// True if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Syntactic category: the POS tag for leaves, the content otherwise
    pub fn category(&self) -> &str {
        match &self.pos {
            Some(pos) => pos,
            None => &self.content,
        }
    }
}

/// A constituency tree (one sentence)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node, if construction has started
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Install the root. Fails if the tree already has one.
    pub fn add_root(
        &mut self,
        category: &str,
        labels: Vec<String>,
    ) -> Result<NodeId, StructuralError> {
        if self.root.is_some() {
            return Err(StructuralError::DuplicateRoot);
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            content: category.to_string(),
            labels,
            pos: None,
            parent: None,
            children: Vec::new(),
            depth: 0,
        });
        self.root = Some(id);
        Ok(id)
    }

    /// Append an internal (category) node under `parent`
    pub fn add_internal(
        &mut self,
        parent: NodeId,
        category: &str,
        labels: Vec<String>,
    ) -> Result<NodeId, StructuralError> {
        self.attach(
            parent,
            Node {
                content: category.to_string(),
                labels,
                pos: None,
                parent: None,
                children: Vec::new(),
                depth: 0,
            },
        )
    }

    /// Append a terminal (word) node under `parent`
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        form: &str,
        pos: &str,
    ) -> Result<NodeId, StructuralError> {
        self.attach(
            parent,
            Node {
                content: form.to_string(),
                labels: Vec::new(),
                pos: Some(pos.to_string()),
                parent: None,
                children: Vec::new(),
                depth: 0,
            },
        )
    }

    fn attach(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, StructuralError> {
        let parent_depth = self
            .nodes
            .get(parent)
            .ok_or(StructuralError::UnknownNode(parent))?
            .depth;
        let id = self.nodes.len();
        node.parent = Some(parent);
        node.depth = parent_depth + 1;
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Position of `id` among its parent's children
    ///
    /// Undefined for the root; asking is a structural error so that
    /// construction bugs surface instead of reading as position 0.
    pub fn index(&self, id: NodeId) -> Result<usize, StructuralError> {
        let node = self.get(id).ok_or(StructuralError::UnknownNode(id))?;
        let parent = node.parent.ok_or(StructuralError::RootHasNoSiblings(id))?;
        self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == id)
            .ok_or(StructuralError::Detached(id))
    }

    /// Generic depth-first walk
    ///
    /// `expand` yields the ordered children to descend into (pass a
    /// reversed list for right-to-left scans), `stop` prunes descent from
    /// a node, `accept` collects it into the result, and `on_visit` runs
    /// on every node reached. Iterative, so arbitrarily deep trees cannot
    /// overflow the call stack.
    pub fn traverse<E, S, A, V>(
        &self,
        start: NodeId,
        expand: E,
        stop: S,
        accept: A,
        mut on_visit: V,
    ) -> Vec<NodeId>
    where
        E: Fn(&Tree, NodeId) -> Vec<NodeId>,
        S: Fn(&Tree, NodeId) -> bool,
        A: Fn(&Tree, NodeId) -> bool,
        V: FnMut(&Tree, NodeId),
    {
        let mut accepted = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            on_visit(self, id);
            if accept(self, id) {
                accepted.push(id);
            }
            if !stop(self, id) {
                // Push in reverse so expand's first child is visited first
                for child in expand(self, id).into_iter().rev() {
                    stack.push(child);
                }
            }
        }
        accepted
    }

    /// All nodes of the subtree rooted at `start`, depth-first
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        self.traverse(
            start,
            |t, n| t.nodes[n].children.clone(),
            |_, _| false,
            |_, _| true,
            |_, _| {},
        )
    }

    /// Terminal nodes of the subtree at `start`, left to right
    ///
    /// Includes trace leaves; NomBank token indices count those too.
    pub fn leaves(&self, start: NodeId) -> Vec<NodeId> {
        self.traverse(
            start,
            |t, n| t.nodes[n].children.clone(),
            |_, _| false,
            |t, n| t.nodes[n].is_leaf(),
            |_, _| {},
        )
    }

    /// Leftmost terminal under `start`
    pub fn first_word(&self, start: NodeId) -> Option<NodeId> {
        self.leaves(start).into_iter().next()
    }

    /// Rightmost terminal under `start`
    pub fn last_word(&self, start: NodeId) -> Option<NodeId> {
        self.traverse(
            start,
            |t, n| {
                let mut kids = t.nodes[n].children.clone();
                kids.reverse();
                kids
            },
            |_, _| false,
            |t, n| t.nodes[n].is_leaf(),
            |_, _| {},
        )
        .into_iter()
        .next()
    }

    /// Root-ward chain of ancestors, nearest first, root-inclusive
    ///
    /// Empty for the root. Terminates because `depth` strictly decreases
    /// along parent links.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cur = id;
        while let Some(parent) = self.nodes[cur].parent {
            chain.push(parent);
            cur = parent;
        }
        chain
    }

    /// Siblings strictly before `id`, in child-list order
    pub fn left_siblings(&self, id: NodeId) -> Result<Vec<NodeId>, StructuralError> {
        let pos = self.index(id)?;
        let parent = self.nodes[id].parent.ok_or(StructuralError::RootHasNoSiblings(id))?;
        Ok(self.nodes[parent].children[..pos].to_vec())
    }

    /// Siblings strictly after `id`, in child-list order
    pub fn right_siblings(&self, id: NodeId) -> Result<Vec<NodeId>, StructuralError> {
        let pos = self.index(id)?;
        let parent = self.nodes[id].parent.ok_or(StructuralError::RootHasNoSiblings(id))?;
        Ok(self.nodes[parent].children[pos + 1..].to_vec())
    }

    /// True for a trace leaf, or an internal node all of whose children
    /// are null elements (the fold is vacuously true for a node whose
    /// subtree contains no leaves at all)
    pub fn is_null_element(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        if node.is_leaf() {
            node.category() == NULL_ELEMENT
        } else {
            node.children.iter().all(|&c| self.is_null_element(c))
        }
    }

    /// Surface text of the subtree at `start`, traces skipped
    pub fn text(&self, start: NodeId) -> String {
        let words: Vec<&str> = self
            .leaves(start)
            .into_iter()
            .filter(|&l| !self.is_null_element(l))
            .map(|l| self.nodes[l].content.as_str())
            .collect();
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (S (NP-SBJ (DT the) (NN dog)) (VP (VBZ runs) (ADVP (RB fast))))
    fn sample_tree() -> Tree {
        let mut tree = Tree::new();
        let s = tree.add_root("S", vec![]).unwrap();
        let np = tree.add_internal(s, "NP", vec!["SBJ".to_string()]).unwrap();
        tree.add_leaf(np, "the", "DT").unwrap();
        tree.add_leaf(np, "dog", "NN").unwrap();
        let vp = tree.add_internal(s, "VP", vec![]).unwrap();
        tree.add_leaf(vp, "runs", "VBZ").unwrap();
        let advp = tree.add_internal(vp, "ADVP", vec![]).unwrap();
        tree.add_leaf(advp, "fast", "RB").unwrap();
        tree
    }

    #[test]
    fn construction_sets_depth_and_parent() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        assert_eq!(tree.nodes[root].depth, 0);
        assert!(tree.nodes[root].parent.is_none());

        for (id, node) in tree.nodes.iter().enumerate() {
            if id == root {
                continue;
            }
            let parent = node.parent.unwrap();
            assert_eq!(node.depth, tree.nodes[parent].depth + 1);
            // Exactly one slot in the parent's child list
            let count = tree.nodes[parent]
                .children
                .iter()
                .filter(|&&c| c == id)
                .count();
            assert_eq!(count, 1);
            assert_eq!(tree.nodes[parent].children[tree.index(id).unwrap()], id);
        }
    }

    #[test]
    fn duplicate_root_rejected() {
        let mut tree = sample_tree();
        assert_eq!(tree.add_root("S", vec![]), Err(StructuralError::DuplicateRoot));
    }

    #[test]
    fn leaves_in_surface_order() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        let forms: Vec<&str> = tree
            .leaves(root)
            .into_iter()
            .map(|l| tree.nodes[l].content.as_str())
            .collect();
        assert_eq!(forms, vec!["the", "dog", "runs", "fast"]);
        assert_eq!(tree.text(root), "the dog runs fast");
    }

    #[test]
    fn first_and_last_word() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        let first = tree.first_word(root).unwrap();
        let last = tree.last_word(root).unwrap();
        assert_eq!(tree.nodes[first].content, "the");
        assert_eq!(tree.nodes[last].content, "fast");
        // A leaf is its own first and last word
        assert_eq!(tree.first_word(first), Some(first));
        assert_eq!(tree.last_word(first), Some(first));
    }

    #[test]
    fn ancestors_chain_ends_at_root() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        assert!(tree.ancestors(root).is_empty());

        for leaf in tree.leaves(root) {
            let chain = tree.ancestors(leaf);
            assert_eq!(*chain.last().unwrap(), root);
            assert_eq!(chain[0], tree.nodes[leaf].parent.unwrap());
        }
    }

    #[test]
    fn sibling_slices_partition_child_list() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        for id in 0..tree.len() {
            if id == root {
                continue;
            }
            let parent = tree.nodes[id].parent.unwrap();
            let mut rebuilt = tree.left_siblings(id).unwrap();
            rebuilt.push(id);
            rebuilt.extend(tree.right_siblings(id).unwrap());
            assert_eq!(rebuilt, tree.nodes[parent].children);
        }
    }

    #[test]
    fn siblings_of_root_is_an_error() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        assert_eq!(
            tree.left_siblings(root),
            Err(StructuralError::RootHasNoSiblings(root))
        );
        assert_eq!(
            tree.right_siblings(root),
            Err(StructuralError::RootHasNoSiblings(root))
        );
        assert_eq!(tree.index(root), Err(StructuralError::RootHasNoSiblings(root)));
    }

    #[test]
    fn checked_lookups_reject_foreign_ids() {
        let tree = sample_tree();
        let out = tree.len();
        assert!(tree.get(out).is_none());
        assert_eq!(tree.index(out), Err(StructuralError::UnknownNode(out)));
    }

    #[test]
    fn category_prefers_pos_for_leaves() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        assert_eq!(tree.nodes[root].category(), "S");
        let first = tree.first_word(root).unwrap();
        assert_eq!(tree.nodes[first].category(), "DT");
        assert_eq!(tree.nodes[first].content, "the");
    }

    #[test]
    fn null_element_leaf_and_fold() {
        let mut tree = Tree::new();
        let s = tree.add_root("S", vec![]).unwrap();
        let np = tree.add_internal(s, "NP", vec![]).unwrap();
        let trace = tree.add_leaf(np, "*T*-1", NULL_ELEMENT).unwrap();
        let vp = tree.add_internal(s, "VP", vec![]).unwrap();
        let word = tree.add_leaf(vp, "ran", "VBD").unwrap();

        assert!(tree.is_null_element(trace));
        assert!(!tree.is_null_element(word));
        // Internal node with only null leaves folds to true
        assert!(tree.is_null_element(np));
        assert!(!tree.is_null_element(vp));
        assert!(!tree.is_null_element(s));
    }

    #[test]
    fn null_element_vacuous_for_childless_category() {
        // A category node that never received children counts as a leaf,
        // so the leaf rule applies: its category is not -NONE-.
        let mut tree = Tree::new();
        let s = tree.add_root("S", vec![]).unwrap();
        let frag = tree.add_internal(s, "FRAG", vec![]).unwrap();
        assert!(tree.nodes[frag].is_leaf());
        assert!(!tree.is_null_element(frag));
    }

    #[test]
    fn traverse_right_to_left_reverses_leaf_order() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        let rtl = tree.traverse(
            root,
            |t, n| {
                let mut kids = t.nodes[n].children.clone();
                kids.reverse();
                kids
            },
            |_, _| false,
            |t, n| t.nodes[n].is_leaf(),
            |_, _| {},
        );
        let mut ltr = tree.leaves(root);
        ltr.reverse();
        assert_eq!(rtl, ltr);
    }

    #[test]
    fn traverse_stop_prunes_descent() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        // Stop at every category node below the root: nothing reaches a
        // leaf, so nothing is accepted and only root + its children are
        // visited.
        let mut visited = 0;
        let accepted = tree.traverse(
            root,
            |t, n| t.nodes[n].children.clone(),
            |t, n| n != root && !t.nodes[n].is_leaf(),
            |t, n| t.nodes[n].is_leaf(),
            |_, _| visited += 1,
        );
        assert!(accepted.is_empty());
        assert_eq!(visited, 1 + tree.nodes[root].children.len());
    }
}

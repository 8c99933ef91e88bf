//! NomBank corpus loading
//!
//! Parses whitespace-delimited NomBank records
//! (`relativePath treeId tokenId stem senseId pointerExpr...`) and binds
//! them to already-built parse trees supplied through the [`Treebank`]
//! provider trait. Loading is row-resilient: the corpus is known to
//! contain isolated corrupt lines, so each bad row becomes a [`RowError`]
//! in the load report (and a `log` warning) while the rest of the batch
//! proceeds.
//!
//! Section and file ids are the digit runs embedded in the relative path
//! (`wsj/05/wsj_0544.mrg` → section 5, file 44). Corpora whose directory
//! numbering starts at 1 are the provider's concern: the loader passes
//! ids through unchanged, and callers may register a placeholder tree at
//! index 0 if their source needs one.

use std::fs;
use std::path::Path;

use log::warn;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::pointer::{self, Annotation, PointerError};
use crate::tree::{NodeId, Tree};

/// Role label that marks the predicate pointer
const REL: &str = "rel";

/// Provider of parse trees indexed by (section, file, tree)
pub trait Treebank {
    fn tree(&self, section: usize, file: usize, index: usize) -> Option<&Tree>;
}

/// In-memory id-keyed tree store
#[derive(Debug, Clone, Default)]
pub struct MemoryTreebank {
    trees: FxHashMap<(usize, usize, usize), Tree>,
}

impl MemoryTreebank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: usize, file: usize, index: usize, tree: Tree) {
        self.trees.insert((section, file, index), tree);
    }
}

impl Treebank for MemoryTreebank {
    fn tree(&self, section: usize, file: usize, index: usize) -> Option<&Tree> {
        self.trees.get(&(section, file, index))
    }
}

/// One resolved NomBank record: the predicate plus its argument set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub section: usize,
    pub file: usize,
    pub tree: usize,
    pub token: usize,
    pub stem: String,
    pub sense: String,
    /// The leaf (or constituent) the `rel` pointer resolved to
    pub predicate: NodeId,
    /// All non-`rel` annotations, in record order
    pub annotations: Vec<Annotation>,
}

/// One (node, label) pair flattened out of an [`Entry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineGrainedEntry {
    pub section: usize,
    pub file: usize,
    pub tree: usize,
    pub token: usize,
    pub stem: String,
    pub sense: String,
    pub predicate: NodeId,
    pub node: NodeId,
    pub label: String,
}

/// Why one corpus row was rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowErrorKind {
    #[error("expected at least 6 fields, found {0}")]
    TooFewFields(usize),

    #[error("field {field} is not a number: {value:?}")]
    BadNumber { field: &'static str, value: String },

    #[error("cannot derive section/file ids from path {0:?}")]
    BadPath(String),

    #[error("no tree for section {section}, file {file}, index {index}")]
    MissingTree {
        section: usize,
        file: usize,
        index: usize,
    },

    #[error(transparent)]
    Pointer(#[from] PointerError),

    #[error("record has no 'rel' pointer")]
    MissingRel,

    #[error("record has more than one 'rel' pointer")]
    DuplicateRel,

    #[error("'rel' pointer does not cover predicate token {token}")]
    PredicateMismatch { token: usize },
}

/// One rejected corpus row, with enough context to find it again
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{path} line {line}: {kind}")]
pub struct RowError {
    pub line: usize,
    pub path: String,
    pub kind: RowErrorKind,
}

/// Result of a batch load: the good rows and the rejected ones
#[derive(Debug, Clone, Default)]
pub struct Load {
    pub entries: Vec<Entry>,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Error)]
pub enum NombankError {
    #[error("reading corpus: {0}")]
    Io(#[from] std::io::Error),
}

/// Load NomBank records from in-memory text
pub fn load_str(input: &str, bank: &impl Treebank) -> Load {
    let mut load = Load::default();
    for (num, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(line, num + 1, bank) {
            Ok(entry) => load.entries.push(entry),
            Err(err) => {
                warn!("skipping corpus row: {err}");
                load.errors.push(err);
            }
        }
    }
    load
}

/// Load NomBank records from a file on disk
pub fn load_file(path: impl AsRef<Path>, bank: &impl Treebank) -> Result<Load, NombankError> {
    let text = fs::read_to_string(path)?;
    Ok(load_str(&text, bank))
}

/// Flatten entries into one record per (node, label) pair
pub fn fine_grained(entries: &[Entry]) -> Vec<FineGrainedEntry> {
    let mut out = Vec::new();
    for entry in entries {
        for annotation in &entry.annotations {
            for &node in &annotation.nodes {
                out.push(FineGrainedEntry {
                    section: entry.section,
                    file: entry.file,
                    tree: entry.tree,
                    token: entry.token,
                    stem: entry.stem.clone(),
                    sense: entry.sense.clone(),
                    predicate: entry.predicate,
                    node,
                    label: annotation.label.clone(),
                });
            }
        }
    }
    out
}

fn parse_row(line: &str, num: usize, bank: &impl Treebank) -> Result<Entry, RowError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let path = fields.first().copied().unwrap_or("<empty>").to_string();
    let fail = |kind: RowErrorKind| RowError {
        line: num,
        path: path.clone(),
        kind,
    };

    if fields.len() < 6 {
        return Err(fail(RowErrorKind::TooFewFields(fields.len())));
    }

    let number = |field: &'static str, value: &str| -> Result<usize, RowError> {
        value.parse().map_err(|_| {
            fail(RowErrorKind::BadNumber {
                field,
                value: value.to_string(),
            })
        })
    };
    let tree_index = number("treeId", fields[1])?;
    let token = number("tokenId", fields[2])?;
    let stem = fields[3].to_string();
    let sense = fields[4].to_string();

    let (section, file) =
        section_file_ids(&path).ok_or_else(|| fail(RowErrorKind::BadPath(path.clone())))?;

    let tree = bank.tree(section, file, tree_index).ok_or_else(|| {
        fail(RowErrorKind::MissingTree {
            section,
            file,
            index: tree_index,
        })
    })?;

    let mut predicate = None;
    let mut annotations = Vec::new();
    for expr in &fields[5..] {
        let annotation = pointer::resolve(tree, expr).map_err(|e| fail(e.into()))?;
        if annotation.label == REL {
            if predicate.is_some() {
                return Err(fail(RowErrorKind::DuplicateRel));
            }
            predicate = annotation.nodes.first().copied();
        } else {
            annotations.push(annotation);
        }
    }
    let predicate = predicate.ok_or_else(|| fail(RowErrorKind::MissingRel))?;

    // The rel node must actually contain the predicate token
    let leaves = match tree.root() {
        Some(root) => tree.leaves(root),
        None => Vec::new(),
    };
    let covered = leaves
        .get(token)
        .map_or(false, |&t| t == predicate || tree.ancestors(t).contains(&predicate));
    if !covered {
        return Err(fail(RowErrorKind::PredicateMismatch { token }));
    }

    Ok(Entry {
        section,
        file,
        tree: tree_index,
        token,
        stem,
        sense,
        predicate,
        annotations,
    })
}

/// Extract (section, file) ids from a corpus-relative path
///
/// The filename's digit run gives the file number modulo 100; the
/// section comes from the nearest ancestor directory with digits, or
/// from the filename's higher digits when the path is flat.
fn section_file_ids(path: &str) -> Option<(usize, usize)> {
    let mut segments: Vec<&str> = path.split(['/', '\\']).collect();
    let filename = segments.pop()?;
    let file_run = digit_run(filename)?;

    let section = segments
        .iter()
        .rev()
        .find_map(|s| digit_run(s))
        .unwrap_or(file_run / 100);
    Some((section, file_run % 100))
}

/// First run of consecutive ASCII digits in `s`, as a number
fn digit_run(s: &str) -> Option<usize> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

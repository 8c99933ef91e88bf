//! Treebank: Penn Treebank parse trees, head finding, and NomBank
//! annotation resolution
//!
//! Trees are arena-based and read-only after construction, so sharing
//! them across threads needs no locking; the head-finding rule tables
//! are immutable process-wide constants.

pub mod bracket; // Bracketed-string reader (pest grammar)
pub mod candidate; // Negative-example candidate selection
pub mod head; // Syntactic and semantic head finders
pub mod nombank; // NomBank corpus records and batch loading
pub mod pointer; // Annotation pointer micro-syntax and resolution
pub mod rule; // Production-rule extraction
pub mod tree; // Arena tree and traversal primitives

// Re-exports for convenience
pub use bracket::{BracketError, parse, parse_forest};
pub use candidate::candidates;
pub use head::{
    COLLINS, Direction, Fallback, HeadFinder, HeadTable, semantic_head_word, syntax_head_word,
};
pub use nombank::{
    Entry, FineGrainedEntry, Load, MemoryTreebank, NombankError, RowError, Treebank, fine_grained,
    load_file, load_str,
};
pub use pointer::{Annotation, PointerError, PointerType, resolve};
pub use rule::Rule;
pub use tree::{NULL_ELEMENT, Node, NodeId, StructuralError, Tree};

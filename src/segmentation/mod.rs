pub mod assembler;
pub mod consolidator;

pub use assembler::{Fragment, SentenceChunk, assemble};
pub use consolidator::{SourceMapEntry, Utterance, consolidate, document_text, total_length};

use crate::dom::NodeId;
use crate::parsing::tree_walker::TreeWalker;

/// Full pipeline for one subtree: walk, assemble, consolidate.
pub fn segment(walker: &TreeWalker<'_>, root: NodeId, language: &str) -> Vec<Utterance> {
    let items = walker.parse(root, language);
    let chunks = assemble(&items);
    consolidate(&chunks)
}

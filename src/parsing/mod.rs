pub mod block_classifier;
pub mod sentence_splitter;
pub mod text_normalizer;
pub mod tree_walker;

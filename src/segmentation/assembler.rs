use crate::dom::NodeId;
use crate::parsing::text_normalizer::{ends_with_terminal_punctuation, ends_with_whitespace};
use crate::parsing::tree_walker::Item;

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub source: NodeId,
    pub text: String,
}

/// Fragments sharing one language, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceChunk {
    pub language: String,
    pub fragments: Vec<Fragment>,
}

impl SentenceChunk {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            fragments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn push(&mut self, source: NodeId, text: impl Into<String>) {
        self.fragments.push(Fragment {
            source,
            text: text.into(),
        });
    }
}

/// Groups items into language-homogeneous sentence chunks.
///
/// Block items open and close their own chunk. Inline items are transparent
/// unless they switch language, in which case they form an island: the chunk
/// before them is closed, the island gets its own chunk, and an empty chunk
/// in the outer language is reopened for the siblings that follow. A line
/// break inside a chunk turns into a synthetic period (or space) fragment.
pub fn assemble(items: &[Item]) -> Vec<SentenceChunk> {
    let mut out = Vec::new();
    if let Some(current) = assemble_level(items, None, &mut out) {
        push_non_empty(&mut out, current);
    }
    log::debug!("Assembled {} sentence chunks", out.len());
    out
}

fn assemble_level(
    items: &[Item],
    mut current: Option<SentenceChunk>,
    out: &mut Vec<SentenceChunk>,
) -> Option<SentenceChunk> {
    for item in items {
        current = match item {
            Item::Block {
                language, children, ..
            } => {
                let sentence = match current {
                    Some(mut sentence) if sentence.is_empty() => {
                        sentence.language.clone_from(language);
                        sentence
                    }
                    Some(sentence) => {
                        out.push(sentence);
                        SentenceChunk::new(language.as_str())
                    }
                    None => SentenceChunk::new(language.as_str()),
                };
                if let Some(sentence) = assemble_level(children, Some(sentence), out) {
                    push_non_empty(out, sentence);
                }
                None
            }
            Item::Text {
                source,
                language,
                text,
            } => {
                let mut sentence = current.unwrap_or_else(|| SentenceChunk::new(language.as_str()));
                sentence.push(*source, text.as_str());
                Some(sentence)
            }
            Item::Inline {
                source,
                language,
                line_break,
                children,
            } => {
                let mut sentence = current.unwrap_or_else(|| SentenceChunk::new(language.as_str()));
                if *line_break {
                    if let Some(last) = sentence.fragments.last() {
                        if !ends_with_terminal_punctuation(&last.text) {
                            sentence.push(*source, ". ");
                        } else if !ends_with_whitespace(&last.text) {
                            sentence.push(*source, " ");
                        }
                    }
                    Some(sentence)
                } else if sentence.language == *language {
                    assemble_level(children, Some(sentence), out)
                } else {
                    let outer_language = sentence.language.clone();
                    if !sentence.is_empty() {
                        out.push(sentence);
                    }
                    let island = SentenceChunk::new(language.as_str());
                    if let Some(island) = assemble_level(children, Some(island), out) {
                        push_non_empty(out, island);
                    }
                    Some(SentenceChunk::new(outer_language))
                }
            }
        };
    }
    current
}

fn push_non_empty(out: &mut Vec<SentenceChunk>, sentence: SentenceChunk) {
    if !sentence.is_empty() {
        out.push(sentence);
    }
}

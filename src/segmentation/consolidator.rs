use crate::dom::NodeId;
use crate::parsing::text_normalizer::{ends_with_terminal_punctuation, ends_with_whitespace};
use crate::segmentation::assembler::SentenceChunk;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceMapEntry {
    /// Char offset inside the utterance text where `source` starts.
    pub offset: usize,
    pub source: NodeId,
}

/// One unit of speech: a single language, punctuation-terminated text and a
/// map from char offsets back to the nodes the text came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub language: String,
    pub text: String,
    pub source_map: Vec<SourceMapEntry>,
    /// Length of `text` in chars.
    pub length: usize,
}

impl Utterance {
    /// The node that produced the char at `offset`.
    pub fn source_at(&self, offset: usize) -> Option<NodeId> {
        let idx = self
            .source_map
            .partition_point(|entry| entry.offset <= offset);
        idx.checked_sub(1).map(|i| self.source_map[i].source)
    }

    fn from_chunk(chunk: &SentenceChunk) -> Option<Self> {
        let mut raw = String::new();
        let mut starts = Vec::with_capacity(chunk.fragments.len());
        let mut offset = 0;
        for fragment in &chunk.fragments {
            // Whitespace never doubles up across a fragment boundary, and the
            // text never starts with it.
            let text = if raw.is_empty() || ends_with_whitespace(&raw) {
                fragment.text.trim_start()
            } else {
                fragment.text.as_str()
            };
            let len = text.chars().count();
            if len == 0 {
                continue;
            }
            starts.push((offset, fragment.source));
            raw.push_str(text);
            offset += len;
        }

        let trimmed = raw.trim_end();
        if trimmed.is_empty() {
            return None;
        }
        let trimmed_len = trimmed.chars().count();

        // Fragments that only contributed trailing whitespace fall out.
        let source_map: Vec<SourceMapEntry> = starts
            .into_iter()
            .filter(|&(start, _)| start < trimmed_len)
            .map(|(offset, source)| SourceMapEntry { offset, source })
            .collect();

        let mut text = trimmed.to_string();
        if !ends_with_terminal_punctuation(&text) {
            text.push('.');
        }
        let length = text.chars().count();

        Some(Self {
            language: chunk.language.clone(),
            text,
            source_map,
            length,
        })
    }

    fn absorb(&mut self, other: Utterance) {
        if !ends_with_terminal_punctuation(&self.text) {
            self.text.push('.');
        }
        let kept = self.text.trim_end().len();
        self.text.truncate(kept);
        self.text.push(' ');

        let offset = self.text.chars().count();
        self.text.push_str(&other.text);
        self.source_map
            .extend(other.source_map.into_iter().map(|entry| SourceMapEntry {
                offset: entry.offset + offset,
                ..entry
            }));
        self.length = self.text.chars().count();
    }
}

/// Collapses each chunk into a single punctuated string with its offset map,
/// then merges neighbours that share a language.
pub fn consolidate(chunks: &[SentenceChunk]) -> Vec<Utterance> {
    let mut consolidated: Vec<Utterance> = Vec::new();

    for utterance in chunks.iter().filter_map(Utterance::from_chunk) {
        match consolidated.last_mut() {
            Some(last) if last.language == utterance.language => last.absorb(utterance),
            _ => consolidated.push(utterance),
        }
    }

    log::debug!(
        "Consolidated {} chunks into {} utterances",
        chunks.len(),
        consolidated.len()
    );
    consolidated
}

/// Length of the whole reading: every utterance plus one separator between
/// neighbours.
pub fn total_length(utterances: &[Utterance]) -> usize {
    let chars: usize = utterances.iter().map(|u| u.length).sum();
    chars + utterances.len().saturating_sub(1)
}

/// The utterances joined by single spaces.
pub fn document_text(utterances: &[Utterance]) -> String {
    utterances
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomTree;
    use crate::segmentation::assembler::Fragment;

    fn node_ids(count: usize) -> Vec<NodeId> {
        let mut tree = DomTree::new();
        let root = tree.root();
        (0..count).map(|_| tree.append_text(root, "x")).collect()
    }

    fn chunk(language: &str, parts: &[(NodeId, &str)]) -> SentenceChunk {
        SentenceChunk {
            language: language.to_string(),
            fragments: parts
                .iter()
                .map(|(source, text)| Fragment {
                    source: *source,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_appends_period_and_trims() {
        let ids = node_ids(1);
        let result = consolidate(&[chunk("en", &[(ids[0], " Hello world ")])]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "Hello world.");
        assert_eq!(result[0].length, 12);
        assert_eq!(
            result[0].source_map,
            vec![SourceMapEntry {
                offset: 0,
                source: ids[0]
            }]
        );
    }

    #[test]
    fn test_keeps_existing_punctuation() {
        let ids = node_ids(1);
        let result = consolidate(&[chunk("en", &[(ids[0], "Is it?")])]);
        assert_eq!(result[0].text, "Is it?");
    }

    #[test]
    fn test_source_map_offsets() {
        let ids = node_ids(3);
        let result = consolidate(&[chunk(
            "en",
            &[(ids[0], "One "), (ids[1], "two"), (ids[2], " three")],
        )]);
        let offsets: Vec<(usize, NodeId)> = result[0]
            .source_map
            .iter()
            .map(|e| (e.offset, e.source))
            .collect();
        assert_eq!(offsets, vec![(0, ids[0]), (4, ids[1]), (7, ids[2])]);
        assert_eq!(result[0].source_at(5), Some(ids[1]));
        assert_eq!(result[0].source_at(100), Some(ids[2]));
    }

    #[test]
    fn test_leading_whitespace_fragment_yields_to_text() {
        let ids = node_ids(2);
        let result = consolidate(&[chunk("en", &[(ids[0], "  "), (ids[1], "word")])]);
        assert_eq!(result[0].text, "word.");
        assert_eq!(
            result[0].source_map,
            vec![SourceMapEntry {
                offset: 0,
                source: ids[1]
            }]
        );
    }

    #[test]
    fn test_trailing_whitespace_fragment_is_dropped() {
        let ids = node_ids(2);
        let result = consolidate(&[chunk("en", &[(ids[0], "word"), (ids[1], " ")])]);
        assert_eq!(result[0].source_map.len(), 1);
    }

    #[test]
    fn test_whitespace_is_not_doubled_between_fragments() {
        let ids = node_ids(3);
        let result = consolidate(&[chunk(
            "en",
            &[(ids[0], "Keep this "), (ids[1], " text"), (ids[2], " too")],
        )]);
        assert_eq!(result[0].text, "Keep this text too.");
        let offsets: Vec<usize> = result[0].source_map.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 10, 14]);
    }

    #[test]
    fn test_merges_adjacent_same_language() {
        let ids = node_ids(2);
        let result = consolidate(&[
            chunk("en", &[(ids[0], "Title")]),
            chunk("en", &[(ids[1], "Body text")]),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "Title. Body text.");
        assert_eq!(result[0].length, 17);
        let offsets: Vec<usize> = result[0].source_map.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 7]);
        assert_eq!(result[0].source_at(7), Some(ids[1]));
    }

    #[test]
    fn test_does_not_merge_different_languages() {
        let ids = node_ids(3);
        let result = consolidate(&[
            chunk("en", &[(ids[0], "Hello ")]),
            chunk("fr", &[(ids[1], "bonjour")]),
            chunk("en", &[(ids[2], " world")]),
        ]);
        let texts: Vec<(&str, &str)> = result
            .iter()
            .map(|u| (u.language.as_str(), u.text.as_str()))
            .collect();
        assert_eq!(
            texts,
            vec![("en", "Hello."), ("fr", "bonjour."), ("en", "world.")]
        );
    }

    #[test]
    fn test_blank_chunks_are_dropped_before_merging() {
        let ids = node_ids(3);
        let result = consolidate(&[
            chunk("en", &[(ids[0], "A")]),
            chunk("fr", &[(ids[1], "   ")]),
            chunk("en", &[(ids[2], "B")]),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "A. B.");
    }

    #[test]
    fn test_empty_input() {
        assert!(consolidate(&[]).is_empty());
        assert_eq!(total_length(&[]), 0);
        assert_eq!(document_text(&[]), "");
    }

    #[test]
    fn test_lengths_count_chars() {
        let ids = node_ids(1);
        let result = consolidate(&[chunk("de", &[(ids[0], "Grüße")])]);
        assert_eq!(result[0].text, "Grüße.");
        assert_eq!(result[0].length, 6);
    }

    #[test]
    fn test_total_length_matches_document_text() {
        let ids = node_ids(3);
        let result = consolidate(&[
            chunk("en", &[(ids[0], "Hello ")]),
            chunk("fr", &[(ids[1], "ça va")]),
            chunk("en", &[(ids[2], "fine")]),
        ]);
        assert_eq!(
            total_length(&result),
            document_text(&result).chars().count()
        );
    }
}

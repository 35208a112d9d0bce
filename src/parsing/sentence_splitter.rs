use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static ACRONYM_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[ .][a-z]\.? *$").expect("acronym pattern is valid"));
static ELLIPSIS_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:…|\.{2,}) *$").expect("ellipsis pattern is valid"));
static TRAILING_TERMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?‽⸘‼⁇⁈⁉。！？] *$").expect("terminator pattern is valid"));

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "fig",
    "vol", "ca", "z.b", "bzw", "usw", "nr", "hr", "fr", "mme", "mlle",
];

fn is_terminator(c: char) -> bool {
    matches!(
        c,
        '.' | '!' | '?' | '‽' | '⸘' | '‼' | '⁇' | '⁈' | '⁉' | '。' | '！' | '？'
    )
}

/// Splits `text` into sentences with simple heuristics: a terminator followed
/// by whitespace ends a sentence unless the text so far ends in an acronym,
/// an ellipsis or a known abbreviation. Line breaks always split.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_spans(text)
        .into_iter()
        .map(|span| text[span].trim())
        .collect()
}

/// The trimmed sentence containing the character at `char_index`; the last
/// sentence when the index runs past the end.
pub fn sentence_at(text: &str, char_index: usize) -> Option<&str> {
    let spans = sentence_spans(text);
    let mut chars_before = 0;
    for span in &spans {
        let len = text[span.clone()].chars().count();
        if char_index < chars_before + len {
            return Some(text[span.clone()].trim());
        }
        chars_before += len;
    }
    spans.last().map(|span| text[span.clone()].trim())
}

/// Byte ranges partitioning `text` into sentences. Whitespace between two
/// sentences belongs to the first one.
pub fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Whitespace-only pieces are glued to their neighbours.
    let mut chunks: Vec<Range<usize>> = Vec::new();
    let mut carried_start: Option<usize> = None;
    for piece in naive_split(text) {
        if text[piece.clone()].trim().is_empty() {
            match chunks.last_mut() {
                Some(last) => last.end = piece.end,
                None => {
                    carried_start.get_or_insert(piece.start);
                }
            }
            continue;
        }
        let start = carried_start.take().unwrap_or(piece.start);
        chunks.push(start..piece.end);
    }

    let mut sentences: Vec<Range<usize>> = Vec::new();
    let mut pending_start: Option<usize> = None;
    for (i, chunk) in chunks.iter().enumerate() {
        let start = pending_start.take().unwrap_or(chunk.start);
        let span = start..chunk.end;
        let has_next = i + 1 < chunks.len();
        if has_next && !looks_like_sentence(&text[span.clone()]) {
            pending_start = Some(start);
        } else {
            sentences.push(span);
        }
    }

    for i in 1..sentences.len() {
        let sentence = &text[sentences[i].clone()];
        let leading = sentence.len() - sentence.trim_start().len();
        if leading > 0 {
            sentences[i - 1].end += leading;
            sentences[i].start += leading;
        }
    }

    sentences
}

fn naive_split(text: &str) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let end = i + c.len_utf8();
        if c == '\n' || c == '\r' {
            if start < i {
                pieces.push(start..i);
            }
            let mut run_end = end;
            while let Some(&(j, next)) = chars.peek() {
                if next != '\n' && next != '\r' {
                    break;
                }
                run_end = j + next.len_utf8();
                chars.next();
            }
            pieces.push(i..run_end);
            start = run_end;
        } else if is_terminator(c)
            && chars
                .peek()
                .is_none_or(|&(_, next)| next.is_whitespace())
        {
            pieces.push(start..end);
            start = end;
        }
    }

    if start < text.len() {
        pieces.push(start..text.len());
    }
    pieces
}

fn looks_like_sentence(candidate: &str) -> bool {
    if ACRONYM_END.is_match(candidate) || ELLIPSIS_END.is_match(candidate) {
        return false;
    }
    if !candidate.chars().any(char::is_alphanumeric) {
        return false;
    }

    let without_terminator = TRAILING_TERMINATOR.replace(candidate, "");
    let last_word = without_terminator
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_lowercase();
    !ABBREVIATIONS.contains(&last_word.as_str())
}

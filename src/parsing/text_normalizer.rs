use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

// Sentence terminators plus the closing quotes and brackets that may follow
// them; trailing whitespace is tolerated.
static TERMINAL_PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?…‼‽⸘⁇⁈⁉。！？"'”’»›)\]}]\s*$"#).expect("terminal pattern is valid")
});

/// Glyphs that are stripped from text by default: soft hyphen, zero width
/// space, bullets and bar separators.
pub const DEFAULT_SILENT_CHARS: &[char] = &['\u{00AD}', '\u{200B}', '•', '·', '|', '¦'];

/// Collapses every run of whitespace to a single space. Leading and trailing
/// whitespace is kept (collapsed), not trimmed.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Removes `silent` glyphs. A glyph sitting between two word characters is
/// dropped without a trace ("foo|bar" reads "foobar"); anywhere else it
/// becomes a space, which then collapses with its neighbours.
pub fn strip_silent_chars(text: &str, silent: &[char]) -> String {
    if silent.is_empty() || !text.contains(silent) {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if !silent.contains(&c) {
            out.push(c);
            continue;
        }
        let prev = out.chars().last();
        let next = chars[i + 1..].iter().find(|c| !silent.contains(c));
        let fuse = prev.is_some_and(is_word_char) && next.is_some_and(|c| is_word_char(*c));
        if !fuse {
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

/// Whitespace collapse followed by silent-glyph removal.
pub fn normalize_text(text: &str, silent: &[char]) -> String {
    strip_silent_chars(&collapse_whitespace(text), silent)
}

pub fn ends_with_terminal_punctuation(text: &str) -> bool {
    TERMINAL_PUNCTUATION.is_match(text)
}

pub fn ends_with_whitespace(text: &str) -> bool {
    text.chars().last().is_some_and(char::is_whitespace)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Hello \n\t world  "), " Hello world ");
        assert_eq!(collapse_whitespace("a\u{00A0}\u{00A0}b"), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_collapse_whitespace_is_idempotent() {
        let samples = [
            "",
            " ",
            "plain",
            "  two   spaces ",
            "\n\nnew\r\nlines\t\ttabs\n",
            "mixed \u{00A0} \u{2003} unicode",
            "ünïcödé\u{3000}ideographic space",
        ];
        for sample in samples {
            let once = collapse_whitespace(sample);
            assert_eq!(collapse_whitespace(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn test_silent_char_between_words_is_fused() {
        assert_eq!(strip_silent_chars("foo|bar", &['|']), "foobar");
        assert_eq!(
            strip_silent_chars("Silben\u{00AD}trennung", DEFAULT_SILENT_CHARS),
            "Silbentrennung"
        );
    }

    #[test]
    fn test_silent_char_as_separator_leaves_one_space() {
        assert_eq!(strip_silent_chars("Home • About", &['•']), "Home About");
        assert_eq!(strip_silent_chars("Home •About", &['•']), "Home About");
        assert_eq!(strip_silent_chars("end.|Next", &['|']), "end. Next");
        assert_eq!(strip_silent_chars("• Item", &['•']), " Item");
    }

    #[test]
    fn test_runs_of_silent_chars() {
        assert_eq!(strip_silent_chars("a||b", &['|']), "ab");
        assert_eq!(strip_silent_chars("a | | b", &['|']), "a b");
    }

    #[test]
    fn test_no_silent_chars_configured() {
        assert_eq!(strip_silent_chars("a|b", &[]), "a|b");
    }

    #[test]
    fn test_terminal_punctuation() {
        assert!(ends_with_terminal_punctuation("Hello."));
        assert!(ends_with_terminal_punctuation("Really?  "));
        assert!(ends_with_terminal_punctuation("He said \u{201C}no.\u{201D}"));
        assert!(ends_with_terminal_punctuation("(aside)"));
        assert!(ends_with_terminal_punctuation("終わり。"));
        assert!(!ends_with_terminal_punctuation("Hello"));
        assert!(!ends_with_terminal_punctuation("list:"));
        assert!(!ends_with_terminal_punctuation(""));
    }

    #[test]
    fn test_ends_with_whitespace() {
        assert!(ends_with_whitespace("a "));
        assert!(!ends_with_whitespace("a"));
        assert!(!ends_with_whitespace(""));
    }
}

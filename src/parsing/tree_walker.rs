use crate::dom::{DomTree, NodeId, NodeKind};
use crate::parsing::block_classifier::{is_block_element, is_line_break, is_non_rendered};
use crate::parsing::text_normalizer::{DEFAULT_SILENT_CHARS, normalize_text};

pub const DEFAULT_SKIP_ATTRIBUTE: &str = "data-spkbl-skip";

/// Class carried by the player markup a host injects next to a widget; it is
/// never read aloud.
pub const PLAYER_CLASS: &str = "spkbl-player";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Text,
    InlineElement,
    BlockElement,
}

/// One readable node of the document with its effective language.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text {
        source: NodeId,
        language: String,
        text: String,
    },
    Inline {
        source: NodeId,
        language: String,
        line_break: bool,
        children: Vec<Item>,
    },
    Block {
        source: NodeId,
        language: String,
        children: Vec<Item>,
    },
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Text { .. } => ItemKind::Text,
            Item::Inline { .. } => ItemKind::InlineElement,
            Item::Block { .. } => ItemKind::BlockElement,
        }
    }

    pub fn language(&self) -> &str {
        match self {
            Item::Text { language, .. }
            | Item::Inline { language, .. }
            | Item::Block { language, .. } => language,
        }
    }

    pub fn source(&self) -> NodeId {
        match self {
            Item::Text { source, .. } | Item::Inline { source, .. } | Item::Block { source, .. } => {
                *source
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Item::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Item] {
        match self {
            Item::Text { .. } => &[],
            Item::Inline { children, .. } | Item::Block { children, .. } => children,
        }
    }
}

/// Turns a DOM subtree into [`Item`]s.
///
/// Elements carrying the skip attribute, non-rendered elements and injected
/// player markup disappear with their whole subtree. Text is whitespace
/// collapsed and stripped of silent glyphs; whitespace-only text produces
/// nothing. In multi-voice mode an element's own `lang` overrides the
/// inherited language for its subtree, otherwise the inherited language is
/// used throughout.
pub struct TreeWalker<'a> {
    tree: &'a DomTree,
    multi_voice: bool,
    skip_attribute: String,
    silent_chars: Vec<char>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(tree: &'a DomTree) -> Self {
        Self {
            tree,
            multi_voice: false,
            skip_attribute: DEFAULT_SKIP_ATTRIBUTE.to_string(),
            silent_chars: DEFAULT_SILENT_CHARS.to_vec(),
        }
    }

    pub fn multi_voice(mut self, enabled: bool) -> Self {
        self.multi_voice = enabled;
        self
    }

    pub fn skip_attribute(mut self, name: impl Into<String>) -> Self {
        self.skip_attribute = name.into();
        self
    }

    pub fn silent_chars(mut self, chars: &[char]) -> Self {
        self.silent_chars = chars.to_vec();
        self
    }

    pub fn parse(&self, node: NodeId, inherited_language: &str) -> Vec<Item> {
        let mut items = Vec::new();

        for &child in self.tree.children(node) {
            match &self.tree.node(child).kind {
                NodeKind::Element { tag, .. } => {
                    if self.is_skipped(child, tag) {
                        log::trace!("Skipping <{tag}> ({child:?})");
                        continue;
                    }

                    let language = match self.tree.declared_language(child) {
                        Some(own) if self.multi_voice => own,
                        _ => inherited_language,
                    };
                    let children = self.parse(child, language);
                    let language = language.to_string();

                    items.push(if is_block_element(tag) {
                        Item::Block {
                            source: child,
                            language,
                            children,
                        }
                    } else {
                        Item::Inline {
                            source: child,
                            language,
                            line_break: is_line_break(tag),
                            children,
                        }
                    });
                }
                NodeKind::Text(raw) => {
                    let mut text = normalize_text(raw, &self.silent_chars);
                    if text.trim().is_empty() {
                        text = " ".to_string();
                    }
                    items.push(Item::Text {
                        source: child,
                        language: inherited_language.to_string(),
                        text,
                    });
                }
                NodeKind::Document | NodeKind::Other => {}
            }
        }

        drop_edge_spaces(items)
    }

    fn is_skipped(&self, id: NodeId, tag: &str) -> bool {
        if is_non_rendered(tag) || self.tree.classes(id).any(|class| class == PLAYER_CLASS) {
            return true;
        }
        match self.tree.attr(id, &self.skip_attribute) {
            Some(value) => !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0"),
            None => false,
        }
    }
}

fn is_space(item: &Item) -> bool {
    matches!(item, Item::Text { text, .. } if text.trim().is_empty())
}

/// Keeps whitespace-only text only where it separates two inline or text
/// siblings; next to a block or at either end of the run it is layout.
fn drop_edge_spaces(items: Vec<Item>) -> Vec<Item> {
    let keep: Vec<bool> = (0..items.len())
        .map(|i| {
            if !is_space(&items[i]) {
                return true;
            }
            let before = i.checked_sub(1).and_then(|j| items.get(j));
            let after = items.get(i + 1);
            [before, after]
                .into_iter()
                .all(|item| item.is_some_and(|item| !matches!(item, Item::Block { .. })))
        })
        .collect();
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_items(html: &str, multi_voice: bool) -> (DomTree, Vec<Item>) {
        let tree = DomTree::parse_html(html);
        let body = tree.body().unwrap();
        let items = TreeWalker::new(&tree)
            .multi_voice(multi_voice)
            .parse(body, "en");
        (tree, items)
    }

    #[test]
    fn test_classifies_block_inline_and_text() {
        let (_, items) = body_items("<p>Hello <em>big</em> world</p>", false);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind(), ItemKind::BlockElement);

        let kinds: Vec<ItemKind> = items[0].children().iter().map(Item::kind).collect();
        assert_eq!(
            kinds,
            vec![ItemKind::Text, ItemKind::InlineElement, ItemKind::Text]
        );
        assert_eq!(items[0].children()[0].text(), Some("Hello "));
        assert_eq!(items[0].children()[2].text(), Some(" world"));
    }

    #[test]
    fn test_text_is_collapsed_but_not_trimmed() {
        let (_, items) = body_items("<p>\n   Hello\n\n   world   </p>", false);
        assert_eq!(items[0].children()[0].text(), Some(" Hello world "));
    }

    #[test]
    fn test_space_between_inline_siblings_is_kept() {
        let (_, items) = body_items("<p> <b>Hello</b>\n <i>world</i> </p>", false);
        let texts: Vec<Option<&str>> = items[0].children().iter().map(Item::text).collect();
        assert_eq!(texts, vec![None, Some(" "), None]);

        let (_, items) = body_items("<p><b>W</b>ord</p>", false);
        assert_eq!(items[0].children().len(), 2);
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let (_, items) = body_items("<div>\n  <p>One</p>\n  <p>Two</p>\n</div>", false);
        let div = &items[0];
        assert_eq!(div.children().len(), 2);
        assert!(
            div.children()
                .iter()
                .all(|item| item.kind() == ItemKind::BlockElement)
        );
    }

    #[test]
    fn test_language_override_requires_multi_voice() {
        let html = r#"<p>Hello <span lang="fr">bonjour</span></p>"#;

        let (_, items) = body_items(html, false);
        let span = &items[0].children()[1];
        assert_eq!(span.language(), "en");
        assert_eq!(span.children()[0].language(), "en");

        let (_, items) = body_items(html, true);
        let span = &items[0].children()[1];
        assert_eq!(span.language(), "fr");
        assert_eq!(span.children()[0].language(), "fr");
    }

    #[test]
    fn test_skip_marker_removes_subtree() {
        let (tree, items) = body_items(
            r#"<p>Keep <span data-spkbl-skip>secret <b>stuff</b></span>this</p>"#,
            false,
        );
        let p = &items[0];
        assert_eq!(p.children().len(), 2);
        let skipped = tree.select("[data-spkbl-skip]").unwrap()[0];
        assert!(p.children().iter().all(|item| item.source() != skipped));
    }

    #[test]
    fn test_skip_marker_can_be_disabled() {
        let (_, items) = body_items(r#"<p data-spkbl-skip="false">Read me</p>"#, false);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_custom_skip_attribute() {
        let tree = DomTree::parse_html(r#"<p>A</p><p aria-hidden="true">B</p>"#);
        let body = tree.body().unwrap();
        let items = TreeWalker::new(&tree)
            .skip_attribute("aria-hidden")
            .parse(body, "en");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_scripts_styles_and_player_markup_are_ignored() {
        let (_, items) = body_items(
            r#"<script>var x = 1;</script><style>p {}</style>
               <div class="spkbl-player"><button>Play</button></div><p>Text</p>"#,
            false,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].children()[0].text(), Some("Text"));
    }

    #[test]
    fn test_line_break_is_flagged() {
        let (_, items) = body_items("<p>One<br>Two</p>", false);
        match &items[0].children()[1] {
            Item::Inline { line_break, .. } => assert!(line_break),
            other => panic!("expected inline line break, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_are_ignored() {
        let (_, items) = body_items("<p>A<!-- note -->B</p>", false);
        let texts: Vec<&str> = items[0].children().iter().filter_map(Item::text).collect();
        assert_eq!(texts, vec!["A", "B"]);
    }

    #[test]
    fn test_silent_chars_are_stripped() {
        let (_, items) = body_items("<p>Home • About</p>", false);
        assert_eq!(items[0].children()[0].text(), Some("Home About"));
    }
}

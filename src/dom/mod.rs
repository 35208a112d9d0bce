use crate::error::{Error, Result};
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::collections::HashMap;

/// Index of a node inside a [`DomTree`]. Only meaningful for the tree that
/// handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    /// Comments, doctypes, processing instructions.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Owned snapshot of a document. Nodes live in one table and refer to each
/// other by [`NodeId`], so the rest of the pipeline can carry plain indices
/// instead of shared node handles.
///
/// A parsed tree also keeps the scraper document it was imported from, so
/// CSS selectors run against the real parse.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    document: Option<Html>,
    /// Arena ids of the document's nodes, in the document's preorder.
    imported: Vec<NodeId>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// An empty tree holding only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![DomNode {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            document: None,
            imported: Vec::new(),
        }
    }

    /// Parses a full HTML document with scraper (html5ever underneath).
    /// Fragments are wrapped in `html`/`body` the way a browser would.
    pub fn parse_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        if !document.errors.is_empty() {
            log::debug!("HTML parsed with {} recoverable errors", document.errors.len());
        }

        let mut tree = Self::new();
        let document_root = document.tree.root();
        let mut arena_ids = HashMap::new();
        arena_ids.insert(document_root.id(), tree.root());
        tree.imported.push(tree.root());

        // Preorder visits every parent before its children.
        for node in document_root.descendants().skip(1) {
            let Some(&parent) = node.parent().and_then(|parent| arena_ids.get(&parent.id()))
            else {
                continue;
            };
            let id = tree.push(parent, Self::kind_of(node.value()));
            arena_ids.insert(node.id(), id);
            tree.imported.push(id);
        }
        log::debug!("Parsed HTML into {} nodes", tree.nodes.len());
        tree.document = Some(document);
        tree
    }

    fn kind_of(node: &Node) -> NodeKind {
        match node {
            Node::Element(element) => NodeKind::Element {
                tag: element.name().to_string(),
                attrs: element
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            },
            Node::Text(text) => {
                let data: &str = text;
                NodeKind::Text(data.to_string())
            }
            _ => NodeKind::Other,
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Attribute lookup; names compare ASCII case-insensitively.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attr(id, "class").unwrap_or("").split_whitespace()
    }

    /// The language an element declares itself through `lang` or `xml:lang`.
    pub fn declared_language(&self, id: NodeId) -> Option<&str> {
        ["lang", "xml:lang"]
            .iter()
            .filter_map(|name| self.attr(id, name))
            .map(str::trim)
            .find(|lang| !lang.is_empty())
    }

    /// Language of `id` itself or of its nearest ancestor declaring one.
    pub fn resolve_language(&self, id: NodeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(lang) = self.declared_language(node) {
                return Some(lang);
            }
            current = self.parent(node);
        }
        None
    }

    /// Descendants of `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Concatenated raw character data below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let Some(own) = self.text(id) {
            text.push_str(own);
        }
        for node in self.descendants(id) {
            if let Some(data) = self.text(node) {
                text.push_str(data);
            }
        }
        text
    }

    /// Elements of the parsed document matching a CSS selector, in document
    /// order. Nodes added through `append_*` are never matched.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>> {
        let parsed = Selector::parse(selector).map_err(|err| Error::Selector {
            selector: selector.to_string(),
            reason: err.to_string(),
        })?;
        let Some(document) = &self.document else {
            return Ok(Vec::new());
        };
        Ok(document
            .tree
            .root()
            .descendants()
            .zip(&self.imported)
            .filter_map(|(node, &id)| {
                ElementRef::wrap(node)
                    .filter(|element| parsed.matches(element))
                    .map(|_| id)
            })
            .collect())
    }

    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.tag(id) == Some("body"))
    }
}

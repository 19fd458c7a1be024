//! The immutable syntax tree node

use super::Tree;
use super::kind::NodeKind;
use crate::diagnostics::Location;
use std::fmt;
use std::sync::Arc;

/// What a node stands for: a kind from the vocabulary, or raw source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
    Kind(NodeKind),
    Text(Arc<str>),
}

struct Node {
    payload: Payload,
    children: Vec<SyntacticTree>,
    location: Option<Location>,
}

/// A node of the document tree.
///
/// Cloning is cheap and shares the node. Equality is structural over payloads and
/// children; locations do not take part in it.
#[derive(Clone)]
pub struct SyntacticTree(Arc<Node>);

impl SyntacticTree {
    pub fn new(payload: Payload, children: Vec<SyntacticTree>, location: Option<Location>) -> Self {
        Self(Arc::new(Node {
            payload,
            children,
            location,
        }))
    }

    /// A kind node without children.
    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(Payload::Kind(kind), Vec::new(), None)
    }

    pub fn node(kind: NodeKind, children: Vec<SyntacticTree>) -> Self {
        Self::new(Payload::Kind(kind), children, None)
    }

    /// A text node without children.
    pub fn literal(text: impl Into<Arc<str>>) -> Self {
        Self::new(Payload::Text(text.into()), Vec::new(), None)
    }

    /// A kind node holding a single text child, the usual shape of tokens.
    pub fn token(kind: NodeKind, text: impl Into<Arc<str>>) -> Self {
        Self::node(kind, vec![Self::literal(text)])
    }

    pub fn word(text: impl Into<Arc<str>>) -> Self {
        Self::token(NodeKind::Word, text)
    }

    pub fn payload(&self) -> &Payload {
        &self.0.payload
    }

    pub fn kind(&self) -> Option<NodeKind> {
        match self.0.payload {
            Payload::Kind(kind) => Some(kind),
            Payload::Text(_) => None,
        }
    }

    /// Kind name for kind nodes, raw text for text nodes.
    pub fn text(&self) -> &str {
        match &self.0.payload {
            Payload::Kind(kind) => kind.name(),
            Payload::Text(text) => text,
        }
    }

    /// Text of the first child, which is where tokens keep their content.
    pub fn first_text(&self) -> Option<&str> {
        self.child(0).map(SyntacticTree::text)
    }

    pub fn children(&self) -> &[SyntacticTree] {
        &self.0.children
    }

    pub fn child(&self, index: usize) -> Option<&SyntacticTree> {
        self.0.children.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.0.children.len()
    }

    pub fn location(&self) -> Option<&Location> {
        self.0.location.as_ref()
    }

    pub fn with_location(&self, location: Location) -> Self {
        Self::new(self.0.payload.clone(), self.0.children.clone(), Some(location))
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn is_one_of(&self, kinds: &[NodeKind]) -> bool {
        self.kind().is_some_and(|kind| kinds.contains(&kind))
    }

    /// Same payload and location, new children.
    pub fn adopt(&self, children: Vec<SyntacticTree>) -> Self {
        Self::new(self.0.payload.clone(), children, self.0.location.clone())
    }

    pub fn add_first(&self, child: SyntacticTree) -> Self {
        let mut children = Vec::with_capacity(self.child_count() + 1);
        children.push(child);
        children.extend(self.children().iter().cloned());
        self.adopt(children)
    }

    pub fn add_last(&self, child: SyntacticTree) -> Self {
        let mut children = self.0.children.clone();
        children.push(child);
        self.adopt(children)
    }

    /// Drops direct children matching the predicate.
    pub fn remove_children(&self, predicate: impl Fn(&SyntacticTree) -> bool) -> Self {
        self.adopt(
            self.children()
                .iter()
                .filter(|child| !predicate(child))
                .cloned()
                .collect(),
        )
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &SyntacticTree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Single-line tree notation, readable back by [`crate::notation::NotationParser`].
    pub fn to_notation(&self) -> String {
        let mut buffer = String::new();
        self.write_notation(&mut buffer);
        buffer
    }

    fn write_notation(&self, buffer: &mut String) {
        let head = match &self.0.payload {
            Payload::Kind(kind) => kind.name().to_string(),
            Payload::Text(text) => quote(text),
        };
        if self.0.children.is_empty() {
            buffer.push_str(&head);
            return;
        }
        buffer.push('(');
        buffer.push_str(&head);
        for child in &self.0.children {
            buffer.push(' ');
            child.write_notation(buffer);
        }
        buffer.push(')');
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl PartialEq for SyntacticTree {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.payload == other.0.payload && self.0.children == other.0.children)
    }
}

impl Eq for SyntacticTree {}

impl fmt::Debug for SyntacticTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation())
    }
}

impl fmt::Display for SyntacticTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation())
    }
}

impl Tree for SyntacticTree {
    fn children(&self) -> &[Self] {
        SyntacticTree::children(self)
    }

    fn adopt(&self, children: Vec<Self>) -> Self {
        SyntacticTree::adopt(self, children)
    }

    fn label(&self) -> &str {
        self.text()
    }

    fn same_node(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

//! Phrase summaries and reference notes.
//!
//! Both walks run in pre-order over either a raw [`ParseNode`] tree or a built
//! [`RenderTree`], through the read-only [`TreeView`] trait. Neither touches the tree.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::{word_key, Reference, Tables};
use crate::syntax::ParseNode;
use crate::tree::{NodeId, RenderTree};

// ============================================================================
// TREE ACCESS
// ============================================================================

/// Read-only access to a constituency tree.
pub trait TreeView {
    type Node: Copy;

    fn root(&self) -> Self::Node;
    fn tag(&self, node: Self::Node) -> &str;
    /// The surface word of a leaf; `None` for branches.
    fn word(&self, node: Self::Node) -> Option<&str>;
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Concatenated leaf words under `node`, left to right.
    fn surface_text(&self, node: Self::Node) -> String {
        let mut text = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            match self.word(current) {
                Some(word) => text.push_str(word),
                None => stack.extend(self.children(current).into_iter().rev()),
            }
        }
        text
    }

    /// Every node, pre-order.
    fn preorder(&self) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }
}

impl<'a> TreeView for &'a ParseNode {
    type Node = &'a ParseNode;

    fn root(&self) -> Self::Node {
        *self
    }

    fn tag(&self, node: Self::Node) -> &str {
        node.tag()
    }

    fn word(&self, node: Self::Node) -> Option<&str> {
        match node {
            ParseNode::Leaf { word, .. } => Some(word.trim()),
            ParseNode::Branch { .. } => None,
        }
    }

    fn children(&self, node: Self::Node) -> Vec<Self::Node> {
        node.children().iter().collect()
    }
}

impl TreeView for RenderTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        RenderTree::root(self).id
    }

    fn tag(&self, node: NodeId) -> &str {
        self.get(node).map_or("", |n| n.tag.as_str())
    }

    fn word(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(|n| n.word.as_deref())
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node).map(|n| n.children.clone()).unwrap_or_default()
    }
}

// ============================================================================
// PHRASES
// ============================================================================

/// A salient phrase and the text it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phrase {
    pub label: String,
    pub text: String,
}

/// One entry per node whose tag has a phrase label, in pre-order.
pub fn extract_phrases<V: TreeView>(view: &V, tables: &Tables) -> Vec<Phrase> {
    view.preorder()
        .into_iter()
        .filter_map(|node| {
            let label = tables.phrase_label(view.tag(node))?;
            Some(Phrase {
                label: label.to_string(),
                text: view.surface_text(node),
            })
        })
        .collect()
}

// ============================================================================
// REFERENCES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceHit {
    pub key: String,
    #[serde(flatten)]
    pub reference: Reference,
}

/// Reference notes for the tree's tags and `word:tag` pairs, first occurrence only.
pub fn collect_references<V: TreeView>(view: &V, tables: &Tables) -> Vec<ReferenceHit> {
    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    for node in view.preorder() {
        let tag = view.tag(node);
        let mut keys = vec![tag.to_string()];
        if let Some(word) = view.word(node) {
            keys.insert(0, word_key(word, tag));
        }
        for key in keys {
            if let Some(reference) = tables.reference(&key) {
                if seen.insert(key.clone()) {
                    hits.push(ReferenceHit {
                        key,
                        reference: reference.clone(),
                    });
                }
            }
        }
    }
    hits
}

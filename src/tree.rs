//! Render-ready trees.
//!
//! [`TreeBuilder`] turns a raw [`ParseNode`] tree into a [`RenderTree`]:
//!
//! 1. chains of single-child branches are collapsed to their sole descendant
//!    (unless every level is requested),
//! 2. the root sentence is shown as `Sentence`, and a `Predicate` that is not the
//!    last child of its parent (the root included) is shown as `Verb Phrase`,
//! 3. branches get their depth as `level` (root = 0) and layer 1; leaves get level
//!    -1, layer 0 and display labels from the label tables,
//! 4. every node receives an ID from a single pre-order counter,
//! 5. each node records its parent's ID and leaves are collected left to right.
//!
//! Nodes live in one arena ordered by ID; children are owned through the arena and
//! the parent link is a plain ID, so ownership only ever flows from the root down.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::config::Tables;
use crate::syntax::{nt, ParseNode};

/// Display tag of the root sentence.
pub const SENTENCE_LABEL: &str = "Sentence";
/// Display tag of a non-final predicate.
pub const VERB_PHRASE_LABEL: &str = "Verb Phrase";

// ============================================================================
// NODES
// ============================================================================

/// A node's position in its tree; IDs start at 1 and follow pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn get(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize - 1
    }

    fn from_index(index: usize) -> Self {
        NodeId(index as u32 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    #[serde(rename = "tree")]
    Branch,
    #[serde(rename = "word")]
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Display tag after relabeling.
    pub tag: String,
    /// Label lines; empty for branches.
    pub tag_label: Vec<String>,
    /// Depth below the root for branches, -1 for leaves.
    pub level: i32,
    pub layer: u8,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Surface morpheme; leaves only.
    pub word: Option<String>,
    pub definition: Option<String>,
}

impl RenderNode {
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }
}

/// Arena of render nodes; index `i` holds the node with ID `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
}

impl RenderTree {
    pub fn root(&self) -> &RenderNode {
        // Builders always push the root first.
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.iter()
    }

    pub fn children<'t>(&'t self, node: &'t RenderNode) -> impl Iterator<Item = &'t RenderNode> + 't {
        node.children.iter().filter_map(|id| self.get(*id))
    }

    pub fn parent(&self, node: &RenderNode) -> Option<&RenderNode> {
        node.parent.and_then(|id| self.get(id))
    }

    /// Leaves, left to right.
    pub fn leaves(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Nested view used for serialization.
    pub fn nested(&self) -> NestedNode<'_> {
        self.nest(self.root())
    }

    fn nest<'t>(&'t self, node: &'t RenderNode) -> NestedNode<'t> {
        NestedNode {
            id: node.id,
            kind: node.kind,
            tag: &node.tag,
            tag_label: &node.tag_label,
            level: node.level,
            layer: node.layer,
            parent: node.parent,
            word: node.word.as_deref(),
            definition: node.definition.as_deref(),
            children: self.children(node).map(|c| self.nest(c)).collect(),
        }
    }
}

impl Serialize for RenderTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.nested().serialize(serializer)
    }
}

/// A render node with its children inlined.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedNode<'t> {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub tag: &'t str,
    #[serde(skip_serializing_if = "no_labels")]
    pub tag_label: &'t [String],
    pub level: i32,
    pub layer: u8,
    pub parent: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<&'t str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<&'t str>,
    pub children: Vec<NestedNode<'t>>,
}

fn no_labels(labels: &&[String]) -> bool {
    labels.is_empty()
}

/// Output of [`TreeBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTree {
    pub tree: RenderTree,
    /// Leaf IDs, left to right.
    pub terminals: Vec<NodeId>,
    /// Deepest level reached, counting a leaf at its parent's level plus one.
    pub height: i32,
}

impl BuiltTree {
    pub fn root(&self) -> &RenderNode {
        self.tree.root()
    }

    pub fn terminal_nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.terminals.iter().filter_map(|id| self.tree.get(*id))
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Where a node sits in its parent's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Root,
    Inner,
    Last,
}

pub struct TreeBuilder<'t> {
    tables: &'t Tables,
    show_all_levels: bool,
    definitions: Option<&'t BTreeMap<String, String>>,
}

struct BuildState {
    nodes: Vec<RenderNode>,
    terminals: Vec<NodeId>,
    height: i32,
}

impl<'t> TreeBuilder<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Self {
            tables,
            show_all_levels: false,
            definitions: None,
        }
    }

    /// Keeps single-child branches instead of eliding them.
    pub fn show_all_levels(mut self, show: bool) -> Self {
        self.show_all_levels = show;
        self
    }

    /// Attaches word definitions to matching leaves.
    pub fn with_definitions(mut self, definitions: &'t BTreeMap<String, String>) -> Self {
        self.definitions = Some(definitions);
        self
    }

    pub fn build(&self, root: &ParseNode) -> BuiltTree {
        let mut state = BuildState {
            nodes: Vec::with_capacity(root.node_count()),
            terminals: Vec::new(),
            height: 0,
        };
        self.visit(root, None, 0, Position::Root, &mut state);
        BuiltTree {
            tree: RenderTree { nodes: state.nodes },
            terminals: state.terminals,
            height: state.height,
        }
    }

    fn visit(
        &self,
        node: &ParseNode,
        parent: Option<NodeId>,
        level: i32,
        position: Position,
        state: &mut BuildState,
    ) -> NodeId {
        let node = if self.show_all_levels { node } else { elide(node) };
        let id = NodeId::from_index(state.nodes.len());
        state.height = state.height.max(level);

        match node {
            ParseNode::Branch { tag, children } => {
                state.nodes.push(RenderNode {
                    id,
                    kind: NodeKind::Branch,
                    tag: display_tag(tag, position).to_string(),
                    tag_label: Vec::new(),
                    level,
                    layer: 1,
                    parent,
                    children: Vec::new(),
                    word: None,
                    definition: None,
                });
                let last = children.len().saturating_sub(1);
                let child_ids = children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        let position = if i == last { Position::Last } else { Position::Inner };
                        self.visit(child, Some(id), level + 1, position, state)
                    })
                    .collect();
                state.nodes[id.index()].children = child_ids;
            }
            ParseNode::Leaf { word, tag } => {
                let word = word.trim();
                state.nodes.push(RenderNode {
                    id,
                    kind: NodeKind::Leaf,
                    tag: tag.clone(),
                    tag_label: self.tables.leaf_label(word, tag),
                    level: -1,
                    layer: 0,
                    parent,
                    children: Vec::new(),
                    word: Some(word.to_string()),
                    definition: self.definitions.and_then(|d| d.get(word)).cloned(),
                });
                state.terminals.push(id);
            }
        }
        id
    }
}

/// Follows single-child branches down to the first node that is not one.
fn elide(mut node: &ParseNode) -> &ParseNode {
    while let ParseNode::Branch { children, .. } = node {
        match children.as_slice() {
            [only] => node = only,
            _ => break,
        }
    }
    node
}

fn display_tag(tag: &str, position: Position) -> &str {
    match (tag, position) {
        (nt::SENTENCE, Position::Root) => SENTENCE_LABEL,
        // A root has no siblings, so it does not count as a last child.
        (nt::PREDICATE, Position::Inner | Position::Root) => VERB_PHRASE_LABEL,
        _ => tag,
    }
}

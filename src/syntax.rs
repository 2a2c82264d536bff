//! Raw constituency trees.
//!
//! [`ParseNode`] is what the grammar produces: branches labelled with a nonterminal tag
//! that own their children, and leaves holding one token each. Reading the leaves left
//! to right always reproduces the parsed token sequence.

use std::fmt;

use serde::Serialize;

pub mod parser;

pub use parser::{parse, GrammarParser};

/// Nonterminal tags produced by the grammar.
pub mod nt {
    pub const SENTENCE: &str = "S";
    pub const CLAUSE: &str = "Clause";
    pub const TOPIC: &str = "Topic";
    pub const SUBJECT: &str = "Subject";
    pub const OBJECT: &str = "Object";
    pub const COMPLEMENT: &str = "Complement";
    pub const ADVERBIAL: &str = "Adverbial";
    pub const VOCATIVE: &str = "Vocative";
    pub const POSSESSIVE: &str = "Possessive";
    pub const NOUN_PHRASE: &str = "NounPhrase";
    pub const ADNOMINAL_CLAUSE: &str = "AdnominalClause";
    pub const NOUN_CLAUSE: &str = "NounClause";
    pub const ADVERB_PHRASE: &str = "AdverbPhrase";
    pub const PREDICATE: &str = "Predicate";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParseNode {
    Branch { tag: String, children: Vec<ParseNode> },
    Leaf { word: String, tag: String },
}

impl ParseNode {
    /// A branch; the grammar never builds one without children.
    pub fn branch(tag: impl Into<String>, children: Vec<ParseNode>) -> Self {
        debug_assert!(!children.is_empty(), "branch without children");
        ParseNode::Branch {
            tag: tag.into(),
            children,
        }
    }

    pub fn leaf(word: impl Into<String>, tag: impl Into<String>) -> Self {
        ParseNode::Leaf {
            word: word.into(),
            tag: tag.into(),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ParseNode::Branch { tag, .. } | ParseNode::Leaf { tag, .. } => tag,
        }
    }

    pub fn children(&self) -> &[ParseNode] {
        match self {
            ParseNode::Branch { children, .. } => children,
            ParseNode::Leaf { .. } => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ParseNode::Leaf { .. })
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&ParseNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ParseNode>) {
        match self {
            ParseNode::Leaf { .. } => out.push(self),
            ParseNode::Branch { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// `(word, tag)` pairs of the leaves, left to right.
    pub fn terminals(&self) -> Vec<(&str, &str)> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| match leaf {
                ParseNode::Leaf { word, tag } => Some((word.as_str(), tag.as_str())),
                ParseNode::Branch { .. } => None,
            })
            .collect()
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(ParseNode::node_count).sum::<usize>()
    }

    /// Levels below and including this node; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children().iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Bracketed form, e.g. `(S (Clause 가/VV 다/EF) ./SF)`.
    pub fn pretty(&self) -> String {
        match self {
            ParseNode::Leaf { word, tag } => format!("{word}/{tag}"),
            ParseNode::Branch { tag, children } => {
                let inner = children
                    .iter()
                    .map(ParseNode::pretty)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("({tag} {inner})")
            }
        }
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_brackets() {
        let tree = ParseNode::branch(
            nt::SENTENCE,
            vec![
                ParseNode::branch(
                    nt::PREDICATE,
                    vec![ParseNode::leaf("가", "VV"), ParseNode::leaf("다", "EF")],
                ),
                ParseNode::leaf(".", "SF"),
            ],
        );
        assert_eq!(tree.pretty(), "(S (Predicate 가/VV 다/EF) ./SF)");
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.terminals(), vec![("가", "VV"), ("다", "EF"), (".", "SF")]);
    }
}

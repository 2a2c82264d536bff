//! Handles all user-facing output for the CLI.
//!
//! Trees are printed as an indented outline: branches show their display tag, leaves
//! show the morpheme, its tag, its label and any definition, with the tag column
//! aligned by display width so Hangul and ASCII words line up.

use std::io;

use termcolor::{Color, ColorSpec, WriteColor};
use unicode_width::UnicodeWidthStr;

use crate::config::Tables;
use crate::engine::SentenceResult;
use crate::tree::{RenderNode, RenderTree};

const INDENT: &str = "  ";

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints one sentence result: the tree and its phrases, or the failure summary.
pub fn write_sentence<W: WriteColor>(out: &mut W, index: usize, sentence: &SentenceResult) -> io::Result<()> {
    let words: Vec<&str> = sentence.morpheme_groups.iter().map(|g| g.word.as_str()).collect();
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    writeln!(out, "--- Sentence {}: {} ---", index + 1, words.join(" "))?;
    out.reset()?;

    match &sentence.parse_tree {
        Some(tree) => {
            write_tree(out, tree)?;
            write_phrases(out, sentence)?;
        }
        None => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "{}", sentence.error.as_deref().unwrap_or_default())?;
            out.reset()?;
            if let Some(token) = &sentence.last_token {
                write!(out, " at `{}/{}` (token {})", token.morpheme, token.tag, token.position)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn write_tree<W: WriteColor>(out: &mut W, tree: &RenderTree) -> io::Result<()> {
    let column = leaf_column(tree, tree.root(), 0);
    write_node(out, tree, tree.root(), 0, column)
}

/// Prints the canonicalization map as `RAW -> CANONICAL` lines.
pub fn write_tags<W: WriteColor>(out: &mut W, tables: &Tables) -> io::Result<()> {
    let width = tables.tag_map.keys().map(|k| k.width()).max().unwrap_or(0);
    for (raw, canonical) in &tables.tag_map {
        write!(out, "{raw}{} -> ", pad(raw, width))?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, "{canonical}")?;
        out.reset()?;
    }
    writeln!(out, "sentence-final tag: {}", tables.sentence_final_tag)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_node<W: WriteColor>(
    out: &mut W,
    tree: &RenderTree,
    node: &RenderNode,
    depth: usize,
    column: usize,
) -> io::Result<()> {
    let indent = INDENT.repeat(depth);
    match &node.word {
        None => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
            writeln!(out, "{indent}{}", node.tag)?;
            out.reset()?;
            for child in tree.children(node) {
                write_node(out, tree, child, depth + 1, column)?;
            }
        }
        Some(word) => {
            let lead = format!("{indent}{word}");
            write!(out, "{lead}{}  ", pad(&lead, column))?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "{:<4}", node.tag)?;
            out.reset()?;
            write!(out, " {}", node.tag_label.join(" "))?;
            if let Some(definition) = &node.definition {
                out.set_color(ColorSpec::new().set_italic(true))?;
                write!(out, "  \"{definition}\"")?;
                out.reset()?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_phrases<W: WriteColor>(out: &mut W, sentence: &SentenceResult) -> io::Result<()> {
    if sentence.phrases.is_empty() {
        return Ok(());
    }
    writeln!(out, "Phrases:")?;
    for phrase in &sentence.phrases {
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "{INDENT}{}", phrase.label)?;
        out.reset()?;
        writeln!(out, ": {}", phrase.text)?;
    }
    Ok(())
}

/// Widest `indent + word` among the leaves under `node`.
fn leaf_column(tree: &RenderTree, node: &RenderNode, depth: usize) -> usize {
    match &node.word {
        Some(word) => INDENT.len() * depth + word.width(),
        None => tree
            .children(node)
            .map(|child| leaf_column(tree, child, depth + 1))
            .max()
            .unwrap_or(0),
    }
}

fn pad(text: &str, column: usize) -> String {
    " ".repeat(column.saturating_sub(text.width()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Token;
    use crate::syntax::parse;
    use crate::tree::TreeBuilder;
    use termcolor::NoColor;

    fn render(annotated: &str) -> String {
        let tokens: Vec<Token> = annotated
            .split_whitespace()
            .map(|pair| {
                let (m, t) = pair.rsplit_once('/').unwrap();
                Token::new(m, t, m)
            })
            .collect();
        let tree = parse(&tokens).unwrap();
        let built = TreeBuilder::new(Tables::builtin()).build(&tree);
        let mut out = NoColor::new(Vec::new());
        write_tree(&mut out, &built.tree).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn outline_indents_and_aligns_leaves() {
        let text = render("가/VV 아/EF ./SF");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Sentence");
        // The clause collapses into its predicate, which is not the last child.
        assert_eq!(lines[1], "  Verb Phrase");
        assert!(lines[2].starts_with("    가  VV"));
        // `.` sits one level up but its tag column lines up with the deeper leaves.
        let tag_col = |line: &str| line.find("VV").or_else(|| line.find("SF")).unwrap();
        let first = &lines[2][..tag_col(lines[2])];
        let last = &lines[4][..tag_col(lines[4])];
        assert_eq!(first.width(), last.width());
    }
}

//! Tagger for pre-analysed text.
//!
//! Each chunk is either `surface=morpheme/TAG+morpheme/TAG` or just the analysis, in
//! which case the surface form is the concatenation of the morphemes.

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use super::{Morpheme, TaggedWord, Tagger};
use crate::errors::TaggerError;

#[derive(Parser)]
#[grammar = "tagging/annotated.pest"]
struct AnnotationGrammar;

/// Reads `morpheme/TAG` annotations instead of running a morphological analyser.
#[derive(Debug, Clone)]
pub struct AnnotatedTagger {
    terminator: String,
}

impl AnnotatedTagger {
    pub fn new() -> Self {
        Self {
            terminator: "./SF".to_string(),
        }
    }

    /// Uses `morpheme/tag` as the sentence terminator appended to unterminated input.
    pub fn with_terminator(morpheme: &str, tag: &str) -> Self {
        Self {
            terminator: format!("{morpheme}/{tag}"),
        }
    }

    fn terminator_tag(&self) -> &str {
        self.terminator
            .rsplit_once('/')
            .map_or(self.terminator.as_str(), |(_, tag)| tag)
    }
}

impl Default for AnnotatedTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for AnnotatedTagger {
    fn tag_word(&self, chunk: &str) -> Result<TaggedWord, TaggerError> {
        let mut pairs =
            AnnotationGrammar::parse(Rule::chunk, chunk).map_err(convert_parse_error)?;
        let chunk_pair = pairs
            .next()
            .ok_or_else(|| TaggerError::new("empty annotation", 0))?;

        let mut surface = None;
        let mut morphemes = Vec::new();
        for pair in chunk_pair.into_inner() {
            match pair.as_rule() {
                Rule::surface => surface = Some(pair.as_str().to_string()),
                Rule::analysis => {
                    for morpheme in pair.into_inner() {
                        morphemes.push(build_morpheme(morpheme)?);
                    }
                }
                _ => {}
            }
        }

        let surface = surface.unwrap_or_else(|| morphemes.iter().map(|m| m.text.as_str()).collect());
        Ok(TaggedWord { surface, morphemes })
    }

    /// Appends the terminator to the last chunk when the input lacks one; annotated
    /// text must not go through surface-text punctuation cleanup.
    fn prepare(&self, input: &str) -> String {
        let text = input.trim();
        if text.is_empty() || text.ends_with(&format!("/{}", self.terminator_tag())) {
            return text.to_string();
        }
        format!("{text}+{}", self.terminator)
    }
}

fn build_morpheme(pair: Pair<Rule>) -> Result<Morpheme, TaggerError> {
    let position = pair.as_span().start();
    let mut inner = pair.into_inner();
    match (inner.next(), inner.next()) {
        (Some(text), Some(tag)) => Ok(Morpheme::new(text.as_str(), tag.as_str())),
        _ => Err(TaggerError::new("morpheme without tag", position)),
    }
}

fn convert_parse_error(error: Error<Rule>) -> TaggerError {
    let position = match error.location {
        pest::error::InputLocation::Pos(pos) => pos,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    TaggerError::new("expected `morpheme/TAG` annotations joined by `+`", position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_and_analysis() {
        let word = AnnotatedTagger::new()
            .tag_word("먹었다=먹/VV+었/EP+다/EF")
            .unwrap();
        assert_eq!(word.surface, "먹었다");
        assert_eq!(
            word.morphemes,
            vec![
                Morpheme::new("먹", "VV"),
                Morpheme::new("었", "EP"),
                Morpheme::new("다", "EF"),
            ]
        );
    }

    #[test]
    fn surface_defaults_to_morphemes() {
        let word = AnnotatedTagger::new().tag_word("학생/NNG+이/JKS").unwrap();
        assert_eq!(word.surface, "학생이");
        assert_eq!(word.morphemes.len(), 2);
    }

    #[test]
    fn punctuation_morphemes() {
        let word = AnnotatedTagger::new().tag_word("가/VV+다/EF+./SF").unwrap();
        assert_eq!(word.morphemes[2], Morpheme::new(".", "SF"));
        let word = AnnotatedTagger::new().tag_word("+/SW").unwrap();
        assert_eq!(word.morphemes, vec![Morpheme::new("+", "SW")]);
    }

    #[test]
    fn rejects_untagged_chunk() {
        let err = AnnotatedTagger::new().tag_word("학생이").unwrap_err();
        assert!(err.message.contains("morpheme/TAG"));
    }

    #[test]
    fn appends_terminator_once() {
        let tagger = AnnotatedTagger::new();
        assert_eq!(tagger.prepare("가/VV+다/EF "), "가/VV+다/EF+./SF");
        assert_eq!(tagger.prepare("가/VV+다/EF+?/SF"), "가/VV+다/EF+?/SF");
    }
}

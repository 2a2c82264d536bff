//! Tag canonicalization and sentence splitting.
//!
//! Tagger output arrives word by word for a whole utterance. [`TagNormalizer`] maps
//! every raw tag through the canonicalization table, regroups morphemes under the word
//! they came from and cuts the stream into sentences at each sentence-final
//! punctuation tag. The punctuation token itself stays in the sentence's token list
//! (the grammar needs it to close the sentence) but is left out of the word groups.

use serde::Serialize;
use tracing::debug;

use crate::config::Tables;
use crate::tagging::TaggedWord;

/// A morpheme with its tag, in parse order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub morpheme: String,
    pub tag: String,
    pub source_word: String,
}

impl Token {
    pub fn new(morpheme: impl Into<String>, tag: impl Into<String>, source_word: impl Into<String>) -> Self {
        Self {
            morpheme: morpheme.into(),
            tag: tag.into(),
            source_word: source_word.into(),
        }
    }
}

/// An input word and the morphemes it was analysed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordGroup {
    pub word: String,
    pub morphemes: Vec<String>,
}

/// One sentence's worth of tagger output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceTokens {
    /// Tokens with the tagger's own tags.
    pub raw: Vec<Token>,
    /// Tokens with canonical tags; this is what the grammar parses.
    pub tokens: Vec<Token>,
    pub groups: Vec<WordGroup>,
}

impl SentenceTokens {
    fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.groups.is_empty()
    }
}

pub struct TagNormalizer<'t> {
    tables: &'t Tables,
}

impl<'t> TagNormalizer<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Self { tables }
    }

    pub fn normalize(&self, words: &[TaggedWord]) -> Vec<SentenceTokens> {
        let mut sentences = Vec::new();
        let mut current = SentenceTokens::default();

        for word in words {
            let morphemes: Vec<String> = word
                .morphemes
                .iter()
                .filter(|m| !self.tables.is_sentence_final(&m.tag))
                .map(|m| m.text.trim().to_string())
                .collect();
            // A word belongs to the sentence it starts in.
            if !morphemes.is_empty() {
                current.groups.push(WordGroup {
                    word: word.surface.clone(),
                    morphemes,
                });
            }

            for morpheme in &word.morphemes {
                let text = morpheme.text.trim();
                let canonical = self.tables.canonical_tag(&morpheme.tag);
                current.raw.push(Token::new(text, morpheme.tag.as_str(), word.surface.as_str()));
                current.tokens.push(Token::new(text, canonical, word.surface.as_str()));

                if self.tables.is_sentence_final(&morpheme.tag) {
                    debug!(
                        tokens = current.tokens.len(),
                        words = current.groups.len(),
                        "sentence boundary"
                    );
                    sentences.push(std::mem::take(&mut current));
                }
            }
        }

        if !current.is_empty() {
            sentences.push(current);
        }
        sentences
    }
}

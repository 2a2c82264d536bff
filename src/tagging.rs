//! Boundary with the morphological tagger.
//!
//! The tagger itself is an external collaborator: it receives one whitespace-delimited
//! chunk of the input and answers with the chunk's morphemes and their part-of-speech
//! tags, in surface order. [`AnnotatedTagger`] is the in-tree implementation; it reads
//! text that has already been analysed (`먹었다=먹/VV+었/EP+다/EF`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::errors::{SentreeError, TaggerError};

mod annotated;

pub use annotated::AnnotatedTagger;

/// One tagged morpheme as produced by the tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Morpheme {
    pub text: String,
    pub tag: String,
}

impl Morpheme {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
        }
    }
}

/// A whitespace-delimited input word and its analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedWord {
    pub surface: String,
    pub morphemes: Vec<Morpheme>,
}

pub trait Tagger: Sync {
    /// Analyses one whitespace-free chunk of input.
    fn tag_word(&self, chunk: &str) -> Result<TaggedWord, TaggerError>;

    /// Cleans raw input before it is split into chunks.
    fn prepare(&self, input: &str) -> String {
        prepare_surface_text(input)
    }

    /// Splits prepared input into chunks and tags each one.
    fn tag_text(&self, input: &str) -> Result<Vec<TaggedWord>, SentreeError> {
        self.prepare(input)
            .split_whitespace()
            .map(|chunk| {
                self.tag_word(chunk).map_err(|source| SentreeError::Tagging {
                    chunk: chunk.to_string(),
                    source,
                })
            })
            .collect()
    }
}

static PUNCTUATION_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.?;,:!])").unwrap());

/// Normalizes plain text for a tagger: trims it, guarantees sentence-final punctuation
/// and removes whitespace before clause punctuation, which taggers mis-analyse.
pub fn prepare_surface_text(input: &str) -> String {
    let mut text = input.trim().to_string();
    if !text.is_empty() && !text.ends_with(['.', '?', '!']) {
        text.push('.');
    }
    PUNCTUATION_GAP.replace_all(&text, "$1").into_owned()
}

//! Shared helpers for the integration tests.
#![allow(dead_code)]

use sentree::definitions::Translator;
use sentree::errors::DefinitionError;
use sentree::normalize::Token;

/// Builds tokens from `morpheme/TAG` pairs separated by spaces.
pub fn tokens(annotated: &str) -> Vec<Token> {
    annotated
        .split_whitespace()
        .map(|pair| {
            let (morpheme, tag) = pair.rsplit_once('/').expect("pair must be `morpheme/TAG`");
            Token::new(morpheme, tag, morpheme)
        })
        .collect()
}

/// A translator that always returns the same text.
pub struct FixedTranslator(pub &'static str);

impl Translator for FixedTranslator {
    fn translate(&self, _text: &str) -> Result<String, DefinitionError> {
        Ok(self.0.to_string())
    }
}

/// A translator that can never be reached.
pub struct DownTranslator;

impl Translator for DownTranslator {
    fn translate(&self, _text: &str) -> Result<String, DefinitionError> {
        Err(DefinitionError::Transport("connection refused".to_string()))
    }
}

//! Sentree error handling.
//!
//! Failures fall into three scopes:
//!
//! - [`SentreeError`] is request-fatal: nothing is parsed and the response is `FAIL`.
//! - [`ParseFailure`] is scoped to one sentence and travels inside that sentence's result.
//! - [`DefinitionError`] never leaves the definition lookup; it degrades to an empty mapping.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Serialize;
use thiserror::Error;

use crate::normalize::Token;

// ============================================================================
// REQUEST-FATAL ERRORS
// ============================================================================

/// Errors that abort a whole request before any sentence is parsed.
#[derive(Debug, Error)]
pub enum SentreeError {
    #[error("Missing input sentence(s)")]
    MissingInput,

    #[error("tagger rejected `{chunk}`")]
    Tagging {
        chunk: String,
        #[source]
        source: TaggerError,
    },

    #[error("invalid tables file `{path}`: {message}")]
    Config { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A morphological tagger could not analyse a chunk of input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (at byte {position})")]
pub struct TaggerError {
    pub message: String,
    pub position: usize,
}

impl TaggerError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

// ============================================================================
// SENTENCE-LOCAL PARSE FAILURES
// ============================================================================

/// The token the grammar could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingToken {
    pub morpheme: String,
    pub tag: String,
    pub position: usize,
}

/// Tag reported when the grammar runs out of tokens.
pub const END_OF_INPUT: &str = "EOS";

impl BlockingToken {
    pub fn at(token: &Token, position: usize) -> Self {
        Self {
            morpheme: token.morpheme.clone(),
            tag: token.tag.clone(),
            position,
        }
    }

    pub fn end_of_input(position: usize) -> Self {
        Self {
            morpheme: String::new(),
            tag: END_OF_INPUT.to_string(),
            position,
        }
    }

    pub fn is_end_of_input(&self) -> bool {
        self.tag == END_OF_INPUT
    }
}

/// A sentence the grammar does not recognise.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unexpected `{}/{}` at token {}, expected {expected}", .token.morpheme, .token.tag, .token.position)]
pub struct ParseFailure {
    pub token: BlockingToken,
    pub expected: String,
}

impl ParseFailure {
    /// Builds a renderable diagnostic over the sentence's tag-annotated token list.
    pub fn to_diagnostic(&self, tokens: &[Token]) -> ParseDiagnostic {
        let mut rendered = String::new();
        let mut span = None;
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                rendered.push(' ');
            }
            let start = rendered.len();
            rendered.push_str(&token.morpheme);
            rendered.push('/');
            rendered.push_str(&token.tag);
            if i == self.token.position {
                span = Some((start, rendered.len() - start));
            }
        }
        // Past the last token: point just after the rendered text.
        let span = span.unwrap_or((rendered.len(), 0));

        ParseDiagnostic {
            src: NamedSource::new("sentence", rendered),
            span: span.into(),
            message: self.to_string(),
            help: Some(format!("the grammar expected {} here", self.expected)),
        }
    }
}

/// Miette view of a [`ParseFailure`], used by the command-line front end.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(sentree::parse))]
pub struct ParseDiagnostic {
    #[source_code]
    pub src: NamedSource<String>,
    #[label("this token does not fit the grammar here")]
    pub span: SourceSpan,
    pub message: String,
    #[help]
    pub help: Option<String>,
}

// ============================================================================
// DEFINITION LOOKUP FAILURES
// ============================================================================

/// Reasons the external translator produced no usable definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("translator request failed: {0}")]
    Transport(String),

    #[error("translator returned HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("ill-formed translator response: {0}")]
    Payload(String),

    #[error("translator returned {got} lines for {expected} words")]
    CountMismatch { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(morpheme: &str, tag: &str) -> Token {
        Token {
            morpheme: morpheme.to_string(),
            tag: tag.to_string(),
            source_word: morpheme.to_string(),
        }
    }

    #[test]
    fn diagnostic_points_at_blocking_token() {
        let tokens = vec![token("나", "NP"), token("는", "JX"), token("☆", "NA")];
        let failure = ParseFailure {
            token: BlockingToken::at(&tokens[2], 2),
            expected: "a predicate".to_string(),
        };
        let diagnostic = failure.to_diagnostic(&tokens);
        // "나/NP 는/JX " is 6 + 1 + 6 + 1 bytes ("나" and "는" are three bytes each).
        assert_eq!(diagnostic.span.offset(), 14);
        assert_eq!(diagnostic.span.len(), "☆/NA".len());
    }

    #[test]
    fn diagnostic_past_end_has_empty_span() {
        let tokens = vec![token("가", "VV")];
        let failure = ParseFailure {
            token: BlockingToken::end_of_input(1),
            expected: "a verb ending".to_string(),
        };
        let diagnostic = failure.to_diagnostic(&tokens);
        assert_eq!(diagnostic.span.offset(), "가/VV".len());
        assert_eq!(diagnostic.span.len(), 0);
        assert!(failure.token.is_end_of_input());
    }
}

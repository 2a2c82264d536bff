//! English glosses for content words.
//!
//! [`DefinitionAugmenter`] picks the nouns, verbs and adverbs out of a sentence and
//! sends them to a [`Translator`] in one newline-joined batch. The reply must come back
//! with exactly one line per word. Any failure leaves the sentence without definitions;
//! it never fails the parse.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{Tables, TranslatorSettings};
use crate::errors::DefinitionError;
use crate::normalize::Token;

/// Surface word to definition.
pub type Definitions = BTreeMap<String, String>;

/// A machine-translation backend.
pub trait Translator: Sync {
    /// Translates `text` as-is; line structure must be preserved.
    fn translate(&self, text: &str) -> Result<String, DefinitionError>;
}

// ============================================================================
// PAPAGO CLIENT
// ============================================================================

/// Naver Papago NMT over HTTPS, single attempt, bounded by the configured timeout.
pub struct PapagoTranslator {
    agent: ureq::Agent,
    settings: TranslatorSettings,
}

#[derive(Deserialize)]
struct PapagoReply {
    message: PapagoMessage,
}

#[derive(Deserialize)]
struct PapagoMessage {
    result: PapagoResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PapagoResult {
    translated_text: String,
}

impl PapagoTranslator {
    pub fn new(settings: TranslatorSettings) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(settings.timeout).build();
        Self { agent, settings }
    }
}

impl Translator for PapagoTranslator {
    fn translate(&self, text: &str) -> Result<String, DefinitionError> {
        let response = self
            .agent
            .post(&self.settings.endpoint)
            .set("X-Naver-Client-Id", &self.settings.client_id)
            .set("X-Naver-Client-Secret", &self.settings.client_secret)
            .send_form(&[
                ("source", self.settings.source_lang.as_str()),
                ("target", self.settings.target_lang.as_str()),
                ("text", text),
            ])
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => DefinitionError::Status {
                    status,
                    reason: response.status_text().to_string(),
                },
                ureq::Error::Transport(transport) => DefinitionError::Transport(transport.to_string()),
            })?;

        let body = response
            .into_string()
            .map_err(|err| DefinitionError::Payload(err.to_string()))?;
        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<String, DefinitionError> {
    let reply: PapagoReply =
        serde_json::from_str(body).map_err(|err| DefinitionError::Payload(err.to_string()))?;
    let text = reply.message.result.translated_text;
    if text.is_empty() {
        return Err(DefinitionError::Payload("empty translatedText".to_string()));
    }
    Ok(text)
}

// ============================================================================
// AUGMENTER
// ============================================================================

pub struct DefinitionAugmenter<'a> {
    tables: &'a Tables,
    translator: &'a dyn Translator,
}

impl<'a> DefinitionAugmenter<'a> {
    pub fn new(tables: &'a Tables, translator: &'a dyn Translator) -> Self {
        Self { tables, translator }
    }

    /// Definitions for the sentence's content words; empty on any lookup failure.
    pub fn lookup(&self, tokens: &[Token]) -> Definitions {
        match self.try_lookup(tokens) {
            Ok(definitions) => definitions,
            Err(err) => {
                warn!(error = %err, "definition lookup failed; continuing without definitions");
                Definitions::new()
            }
        }
    }

    pub fn try_lookup(&self, tokens: &[Token]) -> Result<Definitions, DefinitionError> {
        let (words, queries): (Vec<&str>, Vec<String>) = tokens
            .iter()
            .filter(|t| self.tables.is_content_word(&t.tag))
            .map(|t| (t.morpheme.as_str(), self.citation_form(t)))
            .unzip();
        if words.is_empty() {
            return Ok(Definitions::new());
        }

        debug!(words = words.len(), "requesting definitions");
        let reply = self.translator.translate(&queries.join("\n"))?;
        let lines: Vec<&str> = reply.lines().collect();
        if lines.len() != words.len() {
            return Err(DefinitionError::CountMismatch {
                expected: words.len(),
                got: lines.len(),
            });
        }

        Ok(words
            .into_iter()
            .zip(lines)
            .map(|(word, line)| (word.to_string(), clean_definition(line)))
            .collect())
    }

    fn citation_form(&self, token: &Token) -> String {
        if self.tables.is_verb_class(&token.tag) {
            format!("{}{}", token.morpheme, self.tables.citation_suffix)
        } else {
            token.morpheme.clone()
        }
    }
}

fn clean_definition(line: &str) -> String {
    line.trim().trim_end_matches('.').trim_end().to_lowercase()
}

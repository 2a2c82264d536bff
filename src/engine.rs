use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::Tables,
    definitions::{DefinitionAugmenter, Definitions, Translator},
    errors::{BlockingToken, ParseFailure, SentreeError},
    normalize::{SentenceTokens, TagNormalizer, Token, WordGroup},
    phrases::{collect_references, extract_phrases, Phrase, ReferenceHit},
    syntax,
    tagging::Tagger,
    tree::{NodeId, RenderTree, TreeBuilder},
};

/// Message attached to a sentence the grammar could not parse.
pub const PARSE_FAILED_MSG: &str = "Sorry, failed to parse sentence";

// ============================================================================
// OPTIONS AND RESPONSE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep single-child branches in the render tree.
    pub show_all_levels: bool,
    /// Look up definitions for content words. No external call is made when false.
    pub definitions: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            show_all_levels: false,
            definitions: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Fail,
}

/// Outcome of one request.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub result: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    pub sentences: Vec<SentenceResult>,
}

impl Response {
    pub fn ok(sentences: Vec<SentenceResult>) -> Self {
        Self {
            result: Status::Ok,
            msg: None,
            sentences,
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            result: Status::Fail,
            msg: Some(msg.into()),
            sentences: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == Status::Ok
    }
}

/// Everything known about one sentence. Exactly one of `parse_tree` and `error` is set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceResult {
    pub pos_list: Vec<Token>,
    pub mapped_pos_list: Vec<Token>,
    pub morpheme_groups: Vec<WordGroup>,
    pub parse_tree: Option<RenderTree>,
    pub terminals: Vec<NodeId>,
    pub height: i32,
    pub phrases: Vec<Phrase>,
    pub references: Vec<ReferenceHit>,
    pub definitions: Definitions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_token: Option<BlockingToken>,
    #[serde(skip)]
    pub failure: Option<ParseFailure>,
}

impl SentenceResult {
    fn new(tokens: SentenceTokens) -> Self {
        Self {
            pos_list: tokens.raw,
            mapped_pos_list: tokens.tokens,
            morpheme_groups: tokens.groups,
            parse_tree: None,
            terminals: Vec::new(),
            height: 0,
            phrases: Vec::new(),
            references: Vec::new(),
            definitions: Definitions::new(),
            error: None,
            last_token: None,
            failure: None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.parse_tree.is_some()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Runs the whole pipeline for a request: tag, normalize, then parse and render
/// every sentence independently.
pub struct Engine<'a> {
    tables: &'a Tables,
    tagger: &'a dyn Tagger,
    translator: Option<&'a dyn Translator>,
}

impl<'a> Engine<'a> {
    pub fn new(tables: &'a Tables, tagger: &'a dyn Tagger) -> Self {
        Self {
            tables,
            tagger,
            translator: None,
        }
    }

    pub fn with_translator(mut self, translator: &'a dyn Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Request-level entry point. Request-fatal errors become a `FAIL` response.
    pub fn parse_request(&self, input: Option<&str>, options: &ParseOptions) -> Response {
        let result = input
            .ok_or(SentreeError::MissingInput)
            .and_then(|text| self.parse_input(text, options));
        match result {
            Ok(sentences) => Response::ok(sentences),
            Err(err) => {
                warn!(error = %err, "request failed");
                Response::fail(err.to_string())
            }
        }
    }

    pub fn parse_input(&self, text: &str, options: &ParseOptions) -> Result<Vec<SentenceResult>, SentreeError> {
        if text.trim().is_empty() {
            return Err(SentreeError::MissingInput);
        }
        let words = self.tagger.tag_text(text)?;
        let sentences = TagNormalizer::new(self.tables).normalize(&words);
        info!(words = words.len(), sentences = sentences.len(), "tagged input");

        // Sentences share nothing but the read-only tables; collect keeps input order.
        Ok(sentences
            .into_par_iter()
            .map(|sentence| self.parse_sentence(sentence, options))
            .collect())
    }

    pub fn parse_sentence(&self, sentence: SentenceTokens, options: &ParseOptions) -> SentenceResult {
        debug!(
            raw = %render_tokens(&sentence.raw),
            mapped = %render_tokens(&sentence.tokens),
            "parsing sentence"
        );
        let parsed = syntax::parse(&sentence.tokens);
        let mut result = SentenceResult::new(sentence);

        let tree = match parsed {
            Ok(tree) => tree,
            Err(failure) => {
                warn!(
                    morpheme = %failure.token.morpheme,
                    tag = %failure.token.tag,
                    position = failure.token.position,
                    expected = %failure.expected,
                    "parse failed"
                );
                result.error = Some(PARSE_FAILED_MSG.to_string());
                result.last_token = Some(failure.token.clone());
                result.failure = Some(failure);
                return result;
            }
        };

        result.phrases = extract_phrases(&&tree, self.tables);
        result.references = collect_references(&&tree, self.tables);
        if let (true, Some(translator)) = (options.definitions, self.translator) {
            result.definitions = DefinitionAugmenter::new(self.tables, translator).lookup(&result.mapped_pos_list);
        }

        let built = TreeBuilder::new(self.tables)
            .show_all_levels(options.show_all_levels)
            .with_definitions(&result.definitions)
            .build(&tree);
        result.parse_tree = Some(built.tree);
        result.terminals = built.terminals;
        result.height = built.height;
        result
    }
}

/// `m/TAG m/TAG ...`, for logs.
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("{}/{}", t.morpheme, t.tag))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DefinitionError;
    use crate::tagging::AnnotatedTagger;

    struct Echo;

    impl Translator for Echo {
        fn translate(&self, text: &str) -> Result<String, DefinitionError> {
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn missing_and_blank_input_fail_the_request() {
        let tagger = AnnotatedTagger::new();
        let engine = Engine::new(Tables::builtin(), &tagger);
        let options = ParseOptions::default();

        let missing = engine.parse_request(None, &options);
        assert_eq!(missing.result, Status::Fail);
        assert_eq!(missing.msg.as_deref(), Some("Missing input sentence(s)"));

        let blank = engine.parse_request(Some("   "), &options);
        assert_eq!(blank.result, Status::Fail);
        assert!(blank.sentences.is_empty());
    }

    #[test]
    fn parses_one_sentence() {
        let tagger = AnnotatedTagger::new();
        let engine = Engine::new(Tables::builtin(), &tagger);
        let response = engine.parse_request(Some("나는=나/NP+는/JX 학생이다=학생/NNG+이/VCP+다/EF"), &ParseOptions::default());
        assert!(response.is_ok());
        assert_eq!(response.sentences.len(), 1);

        let sentence = &response.sentences[0];
        assert!(sentence.is_parsed());
        assert!(sentence.error.is_none());
        assert_eq!(sentence.terminals.len(), sentence.mapped_pos_list.len());
        assert_eq!(sentence.morpheme_groups.len(), 2);
        // No translator configured.
        assert!(sentence.definitions.is_empty());
    }

    #[test]
    fn definitions_reach_the_leaves() {
        let tagger = AnnotatedTagger::new();
        let translator = Echo;
        let engine = Engine::new(Tables::builtin(), &tagger).with_translator(&translator);
        let response = engine.parse_request(Some("빵을=빵/NNG+을/JKO 먹었다=먹/VV+었/EP+다/EF"), &ParseOptions::default());
        let sentence = &response.sentences[0];
        assert_eq!(sentence.definitions.get("먹").map(String::as_str), Some("먹다"));

        let tree = sentence.parse_tree.as_ref().unwrap();
        let leaf = tree.leaves().find(|n| n.word.as_deref() == Some("빵")).unwrap();
        assert_eq!(leaf.definition.as_deref(), Some("빵"));
    }

    #[test]
    fn definitions_can_be_switched_off() {
        let tagger = AnnotatedTagger::new();
        let translator = Echo;
        let engine = Engine::new(Tables::builtin(), &tagger).with_translator(&translator);
        let options = ParseOptions {
            definitions: false,
            ..ParseOptions::default()
        };
        let response = engine.parse_request(Some("가=가/VV+아/EF"), &options);
        assert!(response.sentences[0].definitions.is_empty());
    }

    #[test]
    fn tagger_error_fails_the_request() {
        let tagger = AnnotatedTagger::new();
        let engine = Engine::new(Tables::builtin(), &tagger);
        let response = engine.parse_request(Some("빵 가/VV+아/EF"), &ParseOptions::default());
        assert_eq!(response.result, Status::Fail);
        assert!(response.msg.unwrap().contains("`빵`"));
    }
}

//! Read-only configuration tables.
//!
//! [`Tables`] bundles the tag canonicalization map and every label dictionary the
//! pipeline consults. A built-in copy is parsed once per process; callers may load a
//! replacement file at start-up. Either way the value is shared by reference and never
//! mutated afterwards, so any number of sentences can read it concurrently.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::SentreeError;

const BUILTIN_TABLES: &str = include_str!("config/tables.yaml");

static BUILTIN: Lazy<Tables> = Lazy::new(|| {
    // The embedded file is covered by tests; a failure here is a build defect.
    serde_yaml::from_str(BUILTIN_TABLES).unwrap_or_else(|e| panic!("built-in tables: {e}"))
});

// ============================================================================
// LOOKUP TABLES
// ============================================================================

/// A reference note attached to phrase or word nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tables {
    /// Raw tag marking the end of a sentence.
    pub sentence_final_tag: String,
    /// Raw tagger tag -> canonical grammar tag. Absent tags pass through.
    #[serde(default)]
    pub tag_map: BTreeMap<String, String>,
    #[serde(default)]
    pub pos_labels: HashMap<String, String>,
    /// Keyed `"word:tag"`; wins over `pos_labels`.
    #[serde(default)]
    pub word_labels: HashMap<String, String>,
    #[serde(default)]
    pub phrase_labels: HashMap<String, String>,
    #[serde(default)]
    pub references: HashMap<String, Reference>,
    #[serde(default)]
    pub content_classes: Vec<String>,
    pub verb_class: String,
    pub citation_suffix: String,
}

impl Tables {
    /// The process-wide built-in tables.
    pub fn builtin() -> &'static Tables {
        &BUILTIN
    }

    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    pub fn from_path(path: &Path) -> Result<Self, SentreeError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source).map_err(|e| SentreeError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn canonical_tag<'a>(&'a self, raw: &'a str) -> &'a str {
        self.tag_map.get(raw).map_or(raw, String::as_str)
    }

    pub fn is_sentence_final(&self, raw_tag: &str) -> bool {
        raw_tag == self.sentence_final_tag
    }

    /// Display lines for a terminal: exact `(word, tag)` entry first, then the tag's
    /// generic label, then the bare tag.
    pub fn leaf_label(&self, word: &str, tag: &str) -> Vec<String> {
        let label = self
            .word_labels
            .get(&word_key(word, tag))
            .or_else(|| self.pos_labels.get(tag))
            .map_or(tag, String::as_str);
        label.split('\n').map(str::to_string).collect()
    }

    pub fn phrase_label(&self, tag: &str) -> Option<&str> {
        self.phrase_labels.get(tag).map(String::as_str)
    }

    pub fn reference(&self, key: &str) -> Option<&Reference> {
        self.references.get(key)
    }

    pub fn is_content_word(&self, tag: &str) -> bool {
        self.content_classes
            .iter()
            .any(|class| tag.starts_with(class.as_str()))
    }

    pub fn is_verb_class(&self, tag: &str) -> bool {
        tag.starts_with(self.verb_class.as_str())
    }
}

/// Key used by the `"word:tag"` tables.
pub fn word_key(word: &str, tag: &str) -> String {
    format!("{word}:{tag}")
}

// ============================================================================
// TRANSLATOR SETTINGS
// ============================================================================

pub const TRANSLATOR_ID_VAR: &str = "SENTREE_TRANSLATOR_ID";
pub const TRANSLATOR_SECRET_VAR: &str = "SENTREE_TRANSLATOR_SECRET";
pub const TRANSLATOR_URL_VAR: &str = "SENTREE_TRANSLATOR_URL";

const DEFAULT_ENDPOINT: &str = "https://openapi.naver.com/v1/papago/n2mt";

/// Connection settings for the machine-translation service used for definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorSettings {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub source_lang: String,
    pub target_lang: String,
    pub timeout: Duration,
}

impl TranslatorSettings {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            source_lang: "ko".to_string(),
            target_lang: "en".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Reads credentials from the environment; `None` when they are not configured.
    pub fn from_env() -> Option<Self> {
        let id = std::env::var(TRANSLATOR_ID_VAR).ok()?;
        let secret = std::env::var(TRANSLATOR_SECRET_VAR).ok()?;
        let mut settings = Self::new(id, secret);
        if let Ok(url) = std::env::var(TRANSLATOR_URL_VAR) {
            settings.endpoint = url;
        }
        Some(settings)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

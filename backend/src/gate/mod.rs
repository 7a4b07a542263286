//! Topic Gate
//!
//! Decides whether an inbound question falls inside the help desk's scope.
//!
//! The allow-list is a curated set of literal phrases grouped by category.
//! All phrases are compiled into a single case-insensitive alternation, and a
//! message is in scope when it contains any phrase as a substring. There are
//! no word-boundary checks: `"reservation"` only matches when that exact
//! phrase is configured, and a short phrase matches inside longer words.
//!
//! # Flow
//! ```text
//! user text ──► AllowList::is_allowed ──► true  ──► forwarded to the model
//!                                     └─► false ──► refusal::select_refusal
//! ```

pub mod refusal;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub use refusal::{REFUSAL_EN, REFUSAL_MR, RefusalLanguage, contains_devanagari, select_refusal};

/// Startup failures while loading the allow-list or the policy preamble.
///
/// Every variant is fatal: the process must not serve requests with a gate
/// that silently accepts or rejects everything.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed allow-list document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Empty phrase in allow-list category '{category}' at position {index}")]
    EmptyPhrase { category: String, index: usize },

    #[error("Allow-list contains no phrases")]
    NoPhrases,

    #[error("Failed to compile allow-list rule: {0}")]
    Compile(#[from] regex::Error),
}

impl ConfigurationError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(), source }
    }
}

/// Permitted phrases grouped by category.
///
/// Category names carry no meaning for matching. Categories are kept sorted
/// so that the compiled rule is identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PhraseSet {
    categories: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct AllowPatternDocument {
    #[serde(rename = "ALLOW_PATTERN")]
    allow_pattern: PhraseSet,
}

impl PhraseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a category
    pub fn with_category<I, S>(mut self, name: impl Into<String>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(name.into(), phrases.into_iter().map(Into::into).collect());
        self
    }

    /// Parse `{ "ALLOW_PATTERN": { category: [phrase, ...] } }`
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let doc: AllowPatternDocument = serde_json::from_str(json)?;
        Ok(doc.allow_pattern)
    }

    /// Read and parse the allow-list document at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigurationError::io(path, e))?;
        Self::from_json(&content)
    }

    /// All phrases, categories in sorted order, phrases in listed order
    pub fn iter_phrases(&self) -> impl Iterator<Item = &str> {
        self.categories.values().flatten().map(String::as_str)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total number of phrases across all categories
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        for (category, phrases) in &self.categories {
            if let Some(index) = phrases.iter().position(String::is_empty) {
                return Err(ConfigurationError::EmptyPhrase { category: category.clone(), index });
            }
        }
        if self.is_empty() {
            return Err(ConfigurationError::NoPhrases);
        }
        Ok(())
    }
}

/// Compiled allow-list rule.
///
/// Built once at startup and shared read-only (usually behind an `Arc`).
#[derive(Debug, Clone)]
pub struct AllowList {
    rule: Regex,
    phrases: Vec<String>,
}

impl AllowList {
    /// Flatten, escape and compile every phrase into one alternation
    pub fn build(set: &PhraseSet) -> Result<Self, ConfigurationError> {
        set.validate()?;

        let phrases: Vec<String> = set.iter_phrases().map(str::to_owned).collect();
        let alternation = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");

        let rule = RegexBuilder::new(&format!("({})", alternation))
            .case_insensitive(true)
            .build()?;

        tracing::debug!(
            "Compiled allow-list: {} phrases in {} categories",
            phrases.len(),
            set.category_count()
        );

        Ok(Self { rule, phrases })
    }

    /// Load the document at `path` and compile it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let set = PhraseSet::load(path)?;
        Self::build(&set)
    }

    /// True iff `text` contains any configured phrase, ignoring case
    pub fn is_allowed(&self, text: &str) -> bool {
        self.rule.is_match(text)
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn single(phrase: &str) -> AllowList {
        AllowList::build(&PhraseSet::new().with_category("topic", [phrase])).unwrap()
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let gate = single("Maratha reservation");
        assert!(gate.is_allowed("What is Maratha Reservation?"));
        assert!(gate.is_allowed("MARATHA RESERVATION"));
        assert!(gate.is_allowed("tell me about maratha reservationss"));
        assert!(!gate.is_allowed("What is Maratha quota?"));
    }

    #[test]
    fn test_devanagari_question_without_english_phrase_is_rejected() {
        let gate = single("Maratha reservation");
        assert!(!gate.is_allowed("मराठा आरक्षण काय आहे?"));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let gate = single("Maratha reservation");
        assert!(!gate.is_allowed(""));
    }

    #[test]
    fn test_matching_is_literal_not_topical() {
        // Related words do not match unless configured verbatim
        let gate = single("Maratha reservation");
        assert!(!gate.is_allowed("मराठा reservation"));

        let gate = single("reservation");
        assert!(gate.is_allowed("मराठा reservation"));
    }

    #[test]
    fn test_no_word_boundaries() {
        let gate = single("OBC");
        assert!(gate.is_allowed("the mobcast"));
    }

    #[test]
    fn test_regex_meta_characters_are_literal() {
        let gate = single("OBC (non-creamy)");
        assert!(gate.is_allowed("Am I OBC (Non-Creamy) layer?"));
        assert!(!gate.is_allowed("OBC non-creamy"));

        let gate = single("a.b");
        assert!(gate.is_allowed("a.b"));
        assert!(!gate.is_allowed("axb"));

        let gate = single("$10+ fee?");
        assert!(gate.is_allowed("is it $10+ fee?"));
    }

    #[test]
    fn test_any_category_matches() {
        let set = PhraseSet::new()
            .with_category("reservation", ["Maratha reservation", "Kunbi certificate"])
            .with_category("obc", ["OBC quota"]);
        let gate = AllowList::build(&set).unwrap();
        assert_eq!(gate.phrase_count(), 3);
        assert!(gate.is_allowed("how to get a kunbi certificate"));
        assert!(gate.is_allowed("obc quota share"));
        assert!(!gate.is_allowed("cricket score"));
    }

    #[test]
    fn test_pattern_is_deterministic() {
        let a = PhraseSet::new()
            .with_category("b", ["two"])
            .with_category("a", ["one"]);
        let b = PhraseSet::new()
            .with_category("a", ["one"])
            .with_category("b", ["two"]);
        let gate_a = AllowList::build(&a).unwrap();
        let gate_b = AllowList::build(&b).unwrap();
        assert_eq!(gate_a.rule.as_str(), "(one|two)");
        assert_eq!(gate_a.rule.as_str(), gate_b.rule.as_str());
        assert_eq!(gate_a.phrases(), ["one", "two"]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "ALLOW_PATTERN": {
                "reservation": ["Maratha reservation", "आरक्षण"],
                "people": ["Jarange"]
            }
        }"#;
        let set = PhraseSet::from_json(json).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.category_count(), 2);

        let gate = AllowList::build(&set).unwrap();
        assert!(gate.is_allowed("मराठा आरक्षण काय आहे?"));
        assert!(gate.is_allowed("who is jarange"));
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let err = PhraseSet::from_json(r#"{"phrases": {"a": ["x"]}}"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::Malformed(_)));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        for json in [
            r#"{"ALLOW_PATTERN": ["x"]}"#,
            r#"{"ALLOW_PATTERN": {"a": "x"}}"#,
            r#"{"ALLOW_PATTERN": {"a": [1, 2]}}"#,
            r#"{"ALLOW_PATTERN": null}"#,
            "not json",
            "",
        ] {
            let err = PhraseSet::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigurationError::Malformed(_)), "{json}");
        }
    }

    #[test]
    fn test_zero_phrases_is_rejected() {
        let err = AllowList::build(&PhraseSet::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::NoPhrases));

        let set = PhraseSet::from_json(r#"{"ALLOW_PATTERN": {}}"#).unwrap();
        assert!(matches!(AllowList::build(&set), Err(ConfigurationError::NoPhrases)));

        let set = PhraseSet::from_json(r#"{"ALLOW_PATTERN": {"a": [], "b": []}}"#).unwrap();
        assert!(matches!(AllowList::build(&set), Err(ConfigurationError::NoPhrases)));
    }

    #[test]
    fn test_empty_phrase_is_rejected() {
        let set = PhraseSet::new().with_category("obc", ["OBC", ""]);
        match AllowList::build(&set) {
            Err(ConfigurationError::EmptyPhrase { category, index }) => {
                assert_eq!(category, "obc");
                assert_eq!(index, 1);
            },
            other => panic!("expected EmptyPhrase, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ALLOW_PATTERN.json");
        fs::write(&path, r#"{"ALLOW_PATTERN": {"a": ["Maratha reservation"]}}"#).unwrap();

        let gate = AllowList::from_file(&path).unwrap();
        assert!(gate.is_allowed("maratha reservation status"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AllowList::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigurationError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    fn flip_case(s: &str, mask: &[bool]) -> String {
        s.chars()
            .zip(mask.iter().cycle())
            .map(|(c, &up)| if up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_allowed_iff_contains_phrase(
            phrases in prop::collection::vec("[a-zA-Z .*+?()|$^\\[\\]]{1,6}", 1..5),
            text in "[a-zA-Z .*+?()|$^\\[\\]]{0,40}",
        ) {
            let gate = AllowList::build(&PhraseSet::new().with_category("p", phrases.clone())).unwrap();
            let lowered = text.to_ascii_lowercase();
            let expected = phrases.iter().any(|p| lowered.contains(&p.to_ascii_lowercase()));
            prop_assert_eq!(gate.is_allowed(&text), expected);
            // Pure: a second call agrees
            prop_assert_eq!(gate.is_allowed(&text), expected);
        }

        #[test]
        fn prop_embedded_phrase_is_allowed(
            phrase in "[a-zA-Z .*+?()]{1,12}",
            prefix in "\\PC{0,10}",
            suffix in "\\PC{0,10}",
            mask in prop::collection::vec(any::<bool>(), 1..8),
        ) {
            let gate = AllowList::build(&PhraseSet::new().with_category("p", [phrase.clone()])).unwrap();
            let text = format!("{}{}{}", prefix, flip_case(&phrase, &mask), suffix);
            prop_assert!(gate.is_allowed(&text));
        }
    }
}

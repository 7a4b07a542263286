//! Refusal selection for out-of-scope questions.
//!
//! Only one script is distinguished: a message containing at least one
//! Devanagari code point is answered in Marathi, everything else in English.
//! Position and proportion of the Devanagari characters do not matter.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use utoipa::ToSchema;

pub const REFUSAL_EN: &str = "I can only help with Maratha reservation and OBC-related questions in India. Please rephrase your question within that scope.";

pub const REFUSAL_MR: &str = "मी फक्त मराठा आरक्षण आणि ओबीसी-संबंधित प्रश्नांवरच मदत करू शकतो/शकते. कृपया तुमचा प्रश्न त्या चौकटीत पुन्हा विचारा.";

/// Unicode Devanagari block
const DEVANAGARI: RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Language a refusal is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RefusalLanguage {
    #[serde(rename = "mr")]
    Marathi,
    #[serde(rename = "en")]
    English,
}

impl RefusalLanguage {
    pub fn detect(text: &str) -> Self {
        if contains_devanagari(text) { Self::Marathi } else { Self::English }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Marathi => REFUSAL_MR,
            Self::English => REFUSAL_EN,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Marathi => "mr",
            Self::English => "en",
        }
    }
}

pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(|c| DEVANAGARI.contains(&c))
}

/// Pick the refusal matching the script of `text`
pub fn select_refusal(text: &str) -> &'static str {
    RefusalLanguage::detect(text).message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_marathi_text() {
        assert_eq!(select_refusal("मराठा आरक्षण काय आहे?"), REFUSAL_MR);
    }

    #[test]
    fn test_english_text() {
        assert_eq!(select_refusal("What is Maratha reservation?"), REFUSAL_EN);
    }

    #[test]
    fn test_mixed_text() {
        assert_eq!(select_refusal("मराठा reservation"), REFUSAL_MR);
        // A single trailing Devanagari sign is enough
        assert_eq!(select_refusal("a long English sentence with one danda ।"), REFUSAL_MR);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(select_refusal(""), REFUSAL_EN);
        assert_eq!(RefusalLanguage::detect(""), RefusalLanguage::English);
    }

    #[test]
    fn test_block_boundaries() {
        assert!(contains_devanagari("\u{0900}"));
        assert!(contains_devanagari("\u{097F}"));
        assert!(!contains_devanagari("\u{08FF}"));
        // Bengali sits right after the Devanagari block
        assert!(!contains_devanagari("\u{0980}"));
        assert!(!contains_devanagari("বাংলা"));
    }

    #[test]
    fn test_other_scripts_fall_back_to_english() {
        assert_eq!(select_refusal("مرحبا"), REFUSAL_EN);
        assert_eq!(select_refusal("你好"), REFUSAL_EN);
        assert_eq!(select_refusal("ગુજરાતી"), REFUSAL_EN);
    }

    #[test]
    fn test_language_serialization() {
        assert_eq!(serde_json::to_string(&RefusalLanguage::Marathi).unwrap(), "\"mr\"");
        assert_eq!(serde_json::to_string(&RefusalLanguage::English).unwrap(), "\"en\"");
        assert_eq!(RefusalLanguage::Marathi.code(), "mr");
    }

    proptest! {
        #[test]
        fn prop_any_devanagari_selects_marathi(
            before in "\\PC{0,20}",
            after in "\\PC{0,20}",
            c in proptest::char::range('\u{0900}', '\u{097F}'),
        ) {
            let text = format!("{}{}{}", before, c, after);
            prop_assert_eq!(select_refusal(&text), REFUSAL_MR);
        }

        #[test]
        fn prop_no_devanagari_selects_english(text in "[^\u{0900}-\u{097F}]{0,40}") {
            prop_assert_eq!(select_refusal(&text), REFUSAL_EN);
            prop_assert_eq!(select_refusal(&text), select_refusal(&text));
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Languages the assistant can answer in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Marathi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
        }
    }

    /// Exact-match lookup on the tag sent by clients.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.as_str() == tag)
    }

    /// Like [`Language::from_tag`], but unsupported tags fall back to `default`.
    pub fn resolve(tag: &str, default: Language) -> Self {
        Self::from_tag(tag).unwrap_or(default)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the assistant needs to know about one language.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageProfile {
    pub template: String,
    pub detailed_triggers: Vec<String>,
    pub detailed_instruction: String,
    pub brief_instruction: String,
    pub topic_keywords: Vec<String>,
    pub advisory: String,
}

pub type LanguageProfiles = HashMap<Language, LanguageProfile>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_supported() {
        assert_eq!(Language::resolve("Hindi", Language::English), Language::Hindi);
        assert_eq!(Language::resolve("Marathi", Language::English), Language::Marathi);
    }

    #[test]
    fn test_resolve_unsupported_falls_back() {
        assert_eq!(Language::resolve("French", Language::English), Language::English);
        assert_eq!(Language::resolve("", Language::English), Language::English);
    }

    #[test]
    fn test_resolve_is_exact_match() {
        assert_eq!(Language::from_tag("hindi"), None);
        assert_eq!(Language::from_tag(" Hindi"), None);
    }

    #[test]
    fn test_profiles_deserialize_keyed_by_language() {
        let yaml = r#"
Marathi:
  template: "{context} {history} {question}"
  detailed_triggers: ["तपशीलवार"]
  detailed_instruction: "सविस्तर उत्तर द्या."
  brief_instruction: "थोडक्यात उत्तर द्या."
  topic_keywords: ["खत"]
  advisory: "माती परीक्षण करा."
"#;
        let profiles: LanguageProfiles = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[&Language::Marathi].topic_keywords, vec!["खत"]);
        assert!(serde_yaml::from_str::<LanguageProfiles>("French: {}").is_err());
    }
}

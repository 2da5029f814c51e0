use std::sync::Arc;

use crate::domain::{DomainError, Language, LanguageProfile, LanguageProfiles};

/// Builds the final model prompt from a language profile.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    profiles: Arc<LanguageProfiles>,
    fallback: Arc<LanguageProfile>,
    default_language: Language,
}

/// Inputs for one prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptParts<'a> {
    pub context: &'a str,
    pub history: &'a str,
    pub question: &'a str,
    /// Text checked for detailed-answer trigger phrases.
    pub raw_question: &'a str,
    pub language: Language,
}

impl PromptComposer {
    pub fn new(
        profiles: &LanguageProfiles,
        default_language: Language,
    ) -> Result<Self, DomainError> {
        let fallback = profiles
            .get(&default_language)
            .cloned()
            .ok_or_else(|| {
                DomainError::internal(format!("no prompt profile for {default_language}"))
            })?;

        Ok(Self {
            profiles: Arc::new(profiles.clone()),
            fallback: Arc::new(fallback),
            default_language,
        })
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Profile for `language`, or the default language's when it has none.
    pub fn profile(&self, language: Language) -> &LanguageProfile {
        self.profiles.get(&language).unwrap_or(self.fallback.as_ref())
    }

    /// True when the question contains any of the language's trigger phrases,
    /// compared case-insensitively.
    pub fn is_detailed_request(&self, question: &str, language: Language) -> bool {
        let question = question.to_lowercase();
        self.profile(language)
            .detailed_triggers
            .iter()
            .any(|trigger| question.contains(&trigger.to_lowercase()))
    }

    pub fn compose(&self, parts: PromptParts<'_>) -> String {
        let profile = self.profile(parts.language);
        let mut prompt = render(&profile.template, |slot| match slot {
            "context" => Some(parts.context),
            "history" => Some(parts.history),
            "question" => Some(parts.question),
            _ => None,
        });

        let instruction = if self.is_detailed_request(parts.raw_question, parts.language) {
            &profile.detailed_instruction
        } else {
            &profile.brief_instruction
        };
        if !instruction.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(instruction);
        }
        prompt
    }
}

/// Single-pass `{slot}` substitution; substituted text is never rescanned and
/// unknown slots are left as written.
fn render<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}').and_then(|close| {
            let name = &after[..close];
            lookup(name).map(|value| (value, close))
        }) {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::AppConfig;

    fn composer() -> PromptComposer {
        let profiles = AppConfig::default().prompts.languages;
        PromptComposer::new(&profiles, Language::English).unwrap()
    }

    fn parts<'a>(question: &'a str, history: &'a str, language: Language) -> PromptParts<'a> {
        PromptParts {
            context: "Vermicompost improves soil structure.",
            history,
            question,
            raw_question: question,
            language,
        }
    }

    #[test]
    fn test_detailed_request_detection() {
        let c = composer();
        assert!(c.is_detailed_request(
            "Can you explain in detail how to prepare compost?",
            Language::English
        ));
        assert!(c.is_detailed_request("STEP BY STEP please", Language::English));
        assert!(!c.is_detailed_request("What fertilizer should I use?", Language::English));
    }

    #[test]
    fn test_detailed_request_uses_language_triggers() {
        let c = composer();
        assert!(c.is_detailed_request("जीवामृत विस्तार से बताएं", Language::Hindi));
        assert!(c.is_detailed_request("गांडूळ खत तपशीलवार सांगा", Language::Marathi));
        assert!(!c.is_detailed_request("explain in detail", Language::Hindi));
    }

    #[test]
    fn test_compose_fills_slots() {
        let c = composer();
        let prompt = c.compose(parts("What fertilizer should I use?", "", Language::English));

        assert!(prompt.contains("Context: Vermicompost improves soil structure."));
        assert!(prompt.contains("Current Question: What fertilizer should I use?"));
        assert!(!prompt.contains("{history}"));
        assert!(!prompt.contains("Previous conversation:"));
        assert!(prompt.ends_with(&c.profile(Language::English).brief_instruction));
    }

    #[test]
    fn test_compose_appends_detailed_instruction() {
        let c = composer();
        let question = "Explain in detail how to make compost";
        let prompt = c.compose(parts(question, "", Language::English));
        assert!(prompt.ends_with(&c.profile(Language::English).detailed_instruction));
    }

    #[test]
    fn test_compose_uses_language_template() {
        let c = composer();
        let prompt = c.compose(parts("खत कोणते वापरावे?", "", Language::Marathi));
        assert!(prompt.contains("सध्याचा प्रश्न: खत कोणते वापरावे?"));
    }

    #[test]
    fn test_missing_profile_falls_back_to_default() {
        let mut profiles = AppConfig::default().prompts.languages;
        profiles.remove(&Language::Hindi);
        let c = PromptComposer::new(&profiles, Language::English).unwrap();

        let prompt = c.compose(parts("Which crop for kharif?", "", Language::Hindi));
        assert!(prompt.contains("Current Question: Which crop for kharif?"));
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let c = composer();
        let prompt = c.compose(parts("What is {context}?", "", Language::English));
        assert!(prompt.contains("Current Question: What is {context}?"));
    }

    #[test]
    fn test_render_keeps_unknown_slots() {
        let out = render("{a} and {b} and {", |slot| (slot == "a").then_some("x"));
        assert_eq!(out, "x and {b} and {");
    }
}

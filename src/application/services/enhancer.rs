use crate::domain::LanguageProfile;

/// Appends the language's advisory when the answer touches a topic keyword.
///
/// Matching is a case-insensitive substring test, so applying this twice to
/// an answer that already carries the advisory appends it again.
pub fn enhance_response(answer: &str, profile: &LanguageProfile) -> String {
    let lowered = answer.to_lowercase();
    let on_topic = profile
        .topic_keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()));

    if on_topic && !profile.advisory.is_empty() {
        format!("{answer}\n\n{}", profile.advisory)
    } else {
        answer.to_string()
    }
}

use crate::domain::DomainError;

/// Rejects messages that are empty or only whitespace.
pub fn validate_message(message: &str) -> Result<(), DomainError> {
    if message.trim().is_empty() {
        return Err(DomainError::validation("Message cannot be empty"));
    }
    Ok(())
}

/// Escapes markup-significant characters and caps the result at `max_chars`.
///
/// Truncation happens on whole escape sequences, so the output never ends in
/// a partial entity such as `&am`.
pub fn sanitize_message(message: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(message.len().min(max_chars * 4));
    let mut used = 0;
    let mut buf = [0u8; 4];

    for ch in message.chars() {
        let escaped = html_escape::encode_safe(ch.encode_utf8(&mut buf));
        let width = escaped.chars().count();
        if used + width > max_chars {
            break;
        }
        out.push_str(&escaped);
        used += width;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank() {
        assert!(matches!(validate_message(""), Err(DomainError::Validation(_))));
        assert!(matches!(validate_message(" \n\t "), Err(DomainError::Validation(_))));
        assert!(validate_message("What is mulching?").is_ok());
    }

    #[test]
    fn test_sanitize_escapes_markup() {
        let out = sanitize_message("<script>alert(\"x\")</script> & 'y'", 500);

        for raw in ['<', '>', '"', '\''] {
            assert!(!out.contains(raw), "{raw} leaked into {out}");
        }
        assert!(out.contains("&lt;script&gt;"));
        assert!(out.contains("&amp;"));
    }

    #[test]
    fn test_sanitize_plain_text_unchanged() {
        assert_eq!(
            sanitize_message("How do I make bio-fertilizer?", 500),
            "How do I make bio-fertilizer?"
        );
    }

    #[test]
    fn test_sanitize_truncates() {
        let out = sanitize_message(&"a".repeat(800), 500);
        assert_eq!(out.chars().count(), 500);
    }

    #[test]
    fn test_sanitize_never_splits_entities() {
        let input = format!("{}&&&", "a".repeat(497));
        let out = sanitize_message(&input, 500);

        assert_eq!(out, "a".repeat(497));
        assert!(out.chars().count() <= 500);
    }

    #[test]
    fn test_sanitize_counts_characters_not_bytes() {
        let out = sanitize_message(&"खत".repeat(400), 500);
        assert_eq!(out.chars().count(), 500);
    }

    #[test]
    fn test_sanitize_bounds_hold_for_mixed_input() {
        let long = "x<".repeat(500);
        let inputs = ["<<<<>>>>", "a&b<c>d\"e'f", "", long.as_str()];
        for input in inputs {
            for max in [0, 1, 5, 17, 500] {
                let out = sanitize_message(input, max);
                assert!(out.chars().count() <= max);
                assert!(!out.contains('<') && !out.contains('>'));
            }
        }
    }
}

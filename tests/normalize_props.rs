//! Property tests for template name normalization

use proptest::prelude::*;
use whatsai_workflows::company::generate_slug;
use whatsai_workflows::n8n::normalize;

proptest! {
    #[test]
    fn normalize_output_is_lowercase_ascii_alphanumeric(name in "\\PC{0,40}") {
        let key = normalize(&name);
        prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn normalize_is_idempotent(name in "\\PC{0,40}") {
        let once = normalize(&name);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_ignores_case_and_accents(word in "[a-z]{1,12}") {
        let accented: String = word
            .chars()
            .map(|c| match c {
                'a' => 'á',
                'e' => 'ê',
                'o' => 'õ',
                'c' => 'ç',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        prop_assert_eq!(normalize(&accented), normalize(&word));
    }

    #[test]
    fn slug_has_no_empty_segments(text in "\\PC{0,40}") {
        let slug = generate_slug(&text);
        prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }
}

//! Group slug derivation and validation.
//!
//! Slugs come either from an operator (validated as-is) or from the group
//! title through the `slug` crate, which transliterates non-ASCII text such as
//! "Лев Толстой" into `lev-tolstoi`.

use slug::slugify;
use thiserror::Error;

pub const MAX_SLUG_LENGTH: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("slug `{slug}` may only contain lowercase letters, digits, `-` and `_`")]
    InvalidCharacters { slug: String },
    #[error("slug exceeds {MAX_SLUG_LENGTH} characters")]
    TooLong,
}

/// Derive a slug from human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let mut candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    if candidate.len() > MAX_SLUG_LENGTH {
        candidate.truncate(MAX_SLUG_LENGTH);
        while candidate.ends_with('-') {
            candidate.pop();
        }
    }

    Ok(candidate)
}

/// Check an operator-supplied slug without rewriting it.
pub fn validate_slug(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::EmptyInput);
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(SlugError::TooLong);
    }
    let valid = slug
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_');
    if !valid {
        return Err(SlugError::InvalidCharacters {
            slug: slug.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_transliterates_cyrillic() {
        let slug = derive_slug("Лев Толстой").expect("slug");
        assert!(slug.starts_with("lev-tolst"));
        validate_slug(&slug).expect("derived slug is valid");
    }

    #[test]
    fn derive_slug_rejects_blank_titles() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn derive_slug_truncates_long_titles() {
        let slug = derive_slug(&"word ".repeat(40)).expect("slug");
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn validate_slug_rejects_uppercase_and_spaces() {
        assert!(matches!(
            validate_slug("Cats and Dogs"),
            Err(SlugError::InvalidCharacters { .. })
        ));
        validate_slug("cats_and-dogs-2").expect("valid slug");
    }
}

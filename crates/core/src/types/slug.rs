//! URL-safe product and category slugs.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing or deriving a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug contains invalid character {found:?}")]
    InvalidCharacter {
        /// The offending character.
        found: char,
    },
    /// The input starts or ends with a separator.
    #[error("slug cannot start or end with '-'")]
    EdgeSeparator,
    /// The input contains consecutive separators.
    #[error("slug cannot contain consecutive '-'")]
    ConsecutiveSeparators,
    /// The source name has no representable characters at all.
    #[error("name {name:?} has no characters usable in a slug")]
    Unrepresentable {
        /// The rejected source name.
        name: String,
    },
}

/// A URL-safe slug: lowercase ASCII alphanumerics separated by single `-`.
///
/// Slugs identify products and categories in public URLs and must be unique
/// per entity. When a product is created without one, the slug is derived
/// deterministically from the product name via [`Slug::derive`].
///
/// ## Examples
///
/// ```
/// use la_matera_core::Slug;
///
/// let slug = Slug::derive("Mate Imperial Torpedo!").unwrap();
/// assert_eq!(slug.as_str(), "mate-imperial-torpedo");
///
/// // Spanish diacritics are folded before separator collapsing
/// let slug = Slug::derive("Bombilla Pico Loro Ñandú").unwrap();
/// assert_eq!(slug.as_str(), "bombilla-pico-loro-nandu");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 120;

    /// Parse a `Slug` from an already-canonical string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains characters
    /// outside `[a-z0-9-]`, or has misplaced separators.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.starts_with('-') || s.ends_with('-') {
            return Err(SlugError::EdgeSeparator);
        }

        if s.contains("--") {
            return Err(SlugError::ConsecutiveSeparators);
        }

        if let Some(found) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter { found });
        }

        Ok(Self(s.to_owned()))
    }

    /// Derive a slug deterministically from a display name.
    ///
    /// Lowercases, folds Spanish diacritics (including `ñ` → `n`), collapses
    /// every run of non-alphanumeric characters into a single `-`, and trims
    /// leading/trailing separators.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Unrepresentable`] if nothing usable remains, or
    /// [`SlugError::TooLong`] if the result exceeds [`Self::MAX_LENGTH`].
    pub fn derive(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_separator = false;

        for ch in name.chars().flat_map(char::to_lowercase) {
            let folded = fold_diacritic(ch);
            if folded.is_ascii_alphanumeric() {
                if pending_separator && !out.is_empty() {
                    out.push('-');
                }
                pending_separator = false;
                out.push(folded);
            } else {
                pending_separator = true;
            }
        }

        if out.is_empty() {
            return Err(SlugError::Unrepresentable {
                name: name.to_owned(),
            });
        }

        if out.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(out))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Fold the Spanish diacritics that appear in catalog names to plain ASCII.
const fn fold_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        _ => ch,
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_strips_punctuation() {
        let slug = Slug::derive("Mate Imperial Torpedo!").unwrap();
        assert_eq!(slug.as_str(), "mate-imperial-torpedo");
    }

    #[test]
    fn test_derive_folds_diacritics() {
        let slug = Slug::derive("Bombilla Pico Loro Ñandú").unwrap();
        assert_eq!(slug.as_str(), "bombilla-pico-loro-nandu");

        let slug = Slug::derive("Café São Paulo").unwrap();
        assert_eq!(slug.as_str(), "cafe-sao-paulo");
    }

    #[test]
    fn test_derive_collapses_separator_runs() {
        let slug = Slug::derive("Termo -- Media   Manija (1L)").unwrap();
        assert_eq!(slug.as_str(), "termo-media-manija-1l");
    }

    #[test]
    fn test_derive_trims_edges() {
        let slug = Slug::derive("  ¡Combo Matero!  ").unwrap();
        assert_eq!(slug.as_str(), "combo-matero");
    }

    #[test]
    fn test_derive_keeps_digits() {
        let slug = Slug::derive("Termo 1L Acero 304").unwrap();
        assert_eq!(slug.as_str(), "termo-1l-acero-304");
    }

    #[test]
    fn test_derive_uppercase_enye() {
        let slug = Slug::derive("ÑANDÚ").unwrap();
        assert_eq!(slug.as_str(), "nandu");
    }

    #[test]
    fn test_derive_unrepresentable() {
        assert!(matches!(
            Slug::derive("¡¡¡!!!"),
            Err(SlugError::Unrepresentable { .. })
        ));
        assert!(matches!(
            Slug::derive(""),
            Err(SlugError::Unrepresentable { .. })
        ));
    }

    #[test]
    fn test_derive_is_idempotent_on_canonical_input() {
        let first = Slug::derive("Mate Camionero Premium").unwrap();
        let second = Slug::derive(first.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("mate-imperial-torpedo").is_ok());
        assert!(Slug::parse("termo-1l").is_ok());
        assert!(Slug::parse("combos").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Slug::parse(""), Err(SlugError::Empty)));
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        assert!(matches!(
            Slug::parse("Mate"),
            Err(SlugError::InvalidCharacter { found: 'M' })
        ));
    }

    #[test]
    fn test_parse_rejects_edge_separator() {
        assert!(matches!(Slug::parse("-mate"), Err(SlugError::EdgeSeparator)));
        assert!(matches!(Slug::parse("mate-"), Err(SlugError::EdgeSeparator)));
    }

    #[test]
    fn test_parse_rejects_consecutive_separators() {
        assert!(matches!(
            Slug::parse("mate--torpedo"),
            Err(SlugError::ConsecutiveSeparators)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(Slug::MAX_LENGTH + 1);
        assert!(matches!(Slug::parse(&long), Err(SlugError::TooLong { .. })));
    }

    #[test]
    fn test_serde_roundtrip() {
        let slug = Slug::parse("mate-imperial-torpedo").unwrap();
        let json = serde_json::to_string(&slug).unwrap();
        assert_eq!(json, "\"mate-imperial-torpedo\"");

        let parsed: Slug = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, slug);
    }
}

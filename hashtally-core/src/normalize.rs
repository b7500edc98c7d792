//! Tag folding used for allow-list matching.
//!
//! Only [`crate::TagFilter`] goes through here. Counted keys are never
//! normalized.
use unicode_normalization::UnicodeNormalization;

/// Lowercase, decompose (NFKD) and keep printable ASCII only.
///
/// Accents are stripped because decomposition splits them into combining marks,
/// which fall outside ASCII; symbols with no ASCII decomposition disappear.
/// The trailing ASCII lowercase catches compatibility forms such as `ℍ` that
/// only decompose to an uppercase letter, which keeps the function idempotent.
///
/// ```
/// use hashtally_core::normalize;
///
/// assert_eq!(normalize("Café"), "cafe");
/// assert_eq!(normalize("RUST🦀"), "rust");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| *c == ' ' || c.is_ascii_graphic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

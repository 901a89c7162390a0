//! Slug normalization for shareable wish paths.
//!
//! A slug only ever contains `[a-z0-9-]` and never two hyphens in a row.

/// Normalizes a raw wish name into a URL slug.
///
/// Lower-cases the input, replaces every run of characters outside
/// `[a-z0-9-]` with a single hyphen and collapses repeated hyphens.
/// Leading and trailing hyphens are kept.
///
/// # Example
/// ```
/// use shared::slug::normalize;
///
/// assert_eq!(normalize("Sarah's  Birthday!!"), "sarah-s-birthday-");
/// assert_eq!(normalize(&normalize("A--B")), normalize("A--B"));
/// ```
pub fn normalize(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());

    for c in raw.chars().flat_map(char::to_lowercase) {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };

        if mapped == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(mapped);
    }

    slug
}

/// Returns true if the value is already a normalized slug.
pub fn is_normalized(value: &str) -> bool {
    !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Returns true if the slug carries at least one letter or digit.
///
/// `normalize` can legitimately produce `"-"` from punctuation-only input;
/// such a slug is not usable as a wish name.
pub fn has_content(slug: &str) -> bool {
    slug.chars().any(|c| c.is_ascii_alphanumeric())
}

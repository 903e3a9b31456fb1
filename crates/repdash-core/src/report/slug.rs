//! URL slug generation for report titles.

/// Turn a title into a URL slug.
///
/// Lower-cases and trims the text, turns whitespace runs into a single
/// `-`, drops everything except ASCII letters, digits, `_` and `-`, then
/// collapses repeated hyphens and strips them from both ends.
///
/// ```
/// use repdash_core::report::slugify;
///
/// assert_eq!(slugify("  Q3 Revenue -- (EU)  "), "q3-revenue-eu");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        }
    }

    slug
}

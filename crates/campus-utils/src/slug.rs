/// Lower-cases `text` and joins its ASCII alphanumeric runs with `-`.
///
/// The result may be empty when `text` holds no ASCII letters or digits.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c != '\'' {
            pending_dash = true;
        }
    }
    slug
}

/// `slugify`, falling back to `fallback` when nothing is left.
#[must_use]
pub fn slugify_or(text: &str, fallback: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() { fallback.to_string() } else { slug }
}

#[must_use]
pub fn with_suffix(slug: &str, n: u32) -> String {
    format!("{slug}-{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Intro to Rust"), "intro-to-rust");
        assert_eq!(slugify("  Week 1: Ownership & Borrowing!  "), "week-1-ownership-borrowing");
        assert_eq!(slugify("Don't panic"), "dont-panic");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("Grüße"), "gr-e");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_fallback_and_suffix() {
        assert_eq!(slugify_or("!!!", "topic"), "topic");
        assert_eq!(slugify_or("Hello", "topic"), "hello");
        assert_eq!(with_suffix("hello", 2), "hello-2");
    }
}

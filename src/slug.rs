//! Slug derivation for title-addressed resources.
//!
//! Slugs are derived once at creation time and never change afterwards,
//! so they stay valid as lookup identifiers across title edits. The
//! database additionally carries a unique index on every slug column;
//! this module only picks a candidate, the index settles races.

/// Lowercases and reduces a title to URL-safe characters. Runs of
/// non-alphanumerics collapse into single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        // Titles with no usable characters still need an addressable slug.
        slug.push_str("untitled");
    }
    slug
}

/// Picks `base`, or the first `base-N` (N starting at 2) not present in
/// `taken`.
pub fn disambiguate(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_owned();
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken.iter().any(|t| t == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Rust: 2024 Edition!"), "rust-2024-edition");
    }

    #[test]
    fn slugify_collapses_and_trims_separators() {
        assert_eq!(slugify("  --Weird   title--  "), "weird-title");
    }

    #[test]
    fn slugify_falls_back_when_nothing_usable() {
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn disambiguate_returns_base_when_free() {
        assert_eq!(disambiguate("news", &[]), "news");
        assert_eq!(disambiguate("news", &["newsletter".to_owned()]), "news");
    }

    #[test]
    fn disambiguate_appends_first_free_suffix() {
        assert_eq!(disambiguate("news", &["news".to_owned()]), "news-2");
        assert_eq!(
            disambiguate("news", &["news".to_owned(), "news-2".to_owned()]),
            "news-3"
        );
    }
}

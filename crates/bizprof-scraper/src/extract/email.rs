//! Email addresses from page text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").expect("valid regex")
});

/// File extensions that show up in retina asset names like `logo@2x.png`.
const ASSET_SUFFIXES: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico", "avif", "tif", "tiff",
];

/// Distinct email addresses in first-seen order; case-insensitive dedup keeps
/// the first spelling.
#[must_use]
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for m in EMAIL_RE.find_iter(text) {
        let email = m.as_str().trim_end_matches('.');
        let tld = email
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ASSET_SUFFIXES.contains(&tld.as_str()) {
            continue;
        }
        if seen.insert(email.to_ascii_lowercase()) {
            out.push(email.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_and_deduplicates_emails() {
        let text = "Write Info@Acme.com or sales@acme.co.uk. Also info@acme.com!";
        assert_eq!(extract_emails(text), vec!["Info@Acme.com", "sales@acme.co.uk"]);
    }

    #[test]
    fn ignores_retina_asset_names() {
        assert!(extract_emails("src=logo@2x.png and hero@3x.webp").is_empty());
    }
}

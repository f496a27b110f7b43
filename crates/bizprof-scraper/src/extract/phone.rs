//! North American phone numbers.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\+?1[\s.\-]?)?\(?(\d{3})\)?[\s.\-]?(\d{3})[\s.\-]?(\d{4})(?:\s*(?:ext\.?|x|extension)\s*(\d{1,6}))?",
    )
    .expect("valid regex")
});

/// How far before a match to look for a fax label.
const FAX_WINDOW: usize = 12;

/// Numbering-plan check: area code and exchange must not start with 0 or 1.
fn valid_nanp(area: &str, exchange: &str) -> bool {
    let leading_ok = |s: &str| s.bytes().next().is_some_and(|b| (b'2'..=b'9').contains(&b));
    leading_ok(area) && leading_ok(exchange)
}

fn window_before(text: &str, start: usize, width: usize) -> &str {
    let mut from = start.saturating_sub(width);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    &text[from..start]
}

fn is_fax(text: &str, start: usize, end: usize) -> bool {
    if window_before(text, start, FAX_WINDOW)
        .to_ascii_lowercase()
        .contains("fax")
    {
        return true;
    }
    let after = text[end..].trim_start().to_ascii_lowercase();
    after.starts_with("(fax")
}

/// Formats one number as `(AAA) EEE-LLLL[ ext. N]`, or `None` when it fails
/// the numbering-plan check.
#[must_use]
pub fn format_phone(area: &str, exchange: &str, line: &str, ext: Option<&str>) -> Option<String> {
    if !valid_nanp(area, exchange) {
        return None;
    }
    let mut out = format!("({area}) {exchange}-{line}");
    if let Some(ext) = ext {
        out.push_str(" ext. ");
        out.push_str(ext);
    }
    Some(out)
}

/// Every acceptable phone number in `text`, formatted and deduplicated in
/// first-seen order.
#[must_use]
pub fn extract_phones(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caps in PHONE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
        {
            continue;
        }
        if is_fax(text, whole.start(), whole.end()) {
            continue;
        }
        let (Some(area), Some(exchange), Some(line)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let Some(formatted) = format_phone(
            area.as_str(),
            exchange.as_str(),
            line.as_str(),
            caps.get(4).map(|m| m.as_str()),
        ) else {
            continue;
        };
        if seen.insert(formatted.clone()) {
            out.push(formatted);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_common_spellings() {
        let text = "Call (617) 555-0101 or 617.555.0102, toll free +1 800-555-0103.";
        assert_eq!(
            extract_phones(text),
            vec!["(617) 555-0101", "(617) 555-0102", "(800) 555-0103"]
        );
    }

    #[test]
    fn deduplicates_across_formats() {
        let text = "tel: (617) 555-0101\nPhone 617-555-0101\n6175550101";
        assert_eq!(extract_phones(text), vec!["(617) 555-0101"]);
    }

    #[test]
    fn rejects_numbering_plan_violations() {
        assert!(extract_phones("Order 1175550101 shipped").is_empty());
        assert!(extract_phones("Ref (617) 055-0101").is_empty());
        assert!(extract_phones("Ref (017) 555-0101").is_empty());
    }

    #[test]
    fn rejects_digits_inside_longer_identifiers() {
        assert!(extract_phones("SKU 96175550101234").is_empty());
    }

    #[test]
    fn skips_fax_numbers() {
        let text = "Phone: (617) 555-0101 Fax: (617) 555-0199";
        assert_eq!(extract_phones(text), vec!["(617) 555-0101"]);
        assert!(extract_phones("(617) 555-0199 (fax)").is_empty());
    }

    #[test]
    fn keeps_extensions() {
        assert_eq!(
            extract_phones("Office: 617-555-0101 ext. 204"),
            vec!["(617) 555-0101 ext. 204"]
        );
    }
}

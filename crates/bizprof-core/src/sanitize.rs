//! Re-validation of free text returned by the summarization collaborator.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::record::ABSENCE_MARKER;
use crate::vocabulary::Vocabulary;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid regex"));

static DESCRIPTION_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:business\s+)?description\s*:\s*").expect("valid regex")
});

static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("valid regex"));

const LICENSE_LABELS: [&str; 5] = [
    "License Number",
    "Issuing Authority",
    "License Type",
    "Status",
    "Expiration Date",
];

/// True for blank text or a placeholder the collaborator uses for "nothing".
fn is_placeholder(text: &str) -> bool {
    let t = text.trim().trim_end_matches('.');
    t.is_empty()
        || t.eq_ignore_ascii_case(ABSENCE_MARKER)
        || t.eq_ignore_ascii_case("n/a")
        || t.eq_ignore_ascii_case("null")
        || t.eq_ignore_ascii_case("not found")
        || t.eq_ignore_ascii_case("unknown")
}

/// Cleans, caps, and completes a collaborator description.
///
/// Markdown brackets, URLs, a leading label, and banned phrases are removed;
/// the body is capped at the vocabulary's limit and closed with the client
/// base sentence.
#[must_use]
pub fn sanitize_description(raw: &str, client_base: &str, vocab: &Vocabulary) -> String {
    let without_marks: String = raw
        .chars()
        .filter(|c| !matches!(c, '*' | '[' | ']'))
        .collect();
    let without_urls = URL_RE.replace_all(&without_marks, "");
    let without_label = DESCRIPTION_LABEL_RE.replace(&without_urls, "");
    let collapsed = without_label.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = vocab.strip_banned(&collapsed);

    if is_placeholder(&cleaned) {
        return ABSENCE_MARKER.to_string();
    }

    let mut body = cap_text(&cleaned, vocab.description_max_chars());
    if !body.ends_with(['.', '!', '?']) {
        body = body.trim_end_matches([',', ';', ':']).to_string();
        body.push('.');
    }
    format!("{body} The business provides services to {client_base} customers.")
}

/// Truncates to at most `max` characters, preferring a sentence end, then a
/// word boundary.
fn cap_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    if let Some(idx) = cut.rfind(['.', '!', '?']) {
        if idx >= cut.len() / 2 {
            return cut[..=idx].to_string();
        }
    }
    match cut.rfind(char::is_whitespace) {
        Some(idx) => cut[..idx].trim_end().to_string(),
        None => cut,
    }
}

/// Capitalises every word of each comma- or line-separated item and
/// removes duplicates.
#[must_use]
pub fn normalize_products_and_services(raw: &str) -> String {
    let mut seen = HashSet::new();
    let items: Vec<String> = raw
        .split([',', '\n', ';'])
        .map(|item| item.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|item| !is_placeholder(item))
        .map(capitalize_words)
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect();
    if items.is_empty() {
        ABSENCE_MARKER.to_string()
    } else {
        items.join(", ")
    }
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Re-emits license blocks with all five labels, dropping empty and
/// duplicate blocks.
#[must_use]
pub fn normalize_license_blocks(raw: &str) -> String {
    let text = raw.replace('\r', "");
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();

    for chunk in BLANK_LINE_RE.split(text.trim()) {
        let mut values: [Option<String>; 5] = Default::default();
        for line in chunk.lines() {
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let label = label.trim().trim_start_matches(['-', '*']).trim();
            let Some(slot) = LICENSE_LABELS
                .iter()
                .position(|l| l.eq_ignore_ascii_case(label))
            else {
                continue;
            };
            let value = value.trim();
            if !is_placeholder(value) && values[slot].is_none() {
                values[slot] = Some(value.to_string());
            }
        }
        if values.iter().all(Option::is_none) {
            continue;
        }
        let block = LICENSE_LABELS
            .iter()
            .zip(values.iter())
            .map(|(label, value)| {
                format!("{label}: {}", value.as_deref().unwrap_or(ABSENCE_MARKER))
            })
            .collect::<Vec<_>>()
            .join("\n");
        if seen.insert(block.to_lowercase()) {
            blocks.push(block);
        }
    }

    if blocks.is_empty() {
        ABSENCE_MARKER.to_string()
    } else {
        blocks.join("\n\n")
    }
}

/// Trims each line, drops markdown emphasis, and maps placeholders to the
/// absence marker.
#[must_use]
pub fn clean_free_text(raw: &str) -> String {
    let cleaned = raw
        .replace('*', "")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if is_placeholder(&cleaned) {
        ABSENCE_MARKER.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::embedded().expect("embedded vocabulary is valid")
    }

    #[test]
    fn description_is_cleaned_and_completed() {
        let out = sanitize_description(
            "Business Description: **Acme Plumbing** repairs [pipes] in Dayton, see https://acme.example/about",
            "residential",
            &vocab(),
        );
        assert_eq!(
            out,
            "Acme Plumbing repairs pipes in Dayton, see. The business provides services to residential customers."
        );
    }

    #[test]
    fn description_drops_banned_phrases() {
        let out = sanitize_description(
            "Acme offers reliable roofing with a warranty.",
            "commercial",
            &vocab(),
        );
        assert!(!out.to_lowercase().contains("reliable"));
        assert!(!out.to_lowercase().contains("warranty"));
        assert!(out.ends_with("services to commercial customers."));
    }

    #[test]
    fn description_is_capped() {
        let sentence = "Acme repairs pipes in Dayton. ";
        let long = sentence.repeat(60);
        let out = sanitize_description(&long, "residential", &vocab());
        let body = out
            .strip_suffix(" The business provides services to residential customers.")
            .expect("suffix");
        assert!(body.chars().count() <= 900);
        assert!(body.ends_with('.'));
    }

    #[test]
    fn empty_description_is_absent() {
        assert_eq!(
            sanitize_description("  None ", "residential", &vocab()),
            ABSENCE_MARKER
        );
    }

    #[test]
    fn products_are_capitalised_and_deduplicated() {
        assert_eq!(
            normalize_products_and_services("drain cleaning, water heaters\n- Drain Cleaning, none"),
            "Drain Cleaning, Water Heaters"
        );
        assert_eq!(normalize_products_and_services(""), ABSENCE_MARKER);
    }

    #[test]
    fn license_blocks_fill_missing_labels() {
        let raw = "License Number: 12345\nStatus: Active\n\nLicense Number: 12345\nStatus: Active";
        assert_eq!(
            normalize_license_blocks(raw),
            "License Number: 12345\nIssuing Authority: None\nLicense Type: None\nStatus: Active\nExpiration Date: None"
        );
    }

    #[test]
    fn license_blocks_without_values_are_absent() {
        assert_eq!(
            normalize_license_blocks("License Number: None\nStatus: N/A"),
            ABSENCE_MARKER
        );
        assert_eq!(normalize_license_blocks("None"), ABSENCE_MARKER);
    }

    #[test]
    fn free_text_maps_placeholders() {
        assert_eq!(clean_free_text("n/a"), ABSENCE_MARKER);
        assert_eq!(
            clean_free_text("  **Dayton**   and\n\n Kettering "),
            "Dayton and\nKettering"
        );
    }
}

//! Lead-capture entry points: intent-labelled links whose target page
//! carries a real contact form.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::document::{Action, ParsedDocument};

static INTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:quotes?|estimates?|consult(?:ation)?s?|requests?|schedul(?:e|ing)|book(?:ing)?|reserve|reservations?|table|appointments?|services?|contact|order(?:\s+online)?)\b",
    )
    .expect("valid regex")
});

static STRONG_INTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:quotes?|estimates?|consult(?:ation)?s?|schedul(?:e|ing)|book(?:ing)?|reserve|reservations?|appointments?)\b",
    )
    .expect("valid regex")
});

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)name|email|phone|message|address|guests|date|time").expect("valid regex")
});

static FORM_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)form|typeform|jotform|hubspot|marketo|pardot|salesforce|gravityforms|wpforms")
        .expect("valid regex")
});

/// A same-origin, non-root link whose label expresses a contact intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadFormCandidate {
    pub title: String,
    pub url: Url,
    depth: usize,
    strength: u8,
    order: usize,
}

/// The confirmed entry point reported in the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadForm {
    pub title: String,
    pub url: String,
}

fn path_depth(url: &Url) -> usize {
    url.path_segments()
        .map_or(0, |segments| segments.filter(|s| !s.is_empty()).count())
}

fn clean_title(label: &str) -> String {
    label
        .replace('|', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Intent-labelled actions pointing at same-origin, non-root pages, ranked
/// deepest path first, then strongest keyword, then discovery order. One
/// candidate per target URL.
#[must_use]
pub fn rank_candidates<'a, I>(actions: I, root: &Url) -> Vec<LeadFormCandidate>
where
    I: IntoIterator<Item = &'a Action>,
{
    let origin = root.origin();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for (order, action) in actions.into_iter().enumerate() {
        if !INTENT_RE.is_match(&action.match_text) {
            continue;
        }
        let mut target = action.target.clone();
        target.set_fragment(None);
        if target.origin() != origin || matches!(target.path(), "" | "/") {
            continue;
        }
        if !seen.insert(target.as_str().to_string()) {
            continue;
        }
        let strength = if STRONG_INTENT_RE.is_match(&action.match_text) {
            2
        } else {
            1
        };
        candidates.push(LeadFormCandidate {
            title: clean_title(&action.label),
            depth: path_depth(&target),
            url: target,
            strength,
            order,
        });
    }

    candidates.sort_by_key(|c| (Reverse(c.depth), Reverse(c.strength), c.order));
    candidates
}

/// True when the page has a form control named like a contact field, or an
/// embedded frame from a known form host.
#[must_use]
pub fn page_has_form(doc: &ParsedDocument) -> bool {
    let field_hit = doc.form_fields.iter().any(|f| {
        FIELD_RE.is_match(&f.name) || FIELD_RE.is_match(&f.placeholder) || FIELD_RE.is_match(&f.label)
    });
    field_hit
        || doc
            .frame_sources
            .iter()
            .any(|src| FORM_HOST_RE.is_match(src.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FormField;

    fn action(target: &str, label: &str) -> Action {
        Action {
            target: Url::parse(target).unwrap(),
            label: label.to_string(),
            match_text: label.to_string(),
        }
    }

    fn root() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn ranks_deeper_paths_then_stronger_keywords() {
        let actions = vec![
            action("https://example.com/contact", "Contact Us"),
            action("https://example.com/quote", "Get a Quote"),
            action("https://example.com/services/roofing/estimate", "Free | Estimate"),
        ];
        let ranked = rank_candidates(&actions, &root());
        let urls: Vec<&str> = ranked.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/services/roofing/estimate",
                "https://example.com/quote",
                "https://example.com/contact",
            ]
        );
        assert_eq!(ranked[0].title, "Free Estimate");
    }

    #[test]
    fn skips_root_off_origin_and_unlabelled_targets() {
        let actions = vec![
            action("https://example.com/", "Contact"),
            action("https://example.com/#contact", "Contact"),
            action("https://other.com/contact", "Contact"),
            action("https://example.com/blog", "Read more"),
        ];
        assert!(rank_candidates(&actions, &root()).is_empty());
    }

    #[test]
    fn one_candidate_per_target() {
        let actions = vec![
            action("https://example.com/contact#form", "Contact"),
            action("https://example.com/contact", "Contact Us Today"),
        ];
        let ranked = rank_candidates(&actions, &root());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].url.as_str(), "https://example.com/contact");
    }

    #[test]
    fn confirms_form_by_fields_or_frames() {
        let mut doc = ParsedDocument::default();
        assert!(!page_has_form(&doc));

        doc.form_fields.push(FormField {
            name: "search".to_string(),
            ..FormField::default()
        });
        assert!(!page_has_form(&doc));

        doc.form_fields.push(FormField {
            label: "Your Email".to_string(),
            ..FormField::default()
        });
        assert!(page_has_form(&doc));

        let framed = ParsedDocument {
            frame_sources: vec![Url::parse("https://form.jotform.com/123").unwrap()],
            ..ParsedDocument::default()
        };
        assert!(page_has_form(&framed));
    }
}

//! Merge & Normalize: combine structured and pattern-matched candidates per
//! field and fold everything into the output record.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

use bizprof_core::record::{format_elapsed, or_absent};
use bizprof_core::sanitize::{
    clean_free_text, normalize_license_blocks, normalize_products_and_services,
    sanitize_description,
};
use bizprof_core::{BusinessProfileRecord, SummaryFields, Vocabulary, ABSENCE_MARKER};
use url::Url;

use crate::extract::address::{extract_addresses, format_structured};
use crate::extract::email::extract_emails;
use crate::extract::hours::{extract_hours, normalize_hours_text};
use crate::extract::lead_form::LeadForm;
use crate::extract::phone::extract_phones;
use crate::extract::seal::detect_seal;
use crate::extract::social::extract_social;
use crate::jsonld::StructuredMetadata;
use crate::walker::CrawlOutcome;

/// Structured-metadata candidates first, then pattern matches; the first
/// candidate for each key wins.
pub fn prioritize<T, K, F>(structured: Vec<T>, pattern: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    structured
        .into_iter()
        .chain(pattern)
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Deterministic field values recovered from one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub addresses: Vec<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub social: Vec<String>,
    pub hours: Option<String>,
    pub seal_found: bool,
    pub lead_form: Option<LeadForm>,
}

impl ExtractedFields {
    /// Runs every synchronous extractor over the crawl. The lead form needs
    /// extra fetches and is filled in by the caller.
    #[must_use]
    pub fn collect(outcome: &CrawlOutcome, corpus: &str, metadata: &StructuredMetadata) -> Self {
        let structured_phones: Vec<String> = metadata.telephones().flat_map(extract_phones).collect();
        let phones = prioritize(structured_phones, extract_phones(corpus), Clone::clone);

        let structured_addresses: Vec<_> = metadata.addresses().map(format_structured).collect();
        let addresses = prioritize(structured_addresses, extract_addresses(corpus), |a| {
            a.key.clone()
        })
        .into_iter()
        .map(|a| a.formatted)
        .collect();

        let profiles: Vec<Url> = metadata
            .related_profiles()
            .filter_map(|u| Url::parse(u).ok())
            .collect();
        let social = extract_social(profiles.iter().chain(outcome.links()));

        Self {
            addresses,
            phones,
            emails: extract_emails(corpus),
            social,
            hours: extract_hours(metadata, corpus),
            seal_found: detect_seal(
                outcome.images(),
                outcome.pages.iter().map(|p| p.document.visible_text.as_str()),
            ),
            lead_form: None,
        }
    }
}

fn join_or_absent(items: &[String], separator: &str) -> String {
    if items.is_empty() {
        ABSENCE_MARKER.to_string()
    } else {
        items.join(separator)
    }
}

/// Builds the final record. Collaborator output, when present, is
/// re-validated against the vocabulary rather than copied.
#[must_use]
pub fn build_record(
    url: &str,
    fields: &ExtractedFields,
    summary: Option<&SummaryFields>,
    vocabulary: &Vocabulary,
    elapsed: Duration,
) -> BusinessProfileRecord {
    let mut record = BusinessProfileRecord::absent(url);
    record.time_taken = format_elapsed(elapsed);
    record.addresses = join_or_absent(&fields.addresses, "\n\n");
    record.phone_numbers = join_or_absent(&fields.phones, "\n");
    record.email_addresses = join_or_absent(&fields.emails, "\n");
    record.social_media_urls = join_or_absent(&fields.social, "\n");
    record.bbb_seal = vocabulary.seal_status(fields.seal_found).to_string();

    if let Some(lead) = &fields.lead_form {
        record.lead_form = format!("Lead Form Title: {}\nLead Form URL: {}", lead.title, lead.url);
        record.lead_form_title = or_absent(Some(lead.title.clone()));
        record.lead_form_url = or_absent(Some(lead.url.clone()));
    }

    let mut hours = fields.hours.clone();
    if let Some(summary) = summary {
        let client_base = vocabulary.client_base(&summary.client_base);
        if vocabulary.contains_banned(&summary.description) {
            tracing::debug!(url, "dropping banned phrases from summarized description");
        }
        record.description = sanitize_description(&summary.description, &client_base, vocabulary);
        record.client_base = client_base;
        record.owner_demographic = vocabulary
            .owner_demographic(&summary.owner_demographic)
            .unwrap_or_else(|| ABSENCE_MARKER.to_string());
        record.products_and_services =
            normalize_products_and_services(&summary.products_and_services);
        record.license_numbers = normalize_license_blocks(&summary.license_numbers);
        record.methods_of_payment = join_or_absent(
            &vocabulary.payment_methods_from(&summary.methods_of_payment),
            ", ",
        );
        record.service_area = clean_free_text(&summary.service_area);
        record.refund_and_exchange_policy = clean_free_text(&summary.refund_and_exchange_policy);
        if hours.is_none() {
            hours = normalize_hours_text(&summary.hours_of_operation);
        }
    }
    record.hours_of_operation = or_absent(hours);

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::embedded().expect("embedded vocabulary is valid")
    }

    #[test]
    fn prioritize_keeps_structured_first_and_dedups() {
        let merged = prioritize(
            vec!["b", "a"],
            vec!["c", "a", "b", "d"],
            |s: &&str| s.to_string(),
        );
        assert_eq!(merged, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn deterministic_record_without_summary() {
        let fields = ExtractedFields {
            phones: vec!["(617) 555-0101".to_string()],
            social: vec!["Facebook: https://facebook.com/examplebiz".to_string()],
            ..ExtractedFields::default()
        };
        let record = build_record(
            "https://example.com/",
            &fields,
            None,
            &vocab(),
            Duration::from_secs(3),
        );
        assert_eq!(record.phone_numbers, "(617) 555-0101");
        assert_eq!(record.addresses, ABSENCE_MARKER);
        assert_eq!(record.description, ABSENCE_MARKER);
        assert_eq!(record.lead_form_url, ABSENCE_MARKER);
        assert_eq!(record.time_taken, "0 minutes 3 seconds");
        assert!(record.bbb_seal.starts_with("NOT FOUND"));
    }

    #[test]
    fn summary_fields_are_enforced() {
        let summary = SummaryFields {
            description: "Acme Plumbing repairs pipes".to_string(),
            client_base: "Industrial".to_string(),
            owner_demographic: "woman owned".to_string(),
            products_and_services: "drain cleaning, pipe repair".to_string(),
            hours_of_operation: "Monday - Sunday: 8am-6pm".to_string(),
            license_numbers: "None".to_string(),
            methods_of_payment: "Visa, Crypto, cash".to_string(),
            service_area: "Dayton".to_string(),
            refund_and_exchange_policy: String::new(),
        };
        let record = build_record(
            "https://example.com/",
            &ExtractedFields::default(),
            Some(&summary),
            &vocab(),
            Duration::ZERO,
        );
        assert_eq!(record.client_base, "residential");
        assert_eq!(
            record.description,
            "Acme Plumbing repairs pipes. The business provides services to residential customers."
        );
        assert_eq!(record.owner_demographic, "Woman Owned");
        assert_eq!(record.products_and_services, "Drain Cleaning, Pipe Repair");
        assert_eq!(record.methods_of_payment, "Visa, Cash");
        assert_eq!(record.license_numbers, ABSENCE_MARKER);
        assert_eq!(record.refund_and_exchange_policy, ABSENCE_MARKER);
        assert!(record.hours_of_operation.starts_with("Monday: 08:00 AM - 06:00 PM"));
        assert!(record.hours_of_operation.ends_with("Sunday: 08:00 AM - 06:00 PM"));
    }

    #[test]
    fn banned_phrases_never_reach_the_description() {
        let summary = SummaryFields {
            description: "Quality roofing with a lifetime warranty".to_string(),
            client_base: "commercial".to_string(),
            ..SummaryFields::default()
        };
        let v = vocab();
        assert!(v.contains_banned(&summary.description));
        let record = build_record(
            "u",
            &ExtractedFields::default(),
            Some(&summary),
            &v,
            Duration::ZERO,
        );
        assert!(!v.contains_banned(&record.description), "{}", record.description);
        assert!(record.description.contains("roofing"));
    }

    #[test]
    fn deterministic_hours_win_over_summary() {
        let fields = ExtractedFields {
            hours: Some("from the site".to_string()),
            ..ExtractedFields::default()
        };
        let summary = SummaryFields {
            hours_of_operation: "Monday - Sunday: 8am-6pm".to_string(),
            ..SummaryFields::default()
        };
        let record = build_record("u", &fields, Some(&summary), &vocab(), Duration::ZERO);
        assert_eq!(record.hours_of_operation, "from the site");
    }

    #[test]
    fn lead_form_fields_are_split_out() {
        let fields = ExtractedFields {
            lead_form: Some(LeadForm {
                title: "Get a Quote".to_string(),
                url: "https://example.com/quote".to_string(),
            }),
            ..ExtractedFields::default()
        };
        let record = build_record("u", &fields, None, &vocab(), Duration::ZERO);
        assert_eq!(
            record.lead_form,
            "Lead Form Title: Get a Quote\nLead Form URL: https://example.com/quote"
        );
        assert_eq!(record.lead_form_title, "Get a Quote");
    }
}

//! One full pass over a site: crawl, gate on content, and run the
//! deterministic extractors.

use std::time::Duration;

use bizprof_core::{BusinessProfileRecord, CrawlTarget, Vocabulary};
use url::Url;

use crate::document::parse_document;
use crate::error::ScraperError;
use crate::extract::lead_form::{page_has_form, rank_candidates, LeadForm};
use crate::fetch::PageFetcher;
use crate::merge::{build_record, ExtractedFields};
use crate::walker::{walk, CrawlOptions, CrawlOutcome};

/// What a site pass hands to the summarizing step.
#[derive(Debug)]
pub struct SiteHarvest {
    pub url: String,
    /// Visible text of all fetched pages, in discovery order.
    pub corpus: String,
    pub fields: ExtractedFields,
    pub outcome: CrawlOutcome,
}

impl SiteHarvest {
    /// Record built from deterministic fields only; judgment fields stay absent.
    #[must_use]
    pub fn deterministic_record(
        &self,
        vocabulary: &Vocabulary,
        elapsed: Duration,
    ) -> BusinessProfileRecord {
        build_record(&self.url, &self.fields, None, vocabulary, elapsed)
    }
}

/// Crawls `target` and extracts every deterministic field.
///
/// # Errors
///
/// Returns [`ScraperError::InsufficientContent`] when the crawl produced
/// neither visible text nor structured metadata.
pub async fn harvest_site(
    fetcher: &PageFetcher,
    target: &CrawlTarget,
    options: &CrawlOptions,
    lead_form_probes: usize,
) -> Result<SiteHarvest, ScraperError> {
    let root = target.url();
    let outcome = walk(fetcher, root, options).await;
    let corpus = outcome.corpus();
    let metadata = outcome.metadata();

    if corpus.trim().is_empty() && metadata.is_empty() {
        tracing::warn!(
            url = %root,
            failures = outcome.failures.len(),
            "crawl produced no usable content"
        );
        return Err(ScraperError::InsufficientContent {
            url: target.as_str().to_string(),
        });
    }

    let mut fields = ExtractedFields::collect(&outcome, &corpus, &metadata);
    fields.lead_form = confirm_lead_form(fetcher, &outcome, root, lead_form_probes).await;

    tracing::info!(
        url = %root,
        corpus_chars = corpus.chars().count(),
        phones = fields.phones.len(),
        addresses = fields.addresses.len(),
        emails = fields.emails.len(),
        social = fields.social.len(),
        hours = fields.hours.is_some(),
        lead_form = fields.lead_form.is_some(),
        "site harvested"
    );

    Ok(SiteHarvest {
        url: target.as_str().to_string(),
        corpus,
        fields,
        outcome,
    })
}

/// Walks ranked candidates in order. Crawled pages are checked in place;
/// uncrawled ones are fetched, at most `probes` of them.
async fn confirm_lead_form(
    fetcher: &PageFetcher,
    outcome: &CrawlOutcome,
    root: &Url,
    probes: usize,
) -> Option<LeadForm> {
    let actions = outcome.pages.iter().flat_map(|p| p.document.actions.iter());
    let candidates = rank_candidates(actions, root);
    let mut probes_left = probes;

    for candidate in candidates {
        let confirmed = if let Some(page) = outcome.page(&candidate.url) {
            page_has_form(&page.document)
        } else if probes_left > 0 {
            probes_left -= 1;
            match fetcher.fetch(&candidate.url).await {
                Ok(body) => page_has_form(&parse_document(&body, &candidate.url)),
                Err(e) => {
                    tracing::debug!(url = %candidate.url, error = %e, "lead form probe failed");
                    false
                }
            }
        } else {
            continue;
        };

        if confirmed {
            return Some(LeadForm {
                title: candidate.title,
                url: candidate.url.to_string(),
            });
        }
    }
    None
}

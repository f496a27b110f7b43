//! Profile pipeline orchestration.

use std::sync::Arc;
use std::time::Instant;

use bizprof_core::{AppConfig, BusinessProfileRecord, CrawlTarget, Vocabulary};
use bizprof_scraper::{build_record, harvest_site, CrawlOptions, PageFetcher, ScraperError};

use crate::client::Summarizer;
use crate::error::PipelineError;

/// Everything one profile run needs, built once and shared across requests.
#[derive(Debug, Clone)]
pub struct ProfilePipeline {
    fetcher: PageFetcher,
    summarizer: Summarizer,
    vocabulary: Arc<Vocabulary>,
    options: CrawlOptions,
    lead_form_probes: usize,
}

impl ProfilePipeline {
    #[must_use]
    pub fn new(
        fetcher: PageFetcher,
        summarizer: Summarizer,
        vocabulary: Arc<Vocabulary>,
        options: CrawlOptions,
        lead_form_probes: usize,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            vocabulary,
            options,
            lead_form_probes,
        }
    }

    /// # Errors
    ///
    /// Returns [`PipelineError`] if the fetch or summarizer clients cannot be built.
    pub fn from_config(
        config: &AppConfig,
        vocabulary: Arc<Vocabulary>,
    ) -> Result<Self, PipelineError> {
        let fetcher = PageFetcher::new(config.fetch_timeout_secs, &config.user_agent)?;
        let summarizer = Summarizer::from_config(config)?;
        let options = CrawlOptions::from_config(config, &vocabulary);
        Ok(Self::new(
            fetcher,
            summarizer,
            vocabulary,
            options,
            config.lead_form_probes,
        ))
    }

    #[must_use]
    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Crawl and deterministic extraction only; the summarizer is never called.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InsufficientContent`] when the site yields nothing.
    pub async fn extract(
        &self,
        target: &CrawlTarget,
    ) -> Result<BusinessProfileRecord, ScraperError> {
        let started = Instant::now();
        let harvest =
            harvest_site(&self.fetcher, target, &self.options, self.lead_form_probes).await?;
        Ok(harvest.deterministic_record(&self.vocabulary, started.elapsed()))
    }

    /// Full run: crawl, extract, summarize, and merge into one record.
    ///
    /// A missing credential is reported before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Scraper`] for insufficient content and
    /// [`PipelineError::Summarizer`] for any collaborator failure.
    pub async fn profile(
        &self,
        target: &CrawlTarget,
    ) -> Result<BusinessProfileRecord, PipelineError> {
        self.summarizer.ensure_configured()?;
        let started = Instant::now();

        let harvest =
            harvest_site(&self.fetcher, target, &self.options, self.lead_form_probes).await?;
        let summary = self
            .summarizer
            .summarize(&harvest.url, &harvest.corpus, &self.vocabulary)
            .await?;

        let record = build_record(
            &harvest.url,
            &harvest.fields,
            Some(&summary),
            &self.vocabulary,
            started.elapsed(),
        );
        tracing::info!(
            url = %harvest.url,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "profile generated"
        );
        Ok(record)
    }
}

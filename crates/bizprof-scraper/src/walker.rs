//! Site Walker: bounded breadth-first traversal of same-origin pages.
//!
//! One task owns the frontier and the visited set; fetches run concurrently
//! underneath it and report back as `Result`s, so nothing else mutates
//! crawl state.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use bizprof_core::{AppConfig, FallbackPolicy, Vocabulary};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use url::Url;

use crate::document::{parse_document, ParsedDocument};
use crate::error::FetchError;
use crate::fetch::PageFetcher;
use crate::jsonld::{self, StructuredMetadata};

/// Link targets that are never HTML pages.
const ASSET_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "svg", "webp", "ico", "css", "js", "json", "xml", "zip",
    "mp3", "mp4", "mov", "avi", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "woff", "woff2",
];

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Fetch attempts allowed during the traversal, fallback probes excluded.
    pub max_pages: usize,
    pub max_depth: usize,
    pub concurrency: usize,
    /// Ceiling for the whole walk; pages still in flight at the deadline are dropped.
    pub deadline: Duration,
    pub min_corpus_chars: usize,
    pub fallback_policy: FallbackPolicy,
    pub fallback_paths: Vec<String>,
}

impl CrawlOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig, vocabulary: &Vocabulary) -> Self {
        Self {
            max_pages: config.crawl_max_pages,
            max_depth: config.crawl_max_depth,
            concurrency: config.crawl_concurrency,
            deadline: Duration::from_secs(config.crawl_deadline_secs),
            min_corpus_chars: config.min_corpus_chars,
            fallback_policy: config.fallback_policy,
            fallback_paths: vocabulary.fallback_paths().to_vec(),
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 30,
            max_depth: 2,
            concurrency: 4,
            deadline: Duration::from_secs(60),
            min_corpus_chars: 40,
            fallback_policy: FallbackPolicy::WhenThin,
            fallback_paths: Vec::new(),
        }
    }
}

/// One successfully fetched and parsed page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub depth: usize,
    /// Dispatch order; pages are reported sorted by it.
    pub sequence: usize,
    pub document: ParsedDocument,
    pub metadata: StructuredMetadata,
}

#[derive(Debug)]
pub struct PageFailure {
    pub url: Url,
    pub error: FetchError,
}

/// Everything one walk produced.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub pages: Vec<FetchedPage>,
    pub failures: Vec<PageFailure>,
}

impl CrawlOutcome {
    /// Visible text of every page in discovery order, blank-line separated.
    #[must_use]
    pub fn corpus(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.document.visible_text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Structured records of every page, accumulated in discovery order.
    #[must_use]
    pub fn metadata(&self) -> StructuredMetadata {
        let mut all = StructuredMetadata::default();
        for page in &self.pages {
            all.extend(page.metadata.clone());
        }
        all
    }

    pub fn links(&self) -> impl Iterator<Item = &Url> {
        self.pages.iter().flat_map(|p| p.document.links.iter())
    }

    pub fn images(&self) -> impl Iterator<Item = &Url> {
        self.pages.iter().flat_map(|p| p.document.images.iter())
    }

    #[must_use]
    pub fn page(&self, url: &Url) -> Option<&FetchedPage> {
        self.pages.iter().find(|p| p.url == *url)
    }
}

/// Strips the fragment and returns the URL if it is a same-origin http(s)
/// page worth fetching.
#[must_use]
pub fn crawlable(link: &Url, root: &Url) -> Option<Url> {
    if !matches!(link.scheme(), "http" | "https") {
        return None;
    }
    let mut url = link.clone();
    url.set_fragment(None);
    if url.origin() != root.origin() {
        return None;
    }
    let last = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or_default();
    if let Some((_, ext)) = last.rsplit_once('.') {
        if ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return None;
        }
    }
    Some(url)
}

async fn fetch_page(
    fetcher: &PageFetcher,
    url: Url,
    depth: usize,
    sequence: usize,
    deadline: Instant,
) -> Result<FetchedPage, PageFailure> {
    let body = match tokio::time::timeout_at(deadline, fetcher.fetch(&url)).await {
        Ok(Ok(body)) => body,
        Ok(Err(error)) => return Err(PageFailure { url, error }),
        Err(_) => {
            let error = FetchError::Deadline {
                url: url.to_string(),
            };
            return Err(PageFailure { url, error });
        }
    };
    let document = parse_document(&body, &url);
    let metadata = jsonld::harvest(&document.structured_blocks);
    Ok(FetchedPage {
        url,
        depth,
        sequence,
        document,
        metadata,
    })
}

/// Walks `root` breadth-first within the page budget, depth limit, and
/// deadline, then probes fallback paths according to the policy.
///
/// Per-page failures are collected in the outcome and never abort the walk.
pub async fn walk(fetcher: &PageFetcher, root: &Url, options: &CrawlOptions) -> CrawlOutcome {
    let started = std::time::Instant::now();
    let deadline = Instant::now() + options.deadline;
    let concurrency = options.concurrency.max(1);

    let mut root = root.clone();
    root.set_fragment(None);

    let mut seen: HashSet<String> = HashSet::from([root.to_string()]);
    let mut queue: VecDeque<(Url, usize)> = VecDeque::from([(root.clone(), 0)]);
    let mut in_flight = FuturesUnordered::new();
    let mut attempts = 0usize;
    let mut outcome = CrawlOutcome::default();

    loop {
        while in_flight.len() < concurrency && attempts < options.max_pages {
            let Some((url, depth)) = queue.pop_front() else {
                break;
            };
            in_flight.push(fetch_page(fetcher, url, depth, attempts, deadline));
            attempts += 1;
        }

        let Some(result) = in_flight.next().await else {
            break;
        };
        match result {
            Ok(page) => {
                if page.depth < options.max_depth {
                    for link in &page.document.links {
                        let Some(next) = crawlable(link, &root) else {
                            continue;
                        };
                        if seen.insert(next.to_string()) {
                            queue.push_back((next, page.depth + 1));
                        }
                    }
                }
                tracing::debug!(url = %page.url, depth = page.depth, "page fetched");
                outcome.pages.push(page);
            }
            Err(failure) => {
                tracing::debug!(url = %failure.url, error = %failure.error, "page fetch failed");
                outcome.failures.push(failure);
            }
        }
    }
    drop(in_flight);

    let corpus_chars = outcome
        .pages
        .iter()
        .map(|p| p.document.visible_text.chars().count())
        .sum::<usize>();
    let probe = match options.fallback_policy {
        FallbackPolicy::Always => true,
        FallbackPolicy::WhenThin => corpus_chars < options.min_corpus_chars,
        FallbackPolicy::Never => false,
    };
    if probe && Instant::now() < deadline {
        let targets: Vec<Url> = options
            .fallback_paths
            .iter()
            .filter_map(|slug| root.join(&format!("/{}", slug.trim_matches('/'))).ok())
            .filter(|url| seen.insert(url.to_string()))
            .collect();
        tracing::debug!(url = %root, probes = targets.len(), corpus_chars, "probing fallback paths");

        let first_sequence = attempts;
        let results: Vec<_> = futures::stream::iter(targets.into_iter().enumerate())
            .map(|(i, url)| fetch_page(fetcher, url, 1, first_sequence + i, deadline))
            .buffer_unordered(concurrency)
            .collect()
            .await;
        attempts += results.len();
        for result in results {
            match result {
                Ok(page) => outcome.pages.push(page),
                Err(failure) => {
                    tracing::debug!(url = %failure.url, error = %failure.error, "fallback probe failed");
                    outcome.failures.push(failure);
                }
            }
        }
    }

    outcome.pages.sort_by_key(|p| p.sequence);
    tracing::info!(
        url = %root,
        pages = outcome.pages.len(),
        failures = outcome.failures.len(),
        attempts,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "crawl finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn crawlable_strips_fragments() {
        let link = Url::parse("https://example.com/about#team").unwrap();
        assert_eq!(
            crawlable(&link, &root()).map(|u| u.to_string()),
            Some("https://example.com/about".to_string())
        );
    }

    #[test]
    fn crawlable_requires_exact_origin() {
        for raw in [
            "https://blog.example.com/post",
            "http://example.com/about",
            "https://example.com:8443/about",
            "mailto:owner@example.com",
        ] {
            let link = Url::parse(raw).unwrap();
            assert_eq!(crawlable(&link, &root()), None, "{raw}");
        }
    }

    #[test]
    fn crawlable_skips_assets() {
        let link = Url::parse("https://example.com/files/menu.PDF").unwrap();
        assert_eq!(crawlable(&link, &root()), None);
    }
}

pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod jsonld;
pub mod merge;
pub mod walker;

pub use error::{FetchError, ScraperError};
pub use fetch::PageFetcher;
pub use harvest::{harvest_site, SiteHarvest};
pub use merge::{build_record, ExtractedFields};
pub use walker::{walk, CrawlOptions, CrawlOutcome};

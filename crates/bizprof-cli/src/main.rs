use std::sync::Arc;

use anyhow::Context;
use bizprof_core::{AppConfig, BusinessProfileRecord, CrawlTarget, Vocabulary};
use bizprof_summarizer::ProfilePipeline;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bizprof-cli")]
#[command(about = "Build business-profile records from small-business websites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl and print the deterministic fields only; the summarizer is not called.
    Extract(CrawlArgs),
    /// Run the full pipeline, including the summarizer.
    Profile(CrawlArgs),
}

#[derive(Debug, Args)]
struct CrawlArgs {
    /// Root URL of the site to profile.
    url: String,

    /// Override the page budget.
    #[arg(long)]
    max_pages: Option<usize>,

    /// Override the link depth limit.
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print compact JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,
}

impl CrawlArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(max_pages) = self.max_pages {
            config.crawl_max_pages = max_pages;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawl_max_depth = max_depth;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = bizprof_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let (args, full) = match &cli.command {
        Commands::Extract(args) => (args, false),
        Commands::Profile(args) => (args, true),
    };
    args.apply(&mut config);

    let target = CrawlTarget::parse(&args.url)?;
    let vocabulary = Arc::new(Vocabulary::load(config.vocabulary_path.as_deref())?);
    let pipeline = ProfilePipeline::from_config(&config, vocabulary)?;
    tracing::debug!(url = %target, full, max_pages = config.crawl_max_pages, "starting run");

    let record = if full {
        pipeline.profile(&target).await?
    } else {
        pipeline.extract(&target).await?
    };
    print_record(&record, args.compact)
}

fn print_record(record: &BusinessProfileRecord, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(record)
    } else {
        serde_json::to_string_pretty(record)
    }
    .context("failed to serialize record")?;
    println!("{json}");
    Ok(())
}

//! Batch web research from the command line.
//!
//! Reads entity names from a CSV file, researches each one through the
//! configured search/fetch/extract backends, and writes the report to
//! CSV, JSON, or stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use research::{
    BatchConfig, BatchOrchestrator, BatchReport, DuckDuckGoSearcher, GroqExtractor, HttpFetcher,
    ProgressObserver, SearchProvider,
};

mod export;
mod input;

#[derive(Parser)]
#[command(name = "research")]
#[command(about = "Batch web research for a list of entities")]
#[command(version)]
struct Cli {
    /// CSV file with one entity per row
    input: PathBuf,

    /// Column to read entity names from (defaults to the first column)
    #[arg(short, long)]
    column: Option<String>,

    /// Search query template; "{entity}" is replaced with each name
    #[arg(short, long, default_value = research::DEFAULT_TEMPLATE)]
    template: String,

    /// Maximum search results to fetch per entity
    #[arg(long, default_value_t = 3)]
    max_results: usize,

    /// Seconds to wait between entities
    #[arg(long, default_value_t = 2.0)]
    delay_secs: f64,

    /// Search backend
    #[arg(long, value_enum, default_value = "auto")]
    provider: Provider,

    /// Extraction model (defaults to the library's choice)
    #[arg(long)]
    model: Option<String>,

    /// Write the report to this CSV file
    #[arg(long)]
    out_csv: Option<PathBuf>,

    /// Write the report to this JSON file
    #[arg(long)]
    out_json: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Provider {
    /// Tavily when TAVILY_API_KEY is set, DuckDuckGo otherwise
    Auto,
    Duckduckgo,
    Tavily,
}

fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    // Initialize logging to stderr so stdout stays clean for reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,research=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.delay_secs.is_finite() || cli.delay_secs < 0.0 {
        bail!("--delay-secs must be a non-negative number");
    }

    let entities = input::read_entities(&cli.input, cli.column.as_deref())?;
    if entities.is_empty() {
        bail!("No entities found in {}", cli.input.display());
    }

    let config = BatchConfig::new()
        .with_template(cli.template.as_str())
        .with_max_search_results(cli.max_results)
        .with_per_entity_delay(Duration::from_secs_f64(cli.delay_secs));

    let mut extractor = GroqExtractor::from_env()
        .context("GROQ_API_KEY must be set (get a key at https://console.groq.com)")?;
    if let Some(model) = &cli.model {
        extractor = extractor.with_model(model.as_str());
    }

    // Ctrl-C cancels cooperatively: in-flight entities stop, the report
    // still carries one record per input
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, finishing up...");
            ctrl_c_cancel.cancel();
        }
    });

    let fetcher = HttpFetcher::new();
    let use_tavily = match cli.provider {
        Provider::Tavily => true,
        Provider::Duckduckgo => false,
        Provider::Auto => std::env::var("TAVILY_API_KEY").is_ok(),
    };

    let report = if use_tavily {
        let api_key = std::env::var("TAVILY_API_KEY")
            .context("TAVILY_API_KEY must be set to use the Tavily provider")?;
        run_batch(
            research::TavilySearcher::new(api_key),
            fetcher,
            extractor,
            config,
            &entities,
            cancel,
        )
        .await?
    } else {
        run_batch(
            DuckDuckGoSearcher::new(),
            fetcher,
            extractor,
            config,
            &entities,
            cancel,
        )
        .await?
    };

    let mut wrote_file = false;
    if let Some(path) = &cli.out_csv {
        export::write_csv(&report, path)?;
        eprintln!("Wrote {}", path.display());
        wrote_file = true;
    }
    if let Some(path) = &cli.out_json {
        export::write_json(&report, path)?;
        eprintln!("Wrote {}", path.display());
        wrote_file = true;
    }
    if !wrote_file {
        serde_json::to_writer_pretty(std::io::stdout().lock(), report.records())
            .context("Failed to serialize report")?;
        println!();
    }

    eprintln!(
        "Done: {} succeeded, {} partial, {} failed out of {}",
        report.success_count(),
        report.partial_count(),
        report.failed_count(),
        report.len()
    );

    Ok(())
}

/// Drive one batch over the given searcher with a progress bar attached.
async fn run_batch<S: SearchProvider>(
    searcher: S,
    fetcher: HttpFetcher,
    extractor: GroqExtractor,
    config: BatchConfig,
    entities: &[String],
    cancel: CancellationToken,
) -> Result<BatchReport> {
    let bar = ProgressBar::new(entities.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .context("Invalid progress bar template")?
        .progress_chars("=> "),
    );

    let observer_bar = bar.clone();
    let observer: Arc<dyn ProgressObserver> =
        Arc::new(move |completed: usize, _total: usize, entity: &str| {
            observer_bar.set_position(completed as u64);
            observer_bar.set_message(entity.to_string());
        });

    let orchestrator =
        BatchOrchestrator::new(searcher, fetcher, extractor, config).with_observer(observer);
    let report = orchestrator.run_with_cancel(entities, cancel).await?;
    bar.finish_and_clear();
    Ok(report)
}

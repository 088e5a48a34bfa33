//! Binder CLI - card collection spreadsheet tool

use anyhow::{Context, Result};
use binder::prelude::*;
use binder::{FetchStatus, SetIndex, DEFAULT_BASE_URL, DEFAULT_DELAY};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "binder")]
#[command(
    author,
    version,
    about = "Read card collection spreadsheets and look the cards up"
)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG applies otherwise
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the card records found in a collection file
    Records {
        /// Collection file (xlsx, xlsm, csv, json)
        input: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Look every card of a collection up in the catalog
    Fetch {
        /// Collection file (xlsx, xlsm, csv, json)
        input: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Summarize a collection, using cached catalog data
    Stats {
        /// Collection file (xlsx, xlsm, csv, json)
        input: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Card cache written by `fetch`
        #[arg(long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// List the sets known to the catalog
    Sets {
        /// Catalog API root
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },
}

const DEFAULT_CACHE: &str = "binder-cache.json";

#[derive(Args)]
struct ExtractArgs {
    /// Reproduce the historical column handling (one filler cell per gap,
    /// plain label ordering)
    #[arg(long)]
    legacy: bool,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        if self.legacy {
            ExtractOptions::legacy()
        } else {
            ExtractOptions::default()
        }
    }
}

#[derive(Args)]
struct CatalogArgs {
    /// Card cache file
    #[arg(long, default_value = DEFAULT_CACHE)]
    cache: PathBuf,

    /// Pause between catalog requests and between result pages, in
    /// milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY.as_millis() as u64)]
    delay_ms: u64,

    /// Catalog API root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Records {
            input,
            extract,
            format,
        } => show_records(&input, &extract.options(), format),
        Commands::Fetch {
            input,
            extract,
            catalog,
            format,
        } => fetch_cards(&input, &extract.options(), &catalog, format),
        Commands::Stats {
            input,
            extract,
            cache,
            format,
        } => show_stats(&input, &extract.options(), &cache, format),
        Commands::Sets { base_url } => list_sets(&base_url),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_records(input: &Path, options: &ExtractOptions) -> Result<Vec<CardRecord>> {
    let records = load_records(input, options)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    tracing::info!(records = records.len(), "read collection");
    Ok(records)
}

fn client(base_url: &str, delay: Duration) -> Result<HttpCatalogClient> {
    let config = ClientConfig::default()
        .with_base_url(base_url)
        .with_page_delay(delay);
    HttpCatalogClient::new(config).context("Failed to set up the catalog client")
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON")?;
    writeln!(stdout).context("Failed to write to stdout")?;
    Ok(())
}

fn show_records(input: &Path, options: &ExtractOptions, format: Format) -> Result<()> {
    let records = read_records(input, options)?;

    match format {
        Format::Json => print_json(&records)?,
        Format::Text => {
            let width = Status::ALL.iter().map(|s| s.as_str().len()).max().unwrap_or(0);
            let mut stdout = io::stdout().lock();
            for record in &records {
                let status = record.status.as_str();
                writeln!(stdout, "{:<width$}  {}", status, record.name, width = width)
                    .context("Failed to write to stdout")?;
            }
        }
    }

    Ok(())
}

fn fetch_cards(
    input: &Path,
    options: &ExtractOptions,
    args: &CatalogArgs,
    format: Format,
) -> Result<()> {
    let records = read_records(input, options)?;
    let cache = JsonFileCache::open(&args.cache)
        .with_context(|| format!("Failed to read cache '{}'", args.cache.display()))?;

    let delay = Duration::from_millis(args.delay_ms);
    let mut pipeline = FetchPipeline::new(client(&args.base_url, delay)?, cache).with_delay(delay);

    let outcome = pipeline.run(&records, |status: &FetchStatus| {
        eprintln!("{:>3}% {}", status.progress, status.text);
    });

    // Keep whatever was fetched, even when the run stopped early
    pipeline
        .cache_mut()
        .flush()
        .with_context(|| format!("Failed to write cache '{}'", args.cache.display()))?;

    let report = outcome.context("Card lookup failed")?;

    match format {
        Format::Json => print_json(&serde_json::json!({
            "cards": report.cards,
            "missing": report.missing,
        }))?,
        Format::Text => {
            let mut stdout = io::stdout().lock();
            for card in &report.cards {
                writeln!(stdout, "{}  [{}]", card.name(), card.set_codes().join(" "))
                    .context("Failed to write to stdout")?;
            }
        }
    }

    eprintln!(
        "{} cards: {} cached, {} fetched, {} not found",
        report.cards.len() + report.missing.len(),
        report.cached,
        report.fetched,
        report.missing.len()
    );
    for name in &report.missing {
        eprintln!("  not found: {}", name);
    }

    Ok(())
}

fn show_stats(input: &Path, options: &ExtractOptions, cache: &Path, format: Format) -> Result<()> {
    let records = read_records(input, options)?;
    let cache = JsonFileCache::open(cache)
        .with_context(|| format!("Failed to read cache '{}'", cache.display()))?;

    let stats = CollectionStats::compute(&records, &cache);

    match format {
        Format::Json => print_json(&stats)?,
        Format::Text => print_stats(&stats).context("Failed to write to stdout")?,
    }

    Ok(())
}

fn print_stats(stats: &CollectionStats) -> io::Result<()> {
    let mut out = io::stdout().lock();

    writeln!(out, "{:<12}{:>6}", "Cards", stats.total)?;
    for (status, count) in &stats.by_status {
        writeln!(out, "  {:<10}{:>6}", status.as_str(), count)?;
    }
    writeln!(out, "{:<12}{:>5.1}%", "Owned", stats.owned_percent)?;

    if !stats.by_color_identity.is_empty() {
        writeln!(out)?;
        writeln!(out, "Owned by color identity")?;
        for (color, count) in &stats.by_color_identity {
            writeln!(out, "  {:<10}{:>6}", color, count)?;
        }
    }

    if !stats.by_set.is_empty() {
        writeln!(out)?;
        writeln!(out, "Owned by set")?;
        for (set, count) in &stats.by_set {
            writeln!(out, "  {:<10}{:>6}", set, count)?;
        }
    }

    if !stats.unresolved.is_empty() {
        writeln!(out)?;
        writeln!(out, "Not in cache ({}), run `binder fetch` first:", stats.unresolved.len())?;
        for name in &stats.unresolved {
            writeln!(out, "  {}", name)?;
        }
    }

    Ok(())
}

fn list_sets(base_url: &str) -> Result<()> {
    let sets = client(base_url, DEFAULT_DELAY)?
        .list_sets()
        .context("Failed to list sets")?;
    let index = SetIndex::from_sets(sets);

    let mut stdout = io::stdout().lock();
    for (code, set) in index.iter() {
        let released = set
            .released_at
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            stdout,
            "{:<6}  {:<10}  {:>4}  {}",
            code, released, set.card_count, set.name
        )
        .context("Failed to write to stdout")?;
    }

    Ok(())
}

//! persondir CLI
//!
//! Command-line interface for resolving people through a caching lookup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use persondir_cache::{CachingConfig, CachingLookup, StoreKind};
use persondir_core::constants::USERNAME_ATTRIBUTE;
use persondir_core::error::PersonDirError;
use persondir_core::traits::AttributeLookup;
use persondir_core::types::Seed;
use persondir_directory::{FileDirectory, MemoryDirectory};

/// persondir - cached person attribute lookups
#[derive(Parser)]
#[command(name = "persondir")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve seeds through the cache
    Resolve {
        /// Seeds as `name=value[,name=value...]`
        #[arg(required = true)]
        seeds: Vec<String>,

        #[command(flatten)]
        cache: CacheArgs,

        /// Resolve every seed this many times
        #[arg(long, default_value = "1")]
        repeat: usize,

        /// Print only this attribute (any case)
        #[arg(long)]
        show: Option<String>,
    },

    /// List the attribute names the directory can produce
    Attributes {
        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Resolve every directory entry repeatedly and report the hit rate
    Bench {
        #[command(flatten)]
        cache: CacheArgs,

        /// Number of resolve calls
        #[arg(short, long, default_value = "10000")]
        count: usize,
    },
}

/// Options shared by every command that builds a caching lookup.
///
/// Unset options fall back to the `PERSONDIR_*` environment variables.
#[derive(Args)]
struct CacheArgs {
    /// JSON directory file
    #[arg(short, long, env = "PERSONDIR_DIRECTORY")]
    directory: PathBuf,

    /// Attribute the directory is indexed on
    #[arg(long, default_value = USERNAME_ATTRIBUTE)]
    query_attr: String,

    /// Seed attributes forming the cache key
    #[arg(long, value_delimiter = ',')]
    key_attr: Vec<String>,

    /// Fallback cache key attribute
    #[arg(long)]
    default_attr: Option<String>,

    /// Cache store: memory or ttl
    #[arg(long)]
    store: Option<StoreKind>,

    /// TTL of cached records (ttl store)
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Capacity of the cache (ttl store)
    #[arg(long)]
    max_entries: Option<usize>,

    /// Simulated directory latency in milliseconds
    #[arg(long, default_value = "0")]
    latency_ms: u64,
}

impl CacheArgs {
    /// Merges flags over the environment configuration.
    fn caching_config(&self) -> Result<CachingConfig> {
        let mut config = CachingConfig::from_env().context("Invalid PERSONDIR_* environment")?;

        if !self.key_attr.is_empty() {
            config.key_attributes = self.key_attr.clone();
        }
        if let Some(default) = &self.default_attr {
            config.default_attribute = Some(default.clone());
        }
        if config.key_attributes.is_empty() && config.default_attribute.is_none() {
            info!(attribute = %self.query_attr, "No cache key configured, keying on the query attribute");
            config.default_attribute = Some(self.query_attr.clone());
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(ttl) = self.ttl_secs {
            config.store_config.default_ttl_seconds = ttl;
        }
        if let Some(max) = self.max_entries {
            config.store_config.max_entries = max;
        }

        Ok(config)
    }

    async fn open(&self) -> Result<(Arc<FileDirectory>, CachingLookup)> {
        let mut memory = MemoryDirectory::with_query_attribute(&self.query_attr);
        if self.latency_ms > 0 {
            memory = memory.with_latency(Duration::from_millis(self.latency_ms));
        }

        let directory = Arc::new(
            FileDirectory::open_with(&self.directory, memory)
                .await
                .context("Failed to load directory file")?,
        );
        let lookup: Arc<dyn AttributeLookup<String>> = directory.clone();
        let caching = CachingLookup::<String>::from_config(&self.caching_config()?, lookup)
            .context("Failed to configure caching lookup")?;

        Ok((directory, caching))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "persondir=debug,info"
    } else {
        "persondir=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Resolve {
            seeds,
            cache,
            repeat,
            show,
        } => cmd_resolve(&seeds, &cache, repeat, show.as_deref()).await,
        Commands::Attributes { cache } => cmd_attributes(&cache).await,
        Commands::Bench { cache, count } => cmd_bench(&cache, count).await,
    }
}

/// Parses `name=value[,name=value...]` into a seed.
fn parse_seed(raw: &str) -> persondir_core::Result<Seed> {
    let mut seed = Seed::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            PersonDirError::InvalidArgument(format!("expected name=value, got '{}'", pair))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PersonDirError::InvalidArgument(format!(
                "missing attribute name in '{}'",
                pair
            )));
        }
        seed.insert(name, value.trim().to_string());
    }

    if seed.is_empty() {
        return Err(PersonDirError::InvalidArgument(format!("empty seed '{}'", raw)));
    }
    Ok(seed)
}

/// Resolve seeds and print the records
async fn cmd_resolve(raw_seeds: &[String], args: &CacheArgs, repeat: usize, show: Option<&str>) -> Result<()> {
    let seeds = raw_seeds
        .iter()
        .map(|raw| parse_seed(raw))
        .collect::<persondir_core::Result<Vec<_>>>()
        .context("Invalid seed")?;

    let (directory, caching) = args.open().await?;

    for _ in 0..repeat.max(1) {
        for (raw, seed) in raw_seeds.iter().zip(&seeds) {
            let misses_before = caching.stats().misses();
            let started = Instant::now();
            let record = caching
                .resolve(seed)
                .await
                .with_context(|| format!("Failed to resolve '{}'", raw))?;
            let elapsed = started.elapsed();

            let outcome = if caching.stats().misses() > misses_before {
                "MISS".yellow().bold()
            } else {
                "HIT ".green().bold()
            };
            println!("{} {} {}", outcome, raw.cyan(), format!("({:?})", elapsed).dimmed());

            match show {
                Some(attribute) => {
                    let record = record.into_case_insensitive();
                    match record.get(attribute) {
                        Some(values) => println!("   {} {}", format!("{}:", attribute).dimmed(), values.join(", ")),
                        None => println!("   {} {}", format!("{}:", attribute).dimmed(), "<absent>".red()),
                    }
                }
                None if record.is_empty() => println!("   {}", "No matching person".red()),
                None => println!("{}", serde_json::to_string_pretty(&record)?),
            }
        }
    }

    print_stats(&caching, &directory);
    Ok(())
}

/// List the attribute names of the directory
async fn cmd_attributes(args: &CacheArgs) -> Result<()> {
    let (directory, caching) = args.open().await?;

    let names = caching
        .possible_attribute_names()
        .await
        .context("Failed to list attribute names")?;

    println!(
        "{} {}",
        "📇 Attributes in".cyan().bold(),
        directory.path().display()
    );
    for name in names {
        println!("   {}", name);
    }

    Ok(())
}

/// Benchmark the cache against the directory
async fn cmd_bench(args: &CacheArgs, count: usize) -> Result<()> {
    let (directory, caching) = args.open().await?;
    let lookup: &dyn AttributeLookup<String> = &caching;

    let ids = directory.memory().ids();
    if ids.is_empty() {
        anyhow::bail!("Directory {} has no records", directory.path().display());
    }

    println!(
        "{} {} resolves over {} people",
        "⏱️  Benchmarking".cyan().bold(),
        count,
        ids.len()
    );

    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let started = Instant::now();
    for i in 0..count {
        let seed = Seed::new().with(args.query_attr.as_str(), ids[i % ids.len()].clone());
        lookup.resolve(&seed).await.context("Resolve failed during benchmark")?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let elapsed = started.elapsed();
    println!(
        "   {} {:?} ({:.1} µs/resolve)",
        "Elapsed:".dimmed(),
        elapsed,
        elapsed.as_micros() as f64 / count.max(1) as f64
    );
    print_stats(&caching, &directory);

    Ok(())
}

fn print_stats(caching: &CachingLookup, directory: &FileDirectory) {
    let snapshot = caching.stats().snapshot();

    println!("\n{}", "📊 Cache stats:".yellow().bold());
    println!("   {} {}", "Queries:".dimmed(), snapshot.queries);
    println!("   {} {}", "Hits:".dimmed(), snapshot.hits.to_string().green());
    println!("   {} {}", "Misses:".dimmed(), snapshot.misses.to_string().yellow());
    println!("   {} {:.1}%", "Hit rate:".dimmed(), snapshot.hit_rate * 100.0);
    println!("   {} {}", "Directory lookups:".dimmed(), directory.memory().lookups());
}

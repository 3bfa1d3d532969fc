use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use allnews::config::Config;
use allnews::pipeline::Pipeline;
use allnews::retention::sweep_stale_outputs;
use allnews::sources::{builtin_sources, select_feed_urls, Selection};

/// Get the config directory path (~/.config/allnews/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("allnews"))
}

#[derive(Parser, Debug)]
#[command(
    name = "allnews",
    about = "Fetch the articles behind RSS feeds and save their text"
)]
struct Args {
    /// Config file (default: ~/.config/allnews/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Feed source to include, by name (repeatable; default: all)
    #[arg(long = "source", value_name = "NAME")]
    sources: Vec<String>,

    /// Extra feed URL, fetched after the selected sources
    #[arg(long, value_name = "URL")]
    custom_url: Option<String>,

    /// Select no preset sources
    #[arg(long, conflicts_with = "sources")]
    no_presets: bool,

    /// Where result files are written (overrides the config file)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print the available sources and exit
    #[arg(long)]
    list_sources: bool,
}

impl Args {
    fn selection(&self) -> Selection {
        if self.no_presets {
            Selection::None
        } else if self.sources.is_empty() {
            Selection::All
        } else {
            Selection::Named(self.sources.clone())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the run log; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }

    let registry = if config.sources.is_empty() {
        builtin_sources()
    } else {
        std::mem::take(&mut config.sources)
    };

    if args.list_sources {
        for source in &registry {
            println!("{}\t{}", source.name, source.url);
        }
        return Ok(());
    }

    let feed_urls = select_feed_urls(&registry, &args.selection(), args.custom_url.as_deref())?;
    if feed_urls.is_empty() {
        tracing::warn!("No feeds selected");
    }

    let retention = Duration::from_secs(config.retention_minutes.saturating_mul(60));
    sweep_stale_outputs(&config.output_dir, retention, None).with_context(|| {
        format!(
            "Failed to clean up output directory {}",
            config.output_dir.display()
        )
    })?;

    let pipeline = Pipeline::from_config(&config).context("Failed to build HTTP client")?;
    let result = pipeline
        .execute(&feed_urls, &config.output_dir)
        .await
        .context("Failed to save results")?;

    println!("{}", result.log.render());
    println!("{}", result.output_path.display());

    Ok(())
}

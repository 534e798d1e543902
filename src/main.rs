//! Shiori-Archive main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use shiori_archive::config::{load_site_profile, ArchiveConfig};
use shiori_archive::crawler::crawl;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Shiori-Archive: a polite single-site article archiver
///
/// Walks the target site from its root URL, extracts article pages and
/// their embedded images, and writes each article exactly once to a
/// per-article directory. Re-running against the same output path resumes
/// where the previous run stopped.
#[derive(Parser, Debug)]
#[command(name = "shiori-archive")]
#[command(version)]
#[command(about = "A polite single-site article archiver", long_about = None)]
struct Cli {
    /// Root URL of the site to archive
    #[arg(short, long)]
    url: String,

    /// Path to save the result under
    #[arg(short, long)]
    path: PathBuf,

    /// Proxy used for fetching images
    #[arg(long)]
    proxy: Option<String>,

    /// TOML file with site-specific choices (id pattern, metadata policy)
    #[arg(long, value_name = "TOML")]
    site_profile: Option<PathBuf>,

    /// Minimum delay between page requests (milliseconds)
    #[arg(long, default_value_t = 1000)]
    request_delay_ms: u64,

    /// Delay before each image download (milliseconds)
    #[arg(long, default_value_t = 1000)]
    image_delay_ms: u64,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let root_url = Url::parse(&cli.url)
        .with_context(|| format!("invalid root URL '{}'", cli.url))?;

    let mut config = ArchiveConfig::new(root_url, cli.path);
    config.proxy = cli.proxy;
    config.request_delay_ms = cli.request_delay_ms;
    config.image_delay_ms = cli.image_delay_ms;

    if let Some(profile_path) = &cli.site_profile {
        config.profile = load_site_profile(profile_path)
            .with_context(|| format!("failed to load site profile {}", profile_path.display()))?;
    }

    let summary = crawl(config).await?;
    println!("{}", summary);

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shiori_archive=info,warn"),
            1 => EnvFilter::new("shiori_archive=debug,info"),
            2 => EnvFilter::new("shiori_archive=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

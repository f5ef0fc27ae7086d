//! review-verdict - Buy / Don't Buy verdicts from retail product reviews
//!
//! Fetches product review pages with TLS fingerprint emulation and scores them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use review_verdict::commands::AnalyzeCommand;
use review_verdict::config::{Config, OutputFormat, MAX_PAGE_CAP};
use review_verdict::site::Site;
use review_verdict::verdict::Policy;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "review-verdict",
    version,
    about = "Buy / Don't Buy verdicts from product reviews",
    long_about = "Extracts reviews from Amazon and Flipkart product pages, classifies their sentiment and prints a buying verdict."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "RV_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "RV_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the reviews of one or more products
    #[command(alias = "a")]
    Analyze {
        /// Product page URL(s)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Maximum number of review pages per product
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_CAP as i64))]
        pages: Option<u32>,

        /// Aggregation policy (percentage, count-majority)
        #[arg(long)]
        policy: Option<Policy>,

        /// Site to assume instead of detecting it from the URL
        #[arg(long)]
        site: Option<Site>,
    },

    /// List supported sites
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Analyze { urls, pages, policy, site } => {
            if let Some(pages) = pages {
                config.page_cap = pages;
            }
            if let Some(policy) = policy {
                config.policy = policy;
            }

            let cmd = AnalyzeCommand::new(config).with_site(site);

            let output = if urls.len() == 1 {
                cmd.execute(&urls[0]).await?
            } else {
                cmd.execute_batch(&urls).await?
            };

            println!("{}", output);
        }

        Commands::Sites => {
            println!("Supported sites:\n");
            println!("{:<10} {:<15}", "Code", "Domain");
            println!("{:-<10} {:-<15}", "", "");

            for site in Site::all() {
                println!("{:<10} {:<15}", site.to_string(), site.domain());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_page_cap_and_policy_env_left_to_config() {
        let cli = Cli::command();
        let analyze = cli.find_subcommand("analyze").unwrap();

        for id in ["pages", "policy"] {
            let arg = analyze.get_arguments().find(|arg| arg.get_id() == id).unwrap();
            assert!(arg.get_env().is_none(), "--{} reads the environment", id);
        }
    }

    #[test]
    fn test_pages_flag_range() {
        let parse = |pages: &str| {
            let url = "https://www.amazon.in/dp/B0TEST0001";
            Cli::try_parse_from(["review-verdict", "analyze", "--pages", pages, url])
        };

        assert!(parse("10").is_ok());
        assert!(parse("0").is_err());
        assert!(parse("11").is_err());
    }
}

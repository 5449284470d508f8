use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "storefront-scraper")]
#[command(about = "HTTP API for scraping pages and storefront category listings")]
#[command(version)]
pub struct Args {
    /// JSON configuration file (defaults to ./config.json when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

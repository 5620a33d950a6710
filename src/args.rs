use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chart-pages")]
#[command(about = "Downloads sheet music preview pages and packs them into per-instrument PDFs")]
#[command(version)]
pub struct Args {
    /// A song details URL or a .txt file with one URL per line
    pub input: Option<String>,

    /// A single URL to download (same as the positional input)
    #[arg(long = "url")]
    pub url: Option<String>,

    /// A .txt file containing a list of URLs
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Output directory for downloads
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Run the browser with a visible window
    #[arg(long)]
    pub headed: bool,

    /// Enable detailed debug logging
    #[arg(long)]
    pub debug: bool,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// WebDriver endpoint (overrides config and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

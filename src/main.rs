use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process;

use chart_pages::batch::{self, SinglePlan};
use chart_pages::urls::{InputKind, classify_input, is_song_details_url, normalize_url};
use chart_pages::ui::Console;
use chart_pages::{AppConfig, HttpFetcher, RunStats};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    let console = Console::new();
    let mut args = Args::parse();

    if args.file.is_none() {
        if let Some(raw) = args.input.take() {
            match classify_input(&raw) {
                Ok(InputKind::ListFile(path)) => args.file = Some(path),
                Ok(InputKind::Url(url)) => args.input = Some(url),
                Err(_) => args.input = Some(raw),
            }
        }
    }

    if args.file.is_none() && args.input.is_none() && args.url.is_none() {
        console.header("Interactive Mode");
        interactive_settings(&console, &mut args);
        let raw = console.prompt("Enter chart URL or path to a file with URLs:", "");
        match classify_input(&raw) {
            Ok(InputKind::Url(url)) => args.input = Some(url),
            Ok(InputKind::ListFile(path)) => args.file = Some(path),
            Err(message) => {
                console.error(&message);
                let _ = Args::command().print_help();
                process::exit(2);
            }
        }
    }

    init_logging(args.debug);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            console.error(&format!("Failed to load configuration: {e}"));
            process::exit(1);
        }
    };
    ::log::debug!("Configuration: {:?}", config);

    let fetcher = match HttpFetcher::new(&config, console.clone()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            console.error(&format!("Failed to create HTTP client: {e}"));
            process::exit(1);
        }
    };

    let mut stats = RunStats::default();
    let single = args.input.clone().or_else(|| args.url.clone());

    if let Some(file) = &args.file {
        if single.is_some() {
            console.warning(
                "Both a list file and a URL were provided. The list will be processed; the single URL will be ignored.",
            );
        }
        let entries = match batch::read_url_list(file) {
            Ok(entries) => entries,
            Err(e) => {
                console.error(&e.to_string());
                process::exit(1);
            }
        };

        let (urls, invalid) = batch::partition_urls(&entries);
        batch::report_invalid(&console, &invalid);
        stats.skipped += invalid.len();
        if urls.is_empty() {
            console.warning("No valid URLs to process.");
            process::exit(0);
        }

        let tasks = batch::plan_batch(
            &console,
            &urls,
            &config.download_dir,
            |question| console.prompt(question, ""),
            &mut stats,
        );
        batch::run_tasks(&console, &config, &fetcher, &tasks, &mut stats).await;
    } else if let Some(raw) = single {
        let Some(url) = normalize_url(&raw) else {
            console.error(&format!("Invalid URL: {raw}"));
            process::exit(2);
        };
        if !is_song_details_url(&url) {
            console.error(
                "Unsupported URL. Expected something like 'praisecharts.com/songs/details/...'",
            );
            process::exit(2);
        }

        match batch::plan_single(
            &url,
            &config.download_dir,
            |question| console.prompt(question, ""),
            &mut stats,
        ) {
            SinglePlan::Run(task) => {
                batch::run_tasks(&console, &config, &fetcher, &[task], &mut stats).await;
            }
            SinglePlan::Skip => console.info("Skipping."),
            SinglePlan::Quit => {
                eprintln!("Operation cancelled.");
                process::exit(1);
            }
        }
    }

    batch::print_summary(&console, &stats);
}

/// `--debug` turns on this crate's debug output; RUST_LOG still wins when set
fn init_logging(debug: bool) {
    let default_filter = if debug { "chart_pages=debug,info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_config(args: &Args) -> chart_pages::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides();

    if let Some(outdir) = &args.outdir {
        config.download_dir = outdir.clone();
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = url.clone();
    }
    Ok(config)
}

/// Numbered quick settings shown before the interactive URL prompt
fn interactive_settings(console: &Console, args: &mut Args) {
    let current_outdir = args
        .outdir
        .clone()
        .unwrap_or_else(|| PathBuf::from("charts"));

    console.info("Quick settings (enter numbers separated by space, or press Enter to skip):");
    console.item(1, "Show browser window (disable headless)");
    console.item(2, "Enable debug logging");
    console.item(
        3,
        &format!(
            "Change output directory (current: {})",
            current_outdir.display()
        ),
    );

    let answer = console.prompt("Your choice:", "");
    let choices: Vec<u32> = answer
        .split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect();

    if choices.contains(&1) {
        args.headed = true;
    }
    if choices.contains(&2) {
        args.debug = true;
    }
    if choices.contains(&3) {
        let outdir = console.prompt("Output directory:", "");
        if !outdir.is_empty() {
            args.outdir = Some(PathBuf::from(outdir));
        }
    }
}

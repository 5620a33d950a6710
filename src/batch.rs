//! Turning operator input into a queue of session targets and running it.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fetch::HttpFetcher;
use crate::paths::{self, arrangement_path, next_available_dir};
use crate::results::RunStats;
use crate::session;
use crate::ui::{Console, parse_selection};
use crate::urls::{is_song_details_url, normalize_url};

/// Invalid list entries echoed before the rest are summarized
const MAX_LISTED_INVALID: usize = 10;

/// One queued session target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub url: String,
    pub target: PathBuf,
}

/// Decision for a single URL whose target already exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinglePlan {
    Run(Task),
    Skip,
    Quit,
}

/// Read a URL list file: one URL per line, `#` comments and blank lines ignored
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::InvalidInput(format!(
            "File not found at {}",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Provided file is a directory, not a file: {}",
            path.display()
        )));
    }
    let is_txt = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if !is_txt {
        return Err(Error::InvalidInput(format!(
            "Provided file is not a .txt file: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidInput(format!("Failed to read file {}: {}", path.display(), e))
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Split raw entries into normalized chart URLs and rejected entries
pub fn partition_urls(entries: &[String]) -> (Vec<String>, Vec<String>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for entry in entries {
        match normalize_url(entry) {
            Some(url) if is_song_details_url(&url) => valid.push(url),
            _ => invalid.push(entry.clone()),
        }
    }
    (valid, invalid)
}

/// Report rejected list entries
pub fn report_invalid(console: &Console, invalid: &[String]) {
    if invalid.is_empty() {
        return;
    }
    console.warning("Some entries are not valid chart song URLs and will be skipped:");
    for entry in invalid.iter().take(MAX_LISTED_INVALID) {
        console.item("-", entry);
    }
    if invalid.len() > MAX_LISTED_INVALID {
        console.info(&format!(
            "... and {} more",
            invalid.len() - MAX_LISTED_INVALID
        ));
    }
}

/// Queue a batch of URLs, asking the operator what to do with existing targets.
///
/// Conflicting targets can be overwritten first, then renamed; whatever is
/// left is skipped. Non-conflicting URLs are queued after the resolved ones.
pub fn plan_batch(
    console: &Console,
    urls: &[String],
    download_dir: &Path,
    mut ask: impl FnMut(&str) -> String,
    stats: &mut RunStats,
) -> Vec<Task> {
    let mut conflicts = Vec::new();
    let mut fresh = Vec::new();
    for url in urls {
        let task = Task {
            url: url.clone(),
            target: arrangement_path(url, download_dir),
        };
        if task.target.exists() {
            conflicts.push(task);
        } else {
            fresh.push(task);
        }
    }

    let mut tasks = Vec::new();
    if !conflicts.is_empty() {
        console.header("Conflict Resolution");
        console.warning("Found existing arrangements:");
        list_conflicts(console, &conflicts);

        let answer =
            ask("Enter numbers to 'Overwrite' (e.g., '1 2', 'all', or Enter to skip):");
        let selected = parse_selection(console, &answer, conflicts.len());
        let overwrite = take_selected(&mut conflicts, &selected);
        stats.overwritten += overwrite.len();
        tasks.extend(overwrite);

        if !conflicts.is_empty() {
            list_conflicts(console, &conflicts);
            let answer =
                ask("Enter numbers to 'Add number' (e.g., '1 2', 'all', or Enter to skip):");
            let selected = parse_selection(console, &answer, conflicts.len());
            let renamed = take_selected(&mut conflicts, &selected);
            stats.renamed += renamed.len();
            tasks.extend(renamed.into_iter().map(|task| Task {
                target: next_available_dir(&task.target),
                url: task.url,
            }));
        }
    }

    stats.skipped += conflicts.len();
    stats.new += fresh.len();
    tasks.extend(fresh);
    tasks
}

fn list_conflicts(console: &Console, conflicts: &[Task]) {
    for (i, task) in conflicts.iter().enumerate() {
        console.item(i + 1, &paths::display_path(&task.target));
    }
}

/// Remove the tasks at `indices` from `pool`, keeping their on-screen order
fn take_selected(pool: &mut Vec<Task>, indices: &[usize]) -> Vec<Task> {
    let mut picked = Vec::new();
    let mut kept = Vec::new();
    for (i, task) in pool.drain(..).enumerate() {
        if indices.contains(&i) {
            picked.push(task);
        } else {
            kept.push(task);
        }
    }
    *pool = kept;
    picked
}

/// Decide how to handle a single URL, asking only when its target exists
pub fn plan_single(
    url: &str,
    download_dir: &Path,
    ask: impl FnOnce(&str) -> String,
    stats: &mut RunStats,
) -> SinglePlan {
    let target = arrangement_path(url, download_dir);
    if !target.exists() {
        stats.new += 1;
        return SinglePlan::Run(Task {
            url: url.to_string(),
            target,
        });
    }

    let question = format!(
        "Path '{}' exists. [O]verwrite, [N]umber, [S]kip, [Q]uit?",
        paths::display_path(&target)
    );
    match ask(&question).trim().to_ascii_lowercase().as_str() {
        "o" => {
            stats.overwritten += 1;
            SinglePlan::Run(Task {
                url: url.to_string(),
                target,
            })
        }
        "n" => {
            stats.renamed += 1;
            SinglePlan::Run(Task {
                url: url.to_string(),
                target: next_available_dir(&target),
            })
        }
        "q" => SinglePlan::Quit,
        _ => {
            stats.skipped += 1;
            SinglePlan::Skip
        }
    }
}

/// Process queued tasks one after another; a failing task never stops the queue
pub async fn run_tasks(
    console: &Console,
    config: &AppConfig,
    fetcher: &HttpFetcher,
    tasks: &[Task],
    stats: &mut RunStats,
) {
    console.header("Processing Queue");
    for (i, task) in tasks.iter().enumerate() {
        let (song, _) = paths::path_components(&task.url);
        console.info(&format!(
            "[{}/{}] Queued: {} -> {}",
            i + 1,
            tasks.len(),
            song,
            paths::display_path(&task.target)
        ));

        match session::process_url(console, config, fetcher, &task.url, &task.target).await {
            Ok(report) => {
                ::log::info!(
                    "{} finished: {} page(s), {}",
                    task.url,
                    report.traversal.pages.len(),
                    report.traversal.end
                );
            }
            Err(e) => {
                console.error(&format!("Failed to process {}: {}", task.url, e));
                stats.errors += 1;
            }
        }
    }
}

/// Print the end-of-run counters
pub fn print_summary(console: &Console, stats: &RunStats) {
    console.header("Summary");
    console.success(&format!("New downloads: {}", stats.new));
    console.info(&format!("Overwritten: {}", stats.overwritten));
    console.info(&format!("Renamed: {}", stats.renamed));
    console.warning(&format!("Skipped: {}", stats.skipped));
    if stats.errors > 0 {
        console.error(&format!("Errors: {}", stats.errors));
    }
    println!("\nWork complete.");
}

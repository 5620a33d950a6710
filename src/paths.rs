use std::path::{Path, PathBuf};
use url::Url;

/// Song and arrangement slugs derived from a song details URL.
///
/// `/songs/details/<id>/<song>-sheet-music/<arrangement>` yields `(song, arrangement)`;
/// the arrangement defaults to `default` when the URL stops at the song.
pub fn path_components(url: &str) -> (String, String) {
    let fallback = ("unknown-song".to_string(), "unknown-arrangement".to_string());
    let Ok(parsed) = Url::parse(url) else {
        return fallback;
    };

    let parts: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
    let Some(id_index) = parts
        .iter()
        .position(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
    else {
        return fallback;
    };

    let Some(song) = parts.get(id_index + 1) else {
        return fallback;
    };
    let song = song.strip_suffix("-sheet-music").unwrap_or(song).to_string();
    let arrangement = parts
        .get(id_index + 2)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "default".to_string());
    (song, arrangement)
}

/// `<download_dir>/<song>/<arrangement>` for a song details URL
pub fn arrangement_path(url: &str, download_dir: &Path) -> PathBuf {
    let (song, arrangement) = path_components(url);
    download_dir.join(song).join(arrangement)
}

/// First `<base>_N` (N from 1) that does not exist yet
pub fn next_available_dir(base: &Path) -> PathBuf {
    let mut counter = 1u32;
    loop {
        let mut name = base.as_os_str().to_owned();
        name.push(format!("_{counter}"));
        let candidate = PathBuf::from(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Best-effort relative rendering of a path for console output
pub fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

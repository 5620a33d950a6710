use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Host suffix every accepted chart URL must have
pub const SITE_DOMAIN: &str = "praisecharts.com";

/// Path segment that marks a song details page
pub const SONG_DETAILS_PATH: &str = "/songs/details/";

/// What the operator handed us on the command line or at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// A single, already normalized chart URL
    Url(String),
    /// A newline-delimited list of URLs
    ListFile(PathBuf),
}

/// Normalize a user-supplied URL.
///
/// Adds `https://` when no scheme is given and rejects anything without a host
/// or containing whitespace.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).ok()?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Some(candidate),
        _ => None,
    }
}

/// Check whether a URL points at a song details page on the chart site
pub fn is_song_details_url(url: &str) -> bool {
    let Some(normalized) = normalize_url(url) else {
        return false;
    };
    let Ok(parsed) = Url::parse(&normalized) else {
        return false;
    };

    let host_ok = parsed
        .host_str()
        .map(|host| host.ends_with(SITE_DOMAIN))
        .unwrap_or(false);
    host_ok && parsed.path().contains(SONG_DETAILS_PATH)
}

/// Probe whether a URL bounces to the site root (the site's way of saying "not found").
///
/// Uses HEAD and falls back to GET when the server rejects HEAD. Network problems
/// are not treated as a redirect; the browser session will surface them instead.
pub async fn redirects_to_domain_root(
    url: &str,
    client: &reqwest::Client,
    timeout: Duration,
) -> bool {
    let Ok(original) = Url::parse(url) else {
        return false;
    };
    let original_path = original.path();
    if original_path.is_empty() || original_path == "/" {
        return false;
    }

    let response = match client.head(url).timeout(timeout).send().await {
        Ok(resp) if resp.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED => {
            match client.get(url).timeout(timeout).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    ::log::debug!("Redirect probe GET failed for {}: {}", url, e);
                    return false;
                }
            }
        }
        Ok(resp) => resp,
        Err(e) => {
            ::log::debug!("Redirect probe HEAD failed for {}: {}", url, e);
            return false;
        }
    };

    let final_path = response.url().path();
    ::log::debug!(
        "Redirect probe for {} ended at {} with status {}",
        url,
        response.url(),
        response.status()
    );
    (final_path.is_empty() || final_path == "/")
        || response.status() == reqwest::StatusCode::NOT_FOUND
}

/// Decide whether raw operator input is a URL or a list file
pub fn classify_input(raw: &str) -> Result<InputKind, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("Empty input.".to_string());
    }

    let lower = s.to_ascii_lowercase();
    let path = Path::new(s);
    if lower.ends_with(".txt") || path.is_file() {
        return Ok(InputKind::ListFile(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(format!("Provided path is a directory, not a file: {s}"));
    }
    if lower.starts_with("https://") || lower.starts_with("http://") {
        return normalize_url(s)
            .map(InputKind::Url)
            .ok_or_else(|| format!("Invalid URL: {s}"));
    }

    let bare = format!("{SITE_DOMAIN}{SONG_DETAILS_PATH}");
    if lower.starts_with(&bare) || lower.starts_with(&format!("www.{bare}")) {
        return normalize_url(s)
            .map(InputKind::Url)
            .ok_or_else(|| format!("Invalid chart URL: {s}"));
    }

    Err("Could not determine if input is a URL or a path to a .txt file.".to_string())
}

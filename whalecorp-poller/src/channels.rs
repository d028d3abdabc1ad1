//! Channel input normalization and public URLs.

use reqwest::Url;

/// Public channel page origin.
pub const WATCH_BASE_URL: &str = "https://www.twitch.tv";

/// Preview thumbnail dimensions.
pub const THUMBNAIL_WIDTH: u32 = 320;
pub const THUMBNAIL_HEIGHT: u32 = 180;

/// Reduce a raw channel input to a bare lowercase login.
///
/// - `https://www.twitch.tv/Faaaxy/videos` -> `faaaxy` (first path segment)
/// - `@Faaaxy` -> `faaaxy`
/// - ` Trick Masteh ` -> `trickmasteh` (all whitespace removed)
///
/// Returns `None` when nothing is left.
pub fn normalize_login(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if trimmed.starts_with("http") {
        if let Ok(url) = Url::parse(trimmed) {
            return url
                .path_segments()
                .and_then(|mut segments| segments.find(|s| !s.is_empty()))
                .map(str::to_lowercase);
        }
    }

    let login: String = trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    (!login.is_empty()).then_some(login)
}

/// Normalize every input, drop blanks, and keep at most `max` in order.
pub fn normalize_channels<S: AsRef<str>>(inputs: &[S], max: usize) -> Vec<String> {
    inputs
        .iter()
        .filter_map(|raw| normalize_login(raw.as_ref()))
        .take(max)
        .collect()
}

pub fn watch_url(login: &str) -> String {
    format!("{}/{}", WATCH_BASE_URL, urlencoding::encode(login))
}

/// Live preview image, with a cache-buster so each cycle fetches a new frame.
pub fn thumbnail_url(login: &str, cache_buster: i64) -> String {
    format!(
        "https://static-cdn.jtvnw.net/previews-ttv/live_user_{}-{}x{}.jpg?cb={}",
        urlencoding::encode(login),
        THUMBNAIL_WIDTH,
        THUMBNAIL_HEIGHT,
        cache_buster
    )
}

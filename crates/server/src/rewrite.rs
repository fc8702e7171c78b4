//! Playlist rewriting: presign every segment reference.

use crate::error::ApiResult;
use std::time::Duration;
use vitrine_core::playlist::MediaPlaylist;
use vitrine_storage::ObjectGateway;

/// Directory portion of an object key, used to resolve relative segment URIs.
///
/// `show/ep1/playlist.m3u8` -> `show/ep1`; a bare key resolves against the
/// bucket root.
pub fn base_path(resource_path: &str) -> &str {
    resource_path
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or("")
}

/// Segment URIs that already point somewhere else are passed through as-is.
fn is_absolute(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolve a relative segment URI to an object key.
pub fn resolve_segment_key(base_path: &str, uri: &str) -> String {
    let uri = uri.strip_prefix("./").unwrap_or(uri);
    if base_path.is_empty() {
        uri.to_string()
    } else {
        format!("{base_path}/{uri}")
    }
}

/// Parse playlist text, replace every relative segment URI with a presigned
/// URL, bump the declared version, and serialize.
///
/// Segment order, tags and `#EXTINF` payloads are untouched. All presigned
/// URLs share the same `remaining` lifetime, computed once by the caller so
/// every URL in one response expires together with the link itself.
pub async fn rewrite_playlist(
    gateway: &dyn ObjectGateway,
    base_path: &str,
    original: &str,
    remaining: Duration,
) -> ApiResult<String> {
    let mut playlist = MediaPlaylist::parse(original)?;
    playlist.version = Some(playlist.version.unwrap_or(0) + 1);

    for segment in &mut playlist.segments {
        if is_absolute(&segment.uri) {
            continue;
        }
        let key = resolve_segment_key(base_path, &segment.uri);
        segment.uri = gateway.presign_get(&key, remaining).await?;
    }

    Ok(playlist.to_m3u8_text())
}

//! Test fixtures: link construction helpers and playlist documents.

use vitrine_core::capability::compute_digest;

/// Salt configured by `AppConfig::for_testing`.
#[allow(dead_code)]
pub const TEST_SALT: &str = "test-salt";

/// An expiry far in the future (year 2100).
#[allow(dead_code)]
pub const FUTURE_EXPIRY_MS: i64 = 4_102_444_800_000;

/// An expiry long in the past.
#[allow(dead_code)]
pub const PAST_EXPIRY_MS: i64 = 1_000;

/// Build a signed link path for a key, signed with the test salt.
#[allow(dead_code)]
pub fn signed_path(expiry_ms: i64, key: &str) -> String {
    let digest = compute_digest(expiry_ms, key, TEST_SALT);
    format!("/{expiry_ms}/{digest}/{key}")
}

/// A media playlist with three relative segments.
#[allow(dead_code)]
pub const EP1_PLAYLIST: &str = "\
#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:10
#EXT-X-MEDIA-SEQUENCE:0
#EXTINF:9.009,
seg0.ts
#EXTINF:9.009,
seg1.ts
#EXTINF:3.003,
seg2.ts
#EXT-X-ENDLIST
";

/// A media playlist whose only segment is an absolute URL.
#[allow(dead_code)]
pub const ABSOLUTE_PLAYLIST: &str = "\
#EXTM3U
#EXT-X-VERSION:3
#EXTINF:6.0,
https://cdn.example.com/live/seg0.ts
#EXT-X-ENDLIST
";

//! HLS media playlist parsing and serialization.
//!
//! The model keeps the rewriter's hands off everything it does not own:
//! header tags and segment-level tags are carried as raw lines in original
//! order, and each segment keeps its raw `#EXTINF` payload, so a
//! parse/serialize round trip reproduces untouched fields exactly.

use crate::error::{Error, Result};

/// Tags that apply to the next media segment rather than the playlist.
fn is_segment_tag(line: &str) -> bool {
    const PREFIXED: [&str; 6] = [
        "#EXT-X-BYTERANGE:",
        "#EXT-X-KEY:",
        "#EXT-X-MAP:",
        "#EXT-X-PROGRAM-DATE-TIME:",
        "#EXT-X-DATERANGE:",
        "#EXT-X-BITRATE:",
    ];
    // EXT-X-DISCONTINUITY must be an exact match: EXT-X-DISCONTINUITY-SEQUENCE
    // is a playlist-level tag.
    line == "#EXT-X-DISCONTINUITY"
        || line == "#EXT-X-GAP"
        || PREFIXED.iter().any(|p| line.starts_with(p))
}

/// One media segment: a URI plus its `#EXTINF` line and any tags that
/// precede it.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaSegment {
    /// Segment reference, relative or absolute. The only field the rewriter
    /// mutates.
    pub uri: String,
    /// Declared duration in seconds, parsed from `#EXTINF`.
    pub duration: f64,
    /// Raw `#EXTINF` payload (everything after the colon), preserved
    /// verbatim for round-trip stability.
    pub extinf: String,
    /// Segment-level tags in original order (`#EXT-X-KEY`, byteranges,
    /// discontinuities, ...), passed through untouched.
    pub tags: Vec<String>,
}

/// An HLS media playlist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaPlaylist {
    /// Declared `#EXT-X-VERSION`, if any.
    pub version: Option<u32>,
    /// Playlist-level tags in original order, excluding the version tag.
    pub header_tags: Vec<String>,
    /// Media segments in playback order.
    pub segments: Vec<MediaSegment>,
    /// Whether the playlist carried `#EXT-X-ENDLIST`.
    pub end_list: bool,
}

impl MediaPlaylist {
    /// Parse playlist text.
    ///
    /// Requires the `#EXTM3U` header. A segment URI without a preceding
    /// `#EXTINF`, or an `#EXTINF` without a following URI, is an error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

        let first = lines
            .by_ref()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| Error::PlaylistParse("empty document".to_string()))?;
        if first.trim() != "#EXTM3U" {
            return Err(Error::PlaylistParse(format!(
                "missing #EXTM3U header, got: {first}"
            )));
        }

        let mut playlist = MediaPlaylist::default();
        // (duration, raw payload) of an #EXTINF awaiting its URI.
        let mut pending_inf: Option<(f64, String)> = None;
        let mut pending_tags: Vec<String> = Vec::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(value) = line.strip_prefix("#EXT-X-VERSION:") {
                playlist.version = Some(value.trim().parse().map_err(|e| {
                    Error::PlaylistParse(format!("invalid #EXT-X-VERSION '{value}': {e}"))
                })?);
            } else if let Some(payload) = line.strip_prefix("#EXTINF:") {
                if pending_inf.is_some() {
                    return Err(Error::PlaylistParse(
                        "#EXTINF not followed by a segment URI".to_string(),
                    ));
                }
                let duration_str = payload.split(',').next().unwrap_or("").trim();
                let duration = duration_str.parse().map_err(|e| {
                    Error::PlaylistParse(format!("invalid #EXTINF duration '{duration_str}': {e}"))
                })?;
                pending_inf = Some((duration, payload.to_string()));
            } else if line == "#EXT-X-ENDLIST" {
                playlist.end_list = true;
            } else if line.starts_with("#EXT") {
                if is_segment_tag(line) || pending_inf.is_some() {
                    pending_tags.push(line.to_string());
                } else {
                    playlist.header_tags.push(line.to_string());
                }
            } else if line.starts_with('#') {
                // Plain comment, not part of the canonical form.
            } else {
                let (duration, extinf) = pending_inf.take().ok_or_else(|| {
                    Error::PlaylistParse(format!("segment URI without #EXTINF: {line}"))
                })?;
                playlist.segments.push(MediaSegment {
                    uri: line.to_string(),
                    duration,
                    extinf,
                    tags: std::mem::take(&mut pending_tags),
                });
            }
        }

        if pending_inf.is_some() {
            return Err(Error::PlaylistParse(
                "#EXTINF at end of document without a segment URI".to_string(),
            ));
        }
        if !pending_tags.is_empty() {
            return Err(Error::PlaylistParse(
                "segment tags at end of document without a segment URI".to_string(),
            ));
        }

        Ok(playlist)
    }

    /// Serialize to canonical playlist text.
    ///
    /// Output is deterministic for a given structure and parses back under
    /// the same grammar.
    pub fn to_m3u8_text(&self) -> String {
        let mut lines = Vec::new();

        lines.push("#EXTM3U".to_string());
        if let Some(version) = self.version {
            lines.push(format!("#EXT-X-VERSION:{version}"));
        }
        lines.extend(self.header_tags.iter().cloned());

        for segment in &self.segments {
            lines.extend(segment.tags.iter().cloned());
            lines.push(format!("#EXTINF:{}", segment.extinf));
            lines.push(segment.uri.clone());
        }

        if self.end_list {
            lines.push("#EXT-X-ENDLIST".to_string());
        }

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
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

    #[test]
    fn test_parse_basic_playlist() {
        let playlist = MediaPlaylist::parse(BASIC).unwrap();
        assert_eq!(playlist.version, Some(3));
        assert_eq!(
            playlist.header_tags,
            vec!["#EXT-X-TARGETDURATION:10", "#EXT-X-MEDIA-SEQUENCE:0"]
        );
        assert_eq!(playlist.segments.len(), 3);
        assert_eq!(playlist.segments[0].uri, "seg0.ts");
        assert_eq!(playlist.segments[1].uri, "seg1.ts");
        assert_eq!(playlist.segments[2].uri, "seg2.ts");
        assert!((playlist.segments[2].duration - 3.003).abs() < 1e-9);
        assert!(playlist.end_list);
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let playlist = MediaPlaylist::parse(BASIC).unwrap();
        assert_eq!(playlist.to_m3u8_text(), BASIC);
    }

    #[test]
    fn test_roundtrip_preserves_order_and_count() {
        let playlist = MediaPlaylist::parse(BASIC).unwrap();
        let reparsed = MediaPlaylist::parse(&playlist.to_m3u8_text()).unwrap();
        assert_eq!(playlist, reparsed);
    }

    #[test]
    fn test_extinf_payload_preserved_verbatim() {
        let text = "#EXTM3U\n#EXTINF:10.000,Episode One\nseg.ts\n";
        let playlist = MediaPlaylist::parse(text).unwrap();
        assert_eq!(playlist.segments[0].extinf, "10.000,Episode One");
        assert_eq!(playlist.to_m3u8_text(), text);
    }

    #[test]
    fn test_segment_tags_attach_to_following_segment() {
        let text = "\
#EXTM3U
#EXT-X-TARGETDURATION:6
#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"
#EXTINF:6.0,
enc0.ts
#EXT-X-DISCONTINUITY
#EXTINF:6.0,
enc1.ts
";
        let playlist = MediaPlaylist::parse(text).unwrap();
        assert_eq!(playlist.header_tags, vec!["#EXT-X-TARGETDURATION:6"]);
        assert_eq!(
            playlist.segments[0].tags,
            vec!["#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\""]
        );
        assert_eq!(playlist.segments[1].tags, vec!["#EXT-X-DISCONTINUITY"]);
        assert_eq!(playlist.to_m3u8_text(), text);
    }

    #[test]
    fn test_discontinuity_sequence_is_header_tag() {
        let text = "#EXTM3U\n#EXT-X-DISCONTINUITY-SEQUENCE:7\n#EXTINF:4,\na.ts\n";
        let playlist = MediaPlaylist::parse(text).unwrap();
        assert_eq!(playlist.header_tags, vec!["#EXT-X-DISCONTINUITY-SEQUENCE:7"]);
        assert!(playlist.segments[0].tags.is_empty());
    }

    #[test]
    fn test_missing_header_is_error() {
        let result = MediaPlaylist::parse("#EXTINF:4,\na.ts\n");
        assert!(matches!(result, Err(Error::PlaylistParse(_))));
    }

    #[test]
    fn test_uri_without_extinf_is_error() {
        let result = MediaPlaylist::parse("#EXTM3U\nseg0.ts\n");
        assert!(matches!(result, Err(Error::PlaylistParse(_))));
    }

    #[test]
    fn test_dangling_extinf_is_error() {
        let result = MediaPlaylist::parse("#EXTM3U\n#EXTINF:4,\n");
        assert!(matches!(result, Err(Error::PlaylistParse(_))));
    }

    #[test]
    fn test_invalid_duration_is_error() {
        let result = MediaPlaylist::parse("#EXTM3U\n#EXTINF:abc,\na.ts\n");
        assert!(matches!(result, Err(Error::PlaylistParse(_))));
    }

    #[test]
    fn test_crlf_input() {
        let text = "#EXTM3U\r\n#EXT-X-VERSION:2\r\n#EXTINF:4,\r\na.ts\r\n";
        let playlist = MediaPlaylist::parse(text).unwrap();
        assert_eq!(playlist.version, Some(2));
        assert_eq!(playlist.segments[0].uri, "a.ts");
    }

    #[test]
    fn test_version_absent() {
        let playlist = MediaPlaylist::parse("#EXTM3U\n#EXTINF:4,\na.ts\n").unwrap();
        assert_eq!(playlist.version, None);
        assert!(!playlist.to_m3u8_text().contains("#EXT-X-VERSION"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let text = "#EXTM3U\n# generated by encoder\n#EXTINF:4,\na.ts\n";
        let playlist = MediaPlaylist::parse(text).unwrap();
        assert!(playlist.header_tags.is_empty());
        assert_eq!(playlist.segments.len(), 1);
    }
}

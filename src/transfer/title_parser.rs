use serde::Serialize;

use crate::ports::youtube::RawSourceTrack;

const ARTIST_TITLE_DELIMITER: &str = " - ";
const TOPIC_CHANNEL_SUFFIX: &str = " - Topic";

/// A (title, artist) guess derived from one YouTube playlist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackQuery {
    pub title: String,
    pub artist: String,
}

impl TrackQuery {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// Removes the `" - Topic"` suffix YouTube appends to auto-generated artist channels.
pub fn strip_topic_suffix(channel: &str) -> &str {
    let channel = channel.trim_end();
    channel
        .strip_suffix(TOPIC_CHANNEL_SUFFIX)
        .unwrap_or(channel)
        .trim()
}

/// Guesses title and artist for a playlist item.
///
/// Video titles in the common `"Artist - Song"` form are split on the first
/// delimiter. Anything else keeps the full title and takes the artist from the
/// uploading channel. Returns `None` when either part ends up empty.
pub fn parse_track(raw: &RawSourceTrack) -> Option<TrackQuery> {
    let (title, artist) = match raw.title.split_once(ARTIST_TITLE_DELIMITER) {
        Some((artist, title)) => (title.trim(), artist.trim()),
        None => (
            raw.title.as_str(),
            raw.channel_title
                .as_deref()
                .map(strip_topic_suffix)
                .unwrap_or_default(),
        ),
    };

    if title.is_empty() || artist.is_empty() {
        return None;
    }

    Some(TrackQuery::new(title, artist))
}

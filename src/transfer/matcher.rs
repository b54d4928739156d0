use crate::ports::spotify::SpotifyClient;
use crate::transfer::title_parser::{TrackQuery, strip_topic_suffix};

/// Number of ranked results requested per search. Only the first is used.
pub const SEARCH_LIMIT: u32 = 5;

const TITLE_NOISE: [&str; 2] = ["(Official Video)", "(Official Audio)"];

/// Which search produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    /// `"{title} {artist}"`
    TitleAndArtist,
    /// `"{title}"` alone, tried when the combined search found nothing.
    TitleOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Found { uri: String, stage: MatchStage },
    NotFound,
}

fn normalize_title(title: &str) -> String {
    TITLE_NOISE
        .iter()
        .fold(title.to_string(), |title, noise| title.replace(noise, ""))
        .trim()
        .to_string()
}

/// Looks a track up on Spotify, taking the top result of the first search
/// that returns anything.
///
/// A failed search counts as an empty one: the track falls through to the
/// next stage and, failing that, is reported unmatched. Nothing is retried.
pub async fn find_match<C: SpotifyClient>(client: &C, query: &TrackQuery) -> MatchResult {
    let title = normalize_title(&query.title);
    let artist = strip_topic_suffix(&query.artist);

    let stages = [
        (MatchStage::TitleAndArtist, format!("{} {}", title, artist)),
        (MatchStage::TitleOnly, title),
    ];

    for (stage, search) in stages {
        if search.trim().is_empty() {
            continue;
        }
        if let Some(uri) = top_result(client, &search).await {
            log::debug!("Found '{}': {}", search, uri);
            return MatchResult::Found { uri, stage };
        }
        log::debug!("No {:?} result for '{}'", stage, search);
    }

    MatchResult::NotFound
}

async fn top_result<C: SpotifyClient>(client: &C, search: &str) -> Option<String> {
    match client.search_tracks(search, SEARCH_LIMIT).await {
        Ok(uris) => uris.into_iter().next(),
        Err(e) => {
            log::warn!("Spotify search for '{}' failed: {:#}", search, e);
            None
        }
    }
}

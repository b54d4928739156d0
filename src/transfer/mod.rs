pub mod matcher;
pub mod report;
pub mod source_reader;
pub mod title_parser;
pub mod writer;

use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};

use crate::ports::spotify::SpotifyClient;
use crate::ports::youtube::YoutubeClient;
use crate::transfer::matcher::{MatchResult, find_match};
use crate::transfer::writer::{AppendTracksError, append_tracks, create_playlist};

pub use report::TransferReport;
pub use title_parser::TrackQuery;

/// Fixed pauses used to stay under the APIs' rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    /// Pause after every match attempt, hit or miss.
    pub match_delay: Duration,
    /// Pause between successive playlist append batches.
    pub batch_delay: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            match_delay: Duration::from_millis(300),
            batch_delay: Duration::from_millis(500),
        }
    }
}

/// Failures that abort a transfer. Individual tracks that cannot be matched
/// are not errors; they end up in [`TransferReport::unmatched`].
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Nothing was created on Spotify.
    #[error("Failed to fetch YouTube playlist tracks: {0:#}")]
    FetchTracks(color_eyre::Report),
    /// No track was searched.
    #[error("Failed to create Spotify playlist: {0:#}")]
    CreatePlaylist(color_eyre::Report),
    /// The playlist exists and keeps the batches added before the failure.
    /// `report` still holds the outcome of every search.
    #[error("{source}")]
    AppendTracks {
        source: AppendTracksError,
        report: TransferReport,
    },
}

/// Copies YouTube playlists to new Spotify playlists.
///
/// Owns both authenticated clients for the duration of a transfer. Every call
/// to [`transfer`](Self::transfer) creates a new Spotify playlist.
pub struct PlaylistTransferService<Y: YoutubeClient, S: SpotifyClient> {
    youtube: Y,
    spotify: S,
    options: TransferOptions,
}

impl<Y: YoutubeClient, S: SpotifyClient> PlaylistTransferService<Y, S> {
    pub fn new(youtube: Y, spotify: S, options: TransferOptions) -> Self {
        Self {
            youtube,
            spotify,
            options,
        }
    }

    pub async fn transfer(
        &self,
        youtube_playlist_id: &str,
        playlist_name: &str,
    ) -> Result<TransferReport, TransferError> {
        let tracks = source_reader::fetch_all_tracks(&self.youtube, youtube_playlist_id)
            .await
            .map_err(TransferError::FetchTracks)?;

        if tracks.is_empty() {
            log::warn!("No tracks found in playlist {}", youtube_playlist_id);
            return Ok(TransferReport::empty());
        }

        log::info!("Found {} tracks in YouTube playlist", tracks.len());

        let spotify_playlist_id = self
            .create_spotify_playlist(playlist_name)
            .await
            .map_err(TransferError::CreatePlaylist)?;

        let total = tracks.len();
        let mut matched_uris = Vec::new();
        let mut unmatched = Vec::new();

        for (index, track) in tracks.into_iter().enumerate() {
            log::info!(
                "Processing: {} by {} ({}/{})",
                track.title,
                track.artist,
                index + 1,
                total
            );

            match find_match(&self.spotify, &track).await {
                MatchResult::Found { uri, stage } => {
                    log::debug!("Matched via {:?}: {}", stage, uri);
                    matched_uris.push(uri);
                }
                MatchResult::NotFound => {
                    log::info!("No match for {} - {}", track.title, track.artist);
                    unmatched.push(track);
                }
            }

            tokio::time::sleep(self.options.match_delay).await;
        }

        let report = TransferReport {
            matched_count: matched_uris.len(),
            unmatched,
            destination_playlist_id: Some(spotify_playlist_id.clone()),
        };

        if !matched_uris.is_empty() {
            log::info!("Adding {} tracks to Spotify playlist", matched_uris.len());
            if let Err(source) = append_tracks(
                &self.spotify,
                &spotify_playlist_id,
                &matched_uris,
                self.options.batch_delay,
            )
            .await
            {
                return Err(TransferError::AppendTracks { source, report });
            }
        }

        log::info!(
            "Transfer of {} complete: {} matched, {} unmatched",
            youtube_playlist_id,
            report.matched_count,
            report.unmatched.len()
        );

        Ok(report)
    }

    async fn create_spotify_playlist(&self, name: &str) -> Result<String> {
        let user_id = self
            .spotify
            .current_user_id()
            .await
            .wrap_err("Failed to get current Spotify user")?;
        create_playlist(&self.spotify, &user_id, name).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::ports::spotify::MockSpotifyClient;
    use crate::ports::youtube::{MockYoutubeClient, Page, RawSourceTrack};

    fn no_delay() -> TransferOptions {
        TransferOptions {
            match_delay: Duration::ZERO,
            batch_delay: Duration::ZERO,
        }
    }

    fn youtube_with(items: Vec<RawSourceTrack>) -> MockYoutubeClient {
        let mut client = MockYoutubeClient::new();
        client.expect_playlist_items_page().returning(move |_, _| {
            Ok(Page {
                items: items.clone(),
                next_page_token: None,
            })
        });
        client
    }

    fn item(title: &str, channel: &str) -> RawSourceTrack {
        RawSourceTrack {
            title: title.to_string(),
            channel_title: Some(channel.to_string()),
        }
    }

    fn spotify_with_playlist() -> MockSpotifyClient {
        let mut client = MockSpotifyClient::new();
        client
            .expect_current_user_id()
            .returning(|| Ok("user1".to_string()));
        client
            .expect_create_playlist()
            .times(1)
            .returning(|_, _, _, _| Ok("sp-playlist".to_string()));
        client
    }

    #[tokio::test]
    async fn test_transfer_end_to_end() {
        let youtube = youtube_with(vec![
            item("Song A - Artist X", "Artist X - Topic"),
            item("Random Title", "Some Channel"),
        ]);

        let mut spotify = spotify_with_playlist();
        spotify
            .expect_search_tracks()
            .withf(|query, _| query == "Artist X Song A")
            .returning(|_, _| Ok(vec!["spotify:track:a".to_string()]));
        spotify
            .expect_search_tracks()
            .withf(|query, _| query != "Artist X Song A")
            .returning(|_, _| Ok(vec![]));

        let batches = Arc::new(Mutex::new(Vec::new()));
        let recorded = batches.clone();
        spotify
            .expect_add_tracks_to_playlist()
            .withf(|playlist_id, _| playlist_id == "sp-playlist")
            .returning(move |_, uris| {
                recorded.lock().unwrap().push(uris);
                Ok(())
            });

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let report = service.transfer("PL1", "My Mix").await.unwrap();

        assert_eq!(report.matched_count, 1);
        assert_eq!(
            report.unmatched,
            vec![TrackQuery::new("Random Title", "Some Channel")]
        );
        assert_eq!(report.destination_playlist_id.as_deref(), Some("sp-playlist"));
        assert_eq!(
            *batches.lock().unwrap(),
            vec![vec!["spotify:track:a".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_empty_playlist_touches_nothing_on_spotify() {
        let youtube = youtube_with(vec![RawSourceTrack {
            title: "Private video".into(),
            channel_title: None,
        }]);
        let mut spotify = MockSpotifyClient::new();
        spotify.expect_current_user_id().never();
        spotify.expect_create_playlist().never();
        spotify.expect_search_tracks().never();
        spotify.expect_add_tracks_to_playlist().never();

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let report = service.transfer("PL1", "Empty").await.unwrap();

        assert_eq!(report, TransferReport::empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_an_empty_playlist() {
        let mut youtube = MockYoutubeClient::new();
        youtube
            .expect_playlist_items_page()
            .returning(|_, _| Err(color_eyre::eyre::eyre!("401 Unauthorized")));
        let mut spotify = MockSpotifyClient::new();
        spotify.expect_create_playlist().never();

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let err = service.transfer("PL1", "Mix").await.unwrap_err();

        assert!(matches!(err, TransferError::FetchTracks(_)));
        assert!(err.to_string().contains("401 Unauthorized"));
    }

    #[tokio::test]
    async fn test_create_failure_aborts_before_matching() {
        let youtube = youtube_with(vec![item("Artist - Song", "x")]);
        let mut spotify = MockSpotifyClient::new();
        spotify
            .expect_current_user_id()
            .returning(|| Ok("user1".to_string()));
        spotify
            .expect_create_playlist()
            .returning(|_, _, _, _| Err(color_eyre::eyre::eyre!("403 Forbidden")));
        spotify.expect_search_tracks().never();
        spotify.expect_add_tracks_to_playlist().never();

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let err = service.transfer("PL1", "Mix").await.unwrap_err();

        assert!(matches!(err, TransferError::CreatePlaylist(_)));
    }

    #[tokio::test]
    async fn test_user_lookup_failure_is_a_create_failure() {
        let youtube = youtube_with(vec![item("Artist - Song", "x")]);
        let mut spotify = MockSpotifyClient::new();
        spotify
            .expect_current_user_id()
            .returning(|| Err(color_eyre::eyre::eyre!("token expired")));
        spotify.expect_create_playlist().never();
        spotify.expect_search_tracks().never();

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let err = service.transfer("PL1", "Mix").await.unwrap_err();

        assert!(matches!(err, TransferError::CreatePlaylist(_)));
        assert!(err.to_string().contains("Failed to get current Spotify user"));
    }

    #[tokio::test]
    async fn test_matched_tracks_keep_source_order_across_batches() {
        let items: Vec<_> = (0..150)
            .map(|i| item(&format!("Artist{} - Song{}", i, i), "x"))
            .collect();
        let youtube = youtube_with(items);

        let mut spotify = spotify_with_playlist();
        // every third track has no match at all
        spotify.expect_search_tracks().returning(|query, _| {
            let n: usize = query
                .split_whitespace()
                .next()
                .and_then(|word| word.strip_prefix("Song"))
                .and_then(|n| n.parse().ok())
                .unwrap();
            if n % 3 == 0 {
                Ok(vec![])
            } else {
                Ok(vec![format!("spotify:track:{}", n)])
            }
        });

        let batches = Arc::new(Mutex::new(Vec::<Vec<String>>::new()));
        let recorded = batches.clone();
        spotify
            .expect_add_tracks_to_playlist()
            .returning(move |_, uris| {
                recorded.lock().unwrap().push(uris);
                Ok(())
            });

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let report = service.transfer("PL1", "Big").await.unwrap();

        let expected: Vec<String> = (0..150)
            .filter(|n| n % 3 != 0)
            .map(|n| format!("spotify:track:{}", n))
            .collect();
        let batches = batches.lock().unwrap();

        assert_eq!(report.matched_count, 100);
        assert_eq!(report.unmatched.len(), 50);
        assert_eq!(report.unmatched[1], TrackQuery::new("Song3", "Artist3"));
        assert_eq!(batches.len(), 1);
        assert_eq!(batches.concat(), expected);
    }

    #[tokio::test]
    async fn test_append_failure_is_surfaced() {
        let items: Vec<_> = (0..120)
            .map(|i| item(&format!("Artist - Song{}", i), "x"))
            .collect();
        let youtube = youtube_with(items);

        let mut spotify = spotify_with_playlist();
        spotify
            .expect_search_tracks()
            .returning(|query, _| Ok(vec![format!("spotify:track:{}", query)]));
        spotify
            .expect_add_tracks_to_playlist()
            .withf(|_, uris| uris.len() == 100)
            .times(1)
            .returning(|_, _| Ok(()));
        spotify
            .expect_add_tracks_to_playlist()
            .withf(|_, uris| uris.len() == 20)
            .times(1)
            .returning(|_, _| Err(color_eyre::eyre::eyre!("500 Internal Server Error")));

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let err = service.transfer("PL1", "Mix").await.unwrap_err();

        match err {
            TransferError::AppendTracks { source, report } => {
                assert_eq!(source.playlist_id, "sp-playlist");
                assert_eq!(source.appended, 100);
                assert_eq!(report.matched_count, 120);
                assert_eq!(report.destination_playlist_id.as_deref(), Some("sp-playlist"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_append_failure_keeps_unmatched_tracks() {
        let youtube = youtube_with(vec![
            item("Artist1 - Song1", "x"),
            item("Unknown title", "Some Channel"),
            item("Artist3 - Song3", "x"),
        ]);

        let mut spotify = spotify_with_playlist();
        spotify.expect_search_tracks().returning(|query, _| {
            if query.contains("Unknown") {
                Ok(vec![])
            } else {
                Ok(vec![format!("spotify:track:{}", query)])
            }
        });
        spotify
            .expect_add_tracks_to_playlist()
            .times(1)
            .returning(|_, _| Err(color_eyre::eyre::eyre!("500 Internal Server Error")));

        let service = PlaylistTransferService::new(youtube, spotify, no_delay());
        let err = service.transfer("PL1", "Mix").await.unwrap_err();

        let TransferError::AppendTracks { source, report } = err else {
            panic!("expected an append failure");
        };
        assert_eq!(source.appended, 0);
        assert_eq!(report.matched_count, 2);
        assert_eq!(
            report.unmatched,
            vec![TrackQuery::new("Unknown title", "Some Channel")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_after_every_match_and_between_batches() {
        let items: Vec<_> = (0..210)
            .map(|i| item(&format!("Artist{} - Song{}", i, i), "x"))
            .collect();
        let youtube = youtube_with(items);

        let mut spotify = spotify_with_playlist();
        // every seventh track misses both searches
        spotify.expect_search_tracks().returning(|query, _| {
            let n: usize = query
                .split_whitespace()
                .next()
                .and_then(|word| word.strip_prefix("Song"))
                .and_then(|n| n.parse().ok())
                .unwrap();
            if n % 7 == 0 {
                Ok(vec![])
            } else {
                Ok(vec![format!("spotify:track:{}", n)])
            }
        });
        spotify
            .expect_add_tracks_to_playlist()
            .times(2)
            .returning(|_, _| Ok(()));

        let options = TransferOptions::default();
        let service = PlaylistTransferService::new(youtube, spotify, options);

        let start = tokio::time::Instant::now();
        let report = service.transfer("PL1", "Paced").await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(report.matched_count, 180);
        assert_eq!(report.unmatched.len(), 30);
        assert_eq!(elapsed, options.match_delay * 210 + options.batch_delay);
    }
}

use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};

use crate::ports::spotify::SpotifyClient;

/// Maximum number of tracks Spotify accepts per add-items call.
pub const MAX_BATCH_SIZE: usize = 100;

pub const PLAYLIST_DESCRIPTION: &str = "Transferred from YouTube Music";

/// Creates a new public playlist for `user_id`. Existing playlists with the
/// same name are never reused.
pub async fn create_playlist<C: SpotifyClient>(
    client: &C,
    user_id: &str,
    name: &str,
) -> Result<String> {
    let playlist_id = client
        .create_playlist(user_id, name, true, PLAYLIST_DESCRIPTION)
        .await
        .wrap_err_with(|| format!("Failed to create Spotify playlist '{}'", name))?;
    log::info!("Created Spotify playlist '{}' ({})", name, playlist_id);
    Ok(playlist_id)
}

/// A batch append failed. Batches before it stay in the playlist.
#[derive(Debug, thiserror::Error)]
#[error("Failed to add tracks to playlist {playlist_id} after {appended} were added: {error:#}")]
pub struct AppendTracksError {
    pub playlist_id: String,
    /// Number of tracks added by the batches that succeeded.
    pub appended: usize,
    pub error: color_eyre::Report,
}

/// Appends `uris` to the playlist in order, in batches of at most
/// [`MAX_BATCH_SIZE`], sleeping `batch_delay` between calls.
///
/// The first failing batch aborts the rest; nothing is retried or rolled back.
pub async fn append_tracks<C: SpotifyClient>(
    client: &C,
    playlist_id: &str,
    uris: &[String],
    batch_delay: Duration,
) -> Result<usize, AppendTracksError> {
    let mut appended = 0;

    for (index, batch) in uris.chunks(MAX_BATCH_SIZE).enumerate() {
        if index > 0 {
            tokio::time::sleep(batch_delay).await;
        }

        client
            .add_tracks_to_playlist(playlist_id, batch.to_vec())
            .await
            .map_err(|error| AppendTracksError {
                playlist_id: playlist_id.to_string(),
                appended,
                error,
            })?;

        appended += batch.len();
        log::debug!(
            "Added batch {} ({} tracks, {}/{} total)",
            index + 1,
            batch.len(),
            appended,
            uris.len()
        );
    }

    Ok(appended)
}

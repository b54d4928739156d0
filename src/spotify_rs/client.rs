use std::time::Duration;

use color_eyre::Result;
use url::Url;

use crate::session::check_status;
use crate::spotify_rs::types::{
    AddTracksRequest, CreatePlaylistRequest, SnapshotResponse, SpotifyPlaylist,
    SpotifySearchResponse, SpotifyTrack, SpotifyUser,
};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1/";

/// Spotify API client. The access token is passed per call so the caller can
/// swap it after a refresh.
#[derive(Default)]
pub struct SpotifyClient {
    client: reqwest::Client,
}

impl SpotifyClient {
    fn url(path: &str) -> Result<Url> {
        Ok(Url::parse(SPOTIFY_API_URL)?.join(path)?)
    }

    /// Get the current user's profile
    pub async fn get_current_user(&self, access_token: &str) -> Result<SpotifyUser> {
        let response = self
            .client
            .get(Self::url("me")?)
            .bearer_auth(access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        let response = check_status(response)?;

        let user: SpotifyUser = response.json().await?;
        Ok(user)
    }

    /// Search the track catalog
    pub async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SpotifyTrack>> {
        let mut url = Self::url("search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "track")
            .append_pair("limit", &limit.to_string());

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        let response = check_status(response)?;

        let page: SpotifySearchResponse = response.json().await?;
        Ok(page.tracks.items)
    }

    /// Create a playlist owned by `user_id`
    pub async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<SpotifyPlaylist> {
        let url = Self::url(&format!("users/{}/playlists", user_id))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&CreatePlaylistRequest {
                name,
                public,
                description,
            })
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        let response = check_status(response)?;

        let playlist: SpotifyPlaylist = response.json().await?;
        Ok(playlist)
    }

    /// Append tracks to a playlist. Spotify rejects more than 100 URIs per call.
    pub async fn add_tracks_to_playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<SnapshotResponse> {
        let url = Self::url(&format!("playlists/{}/tracks", playlist_id))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&AddTracksRequest { uris })
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        let response = check_status(response)?;

        let snapshot: SnapshotResponse = response.json().await?;
        Ok(snapshot)
    }
}

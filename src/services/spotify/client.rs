use color_eyre::eyre::Result;

use crate::ports::spotify::SpotifyClient;
use crate::session::Session;
use crate::spotify_rs::client::SpotifyClient as SpotifyApi;
use crate::spotify_rs::types::SpotifyUser;

pub struct SpotifyHttpAdapter {
    api: SpotifyApi,
    session: Session,
}

impl SpotifyHttpAdapter {
    pub fn new(session: Session) -> Self {
        Self {
            api: SpotifyApi::default(),
            session,
        }
    }

    pub async fn current_user(&self) -> Result<SpotifyUser> {
        let api = &self.api;
        self.session
            .call(move |token| async move { api.get_current_user(&token).await })
            .await
    }
}

#[async_trait::async_trait]
impl SpotifyClient for SpotifyHttpAdapter {
    async fn current_user_id(&self) -> Result<String> {
        Ok(self.current_user().await?.id)
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<String>> {
        let api = &self.api;
        let tracks = self
            .session
            .call(move |token| async move { api.search_tracks(&token, query, limit).await })
            .await?;

        if let Some(top) = tracks.first() {
            let artists: Vec<&str> = top.artists.iter().map(|a| a.name.as_str()).collect();
            log::debug!("Top result for '{}': {} by {}", query, top.name, artists.join(", "));
        }

        Ok(tracks.into_iter().map(|track| track.uri).collect())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<String> {
        let api = &self.api;
        let playlist = self
            .session
            .call(move |token| async move {
                api.create_playlist(&token, user_id, name, public, description)
                    .await
            })
            .await?;
        log::debug!("Spotify created playlist '{}'", playlist.name);
        Ok(playlist.id)
    }

    async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: Vec<String>) -> Result<()> {
        let api = &self.api;
        let uris = uris.as_slice();
        let snapshot = self
            .session
            .call(move |token| async move {
                api.add_tracks_to_playlist(&token, playlist_id, uris).await
            })
            .await?;
        log::debug!("Playlist {} now at snapshot {}", playlist_id, snapshot.snapshot_id);
        Ok(())
    }
}

use color_eyre::eyre::Result;

/// Port trait wrapping the Spotify API capabilities used by the transfer.
///
/// Track references are Spotify URIs (`spotify:track:...`).
/// Implementations live in `services::spotify::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyClient: Send + Sync {
    async fn current_user_id(&self) -> Result<String>;

    /// Free-text track search, returning at most `limit` track URIs in rank order.
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<String>>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<String>;

    /// Appends up to 100 track URIs to the end of a playlist.
    async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: Vec<String>) -> Result<()>;
}

use color_eyre::eyre::Result;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next page, `None` on the last page.
    pub next_page_token: Option<String>,
}

/// A playlist owned by the current YouTube user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
    pub track_count: u32,
}

/// A playlist item as YouTube reports it, before any title parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSourceTrack {
    pub title: String,
    /// Display name of the channel that uploaded the video, e.g. `"Artist - Topic"`.
    pub channel_title: Option<String>,
}

/// Port trait wrapping the YouTube API capabilities used by the transfer.
///
/// Implementations live in `services::youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait YoutubeClient: Send + Sync {
    async fn my_playlists_page(&self, page_token: Option<String>)
    -> Result<Page<PlaylistSummary>>;

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<RawSourceTrack>>;
}

use serde::Deserialize;

/* ---------- Core response envelope ---------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/* ---------- Playlists ---------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubePlaylist {
    pub id: String,
    pub snippet: YoutubePlaylistSnippet,
    #[serde(default)]
    pub content_details: Option<YoutubePlaylistContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubePlaylistSnippet {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubePlaylistContentDetails {
    pub item_count: u32,
}

/* ---------- Playlist items ---------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubePlaylistItem {
    pub snippet: YoutubePlaylistItemSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubePlaylistItemSnippet {
    pub title: String,
    /// Missing for deleted and private videos.
    #[serde(default)]
    pub video_owner_channel_title: Option<String>,
}

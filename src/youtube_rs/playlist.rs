use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::session::check_status;
use crate::youtube_rs::types::{YoutubeListResponse, YoutubePlaylist, YoutubePlaylistItem};

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Largest page size the Data API allows.
pub const MAX_RESULTS: u32 = 50;

fn list_url(resource: &str, params: &[(&str, &str)], page_token: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(YOUTUBE_API_URL)?.join(resource)?;
    {
        let mut query = url.query_pairs_mut();
        query.extend_pairs(params);
        query.append_pair("maxResults", &MAX_RESULTS.to_string());
        if let Some(token) = page_token {
            query.append_pair("pageToken", token);
        }
    }
    Ok(url)
}

/// Fetches one page of the playlists owned by the authorized user.
///
/// Docs: https://developers.google.com/youtube/v3/docs/playlists/list
pub async fn get_my_playlists_page(
    client: &Client,
    access_token: &str,
    page_token: Option<&str>,
) -> Result<YoutubeListResponse<YoutubePlaylist>> {
    let url = list_url(
        "playlists",
        &[("part", "snippet,contentDetails"), ("mine", "true")],
        page_token,
    )?;

    let response = client
        .get(url)
        .bearer_auth(access_token)
        .timeout(Duration::from_secs(10))
        .send()
        .await?;

    check_status(response)?
        .json::<YoutubeListResponse<YoutubePlaylist>>()
        .await
        .wrap_err("Failed to deserialize YouTube playlists response")
}

/// Fetches one page of the items of a playlist.
///
/// Docs: https://developers.google.com/youtube/v3/docs/playlistItems/list
pub async fn get_playlist_items_page(
    client: &Client,
    access_token: &str,
    playlist_id: &str,
    page_token: Option<&str>,
) -> Result<YoutubeListResponse<YoutubePlaylistItem>> {
    let url = list_url(
        "playlistItems",
        &[("part", "snippet"), ("playlistId", playlist_id)],
        page_token,
    )?;

    let response = client
        .get(url)
        .bearer_auth(access_token)
        .timeout(Duration::from_secs(10))
        .send()
        .await?;

    check_status(response)?
        .json::<YoutubeListResponse<YoutubePlaylistItem>>()
        .await
        .wrap_err("Failed to deserialize YouTube playlist items response")
}

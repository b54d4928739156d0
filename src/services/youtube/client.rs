use color_eyre::eyre::Result;
use reqwest::Client;

use crate::ports::youtube::{Page, PlaylistSummary, RawSourceTrack, YoutubeClient};
use crate::session::Session;
use crate::youtube_rs::playlist::{get_my_playlists_page, get_playlist_items_page};

pub struct YoutubeHttpAdapter {
    client: Client,
    session: Session,
}

impl YoutubeHttpAdapter {
    pub fn new(session: Session) -> Self {
        Self {
            client: Client::new(),
            session,
        }
    }
}

#[async_trait::async_trait]
impl YoutubeClient for YoutubeHttpAdapter {
    async fn my_playlists_page(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<PlaylistSummary>> {
        let client = &self.client;
        let page_token = page_token.as_deref();
        let response = self
            .session
            .call(move |token| async move {
                get_my_playlists_page(client, &token, page_token).await
            })
            .await?;

        Ok(Page {
            items: response
                .items
                .into_iter()
                .map(|playlist| PlaylistSummary {
                    id: playlist.id,
                    title: playlist.snippet.title,
                    track_count: playlist
                        .content_details
                        .map(|details| details.item_count)
                        .unwrap_or_default(),
                })
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<RawSourceTrack>> {
        let client = &self.client;
        let page_token = page_token.as_deref();
        let response = self
            .session
            .call(move |token| async move {
                get_playlist_items_page(client, &token, playlist_id, page_token).await
            })
            .await?;

        Ok(Page {
            items: response
                .items
                .into_iter()
                .map(|item| RawSourceTrack {
                    title: item.snippet.title,
                    channel_title: item.snippet.video_owner_channel_title,
                })
                .collect(),
            next_page_token: response.next_page_token,
        })
    }
}

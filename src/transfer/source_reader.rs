use std::future::Future;
use std::pin::pin;

use color_eyre::eyre::{Result, WrapErr};
use futures::{Stream, TryStreamExt, stream};

use crate::ports::youtube::{Page, PlaylistSummary, RawSourceTrack, YoutubeClient};
use crate::transfer::title_parser::{TrackQuery, parse_track};

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Turns a page-fetching function into a stream of page items.
///
/// The stream ends after the first page without a continuation token and stops
/// at the first error. It cannot be restarted.
fn paginate<'a, T, F, Fut>(mut fetch_page: F) -> impl Stream<Item = Result<Vec<T>>> + 'a
where
    T: 'a,
    F: FnMut(Option<String>) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>>> + 'a,
{
    stream::try_unfold(Cursor::Start, move |cursor| {
        let page_token = match cursor {
            Cursor::Start => Some(None),
            Cursor::Next(token) => Some(Some(token)),
            Cursor::Done => None,
        };
        let page = page_token.map(&mut fetch_page);

        async move {
            let Some(page) = page else {
                return Ok(None);
            };
            let page: Page<T> = page.await?;
            let next = match page.next_page_token {
                Some(token) => Cursor::Next(token),
                None => Cursor::Done,
            };
            Ok::<_, color_eyre::Report>(Some((page.items, next)))
        }
    })
}

/// Lazily pages through the items of a YouTube playlist.
pub fn playlist_item_pages<'a, C: YoutubeClient>(
    client: &'a C,
    playlist_id: &'a str,
) -> impl Stream<Item = Result<Vec<RawSourceTrack>>> + 'a {
    paginate(move |page_token| client.playlist_items_page(playlist_id, page_token))
}

/// Fetches every item of a playlist and parses it into a [`TrackQuery`],
/// dropping items whose title or artist cannot be determined.
///
/// A failed page request fails the whole fetch, so an `Ok` with no tracks
/// always means the playlist had nothing transferable.
pub async fn fetch_all_tracks<C: YoutubeClient>(
    client: &C,
    playlist_id: &str,
) -> Result<Vec<TrackQuery>> {
    let mut pages = pin!(playlist_item_pages(client, playlist_id));
    let mut tracks = Vec::new();
    let mut skipped = 0;

    while let Some(items) = pages
        .try_next()
        .await
        .wrap_err_with(|| format!("Failed to fetch items of playlist {}", playlist_id))?
    {
        for item in &items {
            match parse_track(item) {
                Some(track) => tracks.push(track),
                None => {
                    skipped += 1;
                    log::debug!("Skipping untransferable item: {:?}", item);
                }
            }
        }
    }

    log::info!(
        "Fetched {} tracks from playlist {} ({} skipped)",
        tracks.len(),
        playlist_id,
        skipped
    );
    Ok(tracks)
}

/// Fetches every playlist owned by the current user, in API order.
pub async fn fetch_all_playlists<C: YoutubeClient>(client: &C) -> Result<Vec<PlaylistSummary>> {
    let pages = paginate(move |page_token| client.my_playlists_page(page_token));
    let playlists: Vec<Vec<PlaylistSummary>> = pages
        .try_collect()
        .await
        .wrap_err("Failed to fetch playlists")?;
    Ok(playlists.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::youtube::MockYoutubeClient;

    fn item(title: &str, channel: &str) -> RawSourceTrack {
        RawSourceTrack {
            title: title.to_string(),
            channel_title: Some(channel.to_string()),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_tracks_follows_cursor() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_playlist_items_page()
            .withf(|id, token| id == "PL1" && token.is_none())
            .times(1)
            .returning(|_, _| {
                Ok(Page {
                    items: vec![item("A - One", "x"), item("Two", "B - Topic")],
                    next_page_token: Some("page2".into()),
                })
            });
        client
            .expect_playlist_items_page()
            .withf(|id, token| id == "PL1" && token.as_deref() == Some("page2"))
            .times(1)
            .returning(|_, _| {
                Ok(Page {
                    items: vec![item("Three", "C")],
                    next_page_token: None,
                })
            });

        let tracks = fetch_all_tracks(&client, "PL1").await.unwrap();

        assert_eq!(
            tracks,
            vec![
                TrackQuery::new("One", "A"),
                TrackQuery::new("Two", "B"),
                TrackQuery::new("Three", "C"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_tracks_drops_untransferable_items() {
        let mut client = MockYoutubeClient::new();
        client.expect_playlist_items_page().returning(|_, _| {
            Ok(Page {
                items: vec![
                    RawSourceTrack {
                        title: "Deleted video".into(),
                        channel_title: None,
                    },
                    item("Artist - Song", "whatever"),
                ],
                next_page_token: None,
            })
        });

        let tracks = fetch_all_tracks(&client, "PL1").await.unwrap();
        assert_eq!(tracks, vec![TrackQuery::new("Song", "Artist")]);
    }

    #[tokio::test]
    async fn test_fetch_all_tracks_fails_on_any_page_error() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_playlist_items_page()
            .withf(|_, token| token.is_none())
            .returning(|_, _| {
                Ok(Page {
                    items: vec![item("A - One", "x")],
                    next_page_token: Some("page2".into()),
                })
            });
        client
            .expect_playlist_items_page()
            .withf(|_, token| token.is_some())
            .returning(|_, _| Err(color_eyre::eyre::eyre!("403 Forbidden")));

        let result = fetch_all_tracks(&client, "PL1").await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch items of playlist PL1"));
    }

    #[tokio::test]
    async fn test_empty_playlist_is_ok() {
        let mut client = MockYoutubeClient::new();
        client.expect_playlist_items_page().times(1).returning(|_, _| {
            Ok(Page {
                items: vec![],
                next_page_token: None,
            })
        });

        let tracks = fetch_all_tracks(&client, "PL1").await.unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_playlists() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_my_playlists_page()
            .withf(|token| token.is_none())
            .returning(|_| {
                Ok(Page {
                    items: vec![PlaylistSummary {
                        id: "PL1".into(),
                        title: "Road trip".into(),
                        track_count: 12,
                    }],
                    next_page_token: Some("next".into()),
                })
            });
        client
            .expect_my_playlists_page()
            .withf(|token| token.as_deref() == Some("next"))
            .returning(|_| {
                Ok(Page {
                    items: vec![PlaylistSummary {
                        id: "PL2".into(),
                        title: "Gym".into(),
                        track_count: 3,
                    }],
                    next_page_token: None,
                })
            });

        let playlists = fetch_all_playlists(&client).await.unwrap();

        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].title, "Road trip");
        assert_eq!(playlists[1].id, "PL2");
    }
}

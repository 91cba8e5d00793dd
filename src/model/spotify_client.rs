//! Spotify Web API client implementing the review catalog

use std::sync::Arc;
use anyhow::Result;
use tokio::sync::RwLock;
use rspotify::{
    model::{FullTrack, PlayableId, PlayableItem, PlaylistId, TrackId},
    prelude::*,
    AuthCodeSpotify,
};

use super::catalog::CatalogClient;
use super::types::{Artist, Collection, RawItem, Source};
use crate::{log_catalog_request, log_catalog_result};

/// Spotify API client with token refresh support
#[derive(Clone)]
pub struct SpotifyClient {
    client: Arc<AuthCodeSpotify>,
    refresh_token: Arc<RwLock<String>>,
    token_expires_at: Arc<RwLock<Option<chrono::DateTime<chrono::Utc>>>>,
}

impl SpotifyClient {
    pub fn new(
        client: AuthCodeSpotify,
        refresh_token: String,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            refresh_token: Arc::new(RwLock::new(refresh_token)),
            token_expires_at: Arc::new(RwLock::new(expires_at)),
        }
    }

    pub async fn token_needs_refresh(&self) -> bool {
        let expires_at = self.token_expires_at.read().await;
        if let Some(exp) = *expires_at {
            let remaining = exp - chrono::Utc::now();
            // Refresh if less than 5 minutes remaining
            remaining.num_seconds() < 300
        } else {
            false
        }
    }

    pub async fn refresh_token_if_needed(&self) -> Result<bool> {
        if !self.token_needs_refresh().await {
            return Ok(false);
        }

        let refresh_token = self.refresh_token.read().await.clone();

        tracing::info!("Token expiring soon, refreshing...");

        match crate::auth::refresh_access_token(&refresh_token).await {
            Ok(refreshed) => {
                let new_token = crate::auth::rspotify_token(refreshed.access_token, refreshed.expires_at);
                *self
                    .client
                    .token
                    .lock()
                    .await
                    .map_err(|_| anyhow::anyhow!("rspotify token lock unavailable"))? = Some(new_token);

                *self.refresh_token.write().await = refreshed.refresh_token;
                *self.token_expires_at.write().await = Some(refreshed.expires_at);

                tracing::info!("Token refreshed successfully");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh token");
                Err(e)
            }
        }
    }

    fn raw_item(track: FullTrack) -> RawItem {
        let uri = track.id.as_ref().map(|id| id.uri()).unwrap_or_default();
        RawItem {
            id: track.id.map(|id| id.id().to_string()),
            name: Some(track.name),
            artists: track
                .artists
                .into_iter()
                .map(|a| Artist { name: a.name })
                .collect(),
            album_image_url: track.album.images.first().map(|image| image.url.clone()),
            uri,
        }
    }
}

impl CatalogClient for SpotifyClient {
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        use futures::TryStreamExt;

        log_catalog_request!("list_collections", kind = "playlists");
        let result: Result<Vec<_>, _> = self.client.current_user_playlists().try_collect().await;
        log_catalog_result!("list_collections", result);

        Ok(result?
            .into_iter()
            .map(|playlist| Collection {
                source: Source::playlist(playlist.id.id()),
                name: playlist.name,
            })
            .collect())
    }

    async fn list_default_items(&self, limit: u32, offset: u32) -> Result<Vec<RawItem>> {
        log_catalog_request!("list_default_items", limit, offset);
        let result = self
            .client
            .current_user_saved_tracks_manual(None, Some(limit), Some(offset))
            .await;
        log_catalog_result!("list_default_items", result);

        Ok(result?
            .items
            .into_iter()
            .map(|saved| Self::raw_item(saved.track))
            .collect())
    }

    async fn count_default_items(&self) -> Result<u32> {
        log_catalog_request!("count_default_items", limit = 1);
        let result = self
            .client
            .current_user_saved_tracks_manual(None, Some(1), Some(0))
            .await;
        log_catalog_result!("count_default_items", result);

        Ok(result?.total)
    }

    async fn list_collection_items(
        &self,
        collection_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RawItem>> {
        let id = PlaylistId::from_id(collection_id)?;

        log_catalog_request!("list_collection_items", collection_id, limit, offset);
        let result = self
            .client
            .playlist_items_manual(id, None, None, Some(limit), Some(offset))
            .await;
        log_catalog_result!("list_collection_items", result);

        // Episodes and unavailable entries come through without an id and are
        // dropped at admission
        Ok(result?
            .items
            .into_iter()
            .map(|item| match item.track {
                Some(PlayableItem::Track(track)) => Self::raw_item(track),
                _ => RawItem::default(),
            })
            .collect())
    }

    async fn collection_total(&self, collection_id: &str) -> Result<u32> {
        let id = PlaylistId::from_id(collection_id)?;

        log_catalog_request!("collection_total", collection_id);
        let result = self.client.playlist(id, None, None).await;
        log_catalog_result!("collection_total", result);

        Ok(result?.tracks.total)
    }

    async fn delete_default_item(&self, item_id: &str) -> Result<()> {
        if item_id.is_empty() {
            return Err(anyhow::anyhow!("Track ID is empty"));
        }

        tracing::debug!(item_id, "Removing track from liked songs");
        let id = TrackId::from_id(item_id)?;
        let result = self.client.current_user_saved_tracks_delete([id]).await;
        log_catalog_result!("delete_default_item", result);
        result?;

        tracing::info!(item_id, "Removed track from liked songs");
        Ok(())
    }

    async fn delete_collection_item(&self, collection_id: &str, item_uri: &str) -> Result<()> {
        tracing::debug!(collection_id, item_uri, "Removing track from playlist");
        let playlist_id = PlaylistId::from_id(collection_id)?;
        let track_id = TrackId::from_uri(item_uri)?;

        let result = self
            .client
            .playlist_remove_all_occurrences_of_items(playlist_id, [PlayableId::Track(track_id)], None)
            .await;
        log_catalog_result!("delete_collection_item", result);
        result?;

        tracing::info!(collection_id, item_uri, "Removed track from playlist");
        Ok(())
    }
}

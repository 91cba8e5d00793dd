//! Catalog access: the remote track store and the page fetcher on top of it

use std::future::Future;

use anyhow::Result;

use super::error::ReviewError;
use super::types::{Collection, FetchedPage, PageRequest, RawItem, Source};

/// Remote store of the user's collections.
///
/// Calls are spawned onto the runtime by the controller, so every returned
/// future must be `Send`.
pub trait CatalogClient: Send + Sync + 'static {
    /// The user's own collections, without the liked songs entry
    fn list_collections(&self) -> impl Future<Output = Result<Vec<Collection>>> + Send;

    fn list_default_items(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Vec<RawItem>>> + Send;

    fn count_default_items(&self) -> impl Future<Output = Result<u32>> + Send;

    fn list_collection_items(
        &self,
        collection_id: &str,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Vec<RawItem>>> + Send;

    /// Total number of tracks in a collection
    fn collection_total(&self, collection_id: &str) -> impl Future<Output = Result<u32>> + Send;

    fn delete_default_item(&self, item_id: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete_collection_item(
        &self,
        collection_id: &str,
        item_uri: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Fetch one page of `source`.
///
/// The total is looked up only for the first page: always for liked songs,
/// and for a playlist only when the page has tracks in it. Later pages leave
/// it as `None` and the session keeps what it already knows.
pub async fn fetch_page<C: CatalogClient>(
    client: &C,
    source: &Source,
    request: PageRequest,
    first_page: bool,
) -> Result<FetchedPage, ReviewError> {
    fetch_raw_page(client, source, request, first_page)
        .await
        .map_err(|cause| ReviewError::FetchFailed {
            source_id: source.clone(),
            offset: request.offset,
            cause,
        })
}

async fn fetch_raw_page<C: CatalogClient>(
    client: &C,
    source: &Source,
    request: PageRequest,
    first_page: bool,
) -> Result<FetchedPage> {
    let PageRequest { limit, offset } = request;
    match source {
        Source::Liked => {
            let total = if first_page {
                Some(client.count_default_items().await?)
            } else {
                None
            };
            let items = client.list_default_items(limit, offset).await?;
            Ok(FetchedPage { items, total })
        }
        Source::Playlist { id } => {
            let items = client.list_collection_items(id, limit, offset).await?;
            let total = if first_page && !items.is_empty() {
                Some(client.collection_total(id).await?)
            } else {
                None
            };
            Ok(FetchedPage { items, total })
        }
    }
}

/// Remove `item` from `source` remotely, using the request shape of the source kind
pub async fn delete_item<C: CatalogClient>(
    client: &C,
    source: &Source,
    item_id: &str,
    item_uri: &str,
) -> Result<(), ReviewError> {
    let deleted = match source {
        Source::Liked => client.delete_default_item(item_id).await,
        Source::Playlist { id } => client.delete_collection_item(id, item_uri).await,
    };

    deleted.map_err(|cause| ReviewError::DeleteFailed {
        source_id: source.clone(),
        item_id: item_id.to_string(),
        cause,
    })
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeCatalog, tracks};
    use super::*;

    #[tokio::test]
    async fn test_liked_first_page_includes_total() {
        let catalog = FakeCatalog::with_liked(tracks("l", 30));
        let request = PageRequest { limit: 25, offset: 0 };

        let page = fetch_page(&catalog, &Source::Liked, request, true).await.unwrap();
        assert_eq!(page.items.len(), 25);
        assert_eq!(page.total, Some(30));

        let next = PageRequest { limit: 25, offset: 25 };
        let page = fetch_page(&catalog, &Source::Liked, next, false).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total, None);
        assert_eq!(
            catalog.calls(),
            vec![
                "count_default_items",
                "list_default_items(25, 0)",
                "list_default_items(25, 25)",
            ]
        );
    }

    #[tokio::test]
    async fn test_playlist_total_only_for_non_empty_first_page() {
        let catalog = FakeCatalog::default();
        catalog.add_playlist("full", tracks("p", 3));
        catalog.add_playlist("empty", Vec::new());
        let request = PageRequest { limit: 25, offset: 0 };

        let page = fetch_page(&catalog, &Source::playlist("full"), request, true)
            .await
            .unwrap();
        assert_eq!(page.total, Some(3));

        let page = fetch_page(&catalog, &Source::playlist("empty"), request, true)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, None);
        assert!(!catalog.calls().contains(&"collection_total(empty)".to_string()));
    }

    #[tokio::test]
    async fn test_failure_maps_to_fetch_failed() {
        let catalog = FakeCatalog::with_liked(tracks("l", 3));
        catalog.set_failing(true);
        let request = PageRequest { limit: 25, offset: 25 };

        let err = fetch_page(&catalog, &Source::Liked, request, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::FetchFailed { offset: 25, .. }));
    }

    #[tokio::test]
    async fn test_delete_uses_request_shape_of_source() {
        let catalog = FakeCatalog::with_liked(tracks("l", 2));
        catalog.add_playlist("mix", tracks("p", 2));

        delete_item(&catalog, &Source::Liked, "l0", "spotify:track:l0")
            .await
            .unwrap();
        delete_item(&catalog, &Source::playlist("mix"), "p1", "spotify:track:p1")
            .await
            .unwrap();

        assert_eq!(
            catalog.calls(),
            vec![
                "delete_default_item(l0)",
                "delete_collection_item(mix, spotify:track:p1)",
            ]
        );
        assert_eq!(catalog.liked_ids(), vec!["l1"]);
    }
}

//! Deduplicating buffer of tracks fetched for one review session

use std::collections::HashSet;

use super::error::InvalidItem;
use super::types::{Item, RawItem};

impl TryFrom<RawItem> for Item {
    type Error = InvalidItem;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let id = raw.id.filter(|id| !id.is_empty()).ok_or(InvalidItem::MissingId)?;
        let name = raw
            .name
            .filter(|name| !name.is_empty())
            .ok_or(InvalidItem::MissingName)?;
        if raw.artists.is_empty() {
            return Err(InvalidItem::NoArtists);
        }

        Ok(Item {
            id,
            name,
            artists: raw.artists,
            album_image_url: raw.album_image_url,
            uri: raw.uri,
        })
    }
}

/// Keep the valid tracks of `raw` whose id is not in `seen`, in arrival order.
///
/// Every accepted id is inserted into `seen`, so duplicates inside one batch
/// are dropped as well and admitting the same batch twice yields nothing the
/// second time.
pub fn admit(raw: Vec<RawItem>, seen: &mut HashSet<String>) -> Vec<Item> {
    raw.into_iter()
        .filter_map(|raw| match Item::try_from(raw) {
            Ok(item) => Some(item),
            Err(reason) => {
                tracing::trace!(%reason, "Dropping invalid track");
                None
            }
        })
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// Ordered tracks of a session plus the ids ever admitted into it
#[derive(Debug, Default)]
pub struct ReviewBuffer {
    items: Vec<Item>,
    seen: HashSet<String>,
}

impl ReviewBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with the admitted tracks of a first page
    pub fn replace(&mut self, raw: Vec<RawItem>) -> usize {
        self.items.clear();
        self.seen.clear();
        self.items = admit(raw, &mut self.seen);
        self.items.len()
    }

    /// Append the admitted tracks of a later page, returning how many were new
    pub fn append(&mut self, raw: Vec<RawItem>) -> usize {
        let admitted = admit(raw, &mut self.seen);
        let count = admitted.len();
        self.items.extend(admitted);
        count
    }

    /// Drop a track that was removed remotely, returning its former index.
    ///
    /// The id stays in the seen set so a later page cannot bring it back.
    pub fn remove(&mut self, item_id: &str) -> Option<usize> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        self.items.remove(index);
        Some(index)
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

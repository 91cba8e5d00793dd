//! Core type definitions for the review queue

use std::fmt;

/// An artist credited on a track
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
}

/// A track exactly as the catalog handed it over.
///
/// Catalog responses are not trusted: local files and podcast episodes come
/// back without an id, and some entries carry no artists. Fields stay
/// optional here and are checked when the item is admitted into a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub artists: Vec<Artist>,
    pub album_image_url: Option<String>,
    pub uri: String,
}

/// A validated track that can be reviewed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub album_image_url: Option<String>,
    pub uri: String,
}

impl Item {
    /// Name of the first credited artist
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or_default()
    }
}

/// Where the reviewed tracks come from
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// The user's saved tracks ("Liked Songs")
    Liked,
    /// A playlist, by its catalog id
    Playlist { id: String },
}

impl Source {
    pub fn playlist(id: impl Into<String>) -> Self {
        Self::Playlist { id: id.into() }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Liked => f.write_str("liked"),
            Source::Playlist { id } => write!(f, "playlist:{}", id),
        }
    }
}

/// An entry of the collection picker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub source: Source,
    pub name: String,
}

impl Collection {
    pub fn liked() -> Self {
        Self {
            source: Source::Liked,
            name: "Liked Songs".to_string(),
        }
    }
}

/// The verdict for one reviewed track
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Keep,
    Remove,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Keep => "KEEP",
            Outcome::Remove => "REMOVE",
        }
    }
}

/// A committed verdict. `committed_at` is the logical order within a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub item_id: String,
    pub outcome: Outcome,
    pub committed_at: u64,
}

/// A page request against the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

/// One page of raw tracks plus the total, when the fetcher looked it up
#[derive(Clone, Debug, Default)]
pub struct FetchedPage {
    pub items: Vec<RawItem>,
    pub total: Option<u32>,
}

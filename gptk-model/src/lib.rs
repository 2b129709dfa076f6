//! Data records shared across the gptk crates: item and collection records as
//! the remote service describes them, page envelopes, and the filter
//! configuration a run is driven by.
#![allow(missing_docs)]

#[macro_use]
mod macros;

pub mod album;
pub mod error;
pub mod filter;
pub mod keys;
pub mod media;
pub mod page;
pub mod source;

pub use album::{ALBUM_ITEM_LIMIT, Album, SharedLink};
pub use error::ModelError;
pub use filter::{
    DateType, Filter, IntervalType, MatchType, MediaTypeFilter, Quality,
    SpaceConsumption, UploadStatus,
};
pub use keys::{AlbumKey, DedupKey, MediaKey};
pub use media::{GeoLocation, MediaItem, Resolution};
pub use page::Page;
pub use source::{Source, SourceKind};

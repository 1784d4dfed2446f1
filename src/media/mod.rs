//! Media library: documents, images and films.
//!
//! Every kind is its own collection with the same record shape, change log
//! and revert as templates, and its own external identifier index.

mod store;
mod types;
mod visibility;

pub use store::{create_media_repository, InMemoryMediaRepository, MediaRepository};
pub use types::{MediaContent, MediaItem, MediaKind};
pub use visibility::{MEDIA_FILTERS, MEDIA_LOG_FIELDS, MEDIA_READ_FIELDS, MEDIA_WRITE_FIELDS};

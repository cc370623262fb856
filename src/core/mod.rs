//! Core types - pure abstractions shared across the codebase.

mod category;
mod queue;
mod url;

pub use category::{RefCategory, TAGS_WITH_REFERENCES};
pub use queue::AssetQueue;
pub use url::{is_fetchable, normalize};

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod image;
pub mod profile;
pub mod source;
pub mod storage;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::aggregator::Aggregator;
    pub use crate::api::AppState;
    pub use crate::config::Config;
    pub use crate::error::ListError;
    pub use crate::profile::{MediaKind, MediaProfile, Status};
    pub use crate::source::{ListSource, MalSource};
    pub use crate::storage::{MemoryStorage, Storage};
    pub use crate::types::{AggregateResult, ListEntry, ListRequest, MediaSelection, SortKey};
}

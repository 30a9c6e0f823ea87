//! Storage implementations for different backends

#[cfg(feature = "in-memory")]
pub mod in_memory;
pub mod record;
#[cfg(feature = "rest")]
pub mod rest;

#[cfg(feature = "in-memory")]
pub use in_memory::{InMemoryAuthProvider, InMemoryReviewStore, InMemoryToyStore};
pub use record::{BackendReview, BackendReviewPayload, BackendToy, BackendToyPayload};
#[cfg(feature = "rest")]
pub use rest::{RestAuthProvider, RestReviewStore, RestToyStore};

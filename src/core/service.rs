//! Service trait for the storage collaborator

use async_trait::async_trait;
use serde::Serialize;

use crate::core::error::CatalogError;
use crate::core::query::ToyQuery;
use crate::core::review::{Review, ReviewDraft, ReviewFilter, ReviewStats};
use crate::core::toy::{MessageAuthor, Toy, ToyDraft, ToyMessage};

/// Optional server-side narrowing passed through to the store
///
/// Stores may honor these to shrink the payload, but the catalog re-applies
/// the full filter and sort locally, so correctness never depends on them.
/// Serialized as URL query parameters; absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_idx: Option<usize>,
}

impl StoreQuery {
    /// Parameters worth forwarding for `query`
    ///
    /// Labels and sorting are never forwarded.
    pub fn from_query(query: &ToyQuery) -> Self {
        Self {
            txt: query.filter.txt.clone().filter(|t| !t.is_empty()),
            min_price: query.filter.min_price,
            max_price: query.filter.max_price,
            in_stock: query.filter.in_stock,
            page_idx: query.page_idx,
        }
    }
}

/// CRUD over toy records, keyed by their opaque identifier
///
/// Implementations normalize whatever the backend stores into [`Toy`] before
/// returning it; nothing above this trait sees backend field names.
#[async_trait]
pub trait ToyStore: Send + Sync {
    /// List toys, optionally narrowed/paginated server-side
    async fn list(&self, query: &StoreQuery) -> Result<Vec<Toy>, CatalogError>;

    /// Get a toy by ID
    async fn get(&self, id: &str) -> Result<Option<Toy>, CatalogError>;

    /// Create a toy; the store assigns `id` and `created_at`
    async fn create(&self, draft: ToyDraft) -> Result<Toy, CatalogError>;

    /// Update an existing toy, keeping its `id`, `created_at` and messages
    async fn update(&self, id: &str, draft: ToyDraft) -> Result<Toy, CatalogError>;

    /// Delete a toy
    async fn delete(&self, id: &str) -> Result<(), CatalogError>;

    /// Append a message to a toy's chat
    async fn add_message(&self, toy_id: &str, msg: ToyMessage) -> Result<ToyMessage, CatalogError>;

    /// Remove a message from a toy's chat
    async fn remove_message(&self, toy_id: &str, msg_id: &str) -> Result<(), CatalogError>;
}

/// CRUD over toy reviews
///
/// `by_toy` and `stats` fall back to `query`; backends with dedicated
/// endpoints override them.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Reviews matching `filter`, oldest first
    async fn query(&self, filter: &ReviewFilter) -> Result<Vec<Review>, CatalogError>;

    /// Get a review by ID
    async fn get(&self, id: &str) -> Result<Option<Review>, CatalogError>;

    /// Store a new review by `author`; the store assigns `id` and `created_at`
    async fn add(&self, draft: ReviewDraft, author: MessageAuthor) -> Result<Review, CatalogError>;

    /// Replace the text of an existing review
    async fn update(&self, id: &str, draft: ReviewDraft) -> Result<Review, CatalogError>;

    /// Delete a review
    async fn remove(&self, id: &str) -> Result<(), CatalogError>;

    async fn by_toy(&self, toy_id: &str) -> Result<Vec<Review>, CatalogError> {
        self.query(&ReviewFilter::for_toy(toy_id)).await
    }

    async fn stats(&self, toy_id: &str) -> Result<ReviewStats, CatalogError> {
        let reviews = self.by_toy(toy_id).await?;
        Ok(ReviewStats::from_reviews(toy_id, &reviews))
    }
}

//! # Toy Catalog
//!
//! Client-side toy catalog: browse, filter, sort and edit toys stored behind
//! a REST API.
//!
//! ## Features
//!
//! - **Query Pipeline**: pure, stable filter and sort passes over a fetched snapshot
//! - **Backend-independent**: label filtering and sorting always run locally
//! - **Last Request Wins**: queries tagged with tickets, stale results dropped
//! - **Centralized Authorization**: one capability check for every mutation
//! - **Storage Boundary**: backend field names normalized in one place
//! - **Reviews**: per-toy reviews with author-or-admin removal and statistics
//! - **Configuration-Based**: API root, labels and debounce delay via YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use toy_catalog::prelude::*;
//!
//! let config = CatalogConfig::from_yaml_file("catalog.yaml")?;
//! let catalog = Catalog::new(
//!     RestToyStore::from_config(&config)?,
//!     RestAuthProvider::from_config(&config)?,
//! )
//! .with_vocabulary(config.vocabulary());
//!
//! let filter = catalog.normalize_filter(&FilterForm {
//!     txt: "doll".to_string(),
//!     max_price: "100".to_string(),
//!     ..Default::default()
//! })?;
//! let query = ToyQuery::initial()
//!     .with_filter(filter)
//!     .with_sort(SortCriteria::ascending(SortField::Name));
//! let toys = catalog.query_toys(&query).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        auth::{AuthContext, AuthPolicy, AuthProvider, CatalogAction, Credentials, CurrentUser},
        error::CatalogError,
        pipeline::{apply_filter, apply_sort},
        query::{FilterCriteria, FilterForm, SortCriteria, SortField, ToyQuery},
        review::{Review, ReviewDraft, ReviewFilter, ReviewFilterForm, ReviewStats, ReviewedToy},
        sequence::{Debouncer, QueryTicket, RequestSequencer},
        service::{ReviewStore, StoreQuery, ToyStore},
        toy::{LabelVocabulary, MessageAuthor, Toy, ToyDraft, ToyMessage},
    };

    // === Catalog ===
    pub use crate::catalog::{
        Catalog, Dashboard, LabelCounts, StockValue, ToyListState, UserDetails,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::{InMemoryAuthProvider, InMemoryReviewStore, InMemoryToyStore};
    #[cfg(feature = "rest")]
    pub use crate::storage::{RestAuthProvider, RestReviewStore, RestToyStore};

    // === Config ===
    pub use crate::config::CatalogConfig;

    // === External dependencies ===
    pub use async_trait::async_trait;
}

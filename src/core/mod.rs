//! Core module containing the catalog's types, traits and the query pipeline

pub mod auth;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod review;
pub mod sequence;
pub mod service;
pub mod toy;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, CatalogAction, Credentials, CurrentUser};
pub use error::CatalogError;
pub use query::{FilterCriteria, FilterForm, SortCriteria, SortField, ToyQuery};
pub use review::{Review, ReviewDraft, ReviewFilter, ReviewFilterForm, ReviewStats, ReviewedToy};
pub use sequence::{Debouncer, QueryTicket, RequestSequencer};
pub use service::{ReviewStore, StoreQuery, ToyStore};
pub use toy::{LabelVocabulary, MessageAuthor, Toy, ToyDraft, ToyMessage};

//! The catalog facade: queries, aggregations and authorized mutations
//!
//! [`Catalog`] ties a [`ToyStore`] to an [`AuthProvider`], optionally with a
//! [`ReviewStore`]. Reads go through the query pipeline; every mutation passes
//! the capability check in [`crate::core::auth::authorize`] first.
//!
//! # Example
//!
//! ```rust,ignore
//! let api = "http://localhost:3030/api";
//! let catalog = Catalog::new(RestToyStore::new(api), RestAuthProvider::new(api))
//!     .with_reviews(RestReviewStore::new(api));
//!
//! let query = ToyQuery::initial()
//!     .with_filter(FilterCriteria { in_stock: Some(true), ..Default::default() })
//!     .with_sort(SortCriteria::descending(SortField::Price));
//! let toys = catalog.query_toys(&query).await?;
//! ```

pub mod state;

pub use state::ToyListState;

use indexmap::IndexMap;
use uuid::Uuid;
use validator::Validate;

use crate::core::auth::{AuthProvider, CatalogAction, CurrentUser, authorize};
use crate::core::error::CatalogError;
use crate::core::pipeline;
use crate::core::query::{FilterCriteria, FilterForm, ToyQuery};
use crate::core::review::{Review, ReviewDraft, ReviewFilter, ReviewStats};
use crate::core::service::{ReviewStore, StoreQuery, ToyStore};
use crate::core::toy::{LabelVocabulary, MessageAuthor, Toy, ToyDraft, ToyMessage};

/// Number of toys carrying each vocabulary label, in vocabulary order
pub type LabelCounts = IndexMap<String, usize>;

/// How many toys are in stock, out of how many
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockValue {
    pub in_stock_count: usize,
    pub total_count: usize,
}

impl StockValue {
    /// Share of toys in stock, 0.0 for an empty catalog
    pub fn ratio(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.in_stock_count as f64 / self.total_count as f64
    }
}

/// Aggregates shown on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub label_counts: LabelCounts,
    pub stock: StockValue,
}

/// A user profile with the reviews they wrote
#[derive(Debug, Clone, PartialEq)]
pub struct UserDetails {
    pub user: CurrentUser,
    pub reviews: Vec<Review>,
}

/// Toy catalog over a storage and an authentication collaborator
///
/// The review API is available once a [`ReviewStore`] is attached with
/// [`Catalog::with_reviews`].
#[derive(Debug, Clone)]
pub struct Catalog<S, A, R = ()> {
    store: S,
    auth: A,
    reviews: R,
    vocabulary: LabelVocabulary,
}

impl<S: ToyStore, A: AuthProvider> Catalog<S, A> {
    /// Create a catalog using the default label vocabulary
    pub fn new(store: S, auth: A) -> Self {
        Self {
            store,
            auth,
            reviews: (),
            vocabulary: LabelVocabulary::default(),
        }
    }
}

impl<S: ToyStore, A: AuthProvider, R> Catalog<S, A, R> {
    /// Attach a review store, replacing any previous one
    pub fn with_reviews<R2: ReviewStore>(self, reviews: R2) -> Catalog<S, A, R2> {
        Catalog {
            store: self.store,
            auth: self.auth,
            reviews,
            vocabulary: self.vocabulary,
        }
    }

    /// Replace the label vocabulary used for forms, drafts and label counts
    pub fn with_vocabulary(mut self, vocabulary: LabelVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// The toy storage collaborator
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The authentication collaborator
    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// The labels a toy may carry, in display order
    pub fn labels(&self) -> &[String] {
        self.vocabulary.labels()
    }

    /// Template for the "add toy" form
    pub fn empty_toy(&self) -> ToyDraft {
        ToyDraft::empty()
    }

    /// Turn raw filter-form input into pipeline criteria
    pub fn normalize_filter(&self, form: &FilterForm) -> Result<FilterCriteria, CatalogError> {
        form.normalize(&self.vocabulary)
    }

    /// Fetch a fresh snapshot, then filter and sort it locally
    ///
    /// Text, price and stock filters are forwarded to the store as an
    /// optimization; label filtering and sorting always happen here. A store
    /// failure is returned as is, with no retry.
    pub async fn query_toys(&self, query: &ToyQuery) -> Result<Vec<Toy>, CatalogError> {
        let fetched = self.store.list(&StoreQuery::from_query(query)).await?;
        let toys = pipeline::run(&fetched, query);
        tracing::debug!(
            fetched = fetched.len(),
            count = toys.len(),
            page_idx = ?query.page_idx,
            "Queried toys"
        );
        Ok(toys)
    }

    /// Count toys per vocabulary label; every label is present, even at zero
    pub async fn get_toy_label_counts(&self) -> Result<LabelCounts, CatalogError> {
        let toys = self.query_toys(&ToyQuery::unfiltered()).await?;
        Ok(self
            .vocabulary
            .iter()
            .map(|label| {
                let count = toys.iter().filter(|toy| toy.has_label(label)).count();
                (label.to_string(), count)
            })
            .collect())
    }

    /// In-stock count and total count over the whole catalog
    pub async fn get_in_stock_value(&self) -> Result<StockValue, CatalogError> {
        let toys = self.query_toys(&ToyQuery::unfiltered()).await?;
        Ok(StockValue {
            in_stock_count: toys.iter().filter(|toy| toy.in_stock).count(),
            total_count: toys.len(),
        })
    }

    /// Both dashboard aggregates, fetched concurrently
    pub async fn dashboard(&self) -> Result<Dashboard, CatalogError> {
        let (label_counts, stock) =
            futures::try_join!(self.get_toy_label_counts(), self.get_in_stock_value())?;
        Ok(Dashboard {
            label_counts,
            stock,
        })
    }

    /// Fetch one toy; a missing toy is `NotFound`
    pub async fn get_by_id(&self, id: &str) -> Result<Toy, CatalogError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::toy_not_found(id))
    }

    /// Create the toy when the draft has no id, update it otherwise
    ///
    /// Creating needs a logged-in user, updating needs an admin.
    pub async fn save(&self, draft: ToyDraft) -> Result<Toy, CatalogError> {
        let action = if draft.id.is_some() {
            CatalogAction::UpdateToy
        } else {
            CatalogAction::CreateToy
        };
        authorize(&self.auth.context(), &action)?;
        draft.validate()?;
        self.vocabulary.check(&draft.labels)?;

        let saved = match draft.id.clone() {
            Some(id) => self.store.update(&id, draft).await?,
            None => self.store.create(draft).await?,
        };
        tracing::debug!(toy_id = %saved.id, action = %action, "Toy saved");
        Ok(saved)
    }

    /// Delete a toy (admin only) and return its id
    pub async fn remove(&self, id: &str) -> Result<String, CatalogError> {
        authorize(&self.auth.context(), &CatalogAction::DeleteToy)?;
        self.store.delete(id).await?;
        tracing::debug!(toy_id = id, "Toy removed");
        Ok(id.to_string())
    }

    /// Post a chat message as the current user
    pub async fn add_message(&self, toy_id: &str, txt: &str) -> Result<ToyMessage, CatalogError> {
        let context = self.auth.context();
        authorize(&context, &CatalogAction::PostMessage)?;
        let user = context.user().ok_or(CatalogError::Unauthorized {
            action: CatalogAction::PostMessage.describe(),
        })?;

        let txt = txt.trim();
        if txt.is_empty() {
            return Err(CatalogError::InvalidInput {
                field: "txt",
                reason: "message must not be empty".to_string(),
            });
        }

        let msg = ToyMessage {
            id: Uuid::new_v4().simple().to_string(),
            txt: txt.to_string(),
            by: MessageAuthor {
                id: user.id.clone(),
                fullname: user.fullname.clone(),
            },
        };
        self.store.add_message(toy_id, msg).await
    }

    /// Remove a chat message; allowed for its author and for admins
    pub async fn remove_message(&self, toy_id: &str, msg_id: &str) -> Result<(), CatalogError> {
        let toy = self.get_by_id(toy_id).await?;
        let msg = toy
            .msgs
            .iter()
            .find(|m| m.id == msg_id)
            .ok_or_else(|| CatalogError::NotFound {
                entity: "message",
                id: msg_id.to_string(),
            })?;

        authorize(
            &self.auth.context(),
            &CatalogAction::RemoveMessage {
                author_id: msg.by.id.clone(),
            },
        )?;
        self.store.remove_message(toy_id, msg_id).await
    }

    /// Re-run the list's current query and apply the result if still latest
    ///
    /// Returns `Ok(false)` when a newer query superseded this one.
    pub async fn refresh(&self, state: &mut ToyListState) -> Result<bool, CatalogError> {
        let (ticket, query) = state.begin_query();
        let result = self.query_toys(&query).await;
        state.resolve(ticket, result)
    }
}

impl<S: ToyStore, A: AuthProvider, R: ReviewStore> Catalog<S, A, R> {
    /// The review storage collaborator
    pub fn reviews(&self) -> &R {
        &self.reviews
    }

    /// Reviews matching the explorer filter; readable by anyone
    pub async fn query_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, CatalogError> {
        let reviews = self.reviews.query(filter).await?;
        tracing::debug!(count = reviews.len(), "Queried reviews");
        Ok(reviews)
    }

    /// Fetch one review; a missing review is `NotFound`
    pub async fn get_review(&self, id: &str) -> Result<Review, CatalogError> {
        self.reviews
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                entity: "review",
                id: id.to_string(),
            })
    }

    /// Reviews of one toy, oldest first
    pub async fn get_toy_reviews(&self, toy_id: &str) -> Result<Vec<Review>, CatalogError> {
        self.reviews.by_toy(toy_id).await
    }

    /// Review count, distinct reviewers and newest review of one toy
    pub async fn get_review_stats(&self, toy_id: &str) -> Result<ReviewStats, CatalogError> {
        self.reviews.stats(toy_id).await
    }

    /// Review a toy as the current user
    pub async fn add_review(&self, toy_id: &str, txt: &str) -> Result<Review, CatalogError> {
        let context = self.auth.context();
        authorize(&context, &CatalogAction::AddReview)?;
        let user = context.user().ok_or(CatalogError::Unauthorized {
            action: CatalogAction::AddReview.describe(),
        })?;

        let draft = ReviewDraft::new(toy_id, txt.trim());
        draft.validate()?;
        let author = MessageAuthor {
            id: user.id.clone(),
            fullname: user.fullname.clone(),
        };
        let review = self.reviews.add(draft, author).await?;
        tracing::debug!(review_id = %review.id, toy_id, "Review added");
        Ok(review)
    }

    /// Change a review's text; allowed for its author and for admins
    pub async fn update_review(&self, id: &str, txt: &str) -> Result<Review, CatalogError> {
        let review = self.get_review(id).await?;
        authorize(
            &self.auth.context(),
            &CatalogAction::UpdateReview {
                author_id: review.user.id.clone(),
            },
        )?;
        let draft = ReviewDraft::new(review.toy.id, txt.trim());
        draft.validate()?;
        self.reviews.update(id, draft).await
    }

    /// Delete a review and return its id; allowed for its author and for admins
    pub async fn remove_review(&self, id: &str) -> Result<String, CatalogError> {
        let review = self.get_review(id).await?;
        authorize(
            &self.auth.context(),
            &CatalogAction::RemoveReview {
                author_id: review.user.id,
            },
        )?;
        self.reviews.remove(id).await?;
        tracing::debug!(review_id = id, "Review removed");
        Ok(id.to_string())
    }

    /// A user's profile together with every review they wrote
    pub async fn get_user_details(&self, user_id: &str) -> Result<UserDetails, CatalogError> {
        let review_filter = ReviewFilter::by_user(user_id);
        let (user, reviews) = futures::try_join!(
            self.auth.get_user(user_id),
            self.reviews.query(&review_filter),
        )?;
        let user = user.ok_or_else(|| CatalogError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })?;
        Ok(UserDetails { user, reviews })
    }
}

//! In-memory implementations of ToyStore, ReviewStore and AuthProvider for
//! testing and development

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::auth::{AuthProvider, Credentials, CurrentUser, Session};
use crate::core::error::CatalogError;
use crate::core::pipeline;
use crate::core::query::FilterCriteria;
use crate::core::review::{Review, ReviewDraft, ReviewFilter, ReviewedToy};
use crate::core::service::{ReviewStore, StoreQuery, ToyStore};
use crate::core::toy::{MessageAuthor, Toy, ToyDraft, ToyMessage, now_millis};

/// Page size used when a `page_idx` is forwarded
pub const DEFAULT_PAGE_SIZE: usize = 20;

fn lock_error(err: impl std::fmt::Display) -> CatalogError {
    CatalogError::storage(format!("Failed to acquire lock: {}", err))
}

/// In-memory toy store
///
/// Keeps insertion order, honors the forwarded server-side filters and
/// paginates when asked. Clones share the same records.
#[derive(Debug, Clone)]
pub struct InMemoryToyStore {
    toys: Arc<RwLock<IndexMap<String, Toy>>>,
    page_size: usize,
}

impl InMemoryToyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            toys: Arc::new(RwLock::new(IndexMap::new())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Create a store pre-filled with `toys`, ids kept as given
    pub fn with_toys(toys: impl IntoIterator<Item = Toy>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.toys.write() {
            map.extend(toys.into_iter().map(|toy| (toy.id.clone(), toy)));
        }
        store
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of stored toys
    pub fn len(&self) -> usize {
        self.toys.read().map(|toys| toys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryToyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToyStore for InMemoryToyStore {
    async fn list(&self, query: &StoreQuery) -> Result<Vec<Toy>, CatalogError> {
        let toys = self.toys.read().map_err(lock_error)?;
        let snapshot: Vec<Toy> = toys.values().cloned().collect();
        drop(toys);

        let server_side = FilterCriteria {
            txt: query.txt.clone(),
            min_price: query.min_price,
            max_price: query.max_price,
            in_stock: query.in_stock,
            labels: Vec::new(),
        };
        let filtered = pipeline::apply_filter(&snapshot, &server_side);

        Ok(match query.page_idx {
            Some(page_idx) => filtered
                .into_iter()
                // past the addressable range is simply an empty page
                .skip(page_idx.saturating_mul(self.page_size))
                .take(self.page_size)
                .collect(),
            None => filtered,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<Toy>, CatalogError> {
        let toys = self.toys.read().map_err(lock_error)?;
        Ok(toys.get(id).cloned())
    }

    async fn create(&self, draft: ToyDraft) -> Result<Toy, CatalogError> {
        let toy = draft.into_toy(Uuid::new_v4().simple().to_string(), now_millis());
        let mut toys = self.toys.write().map_err(lock_error)?;
        toys.insert(toy.id.clone(), toy.clone());
        Ok(toy)
    }

    async fn update(&self, id: &str, draft: ToyDraft) -> Result<Toy, CatalogError> {
        let mut toys = self.toys.write().map_err(lock_error)?;
        let existing = toys
            .get_mut(id)
            .ok_or_else(|| CatalogError::toy_not_found(id))?;

        let mut updated = draft.into_toy(existing.id.clone(), existing.created_at);
        updated.msgs = std::mem::take(&mut existing.msgs);
        *existing = updated.clone();

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let mut toys = self.toys.write().map_err(lock_error)?;
        toys.shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| CatalogError::toy_not_found(id))
    }

    async fn add_message(&self, toy_id: &str, msg: ToyMessage) -> Result<ToyMessage, CatalogError> {
        let mut toys = self.toys.write().map_err(lock_error)?;
        let toy = toys
            .get_mut(toy_id)
            .ok_or_else(|| CatalogError::toy_not_found(toy_id))?;
        toy.msgs.push(msg.clone());
        Ok(msg)
    }

    async fn remove_message(&self, toy_id: &str, msg_id: &str) -> Result<(), CatalogError> {
        let mut toys = self.toys.write().map_err(lock_error)?;
        let toy = toys
            .get_mut(toy_id)
            .ok_or_else(|| CatalogError::toy_not_found(toy_id))?;

        let before = toy.msgs.len();
        toy.msgs.retain(|m| m.id != msg_id);
        if toy.msgs.len() == before {
            return Err(CatalogError::NotFound {
                entity: "message",
                id: msg_id.to_string(),
            });
        }
        Ok(())
    }
}

struct Account {
    password: String,
    user: CurrentUser,
}

/// In-memory auth provider
///
/// Accounts live in a map keyed by username; the logged-in user is kept in a
/// [`Session`].
#[derive(Clone, Default)]
pub struct InMemoryAuthProvider {
    accounts: Arc<RwLock<IndexMap<String, Account>>>,
    session: Arc<Session>,
}

impl std::fmt::Debug for InMemoryAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAuthProvider")
            .field("current_user", &self.session.get())
            .finish_non_exhaustive()
    }
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account up front
    pub fn with_account(self, credentials: &Credentials, is_admin: bool) -> Self {
        if let Ok(mut accounts) = self.accounts.write() {
            let user = new_user(credentials, is_admin);
            accounts.insert(
                credentials.username.clone(),
                Account {
                    password: credentials.password.clone(),
                    user,
                },
            );
        }
        self
    }
}

fn new_user(credentials: &Credentials, is_admin: bool) -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4().simple().to_string(),
        username: credentials.username.clone(),
        fullname: credentials
            .fullname
            .clone()
            .unwrap_or_else(|| credentials.username.clone()),
        is_admin,
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn login(&self, credentials: &Credentials) -> Result<CurrentUser, CatalogError> {
        let user = {
            let accounts = self.accounts.read().map_err(lock_error)?;
            accounts
                .get(&credentials.username)
                .filter(|account| account.password == credentials.password)
                .map(|account| account.user.clone())
                .ok_or(CatalogError::InvalidCredentials)?
        };
        self.session.set(user.clone());
        Ok(user)
    }

    async fn signup(&self, credentials: &Credentials) -> Result<CurrentUser, CatalogError> {
        let user = {
            let mut accounts = self.accounts.write().map_err(lock_error)?;
            if accounts.contains_key(&credentials.username) {
                return Err(CatalogError::Conflict(format!(
                    "username '{}'",
                    credentials.username
                )));
            }
            let user = new_user(credentials, false);
            accounts.insert(
                credentials.username.clone(),
                Account {
                    password: credentials.password.clone(),
                    user: user.clone(),
                },
            );
            user
        };
        self.session.set(user.clone());
        Ok(user)
    }

    async fn logout(&self) -> Result<(), CatalogError> {
        self.session.clear();
        Ok(())
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.session.get()
    }

    async fn get_user(&self, id: &str) -> Result<Option<CurrentUser>, CatalogError> {
        let accounts = self.accounts.read().map_err(lock_error)?;
        Ok(accounts
            .values()
            .find(|account| account.user.id == id)
            .map(|account| account.user.clone()))
    }
}

/// In-memory review store
///
/// Reviews are attached to toys of the given [`InMemoryToyStore`]; adding a
/// review for a toy it does not hold fails with `NotFound`.
#[derive(Debug, Clone)]
pub struct InMemoryReviewStore {
    reviews: Arc<RwLock<IndexMap<String, Review>>>,
    toys: InMemoryToyStore,
}

impl InMemoryReviewStore {
    /// Create an empty review store over `toys`
    pub fn new(toys: InMemoryToyStore) -> Self {
        Self {
            reviews: Arc::new(RwLock::new(IndexMap::new())),
            toys,
        }
    }

    /// Number of stored reviews
    pub fn len(&self) -> usize {
        self.reviews.read().map(|reviews| reviews.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn review_not_found(id: &str) -> CatalogError {
    CatalogError::NotFound {
        entity: "review",
        id: id.to_string(),
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn query(&self, filter: &ReviewFilter) -> Result<Vec<Review>, CatalogError> {
        let reviews = self.reviews.read().map_err(lock_error)?;
        let snapshot: Vec<Review> = reviews.values().cloned().collect();
        Ok(filter.apply(&snapshot))
    }

    async fn get(&self, id: &str) -> Result<Option<Review>, CatalogError> {
        let reviews = self.reviews.read().map_err(lock_error)?;
        Ok(reviews.get(id).cloned())
    }

    async fn add(&self, draft: ReviewDraft, author: MessageAuthor) -> Result<Review, CatalogError> {
        let toy = self
            .toys
            .get(&draft.toy_id)
            .await?
            .ok_or_else(|| CatalogError::toy_not_found(&draft.toy_id))?;

        let review = Review {
            id: Uuid::new_v4().simple().to_string(),
            txt: draft.txt,
            created_at: now_millis(),
            toy: ReviewedToy {
                id: toy.id,
                name: toy.name,
                price: toy.price,
            },
            user: author,
        };
        let mut reviews = self.reviews.write().map_err(lock_error)?;
        reviews.insert(review.id.clone(), review.clone());
        Ok(review)
    }

    async fn update(&self, id: &str, draft: ReviewDraft) -> Result<Review, CatalogError> {
        let mut reviews = self.reviews.write().map_err(lock_error)?;
        let review = reviews.get_mut(id).ok_or_else(|| review_not_found(id))?;
        review.txt = draft.txt;
        Ok(review.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), CatalogError> {
        let mut reviews = self.reviews.write().map_err(lock_error)?;
        reviews
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| review_not_found(id))
    }
}

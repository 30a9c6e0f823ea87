//! REST implementations of ToyStore, ReviewStore and AuthProvider
//!
//! Endpoints, relative to the configured API root:
//!
//! ```text
//! GET    /toy?txt=&minPrice=&maxPrice=&inStock=&pageIdx=
//! GET    /toy/{id}
//! POST   /toy                    PUT /toy/{id}        DELETE /toy/{id}
//! POST   /toy/{id}/msg           DELETE /toy/{id}/msg/{msgId}
//! GET    /review?toyId=&userId=&limit=
//! GET    /review/{id}            DELETE /review/{id}
//! POST   /review                 PUT /review
//! GET    /review/toy/{toyId}     GET /review/toy/{toyId}/stats
//! POST   /auth/login             POST /auth/signup    POST /auth/logout
//! GET    /user/{id}
//! ```
//!
//! Ids are percent-encoded as single path segments. Failures are logged and
//! propagated unchanged; nothing is retried here.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::core::auth::{AuthProvider, Credentials, CurrentUser, Session};
use crate::core::error::CatalogError;
use crate::core::review::{Review, ReviewDraft, ReviewFilter, ReviewStats};
use crate::core::service::{ReviewStore, StoreQuery, ToyStore};
use crate::core::toy::{MessageAuthor, Toy, ToyDraft, ToyMessage};
use crate::storage::record::{BackendReview, BackendReviewPayload, BackendToy, BackendToyPayload};

/// `api_root` followed by `segments`, each encoded as one path segment
fn endpoint(api_root: &str, segments: &[&str]) -> Result<Url, CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidInput {
        field: "base_url",
        reason,
    };
    let mut url = Url::parse(api_root).map_err(|e| invalid(format!("'{}': {}", api_root, e)))?;
    url.path_segments_mut()
        .map_err(|()| invalid(format!("'{}' cannot be a base URL", api_root)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-success response into [`CatalogError::Storage`]
async fn check(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    };
    Err(CatalogError::Storage {
        status: Some(status.as_u16()),
        message,
    })
}

fn build_client(config: &CatalogConfig) -> Result<Client, CatalogError> {
    Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(CatalogError::from)
}

/// Toy store backed by the REST API
#[derive(Debug, Clone)]
pub struct RestToyStore {
    client: Client,
    api_root: String,
}

impl RestToyStore {
    /// Create a store with a default client
    pub fn new(api_root: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_root)
    }

    /// Use a preconfigured client; a trailing `/` on the root is ignored
    pub fn with_client(client: Client, api_root: impl Into<String>) -> Self {
        let api_root = api_root.into().trim_end_matches('/').to_string();
        Self { client, api_root }
    }

    /// Create a store honoring the configured root and timeout
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_client(build_client(config)?, config.api_root()))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        endpoint(&self.api_root, segments)
    }

    async fn fetch_all(&self, query: &StoreQuery) -> Result<Vec<BackendToy>, CatalogError> {
        let url = self.url(&["toy"])?;
        let response = self.client.get(url).query(query).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn send_toy(&self, request: reqwest::RequestBuilder) -> Result<Toy, CatalogError> {
        let response = check(request.send().await?).await?;
        let raw: BackendToy = response.json().await?;
        Ok(Toy::from(raw))
    }
}

#[async_trait]
impl ToyStore for RestToyStore {
    async fn list(&self, query: &StoreQuery) -> Result<Vec<Toy>, CatalogError> {
        tracing::debug!(page_idx = ?query.page_idx, "Fetching toys");
        let raw = self
            .fetch_all(query)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching toys"))?;
        tracing::debug!(count = raw.len(), "Fetched toys");
        Ok(raw.into_iter().map(Toy::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Toy>, CatalogError> {
        let response = self.client.get(self.url(&["toy", id])?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: BackendToy = check(response)
            .await
            .inspect_err(|e| tracing::error!(toy_id = id, error = %e, "Error fetching toy"))?
            .json()
            .await?;
        Ok(Some(Toy::from(raw)))
    }

    async fn create(&self, draft: ToyDraft) -> Result<Toy, CatalogError> {
        let payload = BackendToyPayload::from(&draft);
        self.send_toy(self.client.post(self.url(&["toy"])?).json(&payload))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error adding toy"))
    }

    async fn update(&self, id: &str, draft: ToyDraft) -> Result<Toy, CatalogError> {
        let payload = BackendToyPayload::from(&draft);
        let response = self
            .client
            .put(self.url(&["toy", id])?)
            .json(&payload)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::toy_not_found(id));
        }
        let raw: BackendToy = check(response)
            .await
            .inspect_err(|e| tracing::error!(toy_id = id, error = %e, "Error updating toy"))?
            .json()
            .await?;
        Ok(Toy::from(raw))
    }

    async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let response = self.client.delete(self.url(&["toy", id])?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::toy_not_found(id));
        }
        check(response)
            .await
            .inspect_err(|e| tracing::error!(toy_id = id, error = %e, "Error removing toy"))?;
        Ok(())
    }

    async fn add_message(&self, toy_id: &str, msg: ToyMessage) -> Result<ToyMessage, CatalogError> {
        let url = self.url(&["toy", toy_id, "msg"])?;
        let response = self.client.post(url).json(&msg).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::toy_not_found(toy_id));
        }
        Ok(check(response).await?.json().await?)
    }

    async fn remove_message(&self, toy_id: &str, msg_id: &str) -> Result<(), CatalogError> {
        let url = self.url(&["toy", toy_id, "msg", msg_id])?;
        let response = self.client.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                entity: "message",
                id: msg_id.to_string(),
            });
        }
        check(response).await?;
        Ok(())
    }
}

/// Auth provider backed by the REST API
///
/// The user returned by login/signup is kept in an in-process [`Session`].
#[derive(Debug, Clone)]
pub struct RestAuthProvider {
    client: Client,
    api_root: String,
    session: Arc<Session>,
}

impl RestAuthProvider {
    /// Create a provider with a default client and no session
    pub fn new(api_root: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_root)
    }

    /// Use a preconfigured client; a trailing `/` on the root is ignored
    pub fn with_client(client: Client, api_root: impl Into<String>) -> Self {
        Self {
            client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
            session: Arc::new(Session::new()),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_client(build_client(config)?, config.api_root()))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        endpoint(&self.api_root, segments)
    }

    async fn authenticate(
        &self,
        action: &str,
        credentials: &Credentials,
    ) -> Result<CurrentUser, CatalogError> {
        let response = self
            .client
            .post(self.url(&["auth", action])?)
            .json(credentials)
            .send()
            .await?;
        if action == "login" && response.status() == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::InvalidCredentials);
        }
        let user: CurrentUser = check(response)
            .await
            .inspect_err(|e| tracing::error!(action, error = %e, "Authentication failed"))?
            .json()
            .await?;
        self.session.set(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn login(&self, credentials: &Credentials) -> Result<CurrentUser, CatalogError> {
        self.authenticate("login", credentials).await
    }

    async fn signup(&self, credentials: &Credentials) -> Result<CurrentUser, CatalogError> {
        self.authenticate("signup", credentials).await
    }

    /// Clears the session even when the backend call fails
    async fn logout(&self) -> Result<(), CatalogError> {
        let result: Result<(), CatalogError> = async {
            let response = self.client.post(self.url(&["auth", "logout"])?).send().await?;
            check(response).await?;
            Ok(())
        }
        .await;
        self.session.clear();
        if let Err(e) = result {
            tracing::warn!(error = %e, "Logout failed on the backend, session cleared locally");
        }
        Ok(())
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.session.get()
    }

    async fn get_user(&self, id: &str) -> Result<Option<CurrentUser>, CatalogError> {
        let response = self.client.get(self.url(&["user", id])?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let user = check(response)
            .await
            .inspect_err(|e| tracing::error!(user_id = id, error = %e, "Error fetching user"))?
            .json()
            .await?;
        Ok(Some(user))
    }
}

/// Review store backed by the REST API
#[derive(Debug, Clone)]
pub struct RestReviewStore {
    client: Client,
    api_root: String,
}

fn review_not_found(id: &str) -> CatalogError {
    CatalogError::NotFound {
        entity: "review",
        id: id.to_string(),
    }
}

impl RestReviewStore {
    /// Create a store with a default client
    pub fn new(api_root: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_root)
    }

    /// Use a preconfigured client; a trailing `/` on the root is ignored
    pub fn with_client(client: Client, api_root: impl Into<String>) -> Self {
        let api_root = api_root.into().trim_end_matches('/').to_string();
        Self { client, api_root }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_client(build_client(config)?, config.api_root()))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        endpoint(&self.api_root, segments)
    }

    async fn send_review(&self, request: reqwest::RequestBuilder) -> Result<Review, CatalogError> {
        let response = check(request.send().await?).await?;
        let raw: BackendReview = response.json().await?;
        Ok(Review::from(raw))
    }
}

#[async_trait]
impl ReviewStore for RestReviewStore {
    async fn query(&self, filter: &ReviewFilter) -> Result<Vec<Review>, CatalogError> {
        let url = self.url(&["review"])?;
        let response = self.client.get(url).query(filter).send().await?;
        let raw: Vec<BackendReview> = check(response)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching reviews"))?
            .json()
            .await?;
        Ok(raw.into_iter().map(Review::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Review>, CatalogError> {
        let response = self.client.get(self.url(&["review", id])?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: BackendReview = check(response)
            .await
            .inspect_err(|e| tracing::error!(review_id = id, error = %e, "Error fetching review"))?
            .json()
            .await?;
        Ok(Some(Review::from(raw)))
    }

    async fn add(&self, draft: ReviewDraft, author: MessageAuthor) -> Result<Review, CatalogError> {
        let payload = BackendReviewPayload::new_review(&draft, &author);
        let request = self.client.post(self.url(&["review"])?).json(&payload);
        self.send_review(request)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error adding review"))
    }

    async fn update(&self, id: &str, draft: ReviewDraft) -> Result<Review, CatalogError> {
        let payload = BackendReviewPayload::edit(id, &draft);
        let response = self
            .client
            .put(self.url(&["review"])?)
            .json(&payload)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(review_not_found(id));
        }
        let raw: BackendReview = check(response)
            .await
            .inspect_err(|e| tracing::error!(review_id = id, error = %e, "Error updating review"))?
            .json()
            .await?;
        Ok(Review::from(raw))
    }

    async fn remove(&self, id: &str) -> Result<(), CatalogError> {
        let response = self.client.delete(self.url(&["review", id])?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(review_not_found(id));
        }
        check(response)
            .await
            .inspect_err(|e| tracing::error!(review_id = id, error = %e, "Error removing review"))?;
        Ok(())
    }

    async fn by_toy(&self, toy_id: &str) -> Result<Vec<Review>, CatalogError> {
        let url = self.url(&["review", "toy", toy_id])?;
        let response = self.client.get(url).send().await?;
        let raw: Vec<BackendReview> = check(response)
            .await
            .inspect_err(|e| tracing::error!(toy_id, error = %e, "Error fetching toy reviews"))?
            .json()
            .await?;
        Ok(raw.into_iter().map(Review::from).collect())
    }

    async fn stats(&self, toy_id: &str) -> Result<ReviewStats, CatalogError> {
        let url = self.url(&["review", "toy", toy_id, "stats"])?;
        let response = self.client.get(url).send().await?;
        Ok(check(response)
            .await
            .inspect_err(|e| tracing::error!(toy_id, error = %e, "Error fetching review stats"))?
            .json()
            .await?)
    }
}

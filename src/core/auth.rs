//! Authorization for catalog mutations
//!
//! One capability check ([`authorize`]) gates every mutating operation:
//! - browsing is public
//! - adding a toy or posting a message needs a logged-in user
//! - editing or deleting a toy needs an admin
//! - removing a message needs its author or an admin

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::core::error::CatalogError;

/// The logged-in user as returned by the authentication backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub fullname: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Login / signup payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Only used by signup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            fullname: None,
        }
    }

    /// Display name used on signup; defaults to the username
    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }
}

/// Who is performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    User(CurrentUser),
    Anonymous,
}

impl AuthContext {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            AuthContext::User(user) => Some(user),
            AuthContext::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|u| u.id.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User(_))
    }
}

impl From<Option<CurrentUser>> for AuthContext {
    fn from(user: Option<CurrentUser>) -> Self {
        user.map_or(AuthContext::Anonymous, AuthContext::User)
    }
}

/// Operations subject to authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    Browse,
    CreateToy,
    UpdateToy,
    DeleteToy,
    PostMessage,
    RemoveMessage { author_id: String },
    AddReview,
    UpdateReview { author_id: String },
    RemoveReview { author_id: String },
}

impl CatalogAction {
    /// Human phrase used in error messages ("login required to ...")
    pub fn describe(&self) -> &'static str {
        match self {
            CatalogAction::Browse => "browse toys",
            CatalogAction::CreateToy => "add a toy",
            CatalogAction::UpdateToy => "edit a toy",
            CatalogAction::DeleteToy => "remove a toy",
            CatalogAction::PostMessage => "post a message",
            CatalogAction::RemoveMessage { .. } => "remove a message",
            CatalogAction::AddReview => "write a review",
            CatalogAction::UpdateReview { .. } => "edit a review",
            CatalogAction::RemoveReview { .. } => "remove a review",
        }
    }

    /// The policy guarding this action
    pub fn policy(&self) -> AuthPolicy {
        match self {
            CatalogAction::Browse => AuthPolicy::Public,
            CatalogAction::CreateToy | CatalogAction::PostMessage | CatalogAction::AddReview => {
                AuthPolicy::Authenticated
            }
            CatalogAction::UpdateToy | CatalogAction::DeleteToy => AuthPolicy::AdminOnly,
            CatalogAction::RemoveMessage { author_id }
            | CatalogAction::UpdateReview { author_id }
            | CatalogAction::RemoveReview { author_id } => {
                AuthPolicy::Or(vec![AuthPolicy::Author(author_id.clone()), AuthPolicy::AdminOnly])
            }
        }
    }
}

impl fmt::Display for CatalogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    /// No auth required
    Public,

    /// Any logged-in user
    Authenticated,

    /// The user with this id
    Author(String),

    /// Admin only
    AdminOnly,

    /// Any of the policies (OR)
    Or(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,
            AuthPolicy::Authenticated => context.is_authenticated(),
            AuthPolicy::Author(author_id) => context.user_id() == Some(author_id.as_str()),
            AuthPolicy::AdminOnly => context.is_admin(),
            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),
        }
    }
}

/// The single capability check consumed by every mutating operation
///
/// Anonymous callers get [`CatalogError::Unauthorized`]; logged-in callers
/// lacking rights get [`CatalogError::Forbidden`].
pub fn authorize(context: &AuthContext, action: &CatalogAction) -> Result<(), CatalogError> {
    if action.policy().check(context) {
        return Ok(());
    }
    let action = action.describe();
    tracing::debug!(action, user_id = ?context.user_id(), "Authorization denied");
    if context.is_authenticated() {
        Err(CatalogError::Forbidden { action })
    } else {
        Err(CatalogError::Unauthorized { action })
    }
}

/// The authentication collaborator
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Log in and remember the user as the current session
    async fn login(&self, credentials: &Credentials) -> Result<CurrentUser, CatalogError>;

    /// Register, then log in as the new user
    async fn signup(&self, credentials: &Credentials) -> Result<CurrentUser, CatalogError>;

    /// End the session
    async fn logout(&self) -> Result<(), CatalogError>;

    /// The logged-in user, if any
    fn current_user(&self) -> Option<CurrentUser>;

    /// Look up any registered user by id
    async fn get_user(&self, id: &str) -> Result<Option<CurrentUser>, CatalogError>;

    fn context(&self) -> AuthContext {
        AuthContext::from(self.current_user())
    }
}

/// In-process holder of the logged-in user
#[derive(Debug, Default)]
pub struct Session {
    user: RwLock<Option<CurrentUser>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<CurrentUser> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, user: CurrentUser) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn clear(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

//! Wire shape of toy and review records on the REST backend
//!
//! The backend keeps labels as a single `", "`-joined `category` string and
//! names the image field `imageUrl`. Normalization into [`Toy`] and
//! [`Review`] happens here, at the storage boundary, and nowhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::review::{Review, ReviewDraft, ReviewedToy};
use crate::core::toy::{MessageAuthor, Toy, ToyDraft, ToyMessage, dedup_labels, fallback_image_url};

const CATEGORY_SEPARATOR: &str = ", ";

/// `createdAt` as the backend sends it: epoch millis or an RFC 3339 string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendTimestamp {
    Millis(i64),
    Iso(DateTime<Utc>),
}

impl BackendTimestamp {
    /// Epoch milliseconds, whatever the wire form
    pub fn millis(&self) -> i64 {
        match self {
            BackendTimestamp::Millis(ms) => *ms,
            BackendTimestamp::Iso(at) => at.timestamp_millis(),
        }
    }
}

/// A toy record as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendToy {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: BackendTimestamp,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub msgs: Vec<ToyMessage>,
}

impl From<BackendToy> for Toy {
    fn from(raw: BackendToy) -> Self {
        let img_url = raw
            .image_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| fallback_image_url(&raw.name));
        Toy {
            id: raw.id,
            labels: split_category(raw.category.as_deref()),
            created_at: raw.created_at.millis(),
            name: raw.name,
            price: raw.price,
            in_stock: raw.in_stock,
            description: raw.description,
            age_range: raw.age_range,
            img_url: Some(img_url),
            msgs: raw.msgs,
        }
    }
}

/// Body of create/update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendToyPayload {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub age_range: String,
    pub image_url: String,
    pub in_stock: bool,
}

impl From<&ToyDraft> for BackendToyPayload {
    fn from(draft: &ToyDraft) -> Self {
        Self {
            name: draft.name.clone(),
            category: join_category(&draft.labels),
            price: draft.price,
            description: draft.description.clone().unwrap_or_default(),
            age_range: draft.age_range.clone().unwrap_or_default(),
            image_url: draft.img_url.clone().unwrap_or_default(),
            in_stock: draft.in_stock,
        }
    }
}

/// A review as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendReview {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub txt: String,
    #[serde(default)]
    pub created_at: Option<BackendTimestamp>,
    pub toy: ReviewedToy,
    pub user: MessageAuthor,
}

impl From<BackendReview> for Review {
    fn from(raw: BackendReview) -> Self {
        Review {
            id: raw.id,
            txt: raw.txt,
            created_at: raw.created_at.map(|at| at.millis()).unwrap_or_default(),
            toy: raw.toy,
            user: raw.user,
        }
    }
}

/// Body of review add/update requests
///
/// Updates go to the collection URL, so the id travels in the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendReviewPayload {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub toy_id: String,
    pub txt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<MessageAuthor>,
}

impl BackendReviewPayload {
    /// Body of `POST /review`
    pub fn new_review(draft: &ReviewDraft, author: &MessageAuthor) -> Self {
        Self {
            id: None,
            toy_id: draft.toy_id.clone(),
            txt: draft.txt.clone(),
            user: Some(author.clone()),
        }
    }

    /// Body of `PUT /review`
    pub fn edit(id: &str, draft: &ReviewDraft) -> Self {
        Self {
            id: Some(id.to_string()),
            toy_id: draft.toy_id.clone(),
            txt: draft.txt.clone(),
            user: None,
        }
    }
}

/// `"Doll, Baby"` → `["Doll", "Baby"]`; blanks and repeats are dropped
pub fn split_category(category: Option<&str>) -> Vec<String> {
    let Some(category) = category else {
        return Vec::new();
    };
    dedup_labels(
        category
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Inverse of [`split_category`]
pub fn join_category(labels: &[String]) -> String {
    labels.join(CATEGORY_SEPARATOR)
}

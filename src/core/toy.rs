//! Toy records, chat messages and the label vocabulary

use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::error::CatalogError;

/// Labels offered by the catalog when no vocabulary is configured
pub const DEFAULT_LABELS: [&str; 8] = [
    "On wheels",
    "Box game",
    "Art",
    "Baby",
    "Doll",
    "Puzzle",
    "Outdoor",
    "Battery Powered",
];

/// A catalog item as the pipeline sees it
///
/// `id` and `created_at` are assigned by the storage collaborator and never
/// change afterwards. `labels` has set semantics: no duplicates, order kept
/// only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toy {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub labels: Vec<String>,
    pub in_stock: bool,
    /// Creation time, epoch milliseconds
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub msgs: Vec<ToyMessage>,
}

impl Toy {
    /// Case-sensitive exact label match
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// True when the toy carries every one of `required`
    pub fn has_all_labels(&self, required: &[String]) -> bool {
        required.iter().all(|label| self.has_label(label))
    }
}

/// A chat entry attached to a toy. Messages are appended or removed, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToyMessage {
    pub id: String,
    pub txt: String,
    pub by: MessageAuthor,
}

/// Reference to the user who wrote a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: String,
}

/// Editable toy fields, as submitted by the edit form
///
/// A draft without `id` is created on save; with an `id` it updates that record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToyDraft {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[serde(default)]
    pub labels: Vec<String>,
    pub in_stock: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub img_url: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("name is required".into());
        return Err(err);
    }
    Ok(())
}

impl ToyDraft {
    /// Blank template used by the "add toy" form
    pub fn empty() -> Self {
        Self {
            id: None,
            name: String::new(),
            price: 0.0,
            labels: Vec::new(),
            in_stock: true,
            description: None,
            age_range: None,
            img_url: Some(fallback_image_url("New Toy")),
        }
    }

    /// Materialize the draft as a stored record
    ///
    /// Used by stores that assign identifiers themselves.
    pub fn into_toy(self, id: String, created_at: i64) -> Toy {
        let img_url = self
            .img_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| fallback_image_url(&self.name));
        Toy {
            id,
            name: self.name,
            price: self.price,
            labels: dedup_labels(self.labels),
            in_stock: self.in_stock,
            created_at,
            description: self.description,
            age_range: self.age_range,
            img_url: Some(img_url),
            msgs: Vec::new(),
        }
    }
}

impl From<Toy> for ToyDraft {
    fn from(toy: Toy) -> Self {
        Self {
            id: Some(toy.id),
            name: toy.name,
            price: toy.price,
            labels: toy.labels,
            in_stock: toy.in_stock,
            description: toy.description,
            age_range: toy.age_range,
            img_url: toy.img_url,
        }
    }
}

/// Image shown for toys that have none of their own
pub fn fallback_image_url(name: &str) -> String {
    format!("https://robohash.org/{}?set=set4", name.replace(' ', "%20"))
}

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Drop repeated labels, keeping the first occurrence
pub(crate) fn dedup_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen
}

/// The fixed, ordered set of valid labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
}

impl LabelVocabulary {
    /// Build a vocabulary; duplicates are dropped, order is kept
    pub fn new<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            labels: dedup_labels(labels.into_iter().map(Into::into).collect()),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Keep only labels that belong to the vocabulary
    pub fn retain_known(&self, labels: &[String]) -> Vec<String> {
        dedup_labels(
            labels
                .iter()
                .filter(|label| self.contains(label))
                .cloned()
                .collect(),
        )
    }

    /// Fail on the first label outside the vocabulary
    pub fn check(&self, labels: &[String]) -> Result<(), CatalogError> {
        match labels.iter().find(|label| !self.contains(label)) {
            Some(unknown) => Err(CatalogError::UnknownLabel(unknown.clone())),
            None => Ok(()),
        }
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

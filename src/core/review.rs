//! Toy reviews, the review explorer filter and per-toy review statistics

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::error::CatalogError;
use crate::core::toy::MessageAuthor;

/// Longest review text accepted by the review form
pub const MAX_REVIEW_LEN: u64 = 1000;

/// Name used in per-toy counts when a review's toy summary has no name
pub const UNKNOWN_TOY: &str = "Unknown Toy";

/// A user's written opinion about one toy
///
/// The toy and the author are embedded as summaries, so a review list can be
/// shown without fetching either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub txt: String,
    /// Creation time, epoch milliseconds
    pub created_at: i64,
    pub toy: ReviewedToy,
    pub user: MessageAuthor,
}

/// Summary of the reviewed toy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedToy {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

/// Review form input
///
/// Only `txt` changes on update; the toy and author of a review are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub toy_id: String,
    #[validate(
        custom(function = "review_text"),
        length(max = MAX_REVIEW_LEN, message = "review is too long")
    )]
    pub txt: String,
}

fn review_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("review text is required".into());
        return Err(err);
    }
    Ok(())
}

impl ReviewDraft {
    pub fn new(toy_id: impl Into<String>, txt: impl Into<String>) -> Self {
        Self {
            toy_id: toy_id.into(),
            txt: txt.into(),
        }
    }
}

/// Narrowing used by the review explorer
///
/// Serialized as URL query parameters; absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ReviewFilter {
    /// Reviews of one toy
    pub fn for_toy(toy_id: impl Into<String>) -> Self {
        Self {
            toy_id: Some(toy_id.into()),
            ..Default::default()
        }
    }

    /// Reviews written by one user
    pub fn by_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.toy_id.as_deref().is_none_or(|id| review.toy.id == id)
            && self.user_id.as_deref().is_none_or(|id| review.user.id == id)
    }

    /// Keep matching reviews in input order, then cut at `limit`
    pub fn apply(&self, reviews: &[Review]) -> Vec<Review> {
        reviews
            .iter()
            .filter(|review| self.matches(review))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

/// Raw review explorer input: every field is free text, blank means "any"
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewFilterForm {
    pub toy_id: String,
    pub user_id: String,
    pub limit: String,
}

impl ReviewFilterForm {
    /// Blank fields become `None`; the limit must be a positive integer
    pub fn normalize(&self) -> Result<ReviewFilter, CatalogError> {
        let text = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        let limit = match self.limit.trim() {
            "" => None,
            raw => match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => Some(limit),
                _ => {
                    return Err(CatalogError::InvalidInput {
                        field: "limit",
                        reason: format!("'{}' is not a positive number", raw),
                    });
                }
            },
        };
        Ok(ReviewFilter {
            toy_id: text(&self.toy_id),
            user_id: text(&self.user_id),
            limit,
        })
    }
}

/// Review statistics of one toy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub toy_id: String,
    #[serde(default)]
    pub count: usize,
    /// Distinct authors among the reviews
    #[serde(default)]
    pub reviewer_count: usize,
    /// Newest review, epoch milliseconds
    #[serde(default)]
    pub latest_at: Option<i64>,
}

impl ReviewStats {
    /// Compute the statistics of `toy_id` over `reviews`; other toys are ignored
    pub fn from_reviews(toy_id: &str, reviews: &[Review]) -> Self {
        let mine: Vec<&Review> = reviews.iter().filter(|r| r.toy.id == toy_id).collect();
        let mut reviewers: Vec<&str> = mine.iter().map(|r| r.user.id.as_str()).collect();
        reviewers.sort_unstable();
        reviewers.dedup();
        Self {
            toy_id: toy_id.to_string(),
            count: mine.len(),
            reviewer_count: reviewers.len(),
            latest_at: mine.iter().map(|r| r.created_at).max(),
        }
    }
}

/// Reviews per toy name, in order of first appearance
pub fn count_by_toy(reviews: &[Review]) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for review in reviews {
        let name = if review.toy.name.is_empty() {
            UNKNOWN_TOY
        } else {
            review.toy.name.as_str()
        };
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts
}

//! Filter and sort criteria, plus normalization of raw filter-form input

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::core::error::CatalogError;
use crate::core::toy::LabelVocabulary;

/// Narrowing predicate over the toy collection
///
/// Every field is optional; an absent field does not narrow anything.
/// Criteria are assumed already normalized (see [`FilterForm::normalize`]).
///
/// # Example
/// ```rust,ignore
/// let filter = FilterCriteria {
///     txt: Some("doll".to_string()),
///     max_price: Some(100.0),
///     labels: vec!["Baby".to_string()],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the name
    pub txt: Option<String>,

    /// Inclusive lower price bound
    pub min_price: Option<f64>,

    /// Inclusive upper price bound
    pub max_price: Option<f64>,

    /// `None` means "don't care"
    pub in_stock: Option<bool>,

    /// A toy must carry every one of these labels
    pub labels: Vec<String>,
}

impl FilterCriteria {
    /// True when no predicate is active
    pub fn is_empty(&self) -> bool {
        self.txt.as_deref().is_none_or(str::is_empty)
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.in_stock.is_none()
            && self.labels.is_empty()
    }
}

/// Field a toy list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Price,
    CreatedAt,
}

impl SortField {
    /// Name used in sort expressions
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            other => Err(CatalogError::InvalidInput {
                field: "sort",
                reason: format!("unknown sort field '{}'", other),
            }),
        }
    }
}

/// Sort field and direction
///
/// With `field` unset the list keeps its incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortCriteria {
    #[serde(rename = "type", default)]
    pub field: Option<SortField>,
    #[serde(default)]
    pub desc: bool,
}

impl SortCriteria {
    pub fn by(field: SortField, desc: bool) -> Self {
        Self {
            field: Some(field),
            desc,
        }
    }

    pub fn ascending(field: SortField) -> Self {
        Self::by(field, false)
    }

    pub fn descending(field: SortField) -> Self {
        Self::by(field, true)
    }

    /// No ordering, keep input order
    pub fn unsorted() -> Self {
        Self {
            field: None,
            desc: false,
        }
    }

    /// Parse `field`, `field:asc` or `field:desc`
    pub fn parse(expr: &str) -> Result<Self, CatalogError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Ok(Self::unsorted());
        }
        let (field, direction) = expr.split_once(':').unwrap_or((expr, "asc"));
        let desc = match direction {
            "asc" => false,
            "desc" => true,
            other => {
                return Err(CatalogError::InvalidInput {
                    field: "sort",
                    reason: format!("unknown direction '{}'", other),
                });
            }
        };
        Ok(Self::by(field.parse()?, desc))
    }
}

/// The list view starts unsorted with the descending flag already set,
/// so picking a field first orders it descending.
impl Default for SortCriteria {
    fn default() -> Self {
        Self {
            field: None,
            desc: true,
        }
    }
}

/// Everything `query_toys` needs: filter, sort and an optional page index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToyQuery {
    pub filter: FilterCriteria,
    pub sort: SortCriteria,
    pub page_idx: Option<usize>,
}

impl ToyQuery {
    /// No filter, no sort, no pagination
    pub fn unfiltered() -> Self {
        Self {
            filter: FilterCriteria::default(),
            sort: SortCriteria::unsorted(),
            page_idx: None,
        }
    }

    /// State of the catalog list view when it first opens
    pub fn initial() -> Self {
        Self {
            filter: FilterCriteria::default(),
            sort: SortCriteria::default(),
            page_idx: Some(0),
        }
    }

    pub fn with_filter(mut self, filter: FilterCriteria) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortCriteria) -> Self {
        self.sort = sort;
        self
    }

    /// Ask the store for one page only
    pub fn with_page(mut self, page_idx: usize) -> Self {
        self.page_idx = Some(page_idx);
        self
    }
}

/// Raw values typed into the filter form
///
/// Everything arrives as text. [`FilterForm::normalize`] turns the form into
/// [`FilterCriteria`] so the pipeline never sees malformed input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterForm {
    #[validate(length(max = 50, message = "Search term must be less than 50 characters"))]
    pub txt: String,
    pub min_price: String,
    pub max_price: String,
    /// `""`, `"true"` or `"false"`
    pub in_stock: String,
    pub labels: Vec<String>,
}

impl FilterForm {
    /// Validate and convert into pipeline criteria
    ///
    /// - blank text → absent
    /// - non-numeric price → absent, negative price → error
    /// - min above max (both present) → error
    /// - labels outside `vocabulary` are dropped
    pub fn normalize(&self, vocabulary: &LabelVocabulary) -> Result<FilterCriteria, CatalogError> {
        self.validate()?;

        let txt = Some(self.txt.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let min_price = parse_price("minPrice", &self.min_price)?;
        let max_price = parse_price("maxPrice", &self.max_price)?;
        if let (Some(min), Some(max)) = (min_price, max_price)
            && min > max
        {
            return Err(CatalogError::InvalidInput {
                field: "minPrice",
                reason: "Min price must be less than max price".to_string(),
            });
        }

        let in_stock = match self.in_stock.trim() {
            "" => None,
            "true" => Some(true),
            "false" => Some(false),
            other => {
                return Err(CatalogError::InvalidInput {
                    field: "inStock",
                    reason: format!("expected 'true', 'false' or empty, got '{}'", other),
                });
            }
        };

        Ok(FilterCriteria {
            txt,
            min_price,
            max_price,
            in_stock,
            labels: vocabulary.retain_known(&self.labels),
        })
    }
}

fn parse_price(field: &'static str, raw: &str) -> Result<Option<f64>, CatalogError> {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return Ok(None);
    };
    if !value.is_finite() {
        return Ok(None);
    }
    if value < 0.0 {
        return Err(CatalogError::InvalidInput {
            field,
            reason: "Price must be positive".to_string(),
        });
    }
    Ok(Some(value))
}

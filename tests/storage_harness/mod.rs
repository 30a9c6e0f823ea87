//! Shared test harness for storage backend testing
//!
//! Provides toy/draft builders, the catalog's reference sample data, a
//! tracing initializer, and an axum mock of the REST backend.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
mod toy_store_tests;
pub mod mock_backend;

use toy_catalog::core::toy::{MessageAuthor, Toy, ToyDraft, ToyMessage};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Install a test subscriber once; honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Helper functions: drafts and toys
// ---------------------------------------------------------------------------

/// A draft with the given name, price and labels, in stock, no image.
pub fn draft(name: &str, price: f64, labels: &[&str]) -> ToyDraft {
    ToyDraft {
        id: None,
        name: name.to_string(),
        price,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        in_stock: true,
        description: None,
        age_range: None,
        img_url: None,
    }
}

/// A toy record with an explicit id and creation time.
pub fn toy(
    id: &str,
    name: &str,
    price: f64,
    in_stock: bool,
    labels: &[&str],
    created_at: i64,
) -> Toy {
    Toy {
        id: id.to_string(),
        name: name.to_string(),
        price,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        in_stock,
        created_at,
        description: None,
        age_range: None,
        img_url: None,
        msgs: Vec::new(),
    }
}

/// The six reference toys of the catalog, in creation order.
pub fn sample_toys() -> Vec<Toy> {
    vec![
        toy("t101", "Vintage Teddy Bear", 89.0, true, &["Baby", "Doll"], 1631031801011),
        toy(
            "t102",
            "Remote Control Car",
            156.0,
            true,
            &["On wheels", "Battery Powered", "Outdoor"],
            1631031801012,
        ),
        toy("t103", "Art & Craft Set", 67.0, false, &["Art", "Box game"], 1631031801013),
        toy("t104", "Wooden Puzzle", 45.0, true, &["Puzzle", "Box game"], 1631031801014),
        toy("t105", "Building Blocks", 78.0, true, &["Box game", "Art"], 1631031801015),
        toy("t106", "Plush Rabbit", 34.0, false, &["Baby", "Doll"], 1631031801016),
    ]
}

pub fn message(id: &str, txt: &str, author_id: &str) -> ToyMessage {
    ToyMessage {
        id: id.to_string(),
        txt: txt.to_string(),
        by: MessageAuthor {
            id: author_id.to_string(),
            fullname: format!("User {}", author_id),
        },
    }
}

pub fn ids(toys: &[Toy]) -> Vec<&str> {
    toys.iter().map(|t| t.id.as_str()).collect()
}

pub fn names(toys: &[Toy]) -> Vec<&str> {
    toys.iter().map(|t| t.name.as_str()).collect()
}

//! Macro-generated test suite for `ToyStore` contract validation.
//!
//! The `toy_store_tests!` macro generates a test module that validates any
//! `ToyStore` implementation: CRUD, message threads, label and image
//! normalization, and concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use toy_catalog::storage::InMemoryToyStore;
//!
//! toy_store_tests!(InMemoryToyStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_create_and_get`: create then retrieve, verify all fields
//! - `test_get_nonexistent`: unknown id returns None
//! - `test_list_empty`: list on an empty store
//! - `test_list_keeps_insertion_order`: records come back in creation order
//! - `test_update_existing`: fields replaced, id and creation time kept
//! - `test_update_nonexistent`: NotFound
//! - `test_delete_existing` / `test_delete_nonexistent`
//!
//! ## Messages
//! - `test_add_and_remove_message`
//! - `test_remove_missing_message`: NotFound for entity "message"
//!
//! ## Normalization
//! - `test_labels_roundtrip`: label order survives storage
//! - `test_image_fallback`: toys without an image get the generated one
//!
//! ## Concurrency
//! - `test_concurrent_creates`: parallel creates from spawned tasks

/// Generate a `ToyStore` conformance test suite.
///
/// `$factory` is re-evaluated for each test and may contain `.await`. For the
/// concurrent test the store must also be `Clone + 'static`.
#[allow(unused_macros)]
macro_rules! toy_store_tests {
    ($factory:expr) => {
        mod toy_store_contract_tests {
            use super::*;
            use toy_catalog::core::error::CatalogError;
            use toy_catalog::core::service::{StoreQuery, ToyStore};
            use toy_catalog::core::toy::fallback_image_url;

            // ==================================================================
            // CRUD: Create & Get
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory;
                let mut new_toy = draft("Talking Doll", 42.5, &["Doll", "Battery Powered"]);
                new_toy.img_url = Some("https://example.com/doll.png".to_string());
                new_toy.in_stock = false;

                let created = store.create(new_toy).await.unwrap();
                assert!(!created.id.is_empty());
                assert!(created.created_at > 0);
                assert_eq!(created.name, "Talking Doll");
                assert!((created.price - 42.5).abs() < f64::EPSILON);
                assert!(!created.in_stock);
                assert!(created.msgs.is_empty());

                let fetched = store.get(&created.id).await.unwrap().unwrap();
                assert_eq!(fetched.id, created.id);
                assert_eq!(fetched.name, "Talking Doll");
                assert_eq!(fetched.labels, vec!["Doll", "Battery Powered"]);
                assert_eq!(
                    fetched.img_url.as_deref(),
                    Some("https://example.com/doll.png")
                );
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get("no-such-toy").await.unwrap().is_none());
            }

            // ==================================================================
            // CRUD: List
            // ==================================================================

            #[tokio::test]
            async fn test_list_empty() {
                let store = $factory;
                let toys = store.list(&StoreQuery::default()).await.unwrap();
                assert!(toys.is_empty());
            }

            #[tokio::test]
            async fn test_list_keeps_insertion_order() {
                let store = $factory;
                for (name, price) in [("Kite", 12.0), ("Yo-yo", 3.0), ("Drum", 25.0)] {
                    store.create(draft(name, price, &[])).await.unwrap();
                }

                let toys = store.list(&StoreQuery::default()).await.unwrap();
                assert_eq!(names(&toys), vec!["Kite", "Yo-yo", "Drum"]);
            }

            // ==================================================================
            // CRUD: Update
            // ==================================================================

            #[tokio::test]
            async fn test_update_existing() {
                let store = $factory;
                let created = store.create(draft("Kite", 12.0, &["Outdoor"])).await.unwrap();

                let mut edit = draft("Stunt Kite", 19.0, &["Outdoor", "Art"]);
                edit.id = Some(created.id.clone());
                let updated = store.update(&created.id, edit).await.unwrap();

                assert_eq!(updated.id, created.id);
                assert_eq!(updated.created_at, created.created_at);
                assert_eq!(updated.name, "Stunt Kite");

                let fetched = store.get(&created.id).await.unwrap().unwrap();
                assert!((fetched.price - 19.0).abs() < f64::EPSILON);
                assert_eq!(fetched.labels, vec!["Outdoor", "Art"]);
                assert_eq!(fetched.created_at, created.created_at);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let result = store.update("no-such-toy", draft("Ghost", 1.0, &[])).await;
                assert!(matches!(
                    result,
                    Err(CatalogError::NotFound { entity: "toy", .. })
                ));
            }

            // ==================================================================
            // CRUD: Delete
            // ==================================================================

            #[tokio::test]
            async fn test_delete_existing() {
                let store = $factory;
                let kept = store.create(draft("Kite", 12.0, &[])).await.unwrap();
                let gone = store.create(draft("Yo-yo", 3.0, &[])).await.unwrap();

                store.delete(&gone.id).await.unwrap();

                assert!(store.get(&gone.id).await.unwrap().is_none());
                let toys = store.list(&StoreQuery::default()).await.unwrap();
                assert_eq!(ids(&toys), vec![kept.id.as_str()]);
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = $factory;
                assert!(matches!(
                    store.delete("no-such-toy").await,
                    Err(CatalogError::NotFound { .. })
                ));
            }

            // ==================================================================
            // Messages
            // ==================================================================

            #[tokio::test]
            async fn test_add_and_remove_message() {
                let store = $factory;
                let created = store.create(draft("Kite", 12.0, &[])).await.unwrap();

                let first = store
                    .add_message(&created.id, message("m1", "Great kite!", "u1"))
                    .await
                    .unwrap();
                assert_eq!(first.txt, "Great kite!");
                store
                    .add_message(&created.id, message("m2", "Flies well", "u2"))
                    .await
                    .unwrap();

                let fetched = store.get(&created.id).await.unwrap().unwrap();
                let msg_ids: Vec<_> = fetched.msgs.iter().map(|m| m.id.as_str()).collect();
                assert_eq!(msg_ids, vec!["m1", "m2"]);
                assert_eq!(fetched.msgs[0].by.id, "u1");

                store.remove_message(&created.id, "m1").await.unwrap();
                let fetched = store.get(&created.id).await.unwrap().unwrap();
                assert_eq!(fetched.msgs.len(), 1);
                assert_eq!(fetched.msgs[0].id, "m2");
            }

            #[tokio::test]
            async fn test_add_message_to_missing_toy() {
                let store = $factory;
                let result = store
                    .add_message("no-such-toy", message("m1", "hello", "u1"))
                    .await;
                assert!(matches!(
                    result,
                    Err(CatalogError::NotFound { entity: "toy", .. })
                ));
            }

            #[tokio::test]
            async fn test_remove_missing_message() {
                let store = $factory;
                let created = store.create(draft("Kite", 12.0, &[])).await.unwrap();
                let result = store.remove_message(&created.id, "nope").await;
                assert!(matches!(
                    result,
                    Err(CatalogError::NotFound { entity: "message", .. })
                ));
            }

            // ==================================================================
            // Normalization
            // ==================================================================

            #[tokio::test]
            async fn test_labels_roundtrip() {
                let store = $factory;
                let created = store
                    .create(draft("Train", 60.0, &["On wheels", "Box game", "Baby"]))
                    .await
                    .unwrap();
                let fetched = store.get(&created.id).await.unwrap().unwrap();
                assert_eq!(fetched.labels, vec!["On wheels", "Box game", "Baby"]);
                assert!(fetched.has_all_labels(&["Baby".to_string()]));
            }

            #[tokio::test]
            async fn test_image_fallback() {
                let store = $factory;
                let created = store.create(draft("Wooden Train", 60.0, &[])).await.unwrap();
                let fetched = store.get(&created.id).await.unwrap().unwrap();
                assert_eq!(
                    fetched.img_url.as_deref(),
                    Some(fallback_image_url("Wooden Train").as_str())
                );
                assert!(fetched.img_url.unwrap().contains("Wooden%20Train"));
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_creates() {
                let store = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store
                            .create(draft(&format!("Toy {}", i), i as f64, &[]))
                            .await
                            .unwrap()
                    }));
                }
                let mut created_ids = Vec::new();
                for handle in handles {
                    created_ids.push(handle.await.unwrap().id);
                }

                let toys = store.list(&StoreQuery::default()).await.unwrap();
                assert_eq!(toys.len(), 10);
                created_ids.sort();
                created_ids.dedup();
                assert_eq!(created_ids.len(), 10);
            }
        }
    };
}

//! Axum mock of the toy REST backend
//!
//! Speaks the backend's wire format: labels as a `", "`-joined `category`
//! string, `imageUrl`, RFC 3339 `createdAt`. Records are kept as raw JSON so
//! the client's normalization is exercised for real. Reviews embed a toy
//! summary taken from the toy records at creation time.
//!
//! ```rust,ignore
//! let backend = MockBackend::new().with_user("admin", "admin", true);
//! let api_root = backend.clone().spawn().await;
//! let store = RestToyStore::new(api_root);
//! ```

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Reply = Result<Json<Value>, StatusCode>;

struct MockAccount {
    password: String,
    user: Value,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    toys: Arc<Mutex<Vec<Value>>>,
    reviews: Arc<Mutex<Vec<Value>>>,
    accounts: Arc<Mutex<Vec<MockAccount>>>,
    queries: Arc<Mutex<Vec<String>>>,
    next_id: Arc<AtomicU64>,
    fail_list: Arc<AtomicBool>,
    fail_logout: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record exactly as the backend would store it
    pub fn with_raw_toy(self, toy: Value) -> Self {
        self.toys.lock().unwrap().push(toy);
        self
    }

    pub fn with_user(self, username: &str, password: &str, is_admin: bool) -> Self {
        let user = json!({
            "_id": self.next_id("u"),
            "username": username,
            "fullname": username.to_uppercase(),
            "isAdmin": is_admin,
        });
        self.accounts.lock().unwrap().push(MockAccount {
            password: password.to_string(),
            user,
        });
        self
    }

    /// Id of the account registered under `username`
    pub fn user_id(&self, username: &str) -> Option<String> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|a| a.user["username"] == username)
            .and_then(|a| a.user["_id"].as_str().map(str::to_string))
    }

    /// Raw query strings received by `GET /toy`, in arrival order
    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 101)
    }

    /// Serve on an ephemeral port; returns the API root URL
    pub async fn spawn(self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(self);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }
}

fn router(backend: MockBackend) -> Router {
    Router::new()
        .route("/api/toy", get(list_toys).post(create_toy))
        .route(
            "/api/toy/{id}",
            get(get_toy).put(update_toy).delete(delete_toy),
        )
        .route("/api/toy/{id}/msg", post(add_msg))
        .route("/api/toy/{id}/msg/{msg_id}", delete(remove_msg))
        .route("/api/review", get(list_reviews).post(add_review).put(update_review))
        .route("/api/review/{id}", get(get_review).delete(remove_review))
        .route("/api/review/toy/{toy_id}", get(toy_reviews))
        .route("/api/review/toy/{toy_id}/stats", get(review_stats))
        .route("/api/user/{id}", get(get_user))
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/logout", post(logout))
        .with_state(backend)
}

// ---------------------------------------------------------------------------
// Toy handlers
// ---------------------------------------------------------------------------

async fn list_toys(
    State(backend): State<MockBackend>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Value>>, StatusCode> {
    backend
        .queries
        .lock()
        .unwrap()
        .push(query.unwrap_or_default());
    if backend.fail_list.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(backend.toys.lock().unwrap().clone()))
}

async fn get_toy(State(backend): State<MockBackend>, Path(id): Path<String>) -> Reply {
    let toys = backend.toys.lock().unwrap();
    toys.iter()
        .find(|t| t["_id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_toy(State(backend): State<MockBackend>, Json(payload): Json<Value>) -> Reply {
    let mut toy = payload;
    toy["_id"] = json!(backend.next_id("t"));
    toy["createdAt"] = json!(chrono::Utc::now().to_rfc3339());
    toy["msgs"] = json!([]);
    backend.toys.lock().unwrap().push(toy.clone());
    Ok(Json(toy))
}

async fn update_toy(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Reply {
    let mut toys = backend.toys.lock().unwrap();
    let toy = toys
        .iter_mut()
        .find(|t| t["_id"] == id.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;
    if let (Some(target), Value::Object(fields)) = (toy.as_object_mut(), payload) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
    Ok(Json(toy.clone()))
}

async fn delete_toy(State(backend): State<MockBackend>, Path(id): Path<String>) -> StatusCode {
    let mut toys = backend.toys.lock().unwrap();
    match toys.iter().position(|t| t["_id"] == id.as_str()) {
        Some(idx) => {
            toys.remove(idx);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn add_msg(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    Json(msg): Json<Value>,
) -> Reply {
    let mut toys = backend.toys.lock().unwrap();
    let toy = toys
        .iter_mut()
        .find(|t| t["_id"] == id.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;
    if !toy["msgs"].is_array() {
        toy["msgs"] = json!([]);
    }
    if let Some(msgs) = toy["msgs"].as_array_mut() {
        msgs.push(msg.clone());
    }
    Ok(Json(msg))
}

async fn remove_msg(
    State(backend): State<MockBackend>,
    Path((id, msg_id)): Path<(String, String)>,
) -> StatusCode {
    let mut toys = backend.toys.lock().unwrap();
    let Some(toy) = toys.iter_mut().find(|t| t["_id"] == id.as_str()) else {
        return StatusCode::NOT_FOUND;
    };
    let Some(msgs) = toy["msgs"].as_array_mut() else {
        return StatusCode::NOT_FOUND;
    };
    let before = msgs.len();
    msgs.retain(|m| m["id"] != msg_id.as_str());
    if msgs.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

// ---------------------------------------------------------------------------
// Review handlers
// ---------------------------------------------------------------------------

fn reviews_of(backend: &MockBackend, key: &str, id: &str) -> Vec<Value> {
    let reviews = backend.reviews.lock().unwrap();
    reviews
        .iter()
        .filter(|r| r[key]["_id"] == id)
        .cloned()
        .collect()
}

async fn list_reviews(
    State(backend): State<MockBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let reviews = backend.reviews.lock().unwrap();
    let limit = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(usize::MAX);
    let matching = reviews
        .iter()
        .filter(|r| params.get("toyId").is_none_or(|id| r["toy"]["_id"] == id.as_str()))
        .filter(|r| params.get("userId").is_none_or(|id| r["user"]["_id"] == id.as_str()))
        .take(limit)
        .cloned()
        .collect();
    Json(matching)
}

async fn get_review(State(backend): State<MockBackend>, Path(id): Path<String>) -> Reply {
    let reviews = backend.reviews.lock().unwrap();
    reviews
        .iter()
        .find(|r| r["_id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn add_review(State(backend): State<MockBackend>, Json(payload): Json<Value>) -> Reply {
    let toy = {
        let toys = backend.toys.lock().unwrap();
        toys.iter()
            .find(|t| t["_id"] == payload["toyId"])
            .map(|t| json!({ "_id": t["_id"], "name": t["name"], "price": t["price"] }))
            .ok_or(StatusCode::NOT_FOUND)?
    };
    let review = json!({
        "_id": backend.next_id("r"),
        "txt": payload["txt"],
        "createdAt": chrono::Utc::now().to_rfc3339(),
        "toy": toy,
        "user": payload["user"],
    });
    backend.reviews.lock().unwrap().push(review.clone());
    Ok(Json(review))
}

async fn update_review(State(backend): State<MockBackend>, Json(payload): Json<Value>) -> Reply {
    let mut reviews = backend.reviews.lock().unwrap();
    let review = reviews
        .iter_mut()
        .find(|r| r["_id"] == payload["_id"])
        .ok_or(StatusCode::NOT_FOUND)?;
    review["txt"] = payload["txt"].clone();
    Ok(Json(review.clone()))
}

async fn remove_review(State(backend): State<MockBackend>, Path(id): Path<String>) -> StatusCode {
    let mut reviews = backend.reviews.lock().unwrap();
    match reviews.iter().position(|r| r["_id"] == id.as_str()) {
        Some(idx) => {
            reviews.remove(idx);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn toy_reviews(
    State(backend): State<MockBackend>,
    Path(toy_id): Path<String>,
) -> Json<Vec<Value>> {
    Json(reviews_of(&backend, "toy", &toy_id))
}

async fn review_stats(
    State(backend): State<MockBackend>,
    Path(toy_id): Path<String>,
) -> Json<Value> {
    let reviews = reviews_of(&backend, "toy", &toy_id);
    let mut reviewers: Vec<String> = reviews.iter().map(|r| r["user"]["_id"].to_string()).collect();
    reviewers.sort();
    reviewers.dedup();
    Json(json!({
        "toyId": toy_id,
        "count": reviews.len(),
        "reviewerCount": reviewers.len(),
    }))
}

// ---------------------------------------------------------------------------
// User and auth handlers
// ---------------------------------------------------------------------------

async fn get_user(State(backend): State<MockBackend>, Path(id): Path<String>) -> Reply {
    let accounts = backend.accounts.lock().unwrap();
    accounts
        .iter()
        .find(|a| a.user["_id"] == id.as_str())
        .map(|a| Json(a.user.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn login(State(backend): State<MockBackend>, Json(credentials): Json<Value>) -> Reply {
    let accounts = backend.accounts.lock().unwrap();
    accounts
        .iter()
        .find(|a| {
            a.user["username"] == credentials["username"]
                && credentials["password"] == a.password.as_str()
        })
        .map(|a| Json(a.user.clone()))
        .ok_or(StatusCode::UNAUTHORIZED)
}

async fn signup(State(backend): State<MockBackend>, Json(credentials): Json<Value>) -> Reply {
    let username = credentials["username"].as_str().unwrap_or_default().to_string();
    let password = credentials["password"].as_str().unwrap_or_default().to_string();
    let fullname = credentials["fullname"]
        .as_str()
        .unwrap_or(&username)
        .to_string();

    let user = json!({
        "_id": backend.next_id("u"),
        "username": username,
        "fullname": fullname,
        "isAdmin": false,
    });
    let mut accounts = backend.accounts.lock().unwrap();
    if accounts.iter().any(|a| a.user["username"] == username.as_str()) {
        return Err(StatusCode::CONFLICT);
    }
    accounts.push(MockAccount {
        password,
        user: user.clone(),
    });
    Ok(Json(user))
}

async fn logout(State(backend): State<MockBackend>) -> StatusCode {
    if backend.fail_logout.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::Redirect,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
    pub bs: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub address: Address,
    pub phone: String,
    pub website: String,
    pub company: Company,
}

pub type Db = Arc<RwLock<BTreeMap<u64, User>>>;

#[derive(Clone)]
pub struct AppState {
    pub users: Db,
    /// Requests seen so far by `/flaky/{failures}`.
    pub flaky_hits: Arc<AtomicU32>,
}

pub const SESSION_COOKIE: &str = "session=s3cr3t";

pub fn seed_user() -> User {
    User {
        id: 1,
        name: "Leanne Graham".to_string(),
        username: "Bret".to_string(),
        email: "Sincere@april.biz".to_string(),
        address: Address {
            street: "Kulas Light".to_string(),
            suite: "Apt. 556".to_string(),
            city: "Gwenborough".to_string(),
            zipcode: "92998-3874".to_string(),
            geo: Geo {
                lat: "-37.3159".to_string(),
                lng: "81.1496".to_string(),
            },
        },
        phone: "1-770-736-8031 x56442".to_string(),
        website: "hildegard.org".to_string(),
        company: Company {
            name: "Romaguera-Crona".to_string(),
            catch_phrase: "Multi-layered client-server neural-net".to_string(),
            bs: "harness real-time e-markets".to_string(),
        },
    }
}

pub fn app() -> Router {
    let state = AppState {
        users: Arc::new(RwLock::new(BTreeMap::from([(1, seed_user())]))),
        flaky_hits: Arc::default(),
    };
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(replace_user).delete(delete_user),
        )
        .route("/headers", get(request_headers))
        .route("/flaky/{failures}", get(flaky))
        .route("/redirect", get(redirect))
        .route("/cookies/set", get(set_cookie))
        .route("/cookies", get(cookies))
        .route("/echo", post(echo))
        .route("/bytes/{len}", get(bytes))
        .route("/method", any(request_method))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let users = state.users.read().await;
    Json(users.values().cloned().collect())
}

async fn create_user(
    State(state): State<AppState>,
    Json(mut user): Json<User>,
) -> (StatusCode, Json<User>) {
    let mut users = state.users.write().await;
    user.id = users.keys().next_back().map_or(1, |id| id + 1);
    users.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>, StatusCode> {
    let users = state.users.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Store the body under the path id and return what was stored, so a body
/// carrying a different id comes back changed.
async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(mut user): Json<User>,
) -> Json<User> {
    user.id = id;
    state.users.write().await.insert(id, user.clone());
    tracing::debug!(id, "user replaced");
    Json(user)
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut users = state.users.write().await;
    users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn request_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(
        headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect(),
    )
}

/// 503 for the first `failures` hits, then 200.
async fn flaky(State(state): State<AppState>, Path(failures): Path<u32>) -> (StatusCode, Json<Value>) {
    let hits = state.flaky_hits.fetch_add(1, Ordering::SeqCst) + 1;
    let status = if hits <= failures {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(json!({ "hits": hits })))
}

async fn redirect() -> Redirect {
    Redirect::to("/users/1")
}

async fn set_cookie() -> ([(header::HeaderName, String); 1], Json<Value>) {
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
        Json(json!({ "set": true })),
    )
}

async fn cookies(headers: HeaderMap) -> Json<Value> {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "cookie": cookie }))
}

async fn echo(body: Bytes) -> Bytes {
    body
}

/// `len` bytes of `x`, for exercising response size limits.
async fn bytes(Path(len): Path<usize>) -> Vec<u8> {
    vec![b'x'; len]
}

async fn request_method(method: Method) -> String {
    method.to_string()
}

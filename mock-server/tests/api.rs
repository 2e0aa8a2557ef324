use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, seed_user, User, SESSION_COOKIE};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn user_json(id: u64) -> String {
    let mut user = seed_user();
    user.id = id;
    user.name = "foo".to_string();
    serde_json::to_string(&user).unwrap()
}

// --- users ---

#[tokio::test]
async fn list_users_contains_seed() {
    let resp = app().oneshot(get("/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    assert_eq!(users, vec![seed_user()]);
}

#[tokio::test]
async fn get_seed_user() {
    let resp = app().oneshot(get("/users/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "Leanne Graham");
}

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(get("/users/99")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(get("/users/seven")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_with_matching_id_returns_body_unchanged() {
    let body = user_json(7);
    let resp = app()
        .oneshot(json_request("PUT", "/users/7", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let returned: User = body_json(resp).await;
    let sent: User = serde_json::from_str(&body).unwrap();
    assert_eq!(returned, sent);
}

#[tokio::test]
async fn put_with_other_id_returns_path_id() {
    let resp = app()
        .oneshot(json_request("PUT", "/users/1", &user_json(7)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let returned: User = body_json(resp).await;
    assert_eq!(returned.id, 1);
    assert_eq!(returned.name, "foo");
}

#[tokio::test]
async fn put_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("PUT", "/users/1", r#"{"id":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_delete_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create: id assigned after the seed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/users", &user_json(0)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: User = body_json(resp).await;
    assert_eq!(created.id, 2);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/users/2")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/users/2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- helpers for transport tests ---

#[tokio::test]
async fn headers_are_reported_lowercase() {
    let req = Request::builder()
        .uri("/headers")
        .header("X-Trace", "abc")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    let headers: std::collections::BTreeMap<String, String> = body_json(resp).await;
    assert_eq!(headers.get("x-trace").map(String::as_str), Some("abc"));
}

#[tokio::test]
async fn flaky_fails_then_recovers() {
    use tower::Service;

    let mut app = app().into_service();
    let mut statuses = Vec::new();
    for _ in 0..3 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(get("/flaky/2"))
            .await
            .unwrap();
        statuses.push(resp.status());
    }
    assert_eq!(
        statuses,
        vec![
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::OK
        ]
    );
}

#[tokio::test]
async fn redirect_points_at_seed_user() {
    let resp = app().oneshot(get("/redirect")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[http::header::LOCATION], "/users/1");
}

#[tokio::test]
async fn set_cookie_header_is_sent() {
    let resp = app().oneshot(get("/cookies/set")).await.unwrap();

    let cookie = resp.headers()[http::header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(SESSION_COOKIE));
}

#[tokio::test]
async fn cookies_reports_missing_cookie_as_null() {
    let resp = app().oneshot(get("/cookies")).await.unwrap();

    let body: serde_json::Value = body_json(resp).await;
    assert!(body["cookie"].is_null());
}

#[tokio::test]
async fn echo_returns_raw_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .body("plain text, not json".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "plain text, not json");
}

// --- sizes and methods ---

#[tokio::test]
async fn bytes_returns_requested_length() {
    let resp = app().oneshot(get("/bytes/64")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(body.len(), 64);
    assert!(body.iter().all(|b| *b == b'x'));
}

#[tokio::test]
async fn method_reports_extension_methods() {
    let req = Request::builder()
        .method("PURGE")
        .uri("/method")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"PURGE");
}

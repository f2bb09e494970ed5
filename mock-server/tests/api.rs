use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, AppConfig, DEFAULT_CSRF_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("x-csrf-token", DEFAULT_CSRF_TOKEN)
        .body(body.to_string())
        .unwrap()
}

fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("x-csrf-token", DEFAULT_CSRF_TOKEN)
        .body(String::new())
        .unwrap()
}

fn test_app() -> axum::Router {
    app(AppConfig::default())
}

// --- list ---

#[tokio::test]
async fn list_unknown_resource_is_empty() {
    let resp = test_app().oneshot(get("/posts.json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let items: Vec<Value> = body_json(resp).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn paths_without_json_suffix_are_not_found() {
    let resp = test_app().oneshot(get("/posts")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- create ---

#[tokio::test]
async fn create_assigns_integer_id() {
    let resp = test_app()
        .oneshot(json_request("POST", "/posts.json", r#"{"title":"Hello"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Value = body_json(resp).await;
    assert_eq!(item, json!({"id": 1, "title": "Hello"}));
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let resp = test_app()
        .oneshot(json_request("POST", "/posts.json", r#"{"id":99,"title":"x"}"#))
        .await
        .unwrap();

    let item: Value = body_json(resp).await;
    assert_eq!(item["id"], 1);
}

#[tokio::test]
async fn create_without_csrf_token_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/posts.json")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(r#"{"title":"x"}"#.to_string())
        .unwrap();
    let resp = test_app().oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"message": "invalid authenticity token"}));
}

#[tokio::test]
async fn create_with_custom_token() {
    let app = app(AppConfig {
        csrf_token: "secret".to_string(),
    });
    let resp = app
        .oneshot(json_request("POST", "/posts.json", r#"{"title":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_non_object_returns_422() {
    let resp = test_app()
        .oneshot(json_request("POST", "/posts.json", "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"message": "invalid"}));
}

// --- show / update / destroy on missing rows ---

#[tokio::test]
async fn show_missing_returns_404() {
    let resp = test_app().oneshot(get("/posts/1.json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"message": "not found"}));
}

#[tokio::test]
async fn update_missing_returns_404() {
    let resp = test_app()
        .oneshot(json_request("PUT", "/posts/1.json", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn destroy_missing_returns_404() {
    let resp = test_app().oneshot(delete("/posts/1.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- show / update / destroy on existing rows ---

#[tokio::test]
async fn member_routes_serve_existing_row() {
    let app = test_app();
    let request = json_request("POST", "/posts.json", r#"{"title":"a"}"#);
    let resp = app.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.clone().oneshot(get("/posts/1.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let shown: Value = body_json(resp).await;
    assert_eq!(shown, json!({"id": 1, "title": "a"}));

    let request = json_request("PUT", "/posts/1.json", r#"{"title":"b"}"#);
    let resp = app.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated, json!({"id": 1, "title": "b"}));

    let resp = app.clone().oneshot(delete("/posts/1.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn member_route_without_json_suffix_is_not_found() {
    let app = test_app();
    let request = json_request("POST", "/posts.json", r#"{"title":"a"}"#);
    app.clone().oneshot(request).await.unwrap();

    let resp = app.oneshot(get("/posts/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let app = test_app();

    async fn call(app: &axum::Router, request: Request<String>) -> axum::response::Response {
        app.clone().oneshot(request).await.unwrap()
    }

    // create two
    let request = json_request("POST", "/posts.json", r#"{"title":"a","author":"ann"}"#);
    let resp = call(&app, request).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let first: Value = body_json(resp).await;
    let request = json_request("POST", "/posts.json", r#"{"title":"b","author":"bob"}"#);
    let resp = call(&app, request).await;
    let second: Value = body_json(resp).await;
    assert_eq!(second["id"], 2);

    // list keeps insertion order
    let resp = call(&app, get("/posts.json")).await;
    let items: Vec<Value> = body_json(resp).await;
    assert_eq!(items, vec![first.clone(), second.clone()]);

    // list with a filter
    let resp = call(&app, get("/posts.json?author=bob")).await;
    let items: Vec<Value> = body_json(resp).await;
    assert_eq!(items, vec![second.clone()]);

    // other resources are separate tables
    let resp = call(&app, get("/comments.json")).await;
    let items: Vec<Value> = body_json(resp).await;
    assert!(items.is_empty());

    // show
    let resp = call(&app, get("/posts/1.json")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched, first);

    // update merges fields and keeps the id
    let request = json_request("PUT", "/posts/1.json", r#"{"id":50,"title":"a2"}"#);
    let resp = call(&app, request).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated, json!({"id": 1, "title": "a2", "author": "ann"}));

    // destroy
    let resp = call(&app, delete("/posts/1.json")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // show after destroy
    let resp = call(&app, get("/posts/1.json")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after destroy
    let resp = call(&app, get("/posts.json")).await;
    let items: Vec<Value> = body_json(resp).await;
    assert_eq!(items, vec![second]);
}

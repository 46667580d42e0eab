use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use zip::ZipArchive;

use sitegen::config::Config;
use sitegen::provider::{Completion, CompletionClient, CompletionRequest, ProviderError};
use sitegen::server;
use sitegen::service::BundleService;

/// Records calls and answers with a canned payload.
struct MockClient {
    payload: Value,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, _req: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Completion {
            payload: self.payload.clone(),
            elapsed: Duration::from_millis(5),
        })
    }
}

/// Always fails with an upstream HTTP error.
struct FailingClient {
    status: u16,
    body: &'static str,
}

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _req: &CompletionRequest) -> Result<Completion, ProviderError> {
        Err(ProviderError::Upstream {
            status: self.status,
            body: self.body.to_string(),
        })
    }
}

fn configured() -> Config {
    Config {
        api_url: Some("http://upstream.test/v1/complete".into()),
        api_key: Some("test-key".into()),
        model: "test-model".into(),
        ..Config::default()
    }
}

fn app(config: Config, client: Arc<dyn CompletionClient>) -> Router {
    let service = Arc::new(BundleService::new(Arc::new(config), client));
    server::router(service, "public")
}

fn app_with_payload(payload: Value) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = Arc::new(MockClient {
        payload,
        calls: calls.clone(),
    });
    (app(configured(), client), calls)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn generate_normalizes_fenced_choices_payload() {
    let upstream = json!({
        "choices": [
            { "text": "```json\n{\"index.html\":\"<html></html>\",\"styles.css\":\"\",\"script.js\":\"\"}\n```" }
        ]
    });
    let (app, calls) = app_with_payload(upstream);

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": "a red button page" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({
            "files": {
                "index.html": "<html></html>",
                "styles.css": "",
                "script.js": "",
            }
        })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn generate_rejects_unrecognizable_payload_as_bad_gateway() {
    // No known text field, and the serialized form is not a JSON object.
    let (app, _) = app_with_payload(json!([1, 2, 3]));

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": "anything" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "model response not valid JSON");
    assert_eq!(body["model_text_preview"], "[1,2,3]");
}

#[tokio::test]
async fn generate_truncates_long_previews() {
    let (app, _) = app_with_payload(json!({ "text": "y".repeat(4000) }));

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": "anything" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    let preview = body["model_text_preview"].as_str().unwrap();
    assert_eq!(preview.chars().count(), 2000);
}

#[tokio::test]
async fn generate_reports_missing_markup_keys() {
    let (app, _) = app_with_payload(json!({
        "text": "{\"readme.md\":\"hello\",\"styles.css\":\"body{}\"}"
    }));

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": "anything" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "generated bundle missing index.html");
    assert_eq!(body["keys"], json!(["readme.md", "styles.css"]));
}

#[tokio::test]
async fn generate_rejects_empty_prompt_without_calling_upstream() {
    let (app, calls) = app_with_payload(json!({ "text": "unused" }));

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generate_rejects_missing_or_non_string_prompt() {
    let (app, calls) = app_with_payload(json!({ "text": "unused" }));

    let response = app
        .clone()
        .oneshot(post_json("/api/generate", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": 42 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generate_answers_500_when_unconfigured() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = Arc::new(MockClient {
        payload: json!({ "text": "unused" }),
        calls: calls.clone(),
    });
    let app = app(Config::default(), client);

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": "a page" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("misconfigured"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generate_surfaces_upstream_http_failure_with_detail() {
    let client = Arc::new(FailingClient {
        status: 503,
        body: "overloaded",
    });
    let app = app(configured(), client);

    let response = app
        .oneshot(post_json("/api/generate", json!({ "prompt": "a page" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "upstream or server error");
    assert_eq!(body["detail"]["status"], 503);
    assert_eq!(body["detail"]["body"], "overloaded");
}

#[tokio::test]
async fn download_streams_a_zip_of_the_posted_files() {
    let (app, _) = app_with_payload(json!(null));

    let response = app
        .oneshot(post_json(
            "/api/download",
            json!({
                "files": {
                    "index.html": "<html></html>",
                    "styles.css": "body { margin: 0; }",
                    "script.js": "",
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=site.zip"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(archive.len(), 3);

    let mut markup = String::new();
    archive
        .by_name("index.html")
        .unwrap()
        .read_to_string(&mut markup)
        .unwrap();
    assert_eq!(markup, "<html></html>");
}

#[tokio::test]
async fn download_rejects_missing_files_object() {
    let (app, _) = app_with_payload(json!(null));

    let response = app
        .clone()
        .oneshot(post_json("/api/download", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/api/download", json!({ "files": "nope" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

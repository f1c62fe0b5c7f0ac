//! HTTP-level tests for the signfield API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http_body_util::BodyExt;
use lopdf::{dictionary, Document, Object};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use signfield_api::remote::HttpRenderBackend;
use signfield_api::{router, AppState, Config};
use signfield_core::{BackendError, RenderBackend, RenderRequest, RenderResponse};
use signfield_render::{DocumentStore, LocalRenderBackend};
use tower::ServiceExt;

fn test_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn local_app() -> Router {
    let state = AppState::new(Config::default()).unwrap();
    router(Arc::new(state))
}

fn app_with_backend(backend: Arc<dyn RenderBackend>) -> Router {
    let store = Arc::new(DocumentStore::new());
    let local = LocalRenderBackend::new(store.clone());
    let state = AppState::with_backend(Config::default(), store, local, backend);
    router(Arc::new(state))
}

fn app_with_remote(url: &str) -> Router {
    let remote = HttpRenderBackend::new(url, Duration::from_secs(5)).unwrap();
    app_with_backend(Arc::new(remote))
}

/// Backend that answers with a fixed response after a delay
struct SlowBackend {
    delay: Duration,
    response: RenderResponse,
}

#[async_trait]
impl RenderBackend for SlowBackend {
    async fn render(&self, _request: &RenderRequest) -> Result<RenderResponse, BackendError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}

fn slow_app(delay_ms: u64, response: RenderResponse) -> Router {
    app_with_backend(Arc::new(SlowBackend {
        delay: Duration::from_millis(delay_ms),
        response,
    }))
}

async fn session_state(app: &Router, document_id: &str) -> Value {
    let (_, snapshot) = send(app, "GET", &format!("/api/documents/{}", document_id), None).await;
    snapshot["state"].clone()
}

/// Poll until the session reaches `state`, giving up after about two seconds
async fn wait_for_state(app: &Router, document_id: &str, state: &str) {
    for _ in 0..200 {
        if session_state(app, document_id).await == state {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {} never reached {}", document_id, state);
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Create a document with one measured A4 page drawn at 600x800
async fn ready_document(app: &Router, document_id: &str) {
    let (status, body) = send(
        app,
        "POST",
        "/api/documents",
        Some(json!({
            "documentId": document_id,
            "pdfBase64": BASE64.encode(test_pdf()),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pages"][0]["nativeWidth"], 595.0);

    let (status, _) = send(
        app,
        "PUT",
        &format!("/api/documents/{}/pages/1/viewport", document_id),
        Some(json!({
            "renderedWidth": 600.0,
            "renderedHeight": 800.0,
            "nativeWidth": 595.0,
            "nativeHeight": 842.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn place(app: &Router, document_id: &str, field_type: &str, x: f64, y: f64) -> String {
    let (status, field) = send(
        app,
        "POST",
        &format!("/api/documents/{}/fields", document_id),
        Some(json!({ "type": field_type, "page": 1, "x": x, "y": y })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    field["id"].as_str().unwrap().to_string()
}

async fn fill(app: &Router, document_id: &str, field_id: &str, content: &str) -> Value {
    let (status, field) = send(
        app,
        "PATCH",
        &format!("/api/documents/{}/fields/{}/content", document_id, field_id),
        Some(json!({ "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    field
}

#[tokio::test]
async fn health_check() {
    let response = local_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn place_fill_finalize_and_download() {
    let app = local_app();
    ready_document(&app, "lease").await;

    let field_id = place(&app, "lease", "name", 100.0, 200.0).await;
    let field = fill(&app, "lease", &field_id, "Jane  Doe\n").await;
    assert_eq!(field["content"], "Jane Doe");
    assert_eq!(field["font"], "helvetica");

    let (status, body) = send(&app, "POST", "/api/documents/lease/finalize", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["signedFileUrl"], "/api/documents/lease/signed");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/documents/lease/signed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF-"));

    let (_, snapshot) = send(&app, "GET", "/api/documents/lease", None).await;
    assert_eq!(snapshot["state"], "finalized");
    assert_eq!(snapshot["signedFileUrl"], "/api/documents/lease/signed");

    // Locked after finalization
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/documents/lease/fields/{}/position", field_id),
        Some(json!({ "x": 10.0, "y": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn placement_before_render_is_suppressed() {
    let app = local_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/documents",
        Some(json!({ "documentId": "blank" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/documents/blank/fields",
        Some(json!({ "type": "signature", "page": 1, "x": 10.0, "y": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, snapshot) = send(&app, "GET", "/api/documents/blank", None).await;
    assert_eq!(snapshot["fields"], json!([]));
}

#[tokio::test]
async fn click_outside_page_is_suppressed() {
    let app = local_app();
    ready_document(&app, "doc").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/documents/doc/fields",
        Some(json!({ "type": "text", "page": 1, "x": 700.0, "y": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn incomplete_fields_block_finalize() {
    let app = local_app();
    ready_document(&app, "doc").await;
    let field_id = place(&app, "doc", "signature", 50.0, 50.0).await;

    let (status, body) = send(&app, "POST", "/api/documents/doc/finalize", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fieldIds"], json!([field_id]));

    let (_, snapshot) = send(&app, "GET", "/api/documents/doc", None).await;
    assert_eq!(snapshot["state"], "editing");
    assert!(snapshot["lastError"].is_string());
}

#[tokio::test]
async fn resize_refits_font() {
    let app = local_app();
    ready_document(&app, "doc").await;
    let field_id = place(&app, "doc", "signature", 100.0, 100.0).await;
    let field = fill(&app, "doc", &field_id, "Alice").await;
    let before = field["fontSize"].as_f64().unwrap();

    let (status, field) = send(
        &app,
        "PATCH",
        &format!("/api/documents/doc/fields/{}/size", field_id),
        Some(json!({ "width": 10.0, "height": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field["width"], 60.0);
    assert_eq!(field["height"], 20.0);
    let after = field["fontSize"].as_f64().unwrap();
    assert!(after < before);
    assert!(after <= 20.0);
}

#[tokio::test]
async fn font_and_removal() {
    let app = local_app();
    ready_document(&app, "doc").await;
    let field_id = place(&app, "doc", "initials", 20.0, 20.0).await;

    let (status, field) = send(
        &app,
        "PATCH",
        &format!("/api/documents/doc/fields/{}/font", field_id),
        Some(json!({ "font": "allura" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field["font"], "allura");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/documents/doc/fields/{}/font", field_id),
        Some(json!({ "font": "comic-sans" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/documents/doc/fields/{}", field_id);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/api/documents/doc/finalize", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn request_errors() {
    let app = local_app();
    let (status, body) = send(&app, "GET", "/api/documents/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found: nope");

    ready_document(&app, "doc").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/documents",
        Some(json!({ "documentId": "doc" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/documents/doc/fields",
        Some(json!({ "type": "checkbox", "page": 1, "x": 1.0, "y": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/documents",
        Some(json!({ "pdfBase64": "***" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/documents/doc/signed", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn render_endpoint_reports_failure_in_body() {
    let app = local_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/render",
        Some(json!({
            "documentId": "unknown",
            "signatures": [{
                "page": 1, "x": 10.0, "y": 10.0, "width": 120.0, "height": 30.0,
                "type": "text", "content": "x", "font": null, "fontSize": 12.0
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("unknown"));
}

/// Serve a fixed rendering backend on an ephemeral port
async fn spawn_backend(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/render",
        post(move |Json(request): Json<Value>| {
            let body = body.clone();
            async move {
                assert!(request["signatures"].is_array());
                (status, Json(body))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/render", addr)
}

#[tokio::test]
async fn remote_backend_success() {
    let url = spawn_backend(
        StatusCode::OK,
        json!({ "success": true, "signedFileUrl": "https://files.example/lease.pdf" }),
    )
    .await;
    let app = app_with_remote(&url);
    ready_document(&app, "lease").await;
    let field_id = place(&app, "lease", "company", 30.0, 30.0).await;
    fill(&app, "lease", &field_id, "Acme").await;

    let (status, body) = send(&app, "POST", "/api/documents/lease/finalize", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["signedFileUrl"], "https://files.example/lease.pdf");
}

#[tokio::test]
async fn remote_backend_failure_reverts_to_editing() {
    let url = spawn_backend(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })).await;
    let app = app_with_remote(&url);
    ready_document(&app, "lease").await;
    let field_id = place(&app, "lease", "company", 30.0, 30.0).await;
    fill(&app, "lease", &field_id, "Acme").await;

    let (status, body) = send(&app, "POST", "/api/documents/lease/finalize", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);

    let (_, snapshot) = send(&app, "GET", "/api/documents/lease", None).await;
    assert_eq!(snapshot["state"], "editing");
    assert_eq!(snapshot["fields"][0]["content"], "Acme");
}

#[tokio::test]
async fn remote_backend_wrong_shape_is_failure() {
    let url = spawn_backend(StatusCode::OK, json!({ "ok": true })).await;
    let app = app_with_remote(&url);
    ready_document(&app, "lease").await;
    let field_id = place(&app, "lease", "text", 30.0, 30.0).await;
    fill(&app, "lease", &field_id, "hello").await;

    let (status, _) = send(&app, "POST", "/api/documents/lease/finalize", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

async fn ready_filled_document(app: &Router, document_id: &str) -> String {
    ready_document(app, document_id).await;
    let field_id = place(app, document_id, "name", 100.0, 200.0).await;
    fill(app, document_id, &field_id, "Jane Doe").await;
    field_id
}

#[tokio::test]
async fn finalizing_rejects_second_finalize_and_edits() {
    let app = slow_app(300, RenderResponse::success("https://files.example/lease.pdf"));
    let field_id = ready_filled_document(&app, "lease").await;

    let first = {
        let app = app.clone();
        tokio::spawn(async move { send(&app, "POST", "/api/documents/lease/finalize", None).await })
    };
    wait_for_state(&app, "lease", "finalizing").await;

    let (status, body) = send(&app, "POST", "/api/documents/lease/finalize", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Finalization is already in progress");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/documents/lease/fields/{}/content", field_id),
        Some(json!({ "content": "John Roe" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["signedFileUrl"], "https://files.example/lease.pdf");
    assert_eq!(session_state(&app, "lease").await, "finalized");

    let (_, snapshot) = send(&app, "GET", "/api/documents/lease", None).await;
    assert_eq!(snapshot["fields"][0]["content"], "Jane Doe");
}

#[tokio::test]
async fn failed_slow_finalize_returns_to_editing() {
    let app = slow_app(200, RenderResponse::failure("disk full"));
    let field_id = ready_filled_document(&app, "lease").await;

    let first = {
        let app = app.clone();
        tokio::spawn(async move { send(&app, "POST", "/api/documents/lease/finalize", None).await })
    };
    wait_for_state(&app, "lease", "finalizing").await;
    let (status, _) = send(&app, "DELETE", &format!("/api/documents/lease/fields/{}", field_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("disk full"));
    assert_eq!(session_state(&app, "lease").await, "editing");

    // Editable again
    fill(&app, "lease", &field_id, "John Roe").await;
}

#[tokio::test]
async fn dropped_finalize_request_still_completes() {
    let app = slow_app(300, RenderResponse::success("https://files.example/lease.pdf"));
    ready_filled_document(&app, "lease").await;

    let dropped = tokio::time::timeout(
        Duration::from_millis(50),
        send(&app, "POST", "/api/documents/lease/finalize", None),
    )
    .await;
    assert!(dropped.is_err());
    assert_eq!(session_state(&app, "lease").await, "finalizing");

    wait_for_state(&app, "lease", "finalized").await;
    let (_, snapshot) = send(&app, "GET", "/api/documents/lease", None).await;
    assert_eq!(snapshot["signedFileUrl"], "https://files.example/lease.pdf");
}

#[tokio::test]
async fn dropped_failing_finalize_can_be_retried() {
    let app = slow_app(200, RenderResponse::failure("backend offline"));
    let field_id = ready_filled_document(&app, "lease").await;

    let dropped = tokio::time::timeout(
        Duration::from_millis(50),
        send(&app, "POST", "/api/documents/lease/finalize", None),
    )
    .await;
    assert!(dropped.is_err());
    assert_eq!(session_state(&app, "lease").await, "finalizing");

    wait_for_state(&app, "lease", "editing").await;
    let (_, snapshot) = send(&app, "GET", "/api/documents/lease", None).await;
    assert!(snapshot["lastError"].as_str().unwrap().contains("backend offline"));

    fill(&app, "lease", &field_id, "John Roe").await;
    let (status, _) = send(&app, "POST", "/api/documents/lease/finalize", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

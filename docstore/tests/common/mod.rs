#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use docstore::documents::{Document, DocumentUpdate, Documents};
use docstore::migration::Migrator;
use docstore::{AppState, router};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;
use utoipa_axum::router::OpenApiRouter;

pub const BOUNDARY: &str = "docstore-test-boundary";

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn setup_test_app(documents: Documents) -> Router {
    let state = AppState {
        documents,
        max_upload_bytes: 1024 * 1024,
    };
    let (router, _) = OpenApiRouter::new()
        .nest("/documents", router(state))
        .split_for_parts();
    router
}

/// Fixture documents: (name, content type, version, author).
pub const FIXTURES: [(&str, &str, i32, &str); 5] = [
    ("alpha.pdf", "application/pdf", 1, "anonymous"),
    ("beta.txt", "text/plain", 2, "alice"),
    ("gamma.pdf", "application/pdf", 3, "bob"),
    ("notes.txt", "text/plain", 1, "alice"),
    ("Report-2024.pdf", "application/pdf", 2, "bob"),
];

/// Store the fixtures and return their references in fixture order.
pub async fn seed(documents: &Documents) -> Vec<String> {
    let mut refs = Vec::new();
    for (name, content_type, version, author) in FIXTURES {
        let created = documents
            .create(name, content_type, name.as_bytes().to_vec())
            .await
            .unwrap();
        let changes = DocumentUpdate {
            version: Some(version),
            author_ref: Some(author.to_string()),
            ..DocumentUpdate::default()
        };
        documents.update(&created.document_ref, changes).await.unwrap();
        refs.push(created.document_ref);
    }
    refs
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn list(app: &Router, uri: &str) -> (StatusCode, Vec<Document>) {
    let response = get(app, uri).await;
    let status = response.status();
    assert_eq!(status, StatusCode::OK, "GET {uri}");
    let body = body_bytes(response).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub fn names(documents: &[Document]) -> Vec<&str> {
    documents.iter().map(|d| d.name.as_str()).collect()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

/// `q=` parameter with the value escaped for a query string.
pub fn q(filter: &str) -> String {
    format!("q={}", url_escape::encode_component(filter))
}

/// A `multipart/form-data` body with a single file field.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, payload: &[u8]) -> Body {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

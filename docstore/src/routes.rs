//! HTTP boundary of the document store.

use axum::{
    Json,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::criteria::{RealizedPage, pagination_headers};
use crate::documents::{Document, DocumentUpdate, Documents, document, media_type};
use crate::errors::ApiError;
use crate::listing::{ListQuery, Restriction, list_page};

/// Multipart field carrying the uploaded payload.
pub const UPLOAD_FIELD: &str = "file";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct AppState {
    pub documents: Documents,
    pub max_upload_bytes: usize,
}

/// Routes of the `/documents` resource, relative to where they are nested.
pub fn router(state: AppState) -> OpenApiRouter {
    let limit = DefaultBodyLimit::max(state.max_upload_bytes);
    OpenApiRouter::new()
        .routes(routes!(list_documents))
        .routes(routes!(upload_document))
        .routes(routes!(list_documents_by_refs))
        .routes(routes!(get_document))
        .routes(routes!(update_document))
        .routes(routes!(delete_document))
        .routes(routes!(download_document))
        .layer(limit)
        .with_state(state)
}

/// 204 for an empty page, otherwise the page with its pagination headers.
fn page_response(page: RealizedPage<document::Model>) -> Response {
    if page.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let headers = pagination_headers(&page).into_header_map();
    let documents = page.map(Document::from).content;
    (StatusCode::OK, headers, Json(documents)).into_response()
}

#[utoipa::path(
    get,
    path = "/",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching documents", body = [Document],
            headers(
                ("X-Page" = u64, description = "Current page index"),
                ("X-Page-Size" = u64, description = "Page size"),
                ("X-Page-Count" = u64, description = "Elements in this page"),
                ("X-Page-Total-Count" = u64, description = "Total number of pages"),
                ("X-Total-Count" = u64, description = "Total number of elements")
            )
        ),
        (status = 204, description = "No document matches"),
        (status = 400, description = "Malformed filter, unknown field or invalid paging")
    )
)]
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let query = query.with_paging_headers(&headers);
    let page = list_page(&state.documents, &query, None).await?;
    Ok(page_response(page))
}

#[utoipa::path(
    get,
    path = "/refs/{refs}",
    params(
        ("refs" = String, Path, description = "Document references separated by '|'"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Matching documents among the references", body = [Document]),
        (status = 204, description = "No document matches"),
        (status = 400, description = "Malformed filter, unknown field or invalid paging")
    )
)]
pub async fn list_documents_by_refs(
    State(state): State<AppState>,
    Path(refs): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let query = query.with_paging_headers(&headers);
    let restriction = Restriction::parse_refs(&refs);
    let page = list_page(&state.documents, &query, Some(&restriction)).await?;
    Ok(page_response(page))
}

/// Multipart upload body.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = Document),
        (status = 400, description = "Missing or unreadable file field")
    )
)]
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or(UPLOAD_FIELD).to_string();
        let content_type = media_type(field.content_type().unwrap_or(FALLBACK_CONTENT_TYPE)).to_string();
        let payload = field.bytes().await?;

        let created = state
            .documents
            .create(&name, &content_type, payload.to_vec())
            .await?;
        return Ok((StatusCode::CREATED, Json(created.into())));
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart field '{UPLOAD_FIELD}'"
    )))
}

#[utoipa::path(
    get,
    path = "/{document_ref}",
    params(("document_ref" = String, Path, description = "Document reference")),
    responses(
        (status = 200, description = "Document metadata", body = Document),
        (status = 404, description = "Document not found")
    )
)]
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_ref): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let model = state.documents.find_by_ref(&document_ref).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{document_ref}/file",
    params(("document_ref" = String, Path, description = "Document reference")),
    responses(
        (status = 200, description = "Stored payload with its content type"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn download_document(
    State(state): State<AppState>,
    Path(document_ref): Path<String>,
) -> Result<Response, ApiError> {
    let (document, payload) = state.documents.find_file(&document_ref).await?;
    let disposition = format!("inline; filename=\"{}\"", document.name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/{document_ref}",
    params(("document_ref" = String, Path, description = "Document reference")),
    request_body = DocumentUpdate,
    responses(
        (status = 200, description = "Document updated", body = Document),
        (status = 404, description = "Document not found")
    )
)]
pub async fn update_document(
    State(state): State<AppState>,
    Path(document_ref): Path<String>,
    Json(changes): Json<DocumentUpdate>,
) -> Result<Json<Document>, ApiError> {
    let model = state.documents.update(&document_ref, changes).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{document_ref}",
    params(("document_ref" = String, Path, description = "Document reference")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_ref): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.documents.delete(&document_ref).await?;
    Ok(StatusCode::NO_CONTENT)
}

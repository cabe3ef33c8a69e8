//! # Error Handling
//!
//! Every handler returns `Result<_, ApiError>`. Errors map to an HTTP status
//! and a sanitized JSON body `{ "error": "..." }`:
//!
//! - malformed `q`, unknown fields, unconvertible operands, zero or
//!   unaddressable page → 400
//! - missing document → 404
//! - database and other internal failures → 500, details logged only
//!
//! ```rust,ignore
//! async fn get_document(
//!     State(state): State<AppState>,
//!     Path(document_ref): Path<String>,
//! ) -> Result<Json<Document>, ApiError> {
//!     // StoreError converts with `?`
//!     let model = state.documents.find_by_ref(&document_ref).await?;
//!     Ok(Json(model.into()))
//! }
//! ```
//!
//! Internal details go through `tracing`; nothing from a `DbErr` reaches the
//! client.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

use crate::criteria::CriteriaError;
use crate::storage::StoreError;

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - Resource doesn't exist
    NotFound {
        /// Resource type (e.g., "document")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 400 Bad Request - Invalid input from user
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a 404 Not Found error
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    /// Create a 400 Bad Request error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::bad_request("Missing multipart field 'file'"));
    /// ```
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 Internal Server Error with optional details
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::BadRequest { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// Conversions
// ============================================================================

/// Every criteria error is a client error.
impl From<CriteriaError> for ApiError {
    fn from(err: CriteriaError) -> Self {
        Self::bad_request(err.to_string())
    }
}

/// **Conversion Rules:**
/// - `Criteria`, `UnknownField`, `InvalidValue` → 400 Bad Request
/// - `NotFound` → 404 Not Found
/// - `Database` → 500 Internal Server Error (logged internally, sanitized for users)
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Criteria(err) => err.into(),
            StoreError::UnknownField(_) | StoreError::InvalidValue { .. } => {
                Self::bad_request(err.to_string())
            }
            StoreError::NotFound { resource, id } => Self::not_found(resource, Some(id)),
            StoreError::Database(err) => err.into(),
        }
    }
}

/// Every `DbErr` is a 500. Missing documents are detected by the store and
/// arrive as `StoreError::NotFound`.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}

/// Malformed multipart bodies are client errors, except when the body cannot
/// be read at all.
impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status().is_client_error() {
            Self::bad_request(err.body_text())
        } else {
            Self::internal("Failed to read upload", Some(err.body_text()))
        }
    }
}

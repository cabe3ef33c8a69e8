//! Document metadata and payloads.

pub mod entity;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use entity::{document, document_file};
pub use service::Documents;

/// Author recorded on uploads until authentication exists.
pub const DEFAULT_AUTHOR: &str = "anonymous";

/// API field name of the document reference.
pub const REF_FIELD: &str = "documentRef";

/// API field names accepted in `q` and `s`, mapped to their columns.
#[must_use]
pub fn filterable_columns() -> Vec<(&'static str, document::Column)> {
    vec![
        (REF_FIELD, document::Column::DocumentRef),
        ("name", document::Column::Name),
        ("version", document::Column::Version),
        ("createdAt", document::Column::CreatedAt),
        ("contentType", document::Column::ContentType),
        ("authorRef", document::Column::AuthorRef),
    ]
}

/// Media type of an upload: the part of the content type before any
/// parameters, e.g. `text/plain` for `text/plain; charset=utf-8`.
#[must_use]
pub fn media_type(content_type: &str) -> &str {
    content_type
        .split_once(';')
        .map_or(content_type, |(media_type, _)| media_type)
        .trim()
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_ref: String,
    pub name: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub content_type: String,
    pub author_ref: String,
}

impl From<document::Model> for Document {
    fn from(model: document::Model) -> Self {
        Self {
            document_ref: model.document_ref,
            name: model.name,
            version: model.version,
            created_at: model.created_at,
            content_type: model.content_type,
            author_ref: model.author_ref,
        }
    }
}

/// Metadata changes; absent fields keep their stored value.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub version: Option<i32>,
    pub content_type: Option<String>,
    pub author_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_strips_parameters() {
        assert_eq!(media_type("text/plain; charset=utf-8"), "text/plain");
        assert_eq!(media_type("application/pdf"), "application/pdf");
        assert_eq!(media_type(" image/png ;q=1"), "image/png");
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let doc = Document {
            document_ref: "r1".into(),
            name: "report.pdf".into(),
            version: 1,
            created_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            content_type: "application/pdf".into(),
            author_ref: DEFAULT_AUTHOR.into(),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["documentRef"], "r1");
        assert_eq!(json["contentType"], "application/pdf");
        assert_eq!(json["authorRef"], "anonymous");
        assert!(json.get("document_ref").is_none());
    }

    #[test]
    fn test_filterable_columns_cover_entity_fields() {
        use crate::storage::memory::FieldSource;

        let columns: Vec<&str> = filterable_columns().iter().map(|(name, _)| *name).collect();
        let fields: Vec<&str> = document::Model::fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(columns, fields);
    }
}

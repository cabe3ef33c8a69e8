use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, NotSet, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use super::{DEFAULT_AUTHOR, DocumentUpdate, document, document_file, filterable_columns};
use crate::criteria::{PagingDescriptor, RealizedPage};
use crate::storage::sql::{SqlBackend, SqlPredicate};
use crate::storage::{ListingStore, StoreError};

const RESOURCE: &str = "document";

fn not_found(document_ref: &str) -> StoreError {
    StoreError::NotFound {
        resource: RESOURCE,
        id: document_ref.to_string(),
    }
}

/// Document metadata and payload operations over a database connection.
#[derive(Debug, Clone)]
pub struct Documents {
    db: DatabaseConnection,
    backend: SqlBackend<document::Entity>,
}

impl Documents {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            backend: SqlBackend::new(filterable_columns()),
        }
    }

    /// Store a new document under a fresh reference, version 1.
    ///
    /// Metadata and payload are written in one transaction.
    ///
    /// # Errors
    ///
    /// `Database` when either insert fails; nothing is persisted then.
    pub async fn create(
        &self,
        name: &str,
        content_type: &str,
        payload: Vec<u8>,
    ) -> Result<document::Model, StoreError> {
        let document_ref = Uuid::new_v4().to_string();
        let size = payload.len();

        let txn = self.db.begin().await?;
        let created = document::ActiveModel {
            document_ref: Set(document_ref.clone()),
            name: Set(name.to_string()),
            version: Set(1),
            created_at: Set(Utc::now()),
            content_type: Set(content_type.to_string()),
            author_ref: Set(DEFAULT_AUTHOR.to_string()),
        }
        .insert(&txn)
        .await?;
        document_file::ActiveModel {
            id: NotSet,
            document_ref: Set(document_ref),
            payload: Set(payload),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(
            document_ref = %created.document_ref,
            content_type = %created.content_type,
            size,
            "Stored document"
        );
        Ok(created)
    }

    /// # Errors
    ///
    /// `NotFound` when no document has this reference.
    pub async fn find_by_ref(&self, document_ref: &str) -> Result<document::Model, StoreError> {
        document::Entity::find_by_id(document_ref.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(document_ref))
    }

    /// Metadata together with the stored payload.
    ///
    /// # Errors
    ///
    /// `NotFound` when the document or its payload is missing.
    pub async fn find_file(
        &self,
        document_ref: &str,
    ) -> Result<(document::Model, Vec<u8>), StoreError> {
        match document::Entity::find_by_id(document_ref.to_string())
            .find_also_related(document_file::Entity)
            .one(&self.db)
            .await?
        {
            Some((document, Some(file))) => Ok((document, file.payload)),
            Some((_, None)) => {
                tracing::warn!(document_ref, "Document has no stored payload");
                Err(not_found(document_ref))
            }
            None => Err(not_found(document_ref)),
        }
    }

    /// Apply the present fields of `changes` to the stored metadata.
    ///
    /// # Errors
    ///
    /// `NotFound` when no document has this reference.
    pub async fn update(
        &self,
        document_ref: &str,
        changes: DocumentUpdate,
    ) -> Result<document::Model, StoreError> {
        let current = self.find_by_ref(document_ref).await?;
        let mut model = current.clone().into_active_model();
        if let Some(name) = changes.name {
            model.name = Set(name);
        }
        if let Some(version) = changes.version {
            model.version = Set(version);
        }
        if let Some(content_type) = changes.content_type {
            model.content_type = Set(content_type);
        }
        if let Some(author_ref) = changes.author_ref {
            model.author_ref = Set(author_ref);
        }
        if !model.is_changed() {
            return Ok(current);
        }

        let updated = model.update(&self.db).await?;
        tracing::info!(document_ref, version = updated.version, "Updated document");
        Ok(updated)
    }

    /// Remove the payload, then the metadata.
    ///
    /// # Errors
    ///
    /// `NotFound` when no document has this reference.
    pub async fn delete(&self, document_ref: &str) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;
        let exists = document::Entity::find_by_id(document_ref.to_string())
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            return Err(not_found(document_ref));
        }

        document_file::Entity::delete_many()
            .filter(document_file::Column::DocumentRef.eq(document_ref))
            .exec(&txn)
            .await?;
        document::Entity::delete_by_id(document_ref.to_string())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(document_ref, "Deleted document");
        Ok(())
    }
}

#[async_trait]
impl ListingStore for Documents {
    type Record = document::Model;
    type Backend = SqlBackend<document::Entity>;

    fn predicate_backend(&self) -> &Self::Backend {
        &self.backend
    }

    async fn find_page(
        &self,
        predicate: SqlPredicate,
        paging: &PagingDescriptor,
    ) -> Result<RealizedPage<document::Model>, StoreError> {
        self.backend.fetch_page(&self.db, predicate, paging).await
    }
}

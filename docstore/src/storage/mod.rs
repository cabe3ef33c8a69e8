//! Storage backends for the criteria subsystem.
//!
//! - [`sql`]: Sea-ORM backend, predicates are sea-query `Condition`s
//! - [`memory`]: in-memory backend evaluating clauses against plain records

pub mod memory;
pub mod sql;

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::criteria::{CriteriaError, PagingDescriptor, PredicateBackend, RealizedPage};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    /// The field name does not exist on the target entity.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The raw operand cannot be converted to the field's type.
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl StoreError {
    pub(crate) fn invalid_value(field: &str, value: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Value kind of a filterable field, used to convert raw operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Timestamp,
    /// Not usable in filters or sorts (e.g. binary columns).
    Opaque,
}

/// Predicate type produced by a store's backend.
pub type StorePredicate<S> = <<S as ListingStore>::Backend as PredicateBackend>::Predicate;

/// A store that can execute a predicate plus a paging descriptor.
#[async_trait]
pub trait ListingStore: Send + Sync {
    type Record: Send;
    type Backend: PredicateBackend<Error = StoreError> + Sync;

    fn predicate_backend(&self) -> &Self::Backend;

    /// Fetch the page described by `paging` among the rows matching `predicate`.
    ///
    /// # Errors
    ///
    /// `UnknownField` when the ordering names a field the entity does not
    /// have, `Database` for driver failures.
    async fn find_page(
        &self,
        predicate: StorePredicate<Self>,
        paging: &PagingDescriptor,
    ) -> Result<RealizedPage<Self::Record>, StoreError>;
}

//! Backend-agnostic predicate composition.
//!
//! The criteria subsystem never evaluates anything itself. A storage backend
//! implements [`PredicateBackend`] to turn one criterion into an atomic
//! predicate of its own kind (a sea-query `Condition`, an in-memory clause
//! list, ...), and [`build_predicate`] folds those atoms into a conjunction.

use super::error::CriteriaError;
use super::query_parser::FilterCriterion;

/// A composable boolean condition owned by a storage backend.
///
/// `and` must treat [`Predicate::identity`] as a neutral element on both
/// sides: `identity().and(p)` and `p.and(identity())` are exactly `p`.
pub trait Predicate: Sized + Send {
    /// The predicate that matches everything.
    fn identity() -> Self;

    /// Logical conjunction of `self` and `other`.
    #[must_use]
    fn and(self, other: Self) -> Self;

    fn is_identity(&self) -> bool;
}

/// Factory for atomic predicates of one storage backend.
pub trait PredicateBackend {
    type Predicate: Predicate;
    type Error: From<CriteriaError>;

    /// Atomic predicate for a single filter criterion.
    ///
    /// # Errors
    ///
    /// Backends fail when the field does not exist, when the raw value cannot
    /// be converted to the field's type, or with
    /// [`CriteriaError::UnsupportedOperator`] when the operator cannot be
    /// applied to that field.
    fn criterion(&self, criterion: &FilterCriterion) -> Result<Self::Predicate, Self::Error>;

    /// Predicate restricting `field` to one of `values`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PredicateBackend::criterion`].
    fn one_of(&self, field: &str, values: &[String]) -> Result<Self::Predicate, Self::Error>;
}

/// Combine two independently built predicates.
#[must_use]
pub fn and<P: Predicate>(left: P, right: P) -> P {
    left.and(right)
}

/// Fold filter criteria into one predicate, left to right.
///
/// # Errors
///
/// Propagates the first error raised by the backend.
pub fn build_predicate<B: PredicateBackend>(
    backend: &B,
    criteria: &[FilterCriterion],
) -> Result<B::Predicate, B::Error> {
    criteria
        .iter()
        .try_fold(B::Predicate::identity(), |acc, criterion| {
            Ok(acc.and(backend.criterion(criterion)?))
        })
}

use thiserror::Error;

/// Errors raised while turning request parameters into criteria.
///
/// Every variant is a client error: the request carried a filter or paging
/// input that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    /// The token could not be split into field, operator and value.
    #[error("malformed filter criterion '{token}'")]
    MalformedCriterion { token: String },

    /// The token has the right shape but its operator is not known.
    #[error("unsupported operator '{operator}' in filter criterion '{token}'")]
    UnsupportedOperator { operator: String, token: String },

    /// A page size was supplied but it is not a positive number.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// The page starts or ends beyond the largest offset storage can address.
    #[error("page {index} of size {size} is out of range")]
    PageOutOfRange { index: u64, size: u64 },
}

impl CriteriaError {
    pub(crate) fn malformed(token: &str) -> Self {
        Self::MalformedCriterion {
            token: token.to_string(),
        }
    }

    pub(crate) fn unsupported(operator: &str, token: &str) -> Self {
        Self::UnsupportedOperator {
            operator: operator.to_string(),
            token: token.to_string(),
        }
    }
}

/// Raised when page bounds are read from a descriptor that has none.
///
/// This signals a programming error in the caller, not bad user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot read {accessor} from an unpaged descriptor")]
pub struct UnsupportedPagingAccess {
    pub accessor: &'static str,
}

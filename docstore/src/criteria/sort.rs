use std::fmt;

use super::query_parser::CRITERIA_DELIMITER;

const DIRECTION_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse `ASC` / `DESC`, ignoring case. Anything else is rejected.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("ASC") {
            Some(Self::Ascending)
        } else if keyword.eq_ignore_ascii_case("DESC") {
            Some(Self::Descending)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One sort key as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortCriterion {
    pub field: String,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DIRECTION_SEPARATOR}{}", self.field, self.direction.keyword())
    }
}

/// Multi-key ordering. Earlier keys take precedence, later keys break ties.
///
/// An empty ordering means "unspecified": the storage layer may return rows
/// in whatever stable order it likes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Ordering {
    keys: Vec<SortCriterion>,
}

impl Ordering {
    #[must_use]
    pub const fn unsorted() -> Self {
        Self { keys: Vec::new() }
    }

    /// Single-key ordering.
    #[must_use]
    pub fn by(criterion: SortCriterion) -> Self {
        Self {
            keys: vec![criterion],
        }
    }

    /// Append `other` as tie-breaker of `self`.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.keys.extend(other.keys);
        self
    }

    #[must_use]
    pub fn is_unsorted(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> &[SortCriterion] {
        &self.keys
    }
}

fn parse_sort_token(token: &str) -> Option<SortCriterion> {
    let (field, keyword) = token.rsplit_once(DIRECTION_SEPARATOR)?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let direction = SortDirection::parse(keyword.trim())?;
    Some(SortCriterion::new(field, direction))
}

/// Parse the raw sort parameter, e.g. `name:ASC|createdAt:DESC`.
///
/// Tokens with an unknown direction (or no direction at all) are dropped
/// instead of failing the request. Filters are strict; sorting is lenient.
#[must_use]
pub fn parse_sort(raw: Option<&str>) -> Vec<SortCriterion> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(CRITERIA_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let criterion = parse_sort_token(token);
            if criterion.is_none() {
                tracing::debug!(token, "Dropping sort criterion without a valid direction");
            }
            criterion
        })
        .collect()
}

/// Fold sort criteria into one ordering, preserving list order as precedence.
#[must_use]
pub fn build_ordering(criteria: &[SortCriterion]) -> Ordering {
    criteria
        .iter()
        .cloned()
        .map(Ordering::by)
        .fold(Ordering::unsorted(), Ordering::and)
}

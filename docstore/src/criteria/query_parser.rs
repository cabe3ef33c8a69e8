//! Parsing of the `q` filter parameter.
//!
//! A filter is a list of criteria separated by [`CRITERIA_DELIMITER`]. Each
//! criterion is a single `field<operator>value` token:
//!
//! ```text
//! name==report.pdf|version>=2|contentType@application/pdf,text/plain
//! ```
//!
//! The delimiter cannot be escaped, so a value can never contain `|`. A value
//! also cannot start with one of the operator characters, because the
//! operator is read as the longest run of those characters after the field.

use std::fmt;

use super::error::CriteriaError;

/// Separator between criteria in both the filter and the sort parameters.
pub const CRITERIA_DELIMITER: char = '|';

/// Separator between the members of an `In` / `NotIn` operand.
pub const LIST_DELIMITER: char = ',';

const OPERATOR_CHARS: [char; 6] = ['=', '!', '~', '<', '>', '@'];

/// Comparison operators accepted in a filter criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equality (`==`)
    Equal,
    /// Inequality (`!=`)
    NotEqual,
    /// Case-insensitive substring match (`~`)
    Like,
    /// Negated substring match (`!~`)
    NotLike,
    /// Strictly greater (`>`)
    GreaterThan,
    /// Greater or equal (`>=`)
    GreaterOrEqual,
    /// Strictly less (`<`)
    LessThan,
    /// Less or equal (`<=`)
    LessOrEqual,
    /// Membership in a comma separated list (`@`)
    In,
    /// Absence from a comma separated list (`!@`)
    NotIn,
}

impl FilterOperator {
    pub const ALL: [Self; 10] = [
        Self::Equal,
        Self::NotEqual,
        Self::Like,
        Self::NotLike,
        Self::GreaterThan,
        Self::GreaterOrEqual,
        Self::LessThan,
        Self::LessOrEqual,
        Self::In,
        Self::NotIn,
    ];

    /// Look up an operator by its token symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// The symbol used for this operator in a filter token.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Like => "~",
            Self::NotLike => "!~",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::In => "@",
            Self::NotIn => "!@",
        }
    }

    /// Whether the operand is a list rather than a single value.
    #[must_use]
    pub const fn takes_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One parsed filter instruction. The value is kept as raw text; converting
/// it to the field's type is up to the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterCriterion {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterCriterion {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Members of a list operand, trimmed, empty members removed.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        if self.operator.takes_list() {
            self.value
                .split(LIST_DELIMITER)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect()
        } else {
            vec![self.value.as_str()]
        }
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.operator, self.value)
    }
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn parse_criterion(token: &str) -> Result<FilterCriterion, CriteriaError> {
    let field_end = token.find(|c: char| !is_field_char(c)).unwrap_or(token.len());
    let (field, rest) = token.split_at(field_end);
    if field.is_empty() {
        return Err(CriteriaError::malformed(token));
    }

    let operator_end = rest
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(rest.len());
    let (symbol, value) = rest.split_at(operator_end);
    if symbol.is_empty() || value.is_empty() {
        return Err(CriteriaError::malformed(token));
    }

    let operator =
        FilterOperator::from_symbol(symbol).ok_or_else(|| CriteriaError::unsupported(symbol, token))?;

    Ok(FilterCriterion::new(field, operator, value))
}

/// Parse the raw filter parameter into criteria.
///
/// Missing or blank input means "no filter" and yields an empty list.
///
/// # Errors
///
/// `MalformedCriterion` for a token that is not `field<op>value`, and
/// `UnsupportedOperator` for an operator outside [`FilterOperator::ALL`].
pub fn parse_filter(raw: Option<&str>) -> Result<Vec<FilterCriterion>, CriteriaError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(CRITERIA_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_criterion)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_or_blank_filter_is_empty() {
        assert_eq!(parse_filter(None), Ok(vec![]));
        assert_eq!(parse_filter(Some("")), Ok(vec![]));
        assert_eq!(parse_filter(Some("   ")), Ok(vec![]));
    }

    #[test]
    fn test_single_equality() {
        let criteria = parse_filter(Some("name==foo")).unwrap();
        assert_eq!(
            criteria,
            vec![FilterCriterion::new("name", FilterOperator::Equal, "foo")]
        );
    }

    #[test]
    fn test_every_operator_symbol() {
        for operator in FilterOperator::ALL {
            let token = format!("version{}3", operator.symbol());
            let criteria = parse_filter(Some(&token)).unwrap();
            assert_eq!(criteria.len(), 1, "token {token}");
            assert_eq!(criteria[0].operator, operator, "token {token}");
            assert_eq!(criteria[0].value, "3");
        }
    }

    #[test]
    fn test_multiple_criteria_keep_order() {
        let criteria = parse_filter(Some("name~report| version>=2 |authorRef!=bob")).unwrap();
        let fields: Vec<_> = criteria.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, ["name", "version", "authorRef"]);
        assert_eq!(criteria[1].operator, FilterOperator::GreaterOrEqual);
    }

    #[test]
    fn test_trailing_delimiter_is_ignored() {
        let criteria = parse_filter(Some("name==foo|")).unwrap();
        assert_eq!(criteria.len(), 1);
    }

    #[test]
    fn test_value_may_contain_spaces_and_colons() {
        let criteria = parse_filter(Some("createdAt>=2024-01-01T10:00:00Z")).unwrap();
        assert_eq!(criteria[0].value, "2024-01-01T10:00:00Z");

        let criteria = parse_filter(Some("name==annual report")).unwrap();
        assert_eq!(criteria[0].value, "annual report");
    }

    #[test]
    fn test_list_operand() {
        let criteria = parse_filter(Some("contentType@application/pdf, text/plain,")).unwrap();
        assert_eq!(criteria[0].operator, FilterOperator::In);
        assert_eq!(criteria[0].values(), ["application/pdf", "text/plain"]);
    }

    #[test]
    fn test_single_operand_is_not_split() {
        let criterion = FilterCriterion::new("name", FilterOperator::Equal, "a,b");
        assert_eq!(criterion.values(), ["a,b"]);
    }

    #[test]
    fn test_missing_operator_is_malformed() {
        let err = parse_filter(Some("name")).unwrap_err();
        assert_eq!(
            err,
            CriteriaError::MalformedCriterion {
                token: "name".to_string()
            }
        );
    }

    #[test]
    fn test_missing_field_or_value_is_malformed() {
        assert!(matches!(
            parse_filter(Some("==foo")),
            Err(CriteriaError::MalformedCriterion { .. })
        ));
        assert!(matches!(
            parse_filter(Some("name==")),
            Err(CriteriaError::MalformedCriterion { .. })
        ));
        assert!(matches!(
            parse_filter(Some("na me==foo")),
            Err(CriteriaError::MalformedCriterion { .. })
        ));
    }

    #[test]
    fn test_malformed_token_is_reported_verbatim() {
        let err = parse_filter(Some("name==ok|bad token")).unwrap_err();
        assert_eq!(
            err,
            CriteriaError::MalformedCriterion {
                token: "bad token".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_operator() {
        let err = parse_filter(Some("name=foo")).unwrap_err();
        assert_eq!(
            err,
            CriteriaError::UnsupportedOperator {
                operator: "=".to_string(),
                token: "name=foo".to_string()
            }
        );

        assert!(matches!(
            parse_filter(Some("version<>3")),
            Err(CriteriaError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_display_then_parse_is_identity() {
        let originals = [
            FilterCriterion::new("name", FilterOperator::Like, "Report"),
            FilterCriterion::new("version", FilterOperator::LessThan, "10"),
            FilterCriterion::new("documentRef", FilterOperator::NotIn, "a,b,c"),
            FilterCriterion::new("author.ref", FilterOperator::NotEqual, "x y"),
        ];
        for original in originals {
            let reparsed = parse_filter(Some(&original.to_string())).unwrap();
            assert_eq!(reparsed, vec![original]);
        }
    }
}

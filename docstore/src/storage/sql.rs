use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ColumnType, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Value,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

use super::{FieldKind, StoreError};
use crate::criteria::{
    CriteriaError, FilterCriterion, FilterOperator, Ordering, PagingDescriptor, Predicate,
    PredicateBackend, RealizedPage, SortDirection,
};

const LIKE_ESCAPE: char = '\\';

/// Predicate backed by a sea-query `Condition`. `None` is the identity.
#[derive(Debug, Clone, Default)]
pub struct SqlPredicate {
    condition: Option<Condition>,
}

impl SqlPredicate {
    #[must_use]
    pub fn from_expr(expr: SimpleExpr) -> Self {
        Self {
            condition: Some(Condition::all().add(expr)),
        }
    }

    /// The condition to hand to `QueryFilter::filter`.
    #[must_use]
    pub fn into_condition(self) -> Condition {
        self.condition.unwrap_or_else(Condition::all)
    }
}

impl Predicate for SqlPredicate {
    fn identity() -> Self {
        Self { condition: None }
    }

    fn and(self, other: Self) -> Self {
        match (self.condition, other.condition) {
            (None, condition) | (condition, None) => Self { condition },
            (Some(left), Some(right)) => Self {
                condition: Some(Condition::all().add(left).add(right)),
            },
        }
    }

    fn is_identity(&self) -> bool {
        self.condition.is_none()
    }
}

/// Kind of a column, read from its Sea-ORM definition.
fn column_kind<C: ColumnTrait>(column: &C) -> FieldKind {
    match column.def().get_column_type() {
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => FieldKind::Text,
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned
        | ColumnType::BigUnsigned => FieldKind::Integer,
        ColumnType::DateTime | ColumnType::Timestamp | ColumnType::TimestampWithTimeZone => {
            FieldKind::Timestamp
        }
        _ => FieldKind::Opaque,
    }
}

fn convert_value(kind: FieldKind, field: &str, raw: &str) -> Result<Value, StoreError> {
    match kind {
        FieldKind::Text => Ok(Value::from(raw.to_string())),
        FieldKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| StoreError::invalid_value(field, raw)),
        FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw.trim())
            .map(|ts| Value::from(ts.with_timezone(&Utc)))
            .map_err(|_| StoreError::invalid_value(field, raw)),
        FieldKind::Opaque => Err(StoreError::invalid_value(field, raw)),
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Translates criteria on API field names into conditions on an entity.
///
/// Field names map to columns through the same `(name, column)` tables the
/// resource declares as filterable; anything else is an unknown field.
#[derive(Debug, Clone)]
pub struct SqlBackend<E: EntityTrait> {
    columns: Vec<(&'static str, E::Column)>,
}

impl<E: EntityTrait> SqlBackend<E> {
    #[must_use]
    pub const fn new(columns: Vec<(&'static str, E::Column)>) -> Self {
        Self { columns }
    }

    fn resolve(&self, field: &str) -> Result<(E::Column, FieldKind), StoreError> {
        self.columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| (*column, column_kind(column)))
            .ok_or_else(|| StoreError::UnknownField(field.to_string()))
    }

    fn atom(&self, criterion: &FilterCriterion) -> Result<SimpleExpr, StoreError> {
        let (column, kind) = self.resolve(&criterion.field)?;
        let field = criterion.field.as_str();

        if kind == FieldKind::Opaque {
            return Err(CriteriaError::unsupported(
                criterion.operator.symbol(),
                &criterion.to_string(),
            )
            .into());
        }

        match criterion.operator {
            FilterOperator::Like | FilterOperator::NotLike => {
                if kind != FieldKind::Text {
                    return Err(CriteriaError::unsupported(
                        criterion.operator.symbol(),
                        &criterion.to_string(),
                    )
                    .into());
                }
                // SQLite's UPPER folds ASCII only; match it so both backends agree
                let pattern = format!("%{}%", escape_like(&criterion.value).to_ascii_uppercase());
                let pattern = LikeExpr::new(pattern).escape(LIKE_ESCAPE);
                let upper = Expr::expr(Func::upper(Expr::col(column)));
                Ok(if criterion.operator == FilterOperator::Like {
                    upper.like(pattern)
                } else {
                    upper.not_like(pattern)
                })
            }
            FilterOperator::In | FilterOperator::NotIn => {
                let values = criterion
                    .values()
                    .into_iter()
                    .map(|raw| convert_value(kind, field, raw))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if criterion.operator == FilterOperator::In {
                    Expr::col(column).is_in(values)
                } else {
                    Expr::col(column).is_not_in(values)
                })
            }
            operator => {
                let value = convert_value(kind, field, &criterion.value)?;
                let column = Expr::col(column);
                Ok(match operator {
                    FilterOperator::NotEqual => column.ne(value),
                    FilterOperator::GreaterThan => column.gt(value),
                    FilterOperator::GreaterOrEqual => column.gte(value),
                    FilterOperator::LessThan => column.lt(value),
                    FilterOperator::LessOrEqual => column.lte(value),
                    _ => column.eq(value),
                })
            }
        }
    }

    /// Apply the ordering keys in precedence order.
    ///
    /// # Errors
    ///
    /// `UnknownField` when a key does not name a column of the entity.
    pub fn apply_ordering(&self, mut query: Select<E>, ordering: &Ordering) -> Result<Select<E>, StoreError> {
        for key in ordering.keys() {
            let (column, _) = self.resolve(&key.field)?;
            let order = match key.direction {
                SortDirection::Ascending => Order::Asc,
                SortDirection::Descending => Order::Desc,
            };
            query = query.order_by(column, order);
        }
        Ok(query)
    }

    /// Run `predicate` with `paging` against the entity's table.
    ///
    /// # Errors
    ///
    /// `UnknownField` for an unknown sort field, `Database` for query failures.
    pub async fn fetch_page(
        &self,
        db: &DatabaseConnection,
        predicate: SqlPredicate,
        paging: &PagingDescriptor,
    ) -> Result<RealizedPage<E::Model>, StoreError>
    where
        E::Model: Sync,
    {
        let query = E::find().filter(predicate.into_condition());
        let query = self.apply_ordering(query, &paging.ordering())?;

        match paging {
            PagingDescriptor::Paged(page) => {
                let total = query.clone().count(db).await?;
                let content = query
                    .offset(page.offset())
                    .limit(page.size())
                    .all(db)
                    .await?;
                Ok(RealizedPage::new(content, paging, total))
            }
            PagingDescriptor::Unpaged | PagingDescriptor::UnpagedSorted(_) => {
                let content = query.all(db).await?;
                let total = content.len() as u64;
                Ok(RealizedPage::new(content, paging, total))
            }
        }
    }
}

impl<E: EntityTrait> PredicateBackend for SqlBackend<E> {
    type Predicate = SqlPredicate;
    type Error = StoreError;

    fn criterion(&self, criterion: &FilterCriterion) -> Result<SqlPredicate, StoreError> {
        self.atom(criterion).map(SqlPredicate::from_expr)
    }

    fn one_of(&self, field: &str, values: &[String]) -> Result<SqlPredicate, StoreError> {
        let (column, kind) = self.resolve(field)?;
        let values = values
            .iter()
            .map(|raw| convert_value(kind, field, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SqlPredicate::from_expr(Expr::col(column).is_in(values)))
    }
}

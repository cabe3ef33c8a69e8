//! In-memory backend.
//!
//! Predicates are plain clause lists evaluated against records that expose
//! their fields through [`FieldSource`]. Useful for tests and for reasoning
//! about the grammar without a database.

use std::cmp::Ordering as CmpOrdering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{FieldKind, ListingStore, StoreError};
use crate::criteria::{
    CriteriaError, FilterCriterion, FilterOperator, Ordering, PagingDescriptor, Predicate,
    PredicateBackend, RealizedPage, SortDirection,
};

/// A typed field value read from a record.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    fn parse(kind: FieldKind, field: &str, raw: &str) -> Result<Self, StoreError> {
        match kind {
            FieldKind::Text => Ok(Self::Text(raw.to_string())),
            FieldKind::Integer => raw
                .trim()
                .parse()
                .map(Self::Integer)
                .map_err(|_| StoreError::invalid_value(field, raw)),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw.trim())
                .map(|ts| Self::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|_| StoreError::invalid_value(field, raw)),
            FieldKind::Opaque => Err(StoreError::invalid_value(field, raw)),
        }
    }
}

/// Records readable by the in-memory backend.
pub trait FieldSource {
    /// Filterable and sortable fields with their kinds.
    fn fields() -> Vec<(&'static str, FieldKind)>;

    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    field: String,
    operator: FilterOperator,
    operands: Vec<FieldValue>,
}

impl Clause {
    fn matches<T: FieldSource>(&self, record: &T) -> bool {
        let Some(actual) = record.field_value(&self.field) else {
            return false;
        };
        let Some(first) = self.operands.first() else {
            // Empty set: nothing is in it, everything is outside it
            return self.operator == FilterOperator::NotIn;
        };

        match self.operator {
            FilterOperator::Equal => actual == *first,
            FilterOperator::NotEqual => actual != *first,
            FilterOperator::Like => contains_ignore_case(&actual, first),
            FilterOperator::NotLike => !contains_ignore_case(&actual, first),
            FilterOperator::GreaterThan => actual.partial_cmp(first) == Some(CmpOrdering::Greater),
            FilterOperator::GreaterOrEqual => matches!(
                actual.partial_cmp(first),
                Some(CmpOrdering::Greater | CmpOrdering::Equal)
            ),
            FilterOperator::LessThan => actual.partial_cmp(first) == Some(CmpOrdering::Less),
            FilterOperator::LessOrEqual => matches!(
                actual.partial_cmp(first),
                Some(CmpOrdering::Less | CmpOrdering::Equal)
            ),
            FilterOperator::In => self.operands.contains(&actual),
            FilterOperator::NotIn => !self.operands.contains(&actual),
        }
    }
}

fn contains_ignore_case(actual: &FieldValue, pattern: &FieldValue) -> bool {
    match (actual, pattern) {
        (FieldValue::Text(actual), FieldValue::Text(pattern)) => actual
            .to_ascii_uppercase()
            .contains(&pattern.to_ascii_uppercase()),
        _ => false,
    }
}

/// Conjunction of clauses. The empty conjunction matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPredicate {
    clauses: Vec<Clause>,
}

impl MemoryPredicate {
    pub fn matches<T: FieldSource>(&self, record: &T) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

impl Predicate for MemoryPredicate {
    fn identity() -> Self {
        Self::default()
    }

    fn and(mut self, other: Self) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    fn is_identity(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MemoryBackend {
    fields: Vec<(&'static str, FieldKind)>,
}

impl MemoryBackend {
    #[must_use]
    pub const fn new(fields: Vec<(&'static str, FieldKind)>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn for_source<T: FieldSource>() -> Self {
        Self::new(T::fields())
    }

    fn kind(&self, field: &str) -> Result<FieldKind, StoreError> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| StoreError::UnknownField(field.to_string()))
    }

    fn clause(
        &self,
        field: &str,
        operator: FilterOperator,
        raw_values: &[&str],
    ) -> Result<MemoryPredicate, StoreError> {
        let kind = self.kind(field)?;
        let operands = raw_values
            .iter()
            .map(|raw| FieldValue::parse(kind, field, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MemoryPredicate {
            clauses: vec![Clause {
                field: field.to_string(),
                operator,
                operands,
            }],
        })
    }

    /// Sort `records` by `ordering`, keeping insertion order for ties.
    ///
    /// # Errors
    ///
    /// `UnknownField` when a key does not name a known field.
    pub fn sort<T: FieldSource>(&self, records: &mut [T], ordering: &Ordering) -> Result<(), StoreError> {
        for key in ordering.keys() {
            self.kind(&key.field)?;
        }

        records.sort_by(|left, right| {
            for key in ordering.keys() {
                let left = left.field_value(&key.field);
                let right = right.field_value(&key.field);
                let ord = left.partial_cmp(&right).unwrap_or(CmpOrdering::Equal);
                let ord = match key.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                };
                if ord != CmpOrdering::Equal {
                    return ord;
                }
            }
            CmpOrdering::Equal
        });
        Ok(())
    }
}

impl PredicateBackend for MemoryBackend {
    type Predicate = MemoryPredicate;
    type Error = StoreError;

    fn criterion(&self, criterion: &FilterCriterion) -> Result<MemoryPredicate, StoreError> {
        let like = matches!(criterion.operator, FilterOperator::Like | FilterOperator::NotLike);
        if like && self.kind(&criterion.field)? != FieldKind::Text {
            return Err(CriteriaError::unsupported(
                criterion.operator.symbol(),
                &criterion.to_string(),
            )
            .into());
        }
        self.clause(&criterion.field, criterion.operator, &criterion.values())
    }

    fn one_of(&self, field: &str, values: &[String]) -> Result<MemoryPredicate, StoreError> {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        self.clause(field, FilterOperator::In, &values)
    }
}

/// A fixed collection of records behind the [`ListingStore`] interface.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    records: Vec<T>,
    backend: MemoryBackend,
}

impl<T: FieldSource> MemoryStore<T> {
    #[must_use]
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            backend: MemoryBackend::for_source::<T>(),
        }
    }
}

#[async_trait]
impl<T> ListingStore for MemoryStore<T>
where
    T: FieldSource + Clone + Send + Sync,
{
    type Record = T;
    type Backend = MemoryBackend;

    fn predicate_backend(&self) -> &MemoryBackend {
        &self.backend
    }

    async fn find_page(
        &self,
        predicate: MemoryPredicate,
        paging: &PagingDescriptor,
    ) -> Result<RealizedPage<T>, StoreError> {
        let mut matching: Vec<T> = self
            .records
            .iter()
            .filter(|record| predicate.matches(*record))
            .cloned()
            .collect();
        self.backend.sort(&mut matching, &paging.ordering())?;

        let total = matching.len() as u64;
        let content = match paging {
            PagingDescriptor::Paged(page) => matching
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                .take(usize::try_from(page.size()).unwrap_or(usize::MAX))
                .collect(),
            PagingDescriptor::Unpaged | PagingDescriptor::UnpagedSorted(_) => matching,
        };
        Ok(RealizedPage::new(content, paging, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{and, build_predicate, parse_filter, resolve_paging};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        name: &'static str,
        size: i64,
        at: &'static str,
    }

    impl FieldSource for Row {
        fn fields() -> Vec<(&'static str, FieldKind)> {
            vec![
                ("id", FieldKind::Text),
                ("name", FieldKind::Text),
                ("size", FieldKind::Integer),
                ("at", FieldKind::Timestamp),
            ]
        }

        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(FieldValue::Text(self.id.to_string())),
                "name" => Some(FieldValue::Text(self.name.to_string())),
                "size" => Some(FieldValue::Integer(self.size)),
                "at" => DateTime::parse_from_rfc3339(self.at)
                    .ok()
                    .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc))),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: "a", name: "foo", size: 10, at: "2024-01-01T00:00:00Z" },
            Row { id: "b", name: "Foo Bar", size: 20, at: "2024-02-01T00:00:00Z" },
            Row { id: "c", name: "foo", size: 30, at: "2024-03-01T00:00:00Z" },
            Row { id: "d", name: "foo", size: 40, at: "2024-04-01T00:00:00Z" },
            Row { id: "e", name: "baz", size: 50, at: "2024-05-01T00:00:00Z" },
        ]
    }

    fn ids(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.id).collect()
    }

    fn predicate(filter: &str) -> Result<MemoryPredicate, StoreError> {
        build_predicate(&MemoryBackend::for_source::<Row>(), &parse_filter(Some(filter))?)
    }

    fn select(filter: &str) -> Vec<&'static str> {
        let p = predicate(filter).unwrap();
        rows().into_iter().filter(|r| p.matches(r)).map(|r| r.id).collect()
    }

    #[test]
    fn test_identity_matches_everything() {
        assert_eq!(select("").len(), 5);
    }

    #[test]
    fn test_identity_law() {
        let p = predicate("name==foo|size>10").unwrap();
        assert_eq!(and(MemoryPredicate::identity(), p.clone()), p);
        assert_eq!(and(p.clone(), MemoryPredicate::identity()), p);
    }

    #[test]
    fn test_operators() {
        assert_eq!(select("name==foo"), ["a", "c", "d"]);
        assert_eq!(select("name!=foo"), ["b", "e"]);
        assert_eq!(select("name~FOO"), ["a", "b", "c", "d"]);
        assert_eq!(select("name!~bar"), ["a", "c", "d", "e"]);
        assert_eq!(select("size>30"), ["d", "e"]);
        assert_eq!(select("size>=30"), ["c", "d", "e"]);
        assert_eq!(select("size<20"), ["a"]);
        assert_eq!(select("size<=20"), ["a", "b"]);
        assert_eq!(select("id@a,e"), ["a", "e"]);
        assert_eq!(select("id!@a,e"), ["b", "c", "d"]);
        assert_eq!(select("at>=2024-03-01T00:00:00Z"), ["c", "d", "e"]);
    }

    #[test]
    fn test_like_folds_ascii_only() {
        let row = Row { id: "f", name: "Café menu", size: 1, at: "2024-06-01T00:00:00Z" };
        assert!(predicate("name~CAFé").unwrap().matches(&row));
        assert!(predicate("name~café MENU").unwrap().matches(&row));
        assert!(!predicate("name~CAFÉ").unwrap().matches(&row));
    }

    #[test]
    fn test_conjunction() {
        assert_eq!(select("name==foo|size>=20|size<40"), ["c"]);
    }

    #[test]
    fn test_field_errors() {
        assert!(matches!(predicate("colour==red"), Err(StoreError::UnknownField(_))));
        assert!(matches!(predicate("size>big"), Err(StoreError::InvalidValue { .. })));
        assert!(matches!(
            predicate("size~1"),
            Err(StoreError::Criteria(CriteriaError::UnsupportedOperator { .. }))
        ));
    }

    #[tokio::test]
    async fn test_restricted_listing() {
        let store = MemoryStore::new(rows());
        let backend = store.predicate_backend();
        let refs = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let restriction = backend.one_of("id", &refs).unwrap();
        let filter = build_predicate(backend, &parse_filter(Some("name==foo")).unwrap()).unwrap();

        let page = store
            .find_page(and(restriction, filter), &PagingDescriptor::Unpaged)
            .await
            .unwrap();
        assert_eq!(ids(&page.content), ["a", "c"]);
        assert_eq!(page.total_elements, 2);
    }

    #[tokio::test]
    async fn test_paged_and_sorted() {
        let store = MemoryStore::new(rows());
        let paging = resolve_paging(Some(1), Some(2), Some("name:ASC|size:DESC")).unwrap();
        let page = store.find_page(MemoryPredicate::identity(), &paging).await.unwrap();

        // Sorted: b(Foo Bar) e(baz) d c a  -- uppercase sorts first
        assert_eq!(ids(&page.content), ["d", "c"]);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_elements, 5);
    }

    #[tokio::test]
    async fn test_unknown_sort_field_fails() {
        let store = MemoryStore::new(rows());
        let paging = resolve_paging(None, None, Some("colour:ASC")).unwrap();
        let result = store.find_page(MemoryPredicate::identity(), &paging).await;
        assert!(matches!(result, Err(StoreError::UnknownField(_))));
    }
}

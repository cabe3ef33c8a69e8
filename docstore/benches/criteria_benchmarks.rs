/*!
# Criteria Benchmarks

Parsing, predicate building and paged listing over an in-memory SQLite
database.

## Usage

```bash
cargo bench --bench criteria_benchmarks

# Only the parser group
cargo bench --bench criteria_benchmarks -- "Criteria Parsing"
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use docstore::criteria::{build_predicate, parse_filter, parse_sort, resolve_paging};
use docstore::documents::{DocumentUpdate, Documents, filterable_columns};
use docstore::listing::{ListQuery, Restriction, list_page};
use docstore::migration::Migrator;
use docstore::storage::sql::SqlBackend;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::runtime::Runtime;

const FILTERS: [&str; 4] = [
    "name==doc-7.pdf",
    "name~DOC|version>=2",
    "contentType@application/pdf,text/plain|authorRef!=anonymous",
    "version>1|version<=4|name!~txt|createdAt>=2000-01-01T00:00:00Z",
];

async fn setup_benchmark_store(size: usize) -> Result<(Documents, Vec<String>), Box<dyn std::error::Error>> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    let documents = Documents::new(db);

    let mut refs = Vec::with_capacity(size);
    for i in 0..size {
        let (name, content_type) = if i % 2 == 0 {
            (format!("doc-{i}.pdf"), "application/pdf")
        } else {
            (format!("doc-{i}.txt"), "text/plain")
        };
        let created = documents.create(&name, content_type, vec![0; 64]).await?;
        let changes = DocumentUpdate {
            version: Some(i32::try_from(i % 5).unwrap_or(0) + 1),
            author_ref: Some(format!("author-{}", i % 3)),
            ..DocumentUpdate::default()
        };
        documents.update(&created.document_ref, changes).await?;
        refs.push(created.document_ref);
    }
    Ok((documents, refs))
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Criteria Parsing");
    let backend = SqlBackend::new(filterable_columns());

    for filter in FILTERS {
        group.bench_with_input(BenchmarkId::new("parse_filter", filter), &filter, |b, filter| {
            b.iter(|| parse_filter(std::hint::black_box(Some(filter))));
        });
        group.bench_with_input(BenchmarkId::new("build_predicate", filter), &filter, |b, filter| {
            b.iter(|| {
                let criteria = parse_filter(Some(filter)).unwrap_or_default();
                build_predicate(&backend, std::hint::black_box(&criteria))
            });
        });
    }

    let sort = "createdAt:DESC|name:ASC|version:desc|bogus";
    group.bench_function("parse_sort", |b| {
        b.iter(|| parse_sort(std::hint::black_box(Some(sort))));
    });
    group.bench_function("resolve_paging", |b| {
        b.iter(|| resolve_paging(Some(3), Some(25), std::hint::black_box(Some(sort))));
    });

    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    for size in [100, 500] {
        let (documents, refs) = rt.block_on(setup_benchmark_store(size)).unwrap();
        let mut group = c.benchmark_group(format!("Listing SQLite ({size} records)"));
        group.measurement_time(Duration::from_secs(8));

        for filter in FILTERS {
            let query = ListQuery {
                q: Some(filter.to_string()),
                s: Some("name:ASC".to_string()),
                page: Some(1),
                size: Some(20),
            };
            group.bench_with_input(BenchmarkId::new("filtered_page", filter), &query, |b, query| {
                b.iter(|| rt.block_on(list_page(&documents, std::hint::black_box(query), None)));
            });
        }

        let restriction = Restriction::refs(refs.iter().step_by(3).cloned().collect());
        let query = ListQuery {
            q: Some("contentType==application/pdf".to_string()),
            ..ListQuery::default()
        };
        group.bench_function("restricted_unpaged", |b| {
            b.iter(|| rt.block_on(list_page(&documents, &query, Some(std::hint::black_box(&restriction)))));
        });

        group.finish();
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_parsing, bench_listing
}
criterion_main!(benches);

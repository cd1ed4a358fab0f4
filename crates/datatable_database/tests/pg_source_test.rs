//! Record source tests against a live PostgreSQL at `DATABASE_URL`.
//!
//! Run with `cargo test -p datatable_database --features database`.

use datatable_core::{OrderTerm, Predicate, QueryDescriptor, SortDirection};
use datatable_database::{PgRecordSource, SqlRenderer, create_pool};
use datatable_interface::RecordSource;
use diesel::prelude::*;

const SETUP: &str = "
    CREATE TABLE IF NOT EXISTS dt_articles (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        views INTEGER NOT NULL
    )";

fn source() -> PgRecordSource {
    let pool = create_pool().expect("DATABASE_URL must point at a test database");
    let mut conn = pool.get().unwrap();
    diesel::sql_query(SETUP).execute(&mut conn).unwrap();
    diesel::sql_query("TRUNCATE dt_articles").execute(&mut conn).unwrap();
    diesel::sql_query(
        "INSERT INTO dt_articles (title, views) VALUES ('Rust 100%', 10), ('Gardening', 3), ('rusty nails', 7)",
    )
    .execute(&mut conn)
    .unwrap();
    drop(conn);
    PgRecordSource::new(pool, SqlRenderer::new("dt_articles", "Article").unwrap())
}

#[tokio::test]
#[cfg_attr(not(feature = "database"), ignore)]
async fn test_count_and_fetch_page() {
    let source = source();
    let mut query = QueryDescriptor::scoped(
        vec!["Article.title".into(), "Article.views".into()],
        Some(Predicate::contains("Article.title", "RUST")),
    );
    assert_eq!(source.count(&query).await.unwrap(), 2);

    query.order.push(OrderTerm::new("Article.views".into(), SortDirection::Desc));
    query.limit = Some(1);
    query.offset = Some(1);
    let rows = source.fetch(&query).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Article.title"], "rusty nails");

    // LIKE wildcards in the term match literally.
    let percent = QueryDescriptor::scoped(vec![], Some(Predicate::contains("Article.title", "%")));
    assert_eq!(source.count(&percent).await.unwrap(), 1);
}

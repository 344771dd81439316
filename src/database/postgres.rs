use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::store::{Condition, DocumentStore, Filter, Projection, StoreError};
use crate::resources::Collection;
use crate::validation::Document;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS documents (
        id          TEXT PRIMARY KEY,
        collection  TEXT NOT NULL,
        unique_key  TEXT,
        body        JSONB NOT NULL
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS documents_collection_unique_key ON documents (collection, unique_key)",
    "CREATE INDEX IF NOT EXISTS documents_collection_school ON documents (collection, (body ->> 'school_id'))",
];

/// Documents stored as JSONB rows in a single table, one logical collection per
/// `collection` value
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32, timeout_secs: u64) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .connect(url)
            .await?;
        info!("Created database pool (max_connections={})", max_connections);

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the documents table and its indexes if missing
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Document schema ready");
        Ok(())
    }
}

/// Append `AND <condition>` for every condition in the filter
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for condition in filter.conditions() {
        qb.push(" AND ");
        match condition {
            Condition::Eq(field, value) => {
                qb.push("body -> ")
                    .push_bind(field.clone())
                    .push("::text = ")
                    .push_bind(Json(value.clone()))
                    .push("::jsonb");
            }
            Condition::EqIgnoreCase(field, value) => {
                qb.push("lower(body ->> ")
                    .push_bind(field.clone())
                    .push("::text) = lower(")
                    .push_bind(value.clone())
                    .push("::text)");
            }
            Condition::Ne(field, value) => {
                qb.push("body -> ")
                    .push_bind(field.clone())
                    .push("::text IS DISTINCT FROM ")
                    .push_bind(Json(value.clone()))
                    .push("::jsonb");
            }
        }
    }
}

/// `WHERE id = (first matching id)` so single-row mutations touch one document
fn push_first_match(qb: &mut QueryBuilder<'_, Postgres>, collection: Collection, filter: &Filter) {
    qb.push(" WHERE id = (SELECT id FROM documents WHERE collection = ")
        .push_bind(collection.name());
    push_conditions(qb, filter);
    qb.push(" ORDER BY id LIMIT 1)");
}

fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Malformed(format!("expected object, found {}", other))),
    }
}

fn translate(collection: Collection, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(collection),
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(
        &self,
        collection: Collection,
        doc: Document,
        unique_key: Option<String>,
    ) -> Result<Document, StoreError> {
        let id = doc
            .get("_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Malformed("document without _id".to_string()))?;

        let Json(body): Json<Value> = sqlx::query_scalar(
            "INSERT INTO documents (id, collection, unique_key, body) VALUES ($1, $2, $3, $4) RETURNING body",
        )
        .bind(&id)
        .bind(collection.name())
        .bind(unique_key)
        .bind(Json(Value::Object(doc)))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(collection, e))?;

        into_document(body)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb = QueryBuilder::new("SELECT body - ");
        qb.push_bind(projection.excluded())
            .push("::text[] FROM documents WHERE collection = ")
            .push_bind(collection.name());
        push_conditions(&mut qb, filter);
        qb.push(" ORDER BY id");

        let rows: Vec<Json<Value>> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        rows.into_iter().map(|Json(v)| into_document(v)).collect()
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb = QueryBuilder::new("SELECT body - ");
        qb.push_bind(projection.excluded())
            .push("::text[] FROM documents WHERE collection = ")
            .push_bind(collection.name());
        push_conditions(&mut qb, filter);
        qb.push(" ORDER BY id LIMIT 1");

        let row: Option<Json<Value>> = qb.build_query_scalar().fetch_optional(&self.pool).await?;
        row.map(|Json(v)| into_document(v)).transpose()
    }

    async fn find_one_and_replace(
        &self,
        collection: Collection,
        filter: &Filter,
        doc: Document,
        unique_key: Option<String>,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb = QueryBuilder::new("UPDATE documents SET body = ");
        qb.push_bind(Json(Value::Object(doc)))
            .push("::jsonb || jsonb_build_object('_id', id, 'createdAt', body -> 'createdAt'), unique_key = ")
            .push_bind(unique_key);
        push_first_match(&mut qb, collection, filter);
        qb.push(" RETURNING body");

        let row: Option<Json<Value>> = qb
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| translate(collection, e))?;
        row.map(|Json(v)| into_document(v)).transpose()
    }

    async fn find_one_and_delete(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb = QueryBuilder::new("DELETE FROM documents");
        push_first_match(&mut qb, collection, filter);
        qb.push(" RETURNING body");

        let row: Option<Json<Value>> = qb.build_query_scalar().fetch_optional(&self.pool).await?;
        row.map(|Json(v)| into_document(v)).transpose()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_bind_every_value() {
        let filter = Filter::by_id("abc")
            .tenant(Some("s1"))
            .eq_ignore_case("name", "Group 001")
            .ne("_id", "def");
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind("groups");
        push_conditions(&mut qb, &filter);
        let sql = qb.sql();
        assert_eq!(sql.matches('$').count(), 9);
        assert!(sql.contains("lower(body ->> $6::text) = lower($7::text)"), "{}", sql);
        assert!(sql.contains("IS DISTINCT FROM $9::jsonb"), "{}", sql);
        assert!(!sql.contains("Group 001"));
    }

    #[test]
    fn mutations_target_a_single_row() {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM documents");
        push_first_match(&mut qb, Collection::Breaks, &Filter::by_id("abc"));
        let sql = qb.sql();
        assert!(sql.starts_with("DELETE FROM documents WHERE id = (SELECT id FROM documents WHERE collection = $1"));
        assert!(sql.ends_with("ORDER BY id LIMIT 1)"));
    }

    #[test]
    fn non_object_rows_are_malformed() {
        assert!(into_document(serde_json::json!([1, 2])).is_err());
        assert!(into_document(serde_json::json!({ "_id": "a" })).is_ok());
    }
}

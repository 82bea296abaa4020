//! Read queries over the `services` catalog.

use medfind_core::ServiceRecord;
use sqlx::PgPool;

/// A row from the `services` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ServiceRow {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl From<ServiceRow> for ServiceRecord {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
        }
    }
}

/// Every catalog entry, ordered by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_services(pool: &PgPool) -> Result<Vec<ServiceRow>, sqlx::Error> {
    sqlx::query_as::<_, ServiceRow>(
        "SELECT s.id, s.name, s.category, s.description \
         FROM services s \
         ORDER BY s.id",
    )
    .fetch_all(pool)
    .await
}

/// One catalog entry by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_service(
    pool: &PgPool,
    service_id: i64,
) -> Result<Option<ServiceRow>, sqlx::Error> {
    sqlx::query_as::<_, ServiceRow>(
        "SELECT s.id, s.name, s.category, s.description \
         FROM services s \
         WHERE s.id = $1",
    )
    .bind(service_id)
    .fetch_optional(pool)
    .await
}

/// Catalog entries whose name contains `keyword`, ignoring case.
///
/// Matching uses `STRPOS`, so `%` and `_` in the keyword are literal.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn search_services(
    pool: &PgPool,
    keyword: &str,
) -> Result<Vec<ServiceRow>, sqlx::Error> {
    sqlx::query_as::<_, ServiceRow>(
        "SELECT s.id, s.name, s.category, s.description \
         FROM services s \
         WHERE STRPOS(LOWER(s.name), LOWER(TRIM($1))) > 0 \
         ORDER BY s.id",
    )
    .bind(keyword)
    .fetch_all(pool)
    .await
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use crate::entities::NormalizedMovieRecord;

pub const DEFAULT_ROLE: &str = "Unknown";
pub const DEFAULT_SUMMARY: &str = "Description not available";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// A processed record as the dashboard table stores it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StoredMovie {
    pub imdb_rank: i32,
    pub title: String,
    pub year: Option<i32>,
    pub imdb_rating: Option<f64>,
    pub runtime: Option<String>,
    pub genres: Vec<String>,
    pub imdb_url: Option<String>,
    pub role: String,
    pub summary: String,
    pub extracted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredMovie {
    pub fn from_record(record: &NormalizedMovieRecord, loaded_at: DateTime<Utc>) -> Self {
        Self {
            imdb_rank: i32::try_from(record.rank).unwrap_or(i32::MAX),
            title: record.title.clone(),
            year: record.release_year,
            imdb_rating: record.imdb_rating,
            runtime: record.runtime.clone(),
            genres: record.genres.clone(),
            imdb_url: record.imdb_url.clone(),
            role: DEFAULT_ROLE.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
            extracted_at: loaded_at,
            updated_at: loaded_at,
        }
    }
}

/// Table holding the dashboard's movies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn select_all(&self) -> Result<Vec<StoredMovie>, StoreError>;

    async fn insert(&self, rows: &[StoredMovie]) -> Result<u64, StoreError>;

    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Deletes every row then inserts `rows`, atomically where the store allows.
    async fn replace_all(&self, rows: &[StoredMovie]) -> Result<u64, StoreError>;
}

const COLUMNS: &str = "imdb_rank, title, year, imdb_rating, runtime, genres, imdb_url, role, summary, extracted_at, updated_at";

/// `MovieStore` over a Postgres table. The table name must be a plain
/// identifier; `Config` checks this.
#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
    table: String,
}

impl PgMovieStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            self.table
        )
    }

    async fn insert_one<'e, E>(&self, executor: E, row: &StoredMovie) -> Result<(), StoreError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(&self.insert_sql())
            .bind(row.imdb_rank)
            .bind(&row.title)
            .bind(row.year)
            .bind(row.imdb_rating)
            .bind(&row.runtime)
            .bind(&row.genres)
            .bind(&row.imdb_url)
            .bind(&row.role)
            .bind(&row.summary)
            .bind(row.extracted_at)
            .bind(row.updated_at)
            .execute(executor)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn select_all(&self) -> Result<Vec<StoredMovie>, StoreError> {
        let rows = sqlx::query_as::<_, StoredMovie>(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY imdb_rank",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert(&self, rows: &[StoredMovie]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            self.insert_one(&mut *tx, row).await?;
        }
        tx.commit().await?;
        Ok(rows.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn replace_all(&self, rows: &[StoredMovie]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&mut *tx)
            .await?;
        for row in rows {
            self.insert_one(&mut *tx, row).await?;
        }
        tx.commit().await?;
        Ok(rows.len() as u64)
    }
}

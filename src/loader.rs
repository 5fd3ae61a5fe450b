use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::entities::NormalizedMovieRecord;
use crate::repositories::{MovieStore, StoreError, StoredMovie};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: u64,
    /// Rows counted in the table after the load.
    pub verified: usize,
}

/// Replaces the whole table with `records`, stamping both ingestion
/// timestamps with `loaded_at`.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn load_movies(
    store: &dyn MovieStore,
    records: &[NormalizedMovieRecord],
    loaded_at: DateTime<Utc>,
) -> Result<LoadReport, StoreError> {
    let rows: Vec<StoredMovie> = records
        .iter()
        .map(|record| StoredMovie::from_record(record, loaded_at))
        .collect();

    let inserted = store.replace_all(&rows).await?;
    info!(inserted, "table replaced");

    let verified = store.select_all().await?.len();
    info!(verified, "rows in table after load");

    Ok(LoadReport { inserted, verified })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::movie::MockMovieStore;

    fn records() -> Vec<NormalizedMovieRecord> {
        (1..=2)
            .map(|rank| NormalizedMovieRecord {
                rank,
                title: format!("Movie {rank}"),
                release_year: None,
                imdb_rating: Some(6.5),
                runtime: None,
                genres: vec![],
                imdb_url: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_load_replaces_and_verifies() {
        let loaded_at = Utc::now();
        let mut store = MockMovieStore::new();
        store
            .expect_replace_all()
            .withf(move |rows| {
                rows.len() == 2
                    && rows[0].imdb_rank == 1
                    && rows.iter().all(|r| r.extracted_at == loaded_at && r.updated_at == loaded_at)
            })
            .times(1)
            .returning(|rows| Ok(rows.len() as u64));
        store
            .expect_select_all()
            .times(1)
            .returning(move || {
                Ok(records()
                    .iter()
                    .map(|r| StoredMovie::from_record(r, loaded_at))
                    .collect())
            });

        let report = load_movies(&store, &records(), loaded_at).await.unwrap();
        assert_eq!(report, LoadReport { inserted: 2, verified: 2 });
    }

    #[tokio::test]
    async fn test_load_propagates_store_failure() {
        let mut store = MockMovieStore::new();
        store
            .expect_replace_all()
            .returning(|_| Err(StoreError::Database(sqlx::Error::PoolTimedOut)));
        store.expect_select_all().never();

        let err = load_movies(&store, &records(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}

use chrono::{DateTime, Utc};
use natalis_core::{AppError, BirthRecord, NewBirthRecord};
use sqlx::SqlitePool;

use super::transaction::TransactionGuard;

const RECORD_COLUMNS: &str = "id, father_id_type, father_id, mother_id_type, mother_id, \
     mother_name, hospital_name, birth_date, created_at";

/// Repository for birth registrations
#[derive(Clone)]
pub struct BirthRecordRepository {
    pool: SqlitePool,
}

impl BirthRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a record unless its parent pair is already registered.
    ///
    /// The conflict check and the insert run as one statement inside one transaction,
    /// backed by the unique index on `(father_id, mother_id)`. On conflict the hospital
    /// of the existing registration is returned in `AppError::Duplicate`.
    #[tracing::instrument(
        skip(self, record),
        fields(db.table = "birth_records", db.operation = "insert")
    )]
    pub async fn insert(&self, record: &NewBirthRecord) -> Result<BirthRecord, AppError> {
        let created_at_us = Utc::now().timestamp_micros();

        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let inserted = sqlx::query_as::<_, BirthRecord>(&format!(
            r#"
            INSERT INTO birth_records (
                father_id_type, father_id, mother_id_type, mother_id,
                mother_name, hospital_name, birth_date, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (father_id, mother_id) DO NOTHING
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(record.father_id_type)
        .bind(record.father_id)
        .bind(record.mother_id_type)
        .bind(record.mother_id)
        .bind(&record.mother_name)
        .bind(&record.hospital_name)
        .bind(&record.birth_date)
        .bind(created_at_us)
        .fetch_optional(&mut **tx)
        .await?;

        match inserted {
            Some(created) => {
                tx.commit().await?;
                tracing::debug!(record_id = created.id, "Birth record inserted");
                Ok(created)
            }
            None => {
                // The write lock is still held, so the conflicting row is stable here
                let hospital_name = sqlx::query_scalar::<_, String>(
                    "SELECT hospital_name FROM birth_records WHERE father_id = ? AND mother_id = ? ORDER BY id LIMIT 1",
                )
                .bind(record.father_id)
                .bind(record.mother_id)
                .fetch_one(&mut **tx)
                .await?;
                tx.rollback().await?;
                Err(AppError::Duplicate { hospital_name })
            }
        }
    }

    /// All records registered for exactly this parent pair, oldest first
    #[tracing::instrument(skip(self), fields(db.table = "birth_records", db.operation = "select"))]
    pub async fn find_by_parents(
        &self,
        father_id: i64,
        mother_id: i64,
    ) -> Result<Vec<BirthRecord>, AppError> {
        let records = sqlx::query_as::<_, BirthRecord>(&format!(
            "SELECT {} FROM birth_records WHERE father_id = ? AND mother_id = ? ORDER BY id ASC",
            RECORD_COLUMNS
        ))
        .bind(father_id)
        .bind(mother_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Delete every record created strictly before `cutoff`; returns the number deleted
    #[tracing::instrument(skip(self), fields(db.table = "birth_records", db.operation = "delete"))]
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let result = sqlx::query("DELETE FROM birth_records WHERE created_at < ?")
            .bind(cutoff.timestamp_micros())
            .execute(&mut **tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "birth_records", db.operation = "count"))]
    pub async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM birth_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Cheap round-trip used by readiness checks
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect, run_migrations};
    use natalis_core::IdType;
    use std::collections::HashSet;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::task::JoinSet;

    // Each test gets its own database file
    async fn setup_test() -> (BirthRecordRepository, TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let url = format!("sqlite://{}", dir.path().join("births.db").display());
        let pool = connect(&url, 5, Duration::from_secs(30))
            .await
            .expect("Failed to create test database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        (BirthRecordRepository::new(pool), dir)
    }

    fn record(father_id: i64, mother_id: i64, hospital: &str) -> NewBirthRecord {
        NewBirthRecord {
            father_id_type: IdType::UnifiedNumber,
            father_id,
            mother_id_type: IdType::CivilRegistryNumber,
            mother_id,
            mother_name: "Mariam".to_string(),
            hospital_name: hospital.to_string(),
            birth_date: "2024-03-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (repo, _dir) = setup_test().await;

        let created = repo
            .insert(&record(10, 20, "Al Noor Hospital"))
            .await
            .expect("Failed to insert");
        assert!(created.id > 0);
        assert_eq!(created.father_id_type, IdType::UnifiedNumber);
        assert_eq!(created.mother_id_type, IdType::CivilRegistryNumber);

        let found = repo.find_by_parents(10, 20).await.expect("Failed to query");
        assert_eq!(found, vec![created]);
    }

    #[tokio::test]
    async fn test_find_unknown_pair_is_empty() {
        let (repo, _dir) = setup_test().await;
        repo.insert(&record(1, 2, "Hospital A")).await.unwrap();

        assert!(repo.find_by_parents(2, 1).await.unwrap().is_empty());
        assert!(repo.find_by_parents(1, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_pair_names_existing_hospital() {
        let (repo, _dir) = setup_test().await;
        repo.insert(&record(10, 20, "Hospital A")).await.unwrap();

        let err = repo
            .insert(&record(10, 20, "Hospital B"))
            .await
            .expect_err("Duplicate pair should be rejected");
        match err {
            AppError::Duplicate { hospital_name } => assert_eq!(hospital_name, "Hospital A"),
            other => panic!("Expected Duplicate, got {:?}", other),
        }

        let found = repo.find_by_parents(10, 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].hospital_name, "Hospital A");
    }

    #[tokio::test]
    async fn test_pair_is_the_key_not_single_ids() {
        let (repo, _dir) = setup_test().await;
        repo.insert(&record(10, 20, "Hospital A")).await.unwrap();
        repo.insert(&record(10, 21, "Hospital A")).await.unwrap();
        repo.insert(&record(11, 20, "Hospital A")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_purge_with_cutoff_now() {
        let (repo, _dir) = setup_test().await;
        repo.insert(&record(10, 20, "Hospital A")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;

        let deleted = repo.purge_older_than(Utc::now()).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.find_by_parents(10, 20).await.unwrap().is_empty());

        let deleted_again = repo.purge_older_than(Utc::now()).await.unwrap();
        assert_eq!(deleted_again, 0);
    }

    #[tokio::test]
    async fn test_purge_keeps_younger_records() {
        let (repo, _dir) = setup_test().await;
        repo.insert(&record(10, 20, "Hospital A")).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::days(30);
        assert_eq!(repo.purge_older_than(cutoff).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_purge() {
        let (repo, _dir) = setup_test().await;
        let first = repo.insert(&record(10, 20, "Hospital A")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        repo.purge_older_than(Utc::now()).await.unwrap();

        let second = repo.insert(&record(10, 20, "Hospital A")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_pairs_all_stored() {
        let (repo, _dir) = setup_test().await;
        const N: i64 = 25;

        let mut tasks = JoinSet::new();
        for i in 0..N {
            let repo = repo.clone();
            tasks.spawn(async move { repo.insert(&record(i, 1_000 + i, "Hospital A")).await });
        }

        let mut ids = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            let created = joined.expect("task panicked").expect("insert failed");
            ids.insert(created.id);
        }

        assert_eq!(ids.len(), N as usize);
        assert_eq!(repo.count().await.unwrap(), N);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_pair_accepts_exactly_one() {
        let (repo, _dir) = setup_test().await;
        const N: usize = 12;

        let mut tasks = JoinSet::new();
        for i in 0..N {
            let repo = repo.clone();
            let hospital = format!("Hospital {}", i);
            tasks.spawn(async move { repo.insert(&record(7, 8, &hospital)).await });
        }

        let mut winners = Vec::new();
        let mut conflicts = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined.expect("task panicked") {
                Ok(created) => winners.push(created),
                Err(AppError::Duplicate { hospital_name }) => conflicts.push(hospital_name),
                Err(other) => panic!("Unexpected error: {:?}", other),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(conflicts.len(), N - 1);
        let winning_hospital = &winners[0].hospital_name;
        assert!(conflicts.iter().all(|h| h == winning_hospital));
        assert_eq!(repo.find_by_parents(7, 8).await.unwrap().len(), 1);
    }
}

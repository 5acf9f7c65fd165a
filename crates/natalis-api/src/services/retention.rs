use chrono::{DateTime, Utc};
use natalis_core::AppError;
use natalis_db::BirthRecordRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Age-based purge of birth records, on demand and on a schedule.
#[derive(Clone)]
pub struct RetentionService {
    repository: BirthRecordRepository,
    retention_days: i64,
}

impl RetentionService {
    pub fn new(repository: BirthRecordRepository, retention_days: i64) -> Self {
        Self {
            repository,
            retention_days,
        }
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    /// Records created before this instant are expired
    pub fn cutoff(&self) -> Result<DateTime<Utc>, AppError> {
        chrono::Duration::try_days(self.retention_days)
            .and_then(|retention| Utc::now().checked_sub_signed(retention))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Retention window of {} days is out of range",
                    self.retention_days
                ))
            })
    }

    #[tracing::instrument(skip(self), fields(retention.days = self.retention_days))]
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let cutoff = self.cutoff()?;
        let deleted_count = self.repository.purge_older_than(cutoff).await?;

        tracing::info!(
            deleted_count,
            cutoff = %cutoff.to_rfc3339(),
            "Purged expired birth records"
        );

        Ok(deleted_count)
    }

    /// Start the background purge task
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut purge_interval = interval(every);
            purge_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                purge_interval.tick().await;

                tracing::info!("Starting scheduled purge of expired records");

                if let Err(e) = self.purge_expired().await {
                    tracing::error!(error = %e, "Scheduled purge failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use natalis_core::{IdType, NewBirthRecord};
    use natalis_db::{connect, run_migrations};
    use tempfile::TempDir;

    async fn setup_test() -> (BirthRecordRepository, TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let url = format!("sqlite://{}", dir.path().join("births.db").display());
        let pool = connect(&url, 2, Duration::from_secs(30))
            .await
            .expect("Failed to create test database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        (BirthRecordRepository::new(pool), dir)
    }

    async fn insert_aged(repo: &BirthRecordRepository, father_id: i64, age: chrono::Duration) {
        let created_at = (Utc::now() - age).timestamp_micros();
        sqlx::query(
            r#"
            INSERT INTO birth_records (
                father_id_type, father_id, mother_id_type, mother_id,
                mother_name, hospital_name, birth_date, created_at
            )
            VALUES ('UNIFIED_NUMBER', ?, 'UNIFIED_NUMBER', 1, 'Huda', 'Hospital A', '2024-01-01', ?)
            "#,
        )
        .bind(father_id)
        .bind(created_at)
        .execute(repo.pool())
        .await
        .expect("Failed to insert aged record");
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired() {
        let (repo, _dir) = setup_test().await;
        insert_aged(&repo, 1, chrono::Duration::days(31)).await;
        insert_aged(&repo, 2, chrono::Duration::days(29)).await;
        repo.insert(&NewBirthRecord {
            father_id_type: IdType::UnifiedNumber,
            father_id: 3,
            mother_id_type: IdType::UnifiedNumber,
            mother_id: 1,
            mother_name: "Huda".to_string(),
            hospital_name: "Hospital A".to_string(),
            birth_date: "2024-01-01".to_string(),
        })
        .await
        .unwrap();

        let service = RetentionService::new(repo.clone(), 30);
        assert_eq!(service.purge_expired().await.unwrap(), 1);
        assert_eq!(service.purge_expired().await.unwrap(), 0);

        assert!(repo.find_by_parents(1, 1).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cutoff_respects_retention_window() {
        let (repo, _dir) = setup_test().await;
        let service = RetentionService::new(repo, 7);
        let expected = Utc::now() - chrono::Duration::days(7);
        let drift = (service.cutoff().unwrap() - expected).num_seconds().abs();
        assert!(drift <= 1);
        assert_eq!(service.retention_days(), 7);
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_an_error() {
        let (repo, _dir) = setup_test().await;
        insert_aged(&repo, 1, chrono::Duration::days(40)).await;

        let service = RetentionService::new(repo.clone(), 200_000_000);
        match service.purge_expired().await {
            Err(AppError::Internal(msg)) => assert!(msg.contains("200000000")),
            other => panic!("Expected Internal, got {:?}", other),
        }
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_background_task_purges() {
        let (repo, _dir) = setup_test().await;
        insert_aged(&repo, 1, chrono::Duration::days(40)).await;

        let service = Arc::new(RetentionService::new(repo.clone(), 30));
        let handle = service.start(Duration::from_secs(3600));

        // The first tick fires immediately
        for _ in 0..50 {
            if repo.count().await.unwrap() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert_eq!(repo.count().await.unwrap(), 0);
    }
}

use async_trait::async_trait;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{Limit, TagRecord};
use crate::utils::time::current_timestamp_nanos;

/// Persistence of tag records, keyed by (name, tag).
///
/// Handlers only see this trait, so the sqlite implementation can be swapped
/// for a test double.
#[async_trait]
pub trait TagRecordStore: Send + Sync {
    /// Inserts the (name, tag) record, or refreshes `updated_at` when it
    /// already exists. Returns the record as stored.
    async fn upsert(&self, name: &str, tag: &str) -> AppResult<TagRecord>;

    /// Records for `name`, most recently updated first.
    async fn list_by_name(&self, name: &str, limit: Limit) -> AppResult<Vec<TagRecord>>;

    /// Round-trips to the backing store.
    async fn ping(&self) -> AppResult<()>;
}

pub struct TagRecordService {
    db: Database,
}

impl TagRecordService {
    pub fn new(db: Database) -> Self {
        TagRecordService { db }
    }
}

#[async_trait]
impl TagRecordStore for TagRecordService {
    async fn upsert(&self, name: &str, tag: &str) -> AppResult<TagRecord> {
        if name.is_empty() || tag.is_empty() {
            return Err(AppError::Validation(
                "name and tag must not be empty".to_string(),
            ));
        }

        let now = current_timestamp_nanos();

        // Single statement under the (name, tag) unique index, so concurrent
        // writers of the same pair can never both insert.
        let record = sqlx::query_as::<_, TagRecord>(
            r#"
            INSERT INTO tag_record (name, tag, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (name, tag) DO UPDATE SET updated_at = excluded.updated_at
            RETURNING id, name, tag, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(tag)
        .bind(now)
        .fetch_one(self.db.pool())
        .await?;

        Ok(record)
    }

    async fn list_by_name(&self, name: &str, limit: Limit) -> AppResult<Vec<TagRecord>> {
        let records = sqlx::query_as::<_, TagRecord>(
            r#"
            SELECT id, name, tag, created_at, updated_at
            FROM tag_record
            WHERE name = ?1
            ORDER BY updated_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(name)
        .bind(limit.as_sql())
        .fetch_all(self.db.pool())
        .await?;

        Ok(records)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(self.db.pool()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    async fn memory_service() -> TagRecordService {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        TagRecordService::new(db)
    }

    fn tags(records: &[TagRecord]) -> Vec<&str> {
        records.iter().map(|r| r.tag.as_str()).collect()
    }

    async fn tick() {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    #[tokio::test]
    async fn test_upsert_creates_record() {
        let service = memory_service().await;

        let record = service.upsert("app", "v1").await.unwrap();
        assert_eq!(record.name, "app");
        assert_eq!(record.tag, "v1");
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn test_repeated_upsert_keeps_one_record() {
        let service = memory_service().await;

        let first = service.upsert("app", "v1").await.unwrap();
        tick().await;
        service.upsert("app", "v1").await.unwrap();
        tick().await;
        let last = service.upsert("app", "v1").await.unwrap();

        let records = service.list_by_name("app", Limit::Unbounded).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(last.id, first.id);
        assert_eq!(last.created_at, first.created_at);
        assert!(last.updated_at > first.updated_at);
        assert_eq!(records[0], last);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let service = memory_service().await;

        for tag in ["v1", "v2", "v3"] {
            service.upsert("app", tag).await.unwrap();
            tick().await;
        }

        let records = service.list_by_name("app", Limit::Unbounded).await.unwrap();
        assert_eq!(tags(&records), vec!["v3", "v2", "v1"]);

        // Touching v1 again moves it to the front
        service.upsert("app", "v1").await.unwrap();
        let records = service.list_by_name("app", Limit::Unbounded).await.unwrap();
        assert_eq!(tags(&records), vec!["v1", "v3", "v2"]);
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let service = memory_service().await;

        for tag in ["v1", "v2", "v3", "v4", "v5"] {
            service.upsert("app", tag).await.unwrap();
            tick().await;
        }

        let records = service.list_by_name("app", Limit::AtMost(2)).await.unwrap();
        assert_eq!(tags(&records), vec!["v5", "v4"]);

        let records = service.list_by_name("app", Limit::AtMost(50)).await.unwrap();
        assert_eq!(records.len(), 5);

        let records = service.list_by_name("app", Limit::from_count(0)).await.unwrap();
        assert_eq!(records.len(), 5);
    }

    #[tokio::test]
    async fn test_names_do_not_leak() {
        let service = memory_service().await;

        service.upsert("app", "v1").await.unwrap();
        service.upsert("other", "v1").await.unwrap();

        let records = service.list_by_name("other", Limit::Unbounded).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "other");

        let records = service.list_by_name("missing", Limit::Unbounded).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_rejects_empty_parts() {
        let service = memory_service().await;

        assert!(matches!(
            service.upsert("", "v1").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.upsert("app", "").await,
            Err(AppError::Validation(_))
        ));
        assert!(service
            .list_by_name("app", Limit::Unbounded)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_of_same_pair() {
        let tmp = tempfile::tempdir().unwrap();
        let db = Database::open(&tmp.path().join("data.db"), 8).await.unwrap();
        db.run_migrations().await.unwrap();
        let service = Arc::new(TagRecordService::new(db));

        let writes = (0..32).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.upsert("app", "v1").await })
        });
        for result in futures::future::join_all(writes).await {
            result.unwrap().unwrap();
        }

        let records = service.list_by_name("app", Limit::Unbounded).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data.db");

        {
            let db = Database::open(&path, 1).await.unwrap();
            db.run_migrations().await.unwrap();
            TagRecordService::new(db.clone()).upsert("app", "v1").await.unwrap();
            db.pool().close().await;
        }

        let db = Database::open(&path, 1).await.unwrap();
        db.run_migrations().await.unwrap();
        let service = TagRecordService::new(db);
        service.ping().await.unwrap();

        let records = service.list_by_name("app", Limit::Unbounded).await.unwrap();
        assert_eq!(tags(&records), vec!["v1"]);
    }
}

//! Build ledger repository.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{BuildKey, BuildRecord, BuildRow, BuildStatus};
use exn::ResultExt;
use sqlx::SqlitePool;
use time::UtcDateTime;

/// Every key-addressed query ends in the same five placeholders.
macro_rules! bind_key {
    ($query:expr, $key:expr) => {
        $query
            .bind($key.package_name.as_str())
            .bind($key.version.as_str())
            .bind($key.runtime_version.as_str())
            .bind($key.platform.as_str())
            .bind($key.companion_version.as_deref())
    };
}

fn now() -> i64 {
    UtcDateTime::now().unix_timestamp()
}

/// Repository for build records.
///
/// In dry-run mode every write is skipped while reads still hit the
/// database, so a dry run sees (and reports) exactly what a real run would.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
}

impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}

impl Repository {
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Is there a record for exactly this key that blocks rescheduling?
    ///
    /// Records flagged for retry do not count.
    pub async fn exists_scheduled(&self, key: &BuildKey) -> Result<bool> {
        let exists: i64 = bind_key!(sqlx::query_scalar(include_str!("../queries/exists_scheduled.sql")), key)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(exists != 0)
    }

    pub async fn get(&self, key: &BuildKey) -> Result<Option<BuildRecord>> {
        let row: Option<BuildRow> = bind_key!(sqlx::query_as(include_str!("../queries/get.sql")), key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(BuildRecord::try_from).transpose()
    }

    /// Most recently updated records first, optionally limited to one status.
    pub async fn list(&self, status: Option<BuildStatus>, limit: Option<u32>) -> Result<Vec<BuildRecord>> {
        let rows: Vec<BuildRow> = sqlx::query_as(include_str!("../queries/list.sql"))
            .bind(status.map(|s| s.to_string()))
            // SQLite treats a negative limit as "no limit".
            .bind(limit.map_or(-1, i64::from))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(BuildRecord::try_from).collect()
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Record that a build for `key` has been dispatched.
    ///
    /// An existing record for the key is overwritten back to
    /// `scheduled`/`retry = false` (its creation date is kept), which is what
    /// clears a retry flag once the rebuild has been dispatched.
    pub async fn upsert(&self, key: &BuildKey) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let now = now();
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let updated = bind_key!(sqlx::query(include_str!("../queries/reschedule.sql")).bind(now), key)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        if updated == 0 {
            bind_key!(sqlx::query(include_str!("../queries/insert.sql")), key)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::trace!(package = %key.package_name, version = %key.version, "Recorded scheduled build");
        Ok(())
    }

    /// Record a successful build. Returns `false` if no record matched.
    pub async fn mark_completed(&self, key: &BuildKey, run_url: &str, duration_seconds: u64) -> Result<bool> {
        if self.dry_run {
            return Ok(self.get(key).await?.is_some());
        }
        let duration = i64::try_from(duration_seconds).or_raise(|| ErrorKind::InvalidData("build duration"))?;
        let result = bind_key!(
            sqlx::query(include_str!("../queries/mark_completed.sql")).bind(run_url).bind(duration).bind(now()),
            key
        )
        .execute(&self.pool)
        .await
        .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a failed build, keeping any previously known run URL when none
    /// is given. Returns `false` if no record matched.
    pub async fn mark_failed(&self, key: &BuildKey, run_url: Option<&str>) -> Result<bool> {
        if self.dry_run {
            return Ok(self.get(key).await?.is_some());
        }
        let result = bind_key!(sqlx::query(include_str!("../queries/mark_failed.sql")).bind(run_url).bind(now()), key)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Flag a record so that the next scheduling run dispatches it again.
    /// Returns `false` if no record matched.
    pub async fn mark_for_retry(&self, key: &BuildKey) -> Result<bool> {
        if self.dry_run {
            return Ok(self.get(key).await?.is_some());
        }
        let result = bind_key!(sqlx::query(include_str!("../queries/mark_for_retry.sql")).bind(now()), key)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

//! # Cash Counter Repository
//!
//! Persistence for daily cash counters and their audit log.
//!
//! ## Write Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open    ── BEGIN ── INSERT counter ── INSERT event ── COMMIT           │
//! │                         │                                               │
//! │                         └── UNIQUE(date) fails → UniqueViolation        │
//! │                                                                         │
//! │  close / verify / reopen                                                │
//! │          ── BEGIN ── UPDATE ... WHERE id = ? AND version = ?            │
//! │                         │       (version = version + 1)                 │
//! │                         ├── 0 rows, row exists  → StaleWrite            │
//! │                         ├── 0 rows, no row      → NotFound              │
//! │                         └── 1 row ── INSERT event ── COMMIT             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Counters are never deleted and events are never updated.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::{CounterEvent, DailyCashCounter, HistoryPage};

const COUNTER_COLUMNS: &str = r#"
    id, date, status,
    opening_balance_cents, closing_balance_cents, expected_closing_cents, variance_cents,
    opened_by, opened_at, opening_notes,
    closed_by, closed_at, closing_notes,
    verified_by, verified_at, verification_notes,
    version, created_at, updated_at
"#;

const EVENT_COLUMNS: &str = r#"
    id, counter_id, action, actor, status_after,
    opening_balance_cents, closing_balance_cents, expected_closing_cents, variance_cents,
    notes, occurred_at
"#;

/// Repository for cash counter database operations.
#[derive(Debug, Clone)]
pub struct CashCounterRepository {
    pool: SqlitePool,
}

impl CashCounterRepository {
    /// Creates a new CashCounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashCounterRepository { pool }
    }

    /// Gets a counter by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DailyCashCounter>> {
        let sql = format!("SELECT {COUNTER_COLUMNS} FROM cash_counters WHERE id = ?1");

        let counter = sqlx::query_as::<_, DailyCashCounter>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(counter)
    }

    /// Gets the counter for a business date.
    pub async fn get_by_date(&self, date: NaiveDate) -> DbResult<Option<DailyCashCounter>> {
        let sql = format!("SELECT {COUNTER_COLUMNS} FROM cash_counters WHERE date = ?1");

        let counter = sqlx::query_as::<_, DailyCashCounter>(&sql)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(counter)
    }

    /// Inserts a freshly opened counter together with its `opened` event.
    ///
    /// ## Errors
    /// - `UniqueViolation` if a counter already exists for the date
    pub async fn insert(&self, counter: &DailyCashCounter, event: &CounterEvent) -> DbResult<()> {
        debug!(id = %counter.id, date = %counter.date, "Inserting cash counter");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cash_counters (
                id, date, status,
                opening_balance_cents, closing_balance_cents, expected_closing_cents, variance_cents,
                opened_by, opened_at, opening_notes,
                closed_by, closed_at, closing_notes,
                verified_by, verified_at, verification_notes,
                version, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15, ?16,
                ?17, ?18, ?19
            )
            "#,
        )
        .bind(&counter.id)
        .bind(counter.date)
        .bind(counter.status)
        .bind(counter.opening_balance_cents)
        .bind(counter.closing_balance_cents)
        .bind(counter.expected_closing_cents)
        .bind(counter.variance_cents)
        .bind(&counter.opened_by)
        .bind(counter.opened_at)
        .bind(&counter.opening_notes)
        .bind(&counter.closed_by)
        .bind(counter.closed_at)
        .bind(&counter.closing_notes)
        .bind(&counter.verified_by)
        .bind(counter.verified_at)
        .bind(&counter.verification_notes)
        .bind(counter.version)
        .bind(counter.created_at)
        .bind(counter.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, counter.date.to_string())
            }
            other => other,
        })?;

        insert_event(&mut tx, event).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Writes a transitioned counter with a compare-and-set on its version.
    ///
    /// `counter.version` must be the version that was read; the stored row
    /// gets `version + 1`, which is reflected in the returned record.
    ///
    /// ## Errors
    /// - `StaleWrite` if the row changed since it was read
    /// - `NotFound` if the row does not exist
    pub async fn update(
        &self,
        counter: &DailyCashCounter,
        event: &CounterEvent,
    ) -> DbResult<DailyCashCounter> {
        debug!(
            id = %counter.id,
            status = %counter.status,
            expected_version = counter.version,
            "Updating cash counter"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE cash_counters SET
                status = ?3,
                closing_balance_cents = ?4,
                expected_closing_cents = ?5,
                variance_cents = ?6,
                opened_at = ?7,
                closed_by = ?8,
                closed_at = ?9,
                closing_notes = ?10,
                verified_by = ?11,
                verified_at = ?12,
                verification_notes = ?13,
                updated_at = ?14,
                version = version + 1
            WHERE id = ?1 AND version = ?2
            "#,
        )
        .bind(&counter.id)
        .bind(counter.version)
        .bind(counter.status)
        .bind(counter.closing_balance_cents)
        .bind(counter.expected_closing_cents)
        .bind(counter.variance_cents)
        .bind(counter.opened_at)
        .bind(&counter.closed_by)
        .bind(counter.closed_at)
        .bind(&counter.closing_notes)
        .bind(&counter.verified_by)
        .bind(counter.verified_at)
        .bind(&counter.verification_notes)
        .bind(counter.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT version FROM cash_counters WHERE id = ?1")
                    .bind(&counter.id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(match exists {
                Some(_) => DbError::StaleWrite {
                    entity: "Cash counter".to_string(),
                    id: counter.id.clone(),
                    expected_version: counter.version,
                },
                None => DbError::not_found("Cash counter", &counter.id),
            });
        }

        insert_event(&mut tx, event).await?;
        tx.commit().await?;

        Ok(DailyCashCounter {
            version: counter.version + 1,
            ..counter.clone()
        })
    }

    /// Lists counters, most recent date first.
    pub async fn list_history(&self, limit: i64, offset: i64) -> DbResult<HistoryPage> {
        let sql = format!(
            "SELECT {COUNTER_COLUMNS} FROM cash_counters ORDER BY date DESC LIMIT ?1 OFFSET ?2"
        );

        let items = sqlx::query_as::<_, DailyCashCounter>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cash_counters")
            .fetch_one(&self.pool)
            .await?;

        Ok(HistoryPage {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Lists the audit events of a counter in the order they happened.
    pub async fn list_events(&self, counter_id: &str) -> DbResult<Vec<CounterEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM cash_counter_events \
             WHERE counter_id = ?1 ORDER BY occurred_at ASC, rowid ASC"
        );

        let events = sqlx::query_as::<_, CounterEvent>(&sql)
            .bind(counter_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }
}

async fn insert_event(conn: &mut SqliteConnection, event: &CounterEvent) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO cash_counter_events (
            id, counter_id, action, actor, status_after,
            opening_balance_cents, closing_balance_cents, expected_closing_cents, variance_cents,
            notes, occurred_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&event.id)
    .bind(&event.counter_id)
    .bind(event.action)
    .bind(&event.actor)
    .bind(event.status_after)
    .bind(event.opening_balance_cents)
    .bind(event.closing_balance_cents)
    .bind(event.expected_closing_cents)
    .bind(event.variance_cents)
    .bind(&event.notes)
    .bind(event.occurred_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{DateTime, TimeZone, Utc};
    use till_core::{CounterAction, CounterStatus, Money};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, hour, 0, 0).unwrap()
    }

    async fn open(repo: &CashCounterRepository, d: u32) -> DailyCashCounter {
        let counter =
            DailyCashCounter::open(day(d), Money::from_major(2900), "cashier-1", None, at(d, 9))
                .unwrap();
        let event = CounterEvent::record(&counter, CounterAction::Opened, "cashier-1", None, at(d, 9));
        repo.insert(&counter, &event).await.unwrap();
        counter
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.cash_counters();
        let counter = open(&repo, 14).await;

        let by_id = repo.get_by_id(&counter.id).await.unwrap().unwrap();
        assert_eq!(by_id, counter);

        let by_date = repo.get_by_date(day(14)).await.unwrap().unwrap();
        assert_eq!(by_date.id, counter.id);

        assert!(repo.get_by_date(day(15)).await.unwrap().is_none());
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_counter_for_date_is_rejected() {
        let db = db().await;
        let repo = db.cash_counters();
        let first = open(&repo, 14).await;

        let second =
            DailyCashCounter::open(day(14), Money::from_major(10), "cashier-2", None, at(14, 10))
                .unwrap();
        let event = CounterEvent::record(&second, CounterAction::Opened, "cashier-2", None, at(14, 10));

        let err = repo.insert(&second, &event).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let stored = repo.get_by_date(day(14)).await.unwrap().unwrap();
        assert_eq!(stored, first);
        assert_eq!(repo.list_events(&second.id).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_records_event() {
        let db = db().await;
        let repo = db.cash_counters();
        let counter = open(&repo, 14).await;

        let closed = counter
            .close(Money::from_major(4500), Money::from_major(1500), "cashier-1", None, at(14, 22))
            .unwrap();
        let event = CounterEvent::record(&closed, CounterAction::Closed, "cashier-1", None, at(14, 22));
        let stored = repo.update(&closed, &event).await.unwrap();

        assert_eq!(stored.version, counter.version + 1);
        assert_eq!(repo.get_by_id(&counter.id).await.unwrap().unwrap(), stored);

        let events = repo.list_events(&counter.id).await.unwrap();
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![CounterAction::Opened, CounterAction::Closed]);
        assert_eq!(events[1].variance_cents, Some(10_000));
    }

    #[tokio::test]
    async fn test_stale_update_is_rejected() {
        let db = db().await;
        let repo = db.cash_counters();
        let counter = open(&repo, 14).await;

        let closed = counter
            .close(Money::from_major(2900), Money::zero(), "cashier-1", None, at(14, 22))
            .unwrap();
        let event = CounterEvent::record(&closed, CounterAction::Closed, "cashier-1", None, at(14, 22));
        repo.update(&closed, &event).await.unwrap();

        // Same read version, second writer.
        let err = repo.update(&closed, &event).await.unwrap_err();
        assert!(matches!(err, DbError::StaleWrite { .. }));

        let stored = repo.get_by_id(&counter.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CounterStatus::ClosedPendingVerification);
        assert_eq!(repo.list_events(&counter.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_counter() {
        let db = db().await;
        let repo = db.cash_counters();

        let ghost =
            DailyCashCounter::open(day(14), Money::from_major(1), "cashier-1", None, at(14, 9))
                .unwrap();
        let event = CounterEvent::record(&ghost, CounterAction::Opened, "cashier-1", None, at(14, 9));

        let err = repo.update(&ghost, &event).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first_and_paged() {
        let db = db().await;
        let repo = db.cash_counters();
        for d in [12, 14, 13, 11] {
            open(&repo, d).await;
        }

        let page = repo.list_history(2, 0).await.unwrap();
        assert_eq!(page.total, 4);
        let dates: Vec<_> = page.items.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![day(14), day(13)]);

        let page = repo.list_history(2, 2).await.unwrap();
        let dates: Vec<_> = page.items.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![day(12), day(11)]);

        let page = repo.list_history(2, 10).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 4);
    }
}

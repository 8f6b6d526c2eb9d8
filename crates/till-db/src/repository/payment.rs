//! # Payment Repository
//!
//! Read side of the order/payment subsystem: the cash-sales total a counter
//! freezes at close.
//!
//! Only `completed` payments with method `cash` count. Card payments never
//! touch the drawer and voided payments were handed back.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use till_core::Money;

/// A cash payment row as recorded by the order subsystem.
///
/// Used by the seed binary and tests; the service only reads totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashPayment {
    pub id: String,
    pub order_id: String,
    pub method: String,
    pub status: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl CashPayment {
    /// A completed cash payment for `order_id`.
    pub fn completed_cash(order_id: &str, amount: Money, created_at: DateTime<Utc>) -> Self {
        CashPayment {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            method: "cash".to_string(),
            status: "completed".to_string(),
            amount_cents: amount.cents(),
            created_at,
        }
    }
}

/// Repository for payment reads.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Sums completed cash payments with `start <= created_at < end`.
    pub async fn cash_total_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Money> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0)
            FROM payments
            WHERE method = 'cash'
              AND status = 'completed'
              AND created_at >= ?1
              AND created_at < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        debug!(%start, %end, total_cents = total, "Cash sales total");

        Ok(Money::from_cents(total))
    }

    /// Records a payment.
    pub async fn insert(&self, payment: &CashPayment) -> DbResult<()> {
        debug!(order_id = %payment.order_id, amount = payment.amount_cents, "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, method, status, amount_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(&payment.method)
        .bind(&payment.status)
        .bind(payment.amount_cents)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

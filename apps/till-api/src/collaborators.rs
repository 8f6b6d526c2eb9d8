//! # Collaborators
//!
//! Contracts with the subsystems the cash counter depends on but does not own.
//!
//! ```text
//! ┌────────────────────────┐   cash_sales_total(start, end)   ┌───────────────┐
//! │                        │ ───────────────────────────────► │ order/payment │
//! │  CashCounterService    │                                  └───────────────┘
//! │                        │   verify_owner_credential(pw)    ┌───────────────┐
//! │                        │ ───────────────────────────────► │ identity      │
//! │                        │                                  └───────────────┘
//! │                        │   now()                          ┌───────────────┐
//! │                        │ ───────────────────────────────► │ clock         │
//! └────────────────────────┘                                  └───────────────┘
//! ```
//!
//! The default implementations read the shared SQLite database through
//! till-db; tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use till_core::Money;
use till_db::{DbResult, OwnerRepository, PaymentRepository};

/// Total of completed cash payments in a half-open time window.
#[async_trait]
pub trait CashSalesSource: Send + Sync {
    /// Sums cash payments with `window_start <= created_at < window_end`.
    async fn cash_sales_total(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DbResult<Money>;
}

/// Owner credential check gating verify and reopen.
#[async_trait]
pub trait OwnerVerifier: Send + Sync {
    async fn verify_owner_credential(&self, password: &str) -> DbResult<bool>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[async_trait]
impl CashSalesSource for PaymentRepository {
    async fn cash_sales_total(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DbResult<Money> {
        self.cash_total_between(window_start, window_end).await
    }
}

#[async_trait]
impl OwnerVerifier for OwnerRepository {
    async fn verify_owner_credential(&self, password: &str) -> DbResult<bool> {
        self.verify_password(password).await
    }
}

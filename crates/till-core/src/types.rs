//! # Domain Types
//!
//! Core domain types of the daily cash counter.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │  │   DailyCashCounter       │ 1    * │      CounterEvent        │      │
//! │  │  ──────────────────────  │───────►│  ──────────────────────  │      │
//! │  │  id (UUID)               │        │  id (UUID)               │      │
//! │  │  date (unique)           │        │  counter_id (FK)         │      │
//! │  │  status                  │        │  action / actor          │      │
//! │  │  opening/closing cents   │        │  balance snapshot        │      │
//! │  │  expected/variance cents │        │  occurred_at             │      │
//! │  └──────────────────────────┘        └──────────────────────────┘      │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │  │     CounterStatus        │        │     CounterAction        │      │
//! │  │  Open                    │        │  Opened   Closed         │      │
//! │  │  ClosedPendingVerif.     │        │  Verified Reopened       │      │
//! │  │  Verified                │        │                          │      │
//! │  └──────────────────────────┘        └──────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary fields are stored as `*_cents: i64` (the same shape the database
//! uses) and exposed as [`Money`] through accessor methods.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::reconciliation::Reconciliation;

// =============================================================================
// Counter Status
// =============================================================================

/// Status of a date's cash counter.
///
/// ```text
///  (no row) ──open──► Open ──close──► ClosedPendingVerification ──verify──► Verified
///                      ▲                        │                               │
///                      └─────────reopen─────────┴───────────reopen──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CounterStatus {
    /// Float declared; cash sales are being attributed to this counter.
    Open,
    /// Drawer counted and reconciled, waiting for an owner to sign off.
    ClosedPendingVerification,
    /// Owner acknowledged the reconciliation.
    Verified,
}

impl CounterStatus {
    /// Stable string form, identical to the serialized and stored value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CounterStatus::Open => "open",
            CounterStatus::ClosedPendingVerification => "closed_pending_verification",
            CounterStatus::Verified => "verified",
        }
    }
}

impl fmt::Display for CounterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Counter Action
// =============================================================================

/// A lifecycle transition recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CounterAction {
    Opened,
    Closed,
    Verified,
    Reopened,
}

impl CounterAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CounterAction::Opened => "opened",
            CounterAction::Closed => "closed",
            CounterAction::Verified => "verified",
            CounterAction::Reopened => "reopened",
        }
    }
}

impl fmt::Display for CounterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Daily Cash Counter
// =============================================================================

/// The cash-drawer reconciliation record for one calendar date.
///
/// ## Field Groups
/// - opening: always present
/// - closing (`closing_balance_cents`, `expected_closing_cents`,
///   `variance_cents`, `closed_*`): present once closed, cleared on reopen
/// - verification (`verified_*`): present once verified, cleared on reopen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailyCashCounter {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business date this counter reconciles. Unique across counters.
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub status: CounterStatus,

    /// Float declared at open, from the opening denomination count.
    pub opening_balance_cents: i64,

    /// Physically counted cash at close.
    pub closing_balance_cents: Option<i64>,

    /// Opening balance plus the cash-sales snapshot taken at close.
    pub expected_closing_cents: Option<i64>,

    /// Closing minus expected; positive = surplus, negative = shortage.
    pub variance_cents: Option<i64>,

    pub opened_by: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub opening_notes: Option<String>,

    pub closed_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub closing_notes: Option<String>,

    pub verified_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,

    /// Row version for optimistic concurrency; bumped on every write.
    pub version: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl DailyCashCounter {
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_cents(self.opening_balance_cents)
    }

    #[inline]
    pub fn closing_balance(&self) -> Option<Money> {
        self.closing_balance_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn expected_closing(&self) -> Option<Money> {
        self.expected_closing_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn variance(&self) -> Option<Money> {
        self.variance_cents.map(Money::from_cents)
    }

    /// Full reconciliation summary, if the counter has been closed.
    ///
    /// The cash-sales snapshot is derived back from the frozen expected
    /// closing.
    pub fn reconciliation(&self) -> Option<Reconciliation> {
        let closing = self.closing_balance()?;
        let expected_closing = self.expected_closing()?;
        let variance = self.variance()?;

        Some(Reconciliation {
            opening: self.opening_balance(),
            cash_sales: expected_closing.checked_sub(self.opening_balance())?,
            expected_closing,
            closing,
            variance,
        })
    }
}

// =============================================================================
// Counter Event (audit log)
// =============================================================================

/// One append-only audit entry, written with every lifecycle transition.
///
/// Snapshots the balances as they stood right after the transition so the
/// figures of a closing survive a later reopen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CounterEvent {
    pub id: String,
    pub counter_id: String,
    pub action: CounterAction,
    pub actor: String,
    pub status_after: CounterStatus,
    pub opening_balance_cents: i64,
    pub closing_balance_cents: Option<i64>,
    pub expected_closing_cents: Option<i64>,
    pub variance_cents: Option<i64>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,
}

impl CounterEvent {
    /// Builds the audit entry describing `counter` right after `action`.
    pub fn record(
        counter: &DailyCashCounter,
        action: CounterAction,
        actor: &str,
        notes: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        CounterEvent {
            id: uuid::Uuid::new_v4().to_string(),
            counter_id: counter.id.clone(),
            action,
            actor: actor.to_string(),
            status_after: counter.status,
            opening_balance_cents: counter.opening_balance_cents,
            closing_balance_cents: counter.closing_balance_cents,
            expected_closing_cents: counter.expected_closing_cents,
            variance_cents: counter.variance_cents,
            notes,
            occurred_at,
        }
    }
}

// =============================================================================
// History Page
// =============================================================================

/// One page of counter history, most recent date first.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistoryPage {
    pub items: Vec<DailyCashCounter>,
    /// Total number of counters, across all pages.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::VarianceKind;
    use chrono::TimeZone;

    fn closed_counter() -> DailyCashCounter {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        DailyCashCounter {
            id: "c-1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            status: CounterStatus::ClosedPendingVerification,
            opening_balance_cents: 290_000,
            closing_balance_cents: Some(450_000),
            expected_closing_cents: Some(440_000),
            variance_cents: Some(10_000),
            opened_by: "staff-1".to_string(),
            opened_at: at,
            opening_notes: None,
            closed_by: Some("staff-2".to_string()),
            closed_at: Some(at),
            closing_notes: None,
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            version: 2,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_status_strings_match_serde() {
        for status in [
            CounterStatus::Open,
            CounterStatus::ClosedPendingVerification,
            CounterStatus::Verified,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_reconciliation_accessors() {
        let rec = closed_counter().reconciliation().unwrap();
        assert_eq!(rec.cash_sales, Money::from_major(1500));
        assert_eq!(rec.expected_closing, Money::from_major(4400));
        assert_eq!(rec.variance, Money::from_major(100));
        assert_eq!(rec.kind(), VarianceKind::Surplus);
    }

    #[test]
    fn test_open_counter_has_no_reconciliation() {
        let mut counter = closed_counter();
        counter.status = CounterStatus::Open;
        counter.closing_balance_cents = None;
        counter.expected_closing_cents = None;
        counter.variance_cents = None;

        assert!(counter.reconciliation().is_none());
    }

    #[test]
    fn test_event_snapshots_counter() {
        let counter = closed_counter();
        let event = CounterEvent::record(
            &counter,
            CounterAction::Closed,
            "staff-2",
            Some("busy night".to_string()),
            counter.updated_at,
        );

        assert_eq!(event.counter_id, "c-1");
        assert_eq!(event.status_after, CounterStatus::ClosedPendingVerification);
        assert_eq!(event.variance_cents, Some(10_000));
    }
}

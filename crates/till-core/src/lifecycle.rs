//! # Counter Lifecycle
//!
//! Pure state transitions of a [`DailyCashCounter`].
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NoCounter ──open──► Open ──close──► ClosedPendingVerification         │
//! │                        ▲                    │            │              │
//! │                        │                  verify         │              │
//! │                        │                    ▼            │              │
//! │                        │                 Verified        │              │
//! │                        │                    │            │              │
//! │                        └──── reopen ────────┴────────────┘              │
//! │                          (owner credential)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition takes `&self` and returns a new record; the caller
//! persists it with a compare-and-set on [`DailyCashCounter::version`].
//! Nothing here reads the clock, the database or the owner credential.

use chrono::{DateTime, NaiveDate, Utc};

use crate::denomination::ensure_counted;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::reconciliation::{compute_variance, Reconciliation};
use crate::types::{CounterStatus, DailyCashCounter};
use crate::validation::{validate_notes, validate_staff_id};

impl DailyCashCounter {
    /// Creates the counter for `date` with a counted opening float.
    ///
    /// ## Errors
    /// - zero opening balance (nothing was counted)
    /// - blank `opened_by`, over-long notes
    pub fn open(
        date: NaiveDate,
        opening_balance: Money,
        opened_by: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let opening_balance = ensure_counted(opening_balance, "opening balance")?;
        let opened_by = validate_staff_id("opened_by", opened_by)?;
        let opening_notes = validate_notes("notes", notes)?;

        Ok(DailyCashCounter {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            status: CounterStatus::Open,
            opening_balance_cents: opening_balance.cents(),
            closing_balance_cents: None,
            expected_closing_cents: None,
            variance_cents: None,
            opened_by,
            opened_at: now,
            opening_notes,
            closed_by: None,
            closed_at: None,
            closing_notes: None,
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Closes an open counter and freezes the reconciliation.
    ///
    /// `cash_sales` is the snapshot of cash payments taken in
    /// `[opened_at, now)`; it is stored only through `expected_closing`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{NaiveDate, Utc};
    /// use till_core::{CounterStatus, DailyCashCounter, Money};
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    /// let open = DailyCashCounter::open(date, Money::from_major(2900), "cashier", None, Utc::now()).unwrap();
    /// let closed = open
    ///     .close(Money::from_major(4500), Money::from_major(1500), "cashier", None, Utc::now())
    ///     .unwrap();
    ///
    /// assert_eq!(closed.status, CounterStatus::ClosedPendingVerification);
    /// assert_eq!(closed.variance(), Some(Money::from_major(100)));
    /// ```
    pub fn close(
        &self,
        closing_balance: Money,
        cash_sales: Money,
        closed_by: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        self.ensure_can_close()?;

        let closing_balance = ensure_counted(closing_balance, "closing balance")?;
        let closed_by = validate_staff_id("closed_by", closed_by)?;
        let closing_notes = validate_notes("notes", notes)?;

        let rec = Reconciliation::compute(self.opening_balance(), cash_sales, closing_balance)?;

        Ok(DailyCashCounter {
            status: CounterStatus::ClosedPendingVerification,
            closing_balance_cents: Some(rec.closing.cents()),
            expected_closing_cents: Some(rec.expected_closing.cents()),
            variance_cents: Some(rec.variance.cents()),
            closed_by: Some(closed_by),
            closed_at: Some(now),
            closing_notes,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Records the owner's sign-off. The variance is left as computed.
    ///
    /// The owner credential must be checked by the caller before this runs.
    pub fn verify(
        &self,
        verified_by: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        self.ensure_can_verify()?;

        let verified_by = validate_staff_id("verified_by", verified_by)?;
        let verification_notes = validate_notes("notes", notes)?;

        Ok(DailyCashCounter {
            status: CounterStatus::Verified,
            verified_by: Some(verified_by),
            verified_at: Some(now),
            verification_notes,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Returns a closed or verified counter to `Open`.
    ///
    /// Clears every closing and verification field and restarts the
    /// cash-sales window at `now`. The opening balance is kept.
    pub fn reopen(&self, now: DateTime<Utc>) -> CoreResult<Self> {
        self.ensure_can_reopen()?;

        Ok(DailyCashCounter {
            status: CounterStatus::Open,
            closing_balance_cents: None,
            expected_closing_cents: None,
            variance_cents: None,
            opened_at: now,
            closed_by: None,
            closed_at: None,
            closing_notes: None,
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Status precondition of [`close`](Self::close), checked before the
    /// cash-sales total is fetched.
    pub fn ensure_can_close(&self) -> CoreResult<()> {
        self.ensure_status(CounterStatus::Open, "close")
    }

    /// Status precondition of [`verify`](Self::verify), checked before
    /// the owner credential so a wrong-state request never costs a hash.
    pub fn ensure_can_verify(&self) -> CoreResult<()> {
        self.ensure_status(CounterStatus::ClosedPendingVerification, "verify")
    }

    /// Status precondition of [`reopen`](Self::reopen).
    pub fn ensure_can_reopen(&self) -> CoreResult<()> {
        if self.status == CounterStatus::Open {
            return Err(self.invalid_status("reopen"));
        }
        Ok(())
    }

    /// Checks the record invariants.
    ///
    /// ## Invariants
    /// - closing, expected and variance are present together or absent together
    /// - `variance == closing - expected`
    /// - `Open` carries no closing or verification data
    /// - `ClosedPendingVerification` carries closing data, no verification data
    /// - `Verified` carries closing and verification data
    pub fn check_invariants(&self) -> CoreResult<()> {
        let closing_fields = [
            self.closing_balance_cents.is_some(),
            self.expected_closing_cents.is_some(),
            self.variance_cents.is_some(),
        ];
        let has_closing = closing_fields.iter().all(|present| *present);
        if !has_closing && closing_fields.iter().any(|present| *present) {
            return Err(self.inconsistent("closing figures are partially set"));
        }

        if let (Some(closing), Some(expected), Some(variance)) =
            (self.closing_balance(), self.expected_closing(), self.variance())
        {
            if compute_variance(closing, expected).ok() != Some(variance) {
                return Err(self.inconsistent("variance does not equal closing minus expected"));
            }
        }

        let has_close_stamp = self.closed_by.is_some() && self.closed_at.is_some();
        let has_verification = self.verified_by.is_some() || self.verified_at.is_some();

        match self.status {
            CounterStatus::Open => {
                if has_closing || self.closed_at.is_some() || has_verification {
                    return Err(self.inconsistent("open counter carries closing data"));
                }
            }
            CounterStatus::ClosedPendingVerification => {
                if !has_closing || !has_close_stamp {
                    return Err(self.inconsistent("closed counter is missing closing data"));
                }
                if has_verification {
                    return Err(self.inconsistent("unverified counter carries verification data"));
                }
            }
            CounterStatus::Verified => {
                if !has_closing || self.verified_by.is_none() || self.verified_at.is_none() {
                    return Err(self.inconsistent("verified counter is missing closing data"));
                }
            }
        }

        Ok(())
    }

    fn ensure_status(&self, expected: CounterStatus, operation: &'static str) -> CoreResult<()> {
        if self.status != expected {
            return Err(self.invalid_status(operation));
        }
        Ok(())
    }

    fn invalid_status(&self, operation: &'static str) -> CoreError {
        CoreError::InvalidCounterStatus {
            counter_id: self.id.clone(),
            current: self.status,
            operation,
        }
    }

    fn inconsistent(&self, reason: &str) -> CoreError {
        CoreError::InconsistentCounter {
            counter_id: self.id.clone(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

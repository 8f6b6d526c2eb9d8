//! # Reconciliation Engine
//!
//! Computes what the drawer should hold at close and how far the physical
//! count is from it.
//!
//! ```text
//! expected_closing = opening_balance + cash_sales      (frozen at close)
//! variance         = closing_balance - expected_closing
//!
//!   variance > 0  → Surplus   (more cash than recorded sales explain)
//!   variance = 0  → Balanced
//!   variance < 0  → Shortage
//! ```
//!
//! `cash_sales` is a snapshot taken once at close time from the order/payment
//! subsystem. Late or backdated payments recorded afterwards do not move the
//! variance.
//!
//! The sales total comes from outside this crate, so both sums are checked:
//! a figure that would overflow is rejected, never wrapped.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::ValidationResult;

/// Expected drawer balance at close.
pub fn compute_expected_closing(
    opening_balance: Money,
    cash_sales_total: Money,
) -> ValidationResult<Money> {
    opening_balance
        .checked_add(cash_sales_total)
        .ok_or_else(|| overflow("expected closing"))
}

/// Signed difference between counted and expected cash.
pub fn compute_variance(closing_balance: Money, expected_closing: Money) -> ValidationResult<Money> {
    closing_balance
        .checked_sub(expected_closing)
        .ok_or_else(|| overflow("variance"))
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
}

/// Direction of a variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VarianceKind {
    Balanced,
    Surplus,
    Shortage,
}

impl VarianceKind {
    pub fn of(variance: Money) -> Self {
        if variance.is_positive() {
            VarianceKind::Surplus
        } else if variance.is_negative() {
            VarianceKind::Shortage
        } else {
            VarianceKind::Balanced
        }
    }
}

/// All figures of one closing, computed together so they can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reconciliation {
    pub opening: Money,
    pub cash_sales: Money,
    pub expected_closing: Money,
    pub closing: Money,
    pub variance: Money,
}

impl Reconciliation {
    /// Reconciles a counted closing balance against opening float and sales.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::reconciliation::{Reconciliation, VarianceKind};
    /// use till_core::Money;
    ///
    /// let rec = Reconciliation::compute(
    ///     Money::from_major(2900),
    ///     Money::from_major(1500),
    ///     Money::from_major(4500),
    /// )
    /// .unwrap();
    /// assert_eq!(rec.expected_closing, Money::from_major(4400));
    /// assert_eq!(rec.variance, Money::from_major(100));
    /// assert_eq!(rec.kind(), VarianceKind::Surplus);
    /// ```
    pub fn compute(opening: Money, cash_sales: Money, closing: Money) -> CoreResult<Self> {
        let expected_closing = compute_expected_closing(opening, cash_sales)?;
        let variance = compute_variance(closing, expected_closing)?;

        Ok(Reconciliation {
            opening,
            cash_sales,
            expected_closing,
            closing,
            variance,
        })
    }

    pub fn kind(&self) -> VarianceKind {
        VarianceKind::of(self.variance)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # till-core: Pure Business Logic for the Daily Cash Counter
//!
//! This crate holds the rules of the end-of-day cash reconciliation as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 till-api (axum HTTP service)                    │   │
//! │  │    open ──► close ──► verify / reopen ──► today / history       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐ ┌──────────────┐ ┌───────────┐ ┌───────────┐  │   │
//! │  │   │denomination│ │reconciliation│ │ lifecycle │ │ validation│  │   │
//! │  │   │ Totalizer  │ │ expected/var │ │ Open→...  │ │   rules   │  │   │
//! │  │   └────────────┘ └──────────────┘ └───────────┘ └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK READS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                     till-db (Database Layer)                    │   │
//! │  │         SQLite queries, migrations, repositories, audit log     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (DailyCashCounter, CounterStatus, CounterEvent)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`denomination`] - Denomination Totalizer
//! - [`reconciliation`] - Expected closing and variance
//! - [`lifecycle`] - Counter state transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::denomination::{DenominationCounts, DenominationSet};
//! use till_core::reconciliation::{compute_expected_closing, compute_variance};
//! use till_core::Money;
//!
//! let set = DenominationSet::standard();
//! let opening = set.total(&DenominationCounts::from_pairs([(500, 5), (200, 1), (100, 2)])).unwrap();
//! assert_eq!(opening, Money::from_major(2900));
//!
//! let expected = compute_expected_closing(opening, Money::from_major(1500)).unwrap();
//! let closing = set.total(&DenominationCounts::from_pairs([(500, 8), (200, 2), (100, 1)])).unwrap();
//! assert_eq!(compute_variance(closing, expected).unwrap(), Money::from_major(100));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod denomination;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod reconciliation;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use denomination::{DenominationCounts, DenominationSet};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconciliation::{Reconciliation, VarianceKind};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of notes/coins of a single face value in one count.
///
/// A drawer never holds this many of one note; anything above it is a typo.
pub const MAX_DENOMINATION_COUNT: i64 = 100_000;

/// Maximum length of a free-text note attached to a lifecycle phase.
pub const MAX_NOTES_LEN: usize = 500;

/// Maximum length of a staff identity reference.
pub const MAX_STAFF_ID_LEN: usize = 64;

/// Default page size for counter history.
pub const DEFAULT_HISTORY_LIMIT: i64 = 30;

/// Upper bound for a single history page.
pub const MAX_HISTORY_LIMIT: i64 = 100;

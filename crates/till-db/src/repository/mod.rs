//! # Repository Module
//!
//! Database repository implementations for Till.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CashCounterService                                                     │
//! │       │                                                                 │
//! │       │  db.cash_counters().get_by_date(date)                           │
//! │       ▼                                                                 │
//! │  CashCounterRepository                                                  │
//! │  ├── insert(&self, counter, event)                                      │
//! │  ├── get_by_id / get_by_date                                            │
//! │  ├── update(&self, counter, expected_version, event)                    │
//! │  ├── list_history(&self, limit, offset)                                 │
//! │  └── list_events(&self, counter_id)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`cash_counter::CashCounterRepository`] - Counters and their audit log
//! - [`payment::PaymentRepository`] - Cash sales totals
//! - [`owner::OwnerRepository`] - Owner credential checks

pub mod cash_counter;
pub mod owner;
pub mod payment;

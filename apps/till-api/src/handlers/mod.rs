//! HTTP handlers.

pub mod cash_counter;
pub mod health;

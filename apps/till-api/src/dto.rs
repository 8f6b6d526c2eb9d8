//! Request and response bodies of the cash counter endpoints.
//!
//! Counter records go out as [`CounterView`]: the stored row plus the
//! figures derived from it at read time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use till_core::{DailyCashCounter, DenominationCounts, HistoryPage, VarianceKind};
use ts_rs::TS;

/// `POST /cash-counter/open`
///
/// ```json
/// { "denominations": { "500": 5, "200": 1, "100": 2 }, "notes": "float from safe" }
/// ```
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct OpenCounterRequest {
    /// Business date; today in the configured timezone when omitted.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub denominations: DenominationCounts,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `POST /cash-counter/close`
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CloseCounterRequest {
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub denominations: DenominationCounts,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `POST /cash-counter/verify/{id}`
#[derive(Clone, Deserialize, TS)]
#[ts(export)]
pub struct VerifyCounterRequest {
    /// Owner password. An absent field is treated as empty and rejected.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `POST /cash-counter/reopen/{id}`
#[derive(Clone, Deserialize, TS)]
#[ts(export)]
pub struct ReopenCounterRequest {
    #[serde(default)]
    pub password: String,
}

// Passwords stay out of logs.
impl fmt::Debug for VerifyCounterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyCounterRequest")
            .field("password", &"<redacted>")
            .field("notes", &self.notes)
            .finish()
    }
}

impl fmt::Debug for ReopenCounterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReopenCounterRequest")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A counter as returned by every endpoint.
///
/// `cash_sales_cents` and `variance_kind` are `null` until the counter is
/// closed.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CounterView {
    #[serde(flatten)]
    pub counter: DailyCashCounter,
    pub cash_sales_cents: Option<i64>,
    pub variance_kind: Option<VarianceKind>,
}

impl From<DailyCashCounter> for CounterView {
    fn from(counter: DailyCashCounter) -> Self {
        let reconciliation = counter.reconciliation();
        CounterView {
            cash_sales_cents: reconciliation.map(|r| r.cash_sales.cents()),
            variance_kind: reconciliation.map(|r| r.kind()),
            counter,
        }
    }
}

/// `GET /cash-counter/today`
///
/// `counter` is `null` when nothing has been opened for the date yet.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct TodayResponse {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub counter: Option<CounterView>,
}

/// `GET /cash-counter/history`, most recent date first.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct HistoryResponse {
    pub items: Vec<CounterView>,
    /// Total number of counters, across all pages.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl From<HistoryPage> for HistoryResponse {
    fn from(page: HistoryPage) -> Self {
        HistoryResponse {
            items: page.items.into_iter().map(CounterView::from).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// `GET /cash-counter/history?limit=&offset=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

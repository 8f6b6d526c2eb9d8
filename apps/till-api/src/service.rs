//! # Cash Counter Service
//!
//! Orchestrates the counter lifecycle: load, apply a pure transition from
//! `till_core::lifecycle`, persist with a compare-and-set plus audit event.
//!
//! ## Check Order
//! ```text
//! open    : already exists? (409) → totalize (400) → insert (409 on race)
//! close   : no counter? (404) → not Open? (409) → totalize (400)
//!           → cash sales [opened_at, now) → CAS update (409 on race)
//! verify  : no counter? (404) → not pending? (409) → owner gate (401)
//!           → CAS update (409 on race)
//! reopen  : no counter? (404) → already Open? (409) → owner gate (401)
//!           → CAS update (409 on race)
//! ```
//!
//! A rejected owner credential returns before anything is written, so it
//! leaves neither a state change nor an audit event.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

use till_core::validation::{validate_pagination, validate_password, validate_staff_id};
use till_core::{
    CounterAction, CounterEvent, DailyCashCounter, DenominationCounts, DenominationSet,
    HistoryPage, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT,
};
use till_db::Database;

use crate::collaborators::{CashSalesSource, Clock, OwnerVerifier, SystemClock};
use crate::error::{ApiError, ApiResult, ErrorCode};

/// The daily cash counter workflow.
///
/// Cheap to clone; collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct CashCounterService {
    db: Database,
    cash_sales: Arc<dyn CashSalesSource>,
    owners: Arc<dyn OwnerVerifier>,
    clock: Arc<dyn Clock>,
    denominations: DenominationSet,
    timezone: Tz,
    default_history_limit: i64,
    max_history_limit: i64,
}

impl CashCounterService {
    /// Creates a service reading cash sales and owner credentials from `db`.
    pub fn new(db: Database, denominations: DenominationSet, timezone: Tz) -> Self {
        CashCounterService {
            cash_sales: Arc::new(db.payments()),
            owners: Arc::new(db.owners()),
            clock: Arc::new(SystemClock),
            db,
            denominations,
            timezone,
            default_history_limit: DEFAULT_HISTORY_LIMIT,
            max_history_limit: MAX_HISTORY_LIMIT,
        }
    }

    pub fn with_cash_sales(mut self, source: Arc<dyn CashSalesSource>) -> Self {
        self.cash_sales = source;
        self
    }

    pub fn with_owner_verifier(mut self, verifier: Arc<dyn OwnerVerifier>) -> Self {
        self.owners = verifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_history_limits(mut self, default_limit: i64, max_limit: i64) -> Self {
        self.default_history_limit = default_limit;
        self.max_history_limit = max_limit;
        self
    }

    /// Current business date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.timezone).date_naive()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens the counter for `date` (default: today).
    pub async fn open_counter(
        &self,
        date: Option<NaiveDate>,
        denominations: &DenominationCounts,
        opened_by: &str,
        notes: Option<String>,
    ) -> ApiResult<DailyCashCounter> {
        let date = date.unwrap_or_else(|| self.today());
        let repo = self.db.cash_counters();

        if repo.get_by_date(date).await?.is_some() {
            return Err(ApiError::conflict(format!(
                "A cash counter already exists for {}",
                date
            )));
        }

        let opening_balance = self.denominations.total(denominations)?;
        let now = self.clock.now();
        let counter = DailyCashCounter::open(date, opening_balance, opened_by, notes, now)?;

        let event = CounterEvent::record(
            &counter,
            CounterAction::Opened,
            &counter.opened_by,
            counter.opening_notes.clone(),
            now,
        );
        repo.insert(&counter, &event).await?;

        info!(
            id = %counter.id,
            %date,
            opening_balance = %opening_balance,
            opened_by = %counter.opened_by,
            "Cash counter opened"
        );

        Ok(counter)
    }

    /// Closes the open counter for `date` (default: today) and freezes the
    /// reconciliation against cash sales since it was opened.
    pub async fn close_counter(
        &self,
        date: Option<NaiveDate>,
        denominations: &DenominationCounts,
        closed_by: &str,
        notes: Option<String>,
    ) -> ApiResult<DailyCashCounter> {
        let date = date.unwrap_or_else(|| self.today());
        let counter = self.load_by_date(date).await?;
        counter.ensure_can_close()?;

        let closing_balance = self.denominations.total(denominations)?;
        let now = self.clock.now();
        let cash_sales = self
            .cash_sales
            .cash_sales_total(counter.opened_at, now)
            .await?;

        let closed = counter.close(closing_balance, cash_sales, closed_by, notes, now)?;
        let stored = self
            .persist(&closed, CounterAction::Closed, closed_by, closed.closing_notes.clone(), now)
            .await?;

        info!(
            id = %stored.id,
            %date,
            cash_sales = %cash_sales,
            closing_balance = %closing_balance,
            variance_cents = ?stored.variance_cents,
            "Cash counter closed"
        );

        Ok(stored)
    }

    /// Owner sign-off of a closed counter.
    pub async fn verify_counter(
        &self,
        id: &str,
        password: &str,
        verified_by: &str,
        notes: Option<String>,
    ) -> ApiResult<DailyCashCounter> {
        let counter = self.load_by_id(id).await?;
        counter.ensure_can_verify()?;
        self.authorize_owner(password, &counter, "verify").await?;

        let now = self.clock.now();
        let verified = counter.verify(verified_by, notes, now)?;
        let stored = self
            .persist(
                &verified,
                CounterAction::Verified,
                verified_by,
                verified.verification_notes.clone(),
                now,
            )
            .await?;

        info!(id = %stored.id, verified_by = ?stored.verified_by, "Cash counter verified");
        Ok(stored)
    }

    /// Returns a closed or verified counter to `Open`, discarding its closing.
    pub async fn reopen_counter(
        &self,
        id: &str,
        password: &str,
        reopened_by: &str,
    ) -> ApiResult<DailyCashCounter> {
        let reopened_by = validate_staff_id("reopened_by", reopened_by)?;
        let counter = self.load_by_id(id).await?;
        counter.ensure_can_reopen()?;
        self.authorize_owner(password, &counter, "reopen").await?;

        let now = self.clock.now();
        let reopened = counter.reopen(now)?;
        let stored = self
            .persist(&reopened, CounterAction::Reopened, &reopened_by, None, now)
            .await?;

        info!(
            id = %stored.id,
            previous_status = %counter.status,
            %reopened_by,
            "Cash counter reopened"
        );
        Ok(stored)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Today's business date and its counter, if one exists.
    pub async fn today_counter(&self) -> ApiResult<(NaiveDate, Option<DailyCashCounter>)> {
        let date = self.today();
        let counter = self.db.cash_counters().get_by_date(date).await?;
        Ok((date, counter))
    }

    pub async fn get_by_date(&self, date: NaiveDate) -> ApiResult<Option<DailyCashCounter>> {
        Ok(self.db.cash_counters().get_by_date(date).await?)
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<DailyCashCounter> {
        self.load_by_id(id).await
    }

    /// Counter history, most recent date first.
    pub async fn list_history(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ApiResult<HistoryPage> {
        let (limit, offset) = validate_pagination(
            limit,
            offset,
            self.default_history_limit,
            self.max_history_limit,
        )?;
        Ok(self.db.cash_counters().list_history(limit, offset).await?)
    }

    /// Audit events of a counter, oldest first.
    pub async fn list_events(&self, id: &str) -> ApiResult<Vec<CounterEvent>> {
        let counter = self.load_by_id(id).await?;
        Ok(self.db.cash_counters().list_events(&counter.id).await?)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Shared owner-credential gate of verify and reopen.
    async fn authorize_owner(
        &self,
        password: &str,
        counter: &DailyCashCounter,
        operation: &str,
    ) -> ApiResult<()> {
        let accepted = validate_password(password).is_ok()
            && self.owners.verify_owner_credential(password).await?;

        if !accepted {
            warn!(id = %counter.id, operation, "Owner credential rejected");
            return Err(ApiError::authentication("Owner password is incorrect"));
        }

        Ok(())
    }

    async fn load_by_id(&self, id: &str) -> ApiResult<DailyCashCounter> {
        let counter = self
            .db
            .cash_counters()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Cash counter", id))?;
        counter.check_invariants()?;
        Ok(counter)
    }

    async fn load_by_date(&self, date: NaiveDate) -> ApiResult<DailyCashCounter> {
        let counter = self
            .db
            .cash_counters()
            .get_by_date(date)
            .await?
            .ok_or_else(|| {
                ApiError::new(ErrorCode::NotFound, format!("No cash counter open for {}", date))
            })?;
        counter.check_invariants()?;
        Ok(counter)
    }

    async fn persist(
        &self,
        counter: &DailyCashCounter,
        action: CounterAction,
        actor: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> ApiResult<DailyCashCounter> {
        let actor = validate_staff_id("actor", actor)?;
        let event = CounterEvent::record(counter, action, &actor, notes, now);
        Ok(self.db.cash_counters().update(counter, &event).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

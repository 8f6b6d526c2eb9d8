//! Cash counter handlers.
//!
//! Each handler extracts the caller's [`StaffId`], parses the body and hands
//! off to [`CashCounterService`](crate::service::CashCounterService). Body
//! and query rejections are converted to `400 VALIDATION_ERROR` through `?`.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};

use till_core::CounterEvent;

use crate::dto::{
    CloseCounterRequest, CounterView, HistoryQuery, HistoryResponse, OpenCounterRequest,
    ReopenCounterRequest, TodayResponse, VerifyCounterRequest,
};
use crate::error::ApiResult;
use crate::identity::StaffId;
use crate::AppState;

/// `POST /cash-counter/open`
pub async fn open_counter(
    State(state): State<AppState>,
    staff: StaffId,
    body: Result<Json<OpenCounterRequest>, JsonRejection>,
) -> ApiResult<Json<CounterView>> {
    let Json(req) = body?;
    let counter = state
        .service
        .open_counter(req.date, &req.denominations, staff.as_str(), req.notes)
        .await?;
    Ok(Json(counter.into()))
}

/// `POST /cash-counter/close`
pub async fn close_counter(
    State(state): State<AppState>,
    staff: StaffId,
    body: Result<Json<CloseCounterRequest>, JsonRejection>,
) -> ApiResult<Json<CounterView>> {
    let Json(req) = body?;
    let counter = state
        .service
        .close_counter(req.date, &req.denominations, staff.as_str(), req.notes)
        .await?;
    Ok(Json(counter.into()))
}

/// `POST /cash-counter/verify/{id}`
pub async fn verify_counter(
    State(state): State<AppState>,
    staff: StaffId,
    Path(id): Path<String>,
    body: Result<Json<VerifyCounterRequest>, JsonRejection>,
) -> ApiResult<Json<CounterView>> {
    let Json(req) = body?;
    let counter = state
        .service
        .verify_counter(&id, &req.password, staff.as_str(), req.notes)
        .await?;
    Ok(Json(counter.into()))
}

/// `POST /cash-counter/reopen/{id}`
pub async fn reopen_counter(
    State(state): State<AppState>,
    staff: StaffId,
    Path(id): Path<String>,
    body: Result<Json<ReopenCounterRequest>, JsonRejection>,
) -> ApiResult<Json<CounterView>> {
    let Json(req) = body?;
    let counter = state
        .service
        .reopen_counter(&id, &req.password, staff.as_str())
        .await?;
    Ok(Json(counter.into()))
}

/// `GET /cash-counter/today`
pub async fn get_today(
    State(state): State<AppState>,
    _staff: StaffId,
) -> ApiResult<Json<TodayResponse>> {
    let (date, counter) = state.service.today_counter().await?;
    Ok(Json(TodayResponse {
        date,
        counter: counter.map(CounterView::from),
    }))
}

/// `GET /cash-counter/history`
pub async fn list_history(
    State(state): State<AppState>,
    _staff: StaffId,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Query(query) = query?;
    let page = state.service.list_history(query.limit, query.offset).await?;
    Ok(Json(page.into()))
}

/// `GET /cash-counter/{id}`
pub async fn get_counter(
    State(state): State<AppState>,
    _staff: StaffId,
    Path(id): Path<String>,
) -> ApiResult<Json<CounterView>> {
    Ok(Json(state.service.get_by_id(&id).await?.into()))
}

/// `GET /cash-counter/{id}/events`
pub async fn list_events(
    State(state): State<AppState>,
    _staff: StaffId,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<CounterEvent>>> {
    Ok(Json(state.service.list_events(&id).await?))
}

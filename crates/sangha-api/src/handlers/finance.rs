//! Finance dashboard handlers
//!
//! The four operations the dashboard drives: list meetings with their
//! recomputed running balances, preview the live balance during edits,
//! commit a meeting's spendings, and add a new meeting.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use sangha_types::{MeetingId, NewMeeting};

use crate::dto::{
    AddMeetingRequest, CommitMeetingRequest, LiveBalanceQuery, LiveBalanceResponse,
    MeetingResponse,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// The acting admin's identity, stamped into `modified_by`. Authentication
/// itself lives in the surrounding portal; this service only records who
/// the gateway says is acting.
fn actor(headers: &HeaderMap) -> &str {
    headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("system")
}

/// List all meetings in date order with running balance annotations.
pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<MeetingResponse>>> {
    let meetings = state.ledger.list_meetings_with_balances().await?;
    Ok(Json(meetings.into_iter().map(MeetingResponse::from).collect()))
}

/// The balance to display for a selected meeting, with optional unsaved
/// edits applied as a transient preview.
pub async fn live_balance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LiveBalanceQuery>,
) -> ApiResult<Json<LiveBalanceResponse>> {
    let balance = state
        .ledger
        .get_live_balance(MeetingId(query.meeting_id), query.pending_edits())
        .await?;
    Ok(Json(LiveBalanceResponse { balance }))
}

/// Add a new meeting with its allocated budget.
pub async fn add_meeting(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AddMeetingRequest>,
) -> ApiResult<(StatusCode, Json<MeetingResponse>)> {
    let record = state
        .ledger
        .add_meeting(
            NewMeeting {
                name: request.name,
                date: request.date,
                total_amount: request.total_amount,
            },
            actor(&headers),
        )
        .await?;

    let meetings = state.ledger.list_meetings_with_balances().await?;
    let response = meetings
        .into_iter()
        .find(|m| m.record.id == record.id)
        .map(MeetingResponse::from)
        .ok_or(crate::error::ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Commit spending edits to a meeting and lock it.
pub async fn commit_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CommitMeetingRequest>,
) -> ApiResult<Json<MeetingResponse>> {
    let record = state
        .ledger
        .commit_meeting(
            MeetingId(id),
            request.edits(),
            request.version,
            actor(&headers),
        )
        .await?;

    let meetings = state.ledger.list_meetings_with_balances().await?;
    let response = meetings
        .into_iter()
        .find(|m| m.record.id == record.id)
        .map(MeetingResponse::from)
        .ok_or(crate::error::ApiError::Internal)?;

    Ok(Json(response))
}

//! Donation feed handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::dto::{DonationDto, DonationsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// List the donation feed with its total.
pub async fn list_donations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DonationsResponse>> {
    let donations = state.ledger.donations().await?;
    let total = donations.iter().map(|d| d.amount).sum();

    Ok(Json(DonationsResponse {
        donations: donations.into_iter().map(DonationDto::from).collect(),
        total,
    }))
}

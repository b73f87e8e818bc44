use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use tracing::info;
use tramo_core::params::LegParams;
use tramo_order::{BlockReceipt, BlockRequest, BookingLegs, Confirmation, ExtendReceipt, Release};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{transaction_id}/block", post(block))
        .route("/v1/bookings/{transaction_id}/extend", post(extend))
        .route("/v1/bookings/{transaction_id}/confirm", post(confirm))
        .route("/v1/bookings/{transaction_id}/unblock", post(unblock))
        .route("/v1/bookings/{transaction_id}", delete(cancel))
}

async fn block(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(request): Json<BlockRequest>,
) -> Result<(StatusCode, Json<BlockReceipt>), AppError> {
    info!("Block {} seats {:?}", transaction_id, request.seats);
    let receipt = state.bookings.block(&transaction_id, &request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn extend(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(legs): Json<BookingLegs>,
) -> Result<Json<ExtendReceipt>, AppError> {
    Ok(Json(state.bookings.extend(&transaction_id, &legs).await?))
}

async fn confirm(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(legs): Json<BookingLegs>,
) -> Result<Json<Confirmation>, AppError> {
    Ok(Json(state.bookings.confirm(&transaction_id, &legs).await?))
}

async fn unblock(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(params): Json<LegParams>,
) -> Result<Json<Release>, AppError> {
    Ok(Json(state.bookings.unblock(&transaction_id, &params).await?))
}

async fn cancel(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.bookings.cancel(&transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

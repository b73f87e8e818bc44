use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use tramo_catalog::TripListing;
use tramo_core::params::LegParams;
use tramo_core::seat::SeatLayout;
use tramo_core::trip::{City, TripQuery};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DestinationQuery {
    pub origin: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips", get(list_trips))
        .route("/v1/layouts", post(seat_layout))
        .route("/v1/cities/origins", get(origins))
        .route("/v1/cities/destinations", get(destinations))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Json<Vec<TripListing>>, AppError> {
    info!("Trip search {} -> {} on {}", query.origin, query.destination, query.date);
    let listings = state.inventory.list_trips(&query).await?;
    Ok(Json(listings))
}

async fn seat_layout(
    State(state): State<AppState>,
    Json(params): Json<LegParams>,
) -> Result<Json<SeatLayout>, AppError> {
    Ok(Json(state.inventory.seat_layout(&params).await?))
}

async fn origins(State(state): State<AppState>) -> Result<Json<Vec<City>>, AppError> {
    Ok(Json(state.inventory.origins().await?))
}

async fn destinations(
    State(state): State<AppState>,
    Query(query): Query<DestinationQuery>,
) -> Result<Json<Vec<City>>, AppError> {
    Ok(Json(state.inventory.destinations(&query.origin).await?))
}

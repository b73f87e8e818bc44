use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use tramo_core::params::LegParams;
use tramo_core::seat::SeatLayout;
use tramo_core::token::TokenSource;
use tramo_core::trip::{City, Layover, Leg, Trip, TripQuery};
use tramo_core::vendor::VendorApi;
use tramo_core::{CoreError, CoreResult};

use crate::combiner::combine;
use crate::layout;
use crate::trips::{filter_and_compose, is_no_trips_message};

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Company whose trips are sold through this adapter.
    pub company: String,
    pub support_connections: bool,
    /// List trips without the synthesized seat grid.
    pub skip_template_layout: bool,
}

/// One sellable trip as shown to the marketplace.
#[derive(Debug, Clone, Serialize)]
pub struct TripListing {
    pub route_id: String,
    pub journey_id: String,
    #[serde(flatten)]
    pub params: LegParams,
    pub legs: Vec<Leg>,
    pub layovers: Vec<Layover>,
    pub total_fare: i64,
    pub available_seats: u32,
    pub layout: Option<SeatLayout>,
}

/// Read side of the adapter: trips, seat layouts and the city catalog.
pub struct InventoryService {
    vendor: Arc<dyn VendorApi>,
    tokens: Arc<TokenSource>,
    settings: CatalogSettings,
}

impl InventoryService {
    pub fn new(vendor: Arc<dyn VendorApi>, tokens: Arc<TokenSource>, settings: CatalogSettings) -> Self {
        Self {
            vendor,
            tokens,
            settings,
        }
    }

    pub async fn list_trips(&self, query: &TripQuery) -> CoreResult<Vec<TripListing>> {
        let vendor = &self.vendor;
        let company = self.settings.company.as_str();

        let raw = self
            .tokens
            .with_read_token(|token| async move {
                match vendor.list_trips(&token, query, company).await {
                    Err(CoreError::VendorRequest(message)) if is_no_trips_message(&message) => {
                        Ok(Vec::new())
                    }
                    other => other,
                }
            })
            .await?;

        let received = raw.len();
        let trips = filter_and_compose(
            raw,
            &query.origin,
            &query.destination,
            company,
            self.settings.support_connections,
        );
        info!(
            "Listing {} -> {} on {}: {} of {} vendor trips kept",
            query.origin,
            query.destination,
            query.date,
            trips.len(),
            received
        );

        let mut listings = Vec::with_capacity(trips.len());
        for trip in trips {
            match self.listing(trip) {
                Ok(listing) => listings.push(listing),
                Err(CoreError::Skippable(reason)) => warn!("Dropping trip from listing: {}", reason),
                Err(e) => return Err(e),
            }
        }
        Ok(listings)
    }

    fn listing(&self, trip: Trip) -> CoreResult<TripListing> {
        let layovers = trip.layovers()?;
        let layout = if self.settings.skip_template_layout {
            None
        } else {
            Some(template_layout(&trip)?)
        };
        let available_seats = match &layout {
            Some(layout) => layout.available_seats,
            None => trip.legs.iter().map(|leg| leg.available_seats).min().unwrap_or(0),
        };

        Ok(TripListing {
            route_id: trip.route_id(),
            journey_id: trip.journey_id(),
            params: LegParams::from_legs(&trip.legs),
            total_fare: trip.total_fare(),
            layovers,
            available_seats,
            layout,
            legs: trip.legs,
        })
    }

    /// Seat layout built from each leg's live seat map.
    pub async fn seat_layout(&self, params: &LegParams) -> CoreResult<SeatLayout> {
        let legs = params.decode()?;
        let vendor = &self.vendor;

        let mut layouts = Vec::with_capacity(legs.len());
        for leg in &legs {
            let entries = self
                .tokens
                .with_read_token(|token| async move { vendor.get_seat_map(&token, leg).await })
                .await?;
            layouts.push(layout::from_vendor(&entries, leg.fare)?);
        }
        combine(layouts)
    }

    pub async fn origins(&self) -> CoreResult<Vec<City>> {
        let token = self.tokens.mint(None).await?;
        self.vendor.list_origins(&token).await
    }

    pub async fn destinations(&self, origin: &str) -> CoreResult<Vec<City>> {
        let token = self.tokens.mint(None).await?;
        self.vendor.list_destinations(&token, origin).await
    }
}

/// Combined template grid for a trip, from each leg's seat counts.
pub fn template_layout(trip: &Trip) -> CoreResult<SeatLayout> {
    combine(
        trip.legs
            .iter()
            .map(|leg| layout::template(leg.available_seats, leg.occupied_seats, leg.fare))
            .collect::<CoreResult<Vec<SeatLayout>>>()?,
    )
}

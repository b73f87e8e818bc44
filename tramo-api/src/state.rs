use std::sync::Arc;
use tramo_catalog::InventoryService;
use tramo_order::BookingCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryService>,
    pub bookings: Arc<BookingCoordinator>,
}

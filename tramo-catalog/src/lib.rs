pub mod combiner;
pub mod inventory;
pub mod layout;
pub mod trips;

pub use combiner::combine;
pub use inventory::{CatalogSettings, InventoryService, TripListing};
pub use trips::filter_and_compose;

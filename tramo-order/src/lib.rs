pub mod coordinator;
pub mod discount;
pub mod models;
pub mod outcome;
pub mod passenger;
pub mod reference;

pub use coordinator::{BookingCoordinator, BookingPolicy};
pub use models::{BlockReceipt, BlockRequest, BookingLegs, Confirmation, ExtendReceipt, Release};

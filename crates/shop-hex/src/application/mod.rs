pub mod entity_service;
pub mod payment_kickoff;
pub mod user_cascade;

pub use entity_service::{EntityService, Lifecycle};

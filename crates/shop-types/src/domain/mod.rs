pub mod delivery;
pub mod entity;
pub mod order;
pub mod payment;
pub mod user;

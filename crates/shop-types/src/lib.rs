//! shop-types: domain entities and the ports shared by every service.

pub mod domain;
pub mod ports;

//! shop-hex: generic entity services, configuration and the inbound HTTP
//! adapter shared by the users, orders, payments and delivery services.

pub mod config;
pub mod errors;

pub mod application;

pub use shop_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)

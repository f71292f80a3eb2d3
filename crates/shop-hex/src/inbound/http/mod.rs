mod handlers;
mod server;

pub use handlers::resource_routes;
pub use server::{app, HttpServer, HttpServerConfig};

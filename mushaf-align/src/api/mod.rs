//! HTTP API

pub mod health;
pub mod timestamps;

pub use health::health_routes;
pub use timestamps::timestamp_routes;

//! HTTP routes for the demo service.

pub mod health;
pub mod roll;

pub use health::health_routes;
pub use roll::roll_routes;

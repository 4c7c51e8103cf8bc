//! HTTP API handlers for dashstory-api

pub mod auth;
pub mod health;
pub mod narration;
pub mod panels;
pub mod telemetry;
pub mod vision;
pub mod voices;

pub use auth::auth_routes;
pub use health::health_routes;
pub use narration::narration_routes;
pub use panels::panel_routes;
pub use telemetry::telemetry_routes;
pub use vision::vision_routes;
pub use voices::voice_routes;

// Shared components
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Domain layer
pub mod media;
pub mod resource;
pub mod template;

// Application layer
pub mod api;
pub mod server;

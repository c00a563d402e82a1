// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;

// Domain layer (business logic)
pub mod composer;
pub mod template;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod tasks;
pub mod telemetry;

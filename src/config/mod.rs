/// Database configuration and connection management
pub mod database;

/// Entitlement flags passed to gated operations
pub mod features;

/// Default template lists loaded from templates.toml
pub mod templates;

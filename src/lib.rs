//! Seva Intake — incident-intake service core.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod geocode;
pub mod server;
pub mod store;
pub mod wizard;

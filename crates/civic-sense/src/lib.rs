pub mod access;
pub mod config;
pub mod error;
pub mod quiz;
pub mod telemetry;

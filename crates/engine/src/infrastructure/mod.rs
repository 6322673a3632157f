//! Infrastructure - configuration, logging, randomness and archives.

pub mod archive;
pub mod config;
pub mod ports;
pub mod random;
pub mod telemetry;

//! Forecast proxy: location query in, simplified forecast JSON out.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod validator;
pub mod gateway;
pub mod server;

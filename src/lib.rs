//! gifloop - Live stream GIF preview generator
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod convert;
pub mod publish;
pub mod runner;
pub mod server;

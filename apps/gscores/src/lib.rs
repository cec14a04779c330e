//! # gscores
//!
//! HTTP API, CLI and configuration for G-Scores. The binary in `main.rs` is
//! a thin entry point over this library so integration tests can build the
//! router directly.

pub mod api;
pub mod cli;
pub mod config;

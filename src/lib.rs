//! `hotel-insights` library crate.
//!
//! The binary (`hotels`) is a thin wrapper around this library so that:
//!
//! - aggregation and view selection are testable without spawning processes
//! - the same chart specs feed the text plots, the TUI and the exports

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod tui;
pub mod views;

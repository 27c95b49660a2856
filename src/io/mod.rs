//! Input/output helpers.
//!
//! - CSV ingest into the bookings table (`ingest`)
//! - chart spec JSON read/write (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;

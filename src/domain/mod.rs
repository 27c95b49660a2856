//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - the booking schema (`Field`, `FieldKind`, `BookingRecord`)
//! - selection enums (`Insight`, `GroupBy`)
//! - chart specifications handed to presentation sinks (`ChartSpec`, `ChartData`)
//! - the loaded columnar table (`BookingTable`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;

//! Stateless aggregations over the bookings table.
//!
//! - counts, means, ratios, frequency tables (`aggregate`)
//! - correlation matrix (`correlation`)

pub mod aggregate;
pub mod correlation;

pub use aggregate::*;
pub use correlation::*;

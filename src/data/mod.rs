//! Data sources other than the user's CSV.
//!
//! - seeded synthetic bookings (`sample`)

pub mod sample;

pub use sample::*;

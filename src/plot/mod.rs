//! Text rendering of chart specs (the non-interactive presentation sink).

pub mod ascii;

pub use ascii::*;

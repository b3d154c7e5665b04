//! Data sources: seeded Beta samplers.

pub mod mt19937;
pub mod sample;

pub use mt19937::{LegacyRandomState, Mt19937};
pub use sample::*;

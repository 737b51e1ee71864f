//! Analysis modules.
//!
//! Turns recorded answers into per-option tallies.

pub mod aggregator;

pub use aggregator::*;

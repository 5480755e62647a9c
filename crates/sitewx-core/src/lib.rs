//! Core data types, null-safe statistics, and display units for sitewx
//!
//! This crate holds the plain-data model shared by every pipeline stage:
//! parsed samples, hourly slots, daily and monthly aggregates, and the
//! month calendar grid handed to the presentation layer.

pub mod calendar;
pub mod rollups;
pub mod types;
pub mod units;

pub use calendar::*;
pub use rollups::*;
pub use types::*;
pub use units::*;

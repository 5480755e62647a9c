//! Hourly, daily, and monthly roll-ups of station samples
//!
//! Each stage consumes the previous stage's output and produces a fresh,
//! calendar-ordered result. [`Pipeline`] chains them from raw export text
//! to a [`Report`].

pub mod calendar;
pub mod chart;
pub mod daily;
pub mod hourly;
pub mod monthly;
pub mod pipeline;

pub use calendar::*;
pub use chart::*;
pub use daily::*;
pub use hourly::*;
pub use monthly::*;
pub use pipeline::*;

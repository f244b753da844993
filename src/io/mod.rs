//! CSV export of dispatch schedules and benchmark series.

pub mod export;

//! Hydro plant generation-schedule optimizer and revenue benchmarker.

pub mod config;
pub mod io;
/// Dispatch optimization: LP and greedy scheduling, storage simulation, benchmark.
pub mod opt;
pub mod prices;

//! Dispatch optimization core: solver, heuristics, and benchmarking.

/// Three-way revenue benchmark engine.
pub mod benchmark;
/// Price-ranked constructive schedule builder.
pub mod greedy;
/// Band LP formulation of the dispatch problem.
pub mod lp;
pub mod optimizer;
/// Dense-tableau primal simplex.
pub mod simplex;
/// Reservoir volume simulation.
pub mod storage;
pub mod types;

// Re-export the main types for convenience
pub use benchmark::{BenchmarkResult, run_benchmark};
pub use optimizer::{DispatchReport, OptimizedSchedule, optimize, optimize_horizon};
pub use simplex::{LpSolution, SolveStatus, solve_lp};
pub use types::{OptError, OptimizeMethod, PlantParameters, Schedule, Strategy};

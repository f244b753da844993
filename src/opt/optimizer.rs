//! Dispatch orchestration: validation, strategy dispatch, result assembly.

use std::fmt;

use serde::Serialize;

use super::greedy;
use super::lp;
use super::simplex::{self, SolveStatus};
use super::storage::{self, VOLUME_EPS};
use super::types::{OptError, OptimizeMethod, PlantParameters, Schedule, Strategy};

/// Outcome of one optimization run.
#[derive(Debug, Clone)]
pub struct OptimizedSchedule {
    /// The accepted schedule with derived flow and volume trajectories.
    pub schedule: Schedule,
    /// Revenue of the schedule against the input price series.
    pub revenue: f64,
    /// Which path produced the schedule.
    pub method: OptimizeMethod,
    /// True only when the LP path ran to a verified optimum.
    pub solver_success: bool,
}

impl OptimizedSchedule {
    /// Mean generation over the horizon (MW).
    pub fn avg_generation(&self) -> f64 {
        let power = &self.schedule.power_mw;
        if power.is_empty() {
            0.0
        } else {
            power.iter().sum::<f64>() / power.len() as f64
        }
    }

    /// Highest generation over the horizon (MW).
    pub fn peak_generation(&self) -> f64 {
        let power = &self.schedule.power_mw;
        if power.is_empty() {
            0.0
        } else {
            power.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    }
}

/// Computes a revenue-maximizing schedule for a price series.
///
/// Plant bounds are validated before any computation. With
/// [`Strategy::Greedy`] only the heuristic runs; with [`Strategy::Auto`] or
/// [`Strategy::LinearProgram`] the band LP is attempted first and the
/// heuristic substitutes for it whenever the LP cannot be used: shifted
/// origin infeasible, solver stopped `Unbounded` or over its pivot budget,
/// or the mapped schedule failing the storage band. The path that actually
/// produced the result is always reported, never hidden.
///
/// # Errors
///
/// Returns [`OptError::InvalidParameters`] when the plant bounds are
/// malformed.
pub fn optimize(
    prices: &[f64],
    params: &PlantParameters,
    strategy: Strategy,
) -> Result<OptimizedSchedule, OptError> {
    optimize_with_floor(prices, params, strategy, None)
}

/// [`optimize`] with an optional floor on the end-of-horizon volume.
pub fn optimize_with_floor(
    prices: &[f64],
    params: &PlantParameters,
    strategy: Strategy,
    final_volume_floor: Option<f64>,
) -> Result<OptimizedSchedule, OptError> {
    params.validate()?;

    if strategy != Strategy::Greedy {
        if let Some(schedule) = try_lp(prices, params, final_volume_floor) {
            let revenue = schedule.revenue(prices);
            return Ok(OptimizedSchedule {
                schedule,
                revenue,
                method: OptimizeMethod::LinearProgramming,
                solver_success: true,
            });
        }
    }

    let schedule = greedy::build_schedule_with_floor(prices, params, final_volume_floor);
    let revenue = schedule.revenue(prices);
    Ok(OptimizedSchedule {
        schedule,
        revenue,
        method: OptimizeMethod::GreedyHeuristic,
        solver_success: false,
    })
}

/// [`optimize`] over the leading `horizon` steps of a longer price series.
///
/// # Errors
///
/// Returns [`OptError::InsufficientData`] when fewer than `horizon` price
/// points are available, alongside the available count so the caller can
/// shorten the horizon.
pub fn optimize_horizon(
    prices: &[f64],
    horizon: usize,
    params: &PlantParameters,
    strategy: Strategy,
    final_volume_floor: Option<f64>,
) -> Result<OptimizedSchedule, OptError> {
    if prices.len() < horizon {
        return Err(OptError::InsufficientData {
            requested: horizon,
            available: prices.len(),
        });
    }
    optimize_with_floor(&prices[..horizon], params, strategy, final_volume_floor)
}

/// Runs the LP path end to end, returning `None` whenever the heuristic
/// must substitute.
fn try_lp(
    prices: &[f64],
    params: &PlantParameters,
    final_volume_floor: Option<f64>,
) -> Option<Schedule> {
    let problem = lp::build_band_lp(prices, params, final_volume_floor);
    if !problem.is_origin_feasible() {
        return None;
    }
    let solution = simplex::solve_lp(&problem.objective, &problem.constraints, &problem.rhs);
    if solution.status != SolveStatus::Optimal {
        return None;
    }
    let schedule = lp::schedule_from_solution(&solution.x, params);
    if !storage::within_band(&schedule.volume_m3, params) {
        return None;
    }
    if let Some(floor) = final_volume_floor {
        let last = schedule.volume_m3.last().copied()?;
        if last < floor - VOLUME_EPS {
            return None;
        }
    }
    Some(schedule)
}

/// Flat summary of a dispatch run for the JSON boundary.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// Plant parameters the schedule was computed for.
    pub params: PlantParameters,
    /// Revenue against the input price series.
    pub revenue: f64,
    /// Mean generation (MW).
    pub avg_generation: f64,
    /// Highest generation (MW).
    pub peak_generation: f64,
    /// Mean generation as a percentage of `p_max`.
    pub capacity_factor: f64,
    /// Which path produced the schedule.
    pub optimization_method: OptimizeMethod,
    /// True only when the LP path ran to a verified optimum.
    pub solver_success: bool,
    /// Generation per step (MW).
    pub power_mw: Vec<f64>,
    /// Turbine flow per step (m³/s).
    pub flow_m3s: Vec<f64>,
    /// Reservoir trajectory, one extra leading entry (m³).
    pub volume_m3: Vec<f64>,
}

impl DispatchReport {
    /// Assembles the report from an optimization result.
    pub fn new(result: &OptimizedSchedule, params: &PlantParameters) -> Self {
        let avg_generation = result.avg_generation();
        let capacity_factor = if params.p_max > 0.0 {
            100.0 * avg_generation / params.p_max
        } else {
            0.0
        };
        Self {
            params: params.clone(),
            revenue: result.revenue,
            avg_generation,
            peak_generation: result.peak_generation(),
            capacity_factor,
            optimization_method: result.method,
            solver_success: result.solver_success,
            power_mw: result.schedule.power_mw.clone(),
            flow_m3s: result.schedule.flow_m3s.clone(),
            volume_m3: result.schedule.volume_m3.clone(),
        }
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Dispatch Summary ---")?;
        writeln!(f, "Method:            {}", self.optimization_method)?;
        writeln!(f, "Solver success:    {}", self.solver_success)?;
        writeln!(f, "Revenue:           {:.2} USD", self.revenue)?;
        writeln!(f, "Avg generation:    {:.3} MW", self.avg_generation)?;
        writeln!(f, "Peak generation:   {:.3} MW", self.peak_generation)?;
        writeln!(f, "Capacity factor:   {:.1}%", self.capacity_factor)?;
        write!(
            f,
            "Final volume:      {:.1} m³",
            self.volume_m3.last().copied().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn narrow_band_params() -> PlantParameters {
        PlantParameters {
            p_min: 0.0,
            p_max: 2.0,
            s0: 10.0,
            s_min: 8.0,
            s_max: 10.0,
            kappa: 1.0,
            inflow: 0.0,
            step_seconds: 1.0,
        }
    }

    #[test]
    fn malformed_bounds_fail_before_any_solve() {
        let mut params = narrow_band_params();
        params.p_min = 5.0;
        let err = optimize(&[1.0, 2.0], &params, Strategy::Auto).unwrap_err();
        assert!(matches!(err, OptError::InvalidParameters { .. }));
    }

    #[test]
    fn greedy_strategy_is_reported_as_heuristic() {
        let params = narrow_band_params();
        let result = optimize(&[10.0, 50.0, 20.0], &params, Strategy::Greedy).unwrap();
        assert_eq!(result.method, OptimizeMethod::GreedyHeuristic);
        assert!(!result.solver_success);
        assert_eq!(result.schedule.power_mw, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn auto_prefers_the_lp_path() {
        let params = narrow_band_params();
        let result = optimize(&[10.0, 50.0, 20.0], &params, Strategy::Auto).unwrap();
        assert_eq!(result.method, OptimizeMethod::LinearProgramming);
        assert!(result.solver_success);
        assert!((result.revenue - 100.0).abs() < 1e-6);
    }

    #[test]
    fn infeasible_origin_falls_back_to_heuristic() {
        // Inflow alone overflows the band, so the shifted LP origin is
        // unusable and the heuristic substitutes.
        let mut params = narrow_band_params();
        params.inflow = 5.0;
        let result = optimize(&[1.0, 1.0], &params, Strategy::LinearProgram).unwrap();
        assert_eq!(result.method, OptimizeMethod::GreedyHeuristic);
        assert!(!result.solver_success);
    }

    #[test]
    fn lp_beats_greedy_under_a_volume_floor() {
        // The heuristic can only raise whole hours to p_max; with 1 m³ of
        // drainable volume it raises nothing while the LP takes a partial
        // raise in the best hour.
        let params = narrow_band_params();
        let prices = [10.0, 50.0, 20.0];
        let lp = optimize_with_floor(&prices, &params, Strategy::Auto, Some(9.0)).unwrap();
        let greedy = optimize_with_floor(&prices, &params, Strategy::Greedy, Some(9.0)).unwrap();
        assert_eq!(lp.method, OptimizeMethod::LinearProgramming);
        assert!((lp.revenue - 50.0).abs() < 1e-6);
        assert_eq!(greedy.revenue, 0.0);
        assert!(lp.revenue >= greedy.revenue);
    }

    #[test]
    fn horizon_slicing_checks_available_data() {
        let params = narrow_band_params();
        let prices = [10.0, 50.0];
        let err = optimize_horizon(&prices, 24, &params, Strategy::Greedy, None).unwrap_err();
        assert_eq!(
            err,
            OptError::InsufficientData {
                requested: 24,
                available: 2,
            }
        );

        let ok = optimize_horizon(&prices, 1, &params, Strategy::Greedy, None).unwrap();
        assert_eq!(ok.schedule.horizon(), 1);
    }

    #[test]
    fn revenue_matches_price_weighted_sum() {
        let params = narrow_band_params();
        let prices = [10.0, 50.0, 20.0];
        let result = optimize(&prices, &params, Strategy::Auto).unwrap();
        let dot: f64 = result
            .schedule
            .power_mw
            .iter()
            .zip(&prices)
            .map(|(p, pr)| p * pr)
            .sum();
        assert!((result.revenue - dot).abs() <= 1e-9 * dot.abs().max(1.0));
    }

    #[test]
    fn report_carries_boundary_keys() {
        let params = narrow_band_params();
        let result = optimize(&[10.0, 50.0, 20.0], &params, Strategy::Auto).unwrap();
        let report = DispatchReport::new(&result, &params);
        let value = serde_json::to_value(&report).unwrap();

        for key in [
            "params",
            "revenue",
            "avg_generation",
            "peak_generation",
            "capacity_factor",
            "optimization_method",
            "solver_success",
            "power_mw",
            "flow_m3s",
            "volume_m3",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        for key in [
            "p_min", "p_max", "s0", "s_min", "s_max", "kappa", "inflow",
        ] {
            assert!(
                value["params"].get(key).is_some(),
                "missing params key {key}"
            );
        }
        assert_eq!(value["optimization_method"], "linear_programming");
        assert_eq!(value["solver_success"], true);
    }

    #[test]
    fn report_metrics() {
        let params = narrow_band_params();
        let result = optimize(&[10.0, 50.0, 20.0], &params, Strategy::Greedy).unwrap();
        let report = DispatchReport::new(&result, &params);
        // P = [0, 2, 0]
        assert!((report.avg_generation - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.peak_generation - 2.0).abs() < 1e-12);
        assert!((report.capacity_factor - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_horizon_metrics_are_zero() {
        let params = narrow_band_params();
        let result = optimize(&[], &params, Strategy::Greedy).unwrap();
        assert_eq!(result.avg_generation(), 0.0);
        assert_eq!(result.peak_generation(), 0.0);
        assert_eq!(result.revenue, 0.0);
    }
}

//! Band LP formulation of the dispatch problem.
//!
//! Generation is shifted to `u[t] = P[t] - p_min` so every variable is
//! non-negative and the all-`p_min` baseline becomes the tableau origin.
//! Reservoir bounds turn into a band of cumulative-flow inequalities.

use super::types::{PlantParameters, Schedule};

/// A standard-form maximize-with-`<=` problem, built and consumed within
/// one solve.
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Objective coefficients, one per variable.
    pub objective: Vec<f64>,
    /// Constraint matrix, row-major.
    pub constraints: Vec<Vec<f64>>,
    /// Right-hand sides, one per constraint row.
    pub rhs: Vec<f64>,
}

impl LpProblem {
    /// Whether the all-zero point satisfies every constraint, i.e. whether
    /// the slack basis is a valid starting point for the tableau method.
    pub fn is_origin_feasible(&self) -> bool {
        self.rhs.iter().all(|&v| v >= 0.0)
    }
}

/// Builds the cumulative-flow band LP for a price series.
///
/// Variables are the per-step raises above `p_min`. Per step `t` the
/// problem carries three rows: the raise cap `u[t] <= p_max - p_min`, a
/// lower band row keeping `S[t + 1] >= s_min`, and an upper band row
/// keeping `S[t + 1] <= s_max`, both expressed over the cumulative drained
/// volume `sum(kappa * u[i] * step_seconds, i <= t)`. An optional final
/// row keeps the end-of-horizon volume at or above `final_volume_floor`.
pub fn build_band_lp(
    prices: &[f64],
    params: &PlantParameters,
    final_volume_floor: Option<f64>,
) -> LpProblem {
    let steps = prices.len();
    let cap = params.p_max - params.p_min;
    // m³ drained per unit of raise held for one step.
    let kv = params.kappa * params.step_seconds;
    // m³ gained per step while running at p_min.
    let drift = params.step_volume_delta(params.p_min);

    let mut constraints = Vec::with_capacity(3 * steps + 1);
    let mut rhs = Vec::with_capacity(3 * steps + 1);

    for t in 0..steps {
        let mut row = vec![0.0; steps];
        row[t] = 1.0;
        constraints.push(row);
        rhs.push(cap);
    }

    for t in 0..steps {
        let mut row = vec![0.0; steps];
        for v in &mut row[..=t] {
            *v = kv;
        }
        constraints.push(row);
        rhs.push(params.s0 - params.s_min + (t + 1) as f64 * drift);
    }

    for t in 0..steps {
        let mut row = vec![0.0; steps];
        for v in &mut row[..=t] {
            *v = -kv;
        }
        constraints.push(row);
        rhs.push(params.s_max - params.s0 - (t + 1) as f64 * drift);
    }

    if let Some(floor) = final_volume_floor {
        constraints.push(vec![kv; steps]);
        rhs.push(params.s0 - floor + steps as f64 * drift);
    }

    LpProblem {
        objective: prices.to_vec(),
        constraints,
        rhs,
    }
}

/// Maps a solver vector back to a generation schedule.
///
/// Raises are clamped to `[0, p_max - p_min]` to absorb solver roundoff
/// before the trajectory is derived.
pub fn schedule_from_solution(x: &[f64], params: &PlantParameters) -> Schedule {
    let cap = params.p_max - params.p_min;
    let power = x
        .iter()
        .map(|&u| params.p_min + u.clamp(0.0, cap))
        .collect();
    Schedule::from_power(power, params)
}

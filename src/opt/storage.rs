//! Reservoir volume simulation for a candidate generation trajectory.

use super::types::PlantParameters;

/// Absolute tolerance (m³) when checking volumes against the storage band.
pub const VOLUME_EPS: f64 = 1e-6;

/// Simulates the reservoir trajectory produced by a generation trajectory.
///
/// Returns a vector of length `power_mw.len() + 1` where entry 0 is the
/// initial volume `s0` and entry `t + 1` is the volume after step `t`:
/// `S[t + 1] = S[t] + (inflow - kappa * P[t]) * step_seconds`.
///
/// Pure function of its inputs; performs no bound checking.
pub fn simulate(power_mw: &[f64], params: &PlantParameters) -> Vec<f64> {
    let mut volume = Vec::with_capacity(power_mw.len() + 1);
    volume.push(params.s0);
    let mut current = params.s0;
    for &p in power_mw {
        current += params.step_volume_delta(p);
        volume.push(current);
    }
    volume
}

/// Whether every volume lies inside `[s_min, s_max]` within [`VOLUME_EPS`].
pub fn within_band(volume_m3: &[f64], params: &PlantParameters) -> bool {
    volume_m3
        .iter()
        .all(|&v| v >= params.s_min - VOLUME_EPS && v <= params.s_max + VOLUME_EPS)
}

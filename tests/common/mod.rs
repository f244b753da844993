//! Shared test fixtures for integration tests.

use hydro_sched::opt::types::PlantParameters;
use hydro_sched::prices::PriceModel;

/// Default plant (0.5–3 MW band, balanced inflow, hourly steps).
pub fn default_params() -> PlantParameters {
    PlantParameters {
        p_min: 0.5,
        p_max: 3.0,
        s0: 25_000.0,
        s_min: 1_000.0,
        s_max: 50_000.0,
        kappa: 0.667,
        inflow: 0.33,
        step_seconds: 3600.0,
    }
}

/// Plant with a narrow reservoir band: only a few hours can run at full
/// power before the drainable budget is gone.
pub fn tight_params() -> PlantParameters {
    PlantParameters {
        s0: 28_000.0,
        s_min: 5_000.0,
        s_max: 30_000.0,
        inflow: 0.3,
        ..default_params()
    }
}

/// Deterministic daily price curve (base 70, amp 30, noise 3, seed 42).
pub fn daily_prices(steps: usize) -> Vec<f64> {
    let mut model = PriceModel::new(70.0, 30.0, 0.0, 3.0, 24, 42);
    model.generate(steps)
}

/// Flat price series with no daily structure.
pub fn flat_prices(level: f64, steps: usize) -> Vec<f64> {
    vec![level; steps]
}

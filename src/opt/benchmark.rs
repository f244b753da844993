//! Three-way revenue benchmark: flat baseline, forecast-driven schedule,
//! perfect-foresight schedule.

use std::fmt;

use serde::Serialize;

use super::optimizer;
use super::types::{OptError, PlantParameters, Strategy};

/// Steps per daily breakdown window.
pub const DAY_STEPS: usize = 24;

/// Per-step series underlying the benchmark summary.
#[derive(Debug, Clone, Serialize)]
pub struct HourlySeries {
    /// Realized prices the three schedules are graded on.
    pub historical_prices: Vec<f64>,
    /// Forecast prices the programmed schedule was built from.
    pub programmed_prices: Vec<f64>,
    /// Flat baseline generation (MW).
    pub power_stable: Vec<f64>,
    /// Forecast-driven generation (MW).
    pub power_programmed: Vec<f64>,
    /// Perfect-foresight generation (MW).
    pub power_hindsight: Vec<f64>,
}

/// Revenues and local efficiency of one 24-step window.
///
/// A trailing partial window is reported as its own shorter day so every
/// step is accounted for.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    /// Day number, starting at 1.
    pub day: usize,
    /// Steps in this window (24 except for a trailing partial day).
    pub steps: usize,
    pub revenue_stable: f64,
    pub revenue_programmed: f64,
    pub revenue_hindsight: f64,
    pub efficiency_pct: f64,
}

/// Outcome of a benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    /// Flat baseline generation level (MW).
    pub p_stable: f64,
    /// Revenue of the flat baseline against realized prices.
    pub revenue_stable: f64,
    /// Revenue of the forecast-driven schedule against realized prices.
    pub revenue_programmed: f64,
    /// Revenue of the perfect-foresight schedule (the ceiling).
    pub revenue_hindsight: f64,
    /// `100 * programmed / hindsight`; 0 when hindsight is not positive.
    pub efficiency_pct: f64,
    /// `100 * (programmed - stable) / stable`; 0 when stable revenue is 0.
    pub improvement_vs_stable_pct: f64,
    /// Per-step series behind the summary numbers.
    pub hourly: HourlySeries,
    /// Per-24-step-window breakdown.
    pub daily: Vec<DaySummary>,
}

/// Grades a forecast-driven dispatch against hindsight and a flat baseline.
///
/// Three schedules are computed: the *stable* schedule holds `p_stable`
/// flat (a yardstick policy, not optimized and not storage-checked); the
/// *programmed* schedule is optimized against the forecast series and then
/// graded against the realized series; the *hindsight* schedule is
/// optimized directly against the realized series. All three revenues use
/// realized prices.
///
/// # Errors
///
/// Returns [`OptError::InsufficientData`] when the two series differ in
/// length or are empty, and [`OptError::InvalidParameters`] for malformed
/// plant bounds.
pub fn run_benchmark(
    realized: &[f64],
    forecast: &[f64],
    params: &PlantParameters,
    p_stable: f64,
    strategy: Strategy,
    final_volume_floor: Option<f64>,
) -> Result<BenchmarkResult, OptError> {
    if realized.is_empty() || realized.len() != forecast.len() {
        return Err(OptError::InsufficientData {
            requested: realized.len(),
            available: forecast.len(),
        });
    }
    params.validate()?;

    let programmed = optimizer::optimize_with_floor(forecast, params, strategy, final_volume_floor)?;
    let hindsight = optimizer::optimize_with_floor(realized, params, strategy, final_volume_floor)?;

    let power_stable = vec![p_stable; realized.len()];
    let power_programmed = programmed.schedule.power_mw;
    let power_hindsight = hindsight.schedule.power_mw;

    let revenue_stable = dot(&power_stable, realized);
    // Forecast-built schedule, graded on what prices actually did.
    let revenue_programmed = dot(&power_programmed, realized);
    let revenue_hindsight = dot(&power_hindsight, realized);

    let improvement_vs_stable_pct = if revenue_stable != 0.0 {
        100.0 * (revenue_programmed - revenue_stable) / revenue_stable
    } else {
        0.0
    };

    let mut daily = Vec::new();
    let mut start = 0;
    while start < realized.len() {
        let end = (start + DAY_STEPS).min(realized.len());
        let window = start..end;
        let day_stable = dot(&power_stable[window.clone()], &realized[window.clone()]);
        let day_programmed = dot(&power_programmed[window.clone()], &realized[window.clone()]);
        let day_hindsight = dot(&power_hindsight[window.clone()], &realized[window.clone()]);
        daily.push(DaySummary {
            day: daily.len() + 1,
            steps: end - start,
            revenue_stable: day_stable,
            revenue_programmed: day_programmed,
            revenue_hindsight: day_hindsight,
            efficiency_pct: efficiency_pct(day_programmed, day_hindsight),
        });
        start = end;
    }

    Ok(BenchmarkResult {
        p_stable,
        revenue_stable,
        revenue_programmed,
        revenue_hindsight,
        efficiency_pct: efficiency_pct(revenue_programmed, revenue_hindsight),
        improvement_vs_stable_pct,
        hourly: HourlySeries {
            historical_prices: realized.to_vec(),
            programmed_prices: forecast.to_vec(),
            power_stable,
            power_programmed,
            power_hindsight,
        },
        daily,
    })
}

fn dot(power: &[f64], prices: &[f64]) -> f64 {
    power.iter().zip(prices).map(|(p, price)| p * price).sum()
}

fn efficiency_pct(programmed: f64, hindsight: f64) -> f64 {
    if hindsight > 0.0 {
        100.0 * programmed / hindsight
    } else {
        0.0
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Benchmark Report ---")?;
        writeln!(f, "Flat baseline:       {:.3} MW", self.p_stable)?;
        writeln!(f, "Stable revenue:      {:.2} USD", self.revenue_stable)?;
        writeln!(f, "Programmed revenue:  {:.2} USD", self.revenue_programmed)?;
        writeln!(f, "Hindsight revenue:   {:.2} USD", self.revenue_hindsight)?;
        writeln!(f, "Efficiency:          {:.1}%", self.efficiency_pct)?;
        write!(
            f,
            "Vs stable:           {:+.1}%",
            self.improvement_vs_stable_pct
        )?;
        for d in &self.daily {
            write!(
                f,
                "\n  day {:>2} ({:>2} steps): eff {:>5.1}%  prog {:.2}  hind {:.2}",
                d.day, d.steps, d.efficiency_pct, d.revenue_programmed, d.revenue_hindsight
            )?;
        }
        Ok(())
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

    fn roomy_params() -> PlantParameters {
        PlantParameters {
            p_min: 0.5,
            p_max: 3.0,
            s0: 1.0e7,
            s_min: 0.0,
            s_max: 1.0e9,
            kappa: 0.667,
            inflow: 1.0,
            step_seconds: 3600.0,
        }
    }

    #[test]
    fn mismatched_series_rejected() {
        let params = narrow_band_params();
        let err = run_benchmark(
            &[1.0, 2.0, 3.0],
            &[1.0, 2.0],
            &params,
            1.0,
            Strategy::Greedy,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            OptError::InsufficientData {
                requested: 3,
                available: 2,
            }
        );
    }

    #[test]
    fn empty_series_rejected() {
        let params = narrow_band_params();
        let err = run_benchmark(&[], &[], &params, 1.0, Strategy::Greedy, None).unwrap_err();
        assert!(matches!(err, OptError::InsufficientData { .. }));
    }

    #[test]
    fn bad_params_rejected_after_data_check() {
        let mut params = narrow_band_params();
        params.s_min = 20.0;
        let err = run_benchmark(
            &[1.0, 2.0],
            &[1.0, 2.0],
            &params,
            1.0,
            Strategy::Greedy,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, OptError::InvalidParameters { .. }));
    }

    #[test]
    fn bad_forecast_costs_revenue() {
        // The forecast swaps the cheap and expensive hours, so the
        // programmed schedule drains its budget in the wrong hour.
        let params = narrow_band_params();
        let realized = [10.0, 50.0, 20.0];
        let forecast = [50.0, 10.0, 20.0];
        let result =
            run_benchmark(&realized, &forecast, &params, 1.0, Strategy::Greedy, None).unwrap();

        assert!((result.revenue_hindsight - 100.0).abs() < 1e-9);
        assert!((result.revenue_programmed - 20.0).abs() < 1e-9);
        assert!((result.revenue_stable - 80.0).abs() < 1e-9);
        assert!((result.efficiency_pct - 20.0).abs() < 1e-9);
        assert!((result.improvement_vs_stable_pct - (-75.0)).abs() < 1e-9);
        assert!(result.revenue_hindsight >= result.revenue_programmed);
    }

    #[test]
    fn perfect_forecast_reaches_full_efficiency() {
        let params = roomy_params();
        let prices = vec![100.0; 24];
        let result = run_benchmark(&prices, &prices, &params, 1.0, Strategy::Auto, None).unwrap();
        assert!((result.revenue_programmed - result.revenue_hindsight).abs() < 1e-9);
        assert!((result.efficiency_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn hindsight_is_a_ceiling() {
        let params = narrow_band_params();
        let realized = [30.0, 10.0, 40.0, 25.0];
        let forecast = [10.0, 40.0, 25.0, 30.0];
        let result =
            run_benchmark(&realized, &forecast, &params, 0.5, Strategy::Greedy, None).unwrap();
        assert!(result.revenue_hindsight >= result.revenue_programmed - 1e-9);
        assert!(result.efficiency_pct >= 0.0 && result.efficiency_pct <= 100.0 + 1e-9);
    }

    #[test]
    fn hourly_series_align_with_horizon() {
        let params = narrow_band_params();
        let realized = [10.0, 50.0, 20.0];
        let forecast = [12.0, 45.0, 22.0];
        let result =
            run_benchmark(&realized, &forecast, &params, 1.0, Strategy::Greedy, None).unwrap();
        let h = &result.hourly;
        assert_eq!(h.historical_prices.len(), 3);
        assert_eq!(h.programmed_prices.len(), 3);
        assert_eq!(h.power_stable, vec![1.0; 3]);
        assert_eq!(h.power_programmed.len(), 3);
        assert_eq!(h.power_hindsight.len(), 3);
    }

    #[test]
    fn daily_windows_cover_every_step() {
        let params = roomy_params();
        let realized: Vec<f64> = (0..60).map(|t| 50.0 + (t % 24) as f64).collect();
        let forecast = realized.clone();
        let result =
            run_benchmark(&realized, &forecast, &params, 1.0, Strategy::Greedy, None).unwrap();

        assert_eq!(result.daily.len(), 3);
        assert_eq!(result.daily[0].day, 1);
        assert_eq!(result.daily[0].steps, 24);
        assert_eq!(result.daily[1].steps, 24);
        assert_eq!(result.daily[2].steps, 12);

        let sum: f64 = result.daily.iter().map(|d| d.revenue_programmed).sum();
        assert!((sum - result.revenue_programmed).abs() < 1e-9 * sum.abs().max(1.0));
    }

    #[test]
    fn zero_stable_revenue_guards_improvement() {
        let params = narrow_band_params();
        let realized = [10.0, 50.0, 20.0];
        let result =
            run_benchmark(&realized, &realized, &params, 0.0, Strategy::Greedy, None).unwrap();
        assert_eq!(result.revenue_stable, 0.0);
        assert_eq!(result.improvement_vs_stable_pct, 0.0);
    }

    #[test]
    fn report_lists_every_day() {
        let params = roomy_params();
        let realized: Vec<f64> = (0..48).map(|t| 60.0 + (t % 7) as f64).collect();
        let result =
            run_benchmark(&realized, &realized, &params, 1.0, Strategy::Greedy, None).unwrap();
        let text = result.to_string();
        assert!(text.contains("--- Benchmark Report ---"));
        assert!(text.contains("day  1"));
        assert!(text.contains("day  2"));
    }
}

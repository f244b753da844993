//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::opt::storage;
use crate::opt::types::{PlantParameters, Strategy};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Plant and reservoir physical parameters.
    #[serde(default)]
    pub plant: PlantConfig,
    /// Scheduling horizon parameters.
    #[serde(default)]
    pub horizon: HorizonConfig,
    /// Price series source parameters.
    #[serde(default)]
    pub prices: PricesConfig,
    /// Optimizer strategy parameters.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Benchmark parameters.
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
}

/// Plant and reservoir physical parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Minimum (must-run) generation (MW).
    pub p_min_mw: f64,
    /// Maximum generation (MW).
    pub p_max_mw: f64,
    /// Initial reservoir volume (m³).
    pub s0_m3: f64,
    /// Lower reservoir bound (m³).
    pub s_min_m3: f64,
    /// Upper reservoir bound (m³).
    pub s_max_m3: f64,
    /// Flow conversion factor ((m³/s)/MW).
    pub kappa: f64,
    /// Natural inflow (m³/s).
    pub inflow_m3s: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            p_min_mw: 0.5,
            p_max_mw: 3.0,
            s0_m3: 25_000.0,
            s_min_m3: 1_000.0,
            s_max_m3: 50_000.0,
            kappa: 0.667,
            inflow_m3s: 0.33,
        }
    }
}

/// Scheduling horizon parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HorizonConfig {
    /// Number of scheduling steps (must be > 0).
    pub steps: usize,
    /// Duration of one step in seconds (must be > 0).
    pub step_seconds: f64,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            steps: 24,
            step_seconds: 3600.0,
        }
    }
}

/// Price series source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricesConfig {
    /// Price source: `"synthetic"` or `"csv"`.
    pub source: String,
    /// CSV path, required when `source = "csv"`.
    pub csv_path: Option<String>,
    /// Mean price level for the synthetic curve (USD/MWh).
    pub base_usd_mwh: f64,
    /// Daily swing amplitude for the synthetic curve (USD/MWh).
    pub amp_usd_mwh: f64,
    /// Phase offset of the synthetic curve (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (USD/MWh).
    pub noise_std: f64,
    /// Random seed for synthetic noise.
    pub seed: u64,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            source: "synthetic".to_string(),
            csv_path: None,
            base_usd_mwh: 70.0,
            amp_usd_mwh: 30.0,
            phase_rad: 0.0,
            noise_std: 3.0,
            seed: 42,
        }
    }
}

/// Optimizer strategy parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Strategy: `"auto"`, `"lp"`, or `"greedy"`.
    pub strategy: String,
    /// Optional floor on the end-of-horizon reservoir volume (m³).
    pub final_volume_floor_m3: Option<f64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: "auto".to_string(),
            final_volume_floor_m3: None,
        }
    }
}

/// Benchmark parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Whether the benchmark runs after the dispatch.
    pub enabled: bool,
    /// Flat baseline generation level (MW).
    pub p_stable_mw: f64,
    /// CSV path for the forecast series; when absent the forecast is the
    /// realized series plus seeded noise.
    pub forecast_csv_path: Option<String>,
    /// Gaussian noise applied to synthesize the forecast (USD/MWh).
    pub forecast_noise_std: f64,
    /// Random seed for forecast synthesis.
    pub forecast_seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            p_stable_mw: 1.0,
            forecast_csv_path: None,
            forecast_noise_std: 8.0,
            forecast_seed: 7,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"plant.p_min_mw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: one hourly day of dispatch for a
    /// mid-size plant with a balanced reservoir.
    pub fn baseline() -> Self {
        Self {
            plant: PlantConfig::default(),
            horizon: HorizonConfig::default(),
            prices: PricesConfig::default(),
            optimizer: OptimizerConfig::default(),
            benchmark: BenchmarkConfig::default(),
        }
    }

    /// Returns the wet-week preset: a week-long horizon with surplus
    /// inflow, benchmark enabled.
    pub fn wet_week() -> Self {
        Self {
            plant: PlantConfig {
                p_min_mw: 1.0,
                inflow_m3s: 0.7,
                ..PlantConfig::default()
            },
            horizon: HorizonConfig {
                steps: 168,
                ..HorizonConfig::default()
            },
            prices: PricesConfig {
                seed: 11,
                ..PricesConfig::default()
            },
            optimizer: OptimizerConfig::default(),
            benchmark: BenchmarkConfig {
                enabled: true,
                p_stable_mw: 1.5,
                ..BenchmarkConfig::default()
            },
        }
    }

    /// Returns the tight-band preset: two days against a narrow reservoir
    /// band where only a few peak hours can run at full power.
    pub fn tight_band() -> Self {
        Self {
            plant: PlantConfig {
                s0_m3: 28_000.0,
                s_min_m3: 5_000.0,
                s_max_m3: 30_000.0,
                inflow_m3s: 0.3,
                ..PlantConfig::default()
            },
            horizon: HorizonConfig {
                steps: 48,
                ..HorizonConfig::default()
            },
            prices: PricesConfig {
                amp_usd_mwh: 35.0,
                noise_std: 5.0,
                seed: 99,
                ..PricesConfig::default()
            },
            optimizer: OptimizerConfig::default(),
            benchmark: BenchmarkConfig::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "wet_week", "tight_band"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "wet_week" => Ok(Self::wet_week()),
            "tight_band" => Ok(Self::tight_band()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Core plant parameters for the configured plant and step length.
    pub fn plant_parameters(&self) -> PlantParameters {
        PlantParameters {
            p_min: self.plant.p_min_mw,
            p_max: self.plant.p_max_mw,
            s0: self.plant.s0_m3,
            s_min: self.plant.s_min_m3,
            s_max: self.plant.s_max_m3,
            kappa: self.plant.kappa,
            inflow: self.plant.inflow_m3s,
            step_seconds: self.horizon.step_seconds,
        }
    }

    /// Parsed optimizer strategy; validation guarantees the name is known.
    pub fn strategy(&self) -> Strategy {
        Strategy::from_name(&self.optimizer.strategy).unwrap_or(Strategy::Auto)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let p = &self.plant;

        if !(p.p_min_mw < p.p_max_mw) {
            errors.push(ConfigError {
                field: "plant.p_min_mw".into(),
                message: "must be < plant.p_max_mw".into(),
            });
        }
        if !(p.s_min_m3 < p.s_max_m3) {
            errors.push(ConfigError {
                field: "plant.s_min_m3".into(),
                message: "must be < plant.s_max_m3".into(),
            });
        }
        if !(p.s_min_m3 <= p.s0_m3 && p.s0_m3 <= p.s_max_m3) {
            errors.push(ConfigError {
                field: "plant.s0_m3".into(),
                message: "must lie within [plant.s_min_m3, plant.s_max_m3]".into(),
            });
        }
        if !(p.kappa > 0.0) {
            errors.push(ConfigError {
                field: "plant.kappa".into(),
                message: "must be > 0".into(),
            });
        }

        let h = &self.horizon;
        if h.steps == 0 {
            errors.push(ConfigError {
                field: "horizon.steps".into(),
                message: "must be > 0".into(),
            });
        }
        if !(h.step_seconds > 0.0) {
            errors.push(ConfigError {
                field: "horizon.step_seconds".into(),
                message: "must be > 0".into(),
            });
        }

        let pr = &self.prices;
        if pr.source != "synthetic" && pr.source != "csv" {
            errors.push(ConfigError {
                field: "prices.source".into(),
                message: format!("must be \"synthetic\" or \"csv\", got \"{}\"", pr.source),
            });
        }
        if pr.source == "csv" && pr.csv_path.is_none() {
            errors.push(ConfigError {
                field: "prices.csv_path".into(),
                message: "required when prices.source = \"csv\"".into(),
            });
        }
        if pr.noise_std < 0.0 {
            errors.push(ConfigError {
                field: "prices.noise_std".into(),
                message: "must be >= 0".into(),
            });
        }

        let o = &self.optimizer;
        if Strategy::from_name(&o.strategy).is_none() {
            errors.push(ConfigError {
                field: "optimizer.strategy".into(),
                message: format!(
                    "must be \"auto\", \"lp\", or \"greedy\", got \"{}\"",
                    o.strategy
                ),
            });
        }

        let b = &self.benchmark;
        if b.p_stable_mw < 0.0 {
            errors.push(ConfigError {
                field: "benchmark.p_stable_mw".into(),
                message: "must be >= 0".into(),
            });
        }
        if b.forecast_noise_std < 0.0 {
            errors.push(ConfigError {
                field: "benchmark.forecast_noise_std".into(),
                message: "must be >= 0".into(),
            });
        }

        // Cross-field check: the must-run trajectory has to stay inside the
        // storage band or no schedule at all is feasible. Only meaningful
        // once the individual bounds above hold.
        if errors.is_empty() {
            let params = self.plant_parameters();
            let baseline = storage::simulate(&vec![params.p_min; h.steps], &params);
            if !storage::within_band(&baseline, &params) {
                errors.push(ConfigError {
                    field: "plant.inflow_m3s".into(),
                    message: format!(
                        "running at p_min for {} steps leaves the reservoir outside \
                         [s_min, s_max]; rebalance inflow, bounds, or horizon",
                        h.steps
                    ),
                });
            } else if let Some(floor) = o.final_volume_floor_m3 {
                let last = baseline.last().copied().unwrap_or(params.s0);
                if floor > last + storage::VOLUME_EPS {
                    errors.push(ConfigError {
                        field: "optimizer.final_volume_floor_m3".into(),
                        message: format!(
                            "unreachable: even the must-run trajectory ends at {last:.1} m³"
                        ),
                    });
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[plant]
p_min_mw = 0.8
p_max_mw = 2.4
s0_m3 = 12000.0
s_min_m3 = 2000.0
s_max_m3 = 20000.0
kappa = 0.7
inflow_m3s = 0.55

[horizon]
steps = 48
step_seconds = 3600.0

[prices]
source = "synthetic"
base_usd_mwh = 65.0
amp_usd_mwh = 25.0
phase_rad = 0.5
noise_std = 2.0
seed = 123

[optimizer]
strategy = "greedy"

[benchmark]
enabled = true
p_stable_mw = 1.2
forecast_noise_std = 6.0
forecast_seed = 5
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.horizon.steps), Some(48));
        assert_eq!(cfg.as_ref().map(|c| &*c.optimizer.strategy), Some("greedy"));
        assert_eq!(cfg.as_ref().map(|c| c.benchmark.enabled), Some(true));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[plant]
p_min_mw = 0.5
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[prices]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.prices.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.horizon.steps), Some(24));
        assert_eq!(cfg.as_ref().map(|c| c.plant.p_max_mw), Some(3.0));
    }

    #[test]
    fn validation_catches_inverted_power_bounds() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.plant.p_min_mw = 5.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "plant.p_min_mw"));
    }

    #[test]
    fn validation_catches_initial_volume_outside_band() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.plant.s0_m3 = 100.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "plant.s0_m3"));
    }

    #[test]
    fn validation_catches_zero_steps() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.horizon.steps = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "horizon.steps"));
    }

    #[test]
    fn validation_catches_bad_source() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.prices.source = "api".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "prices.source"));
    }

    #[test]
    fn validation_requires_csv_path_for_csv_source() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.prices.source = "csv".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "prices.csv_path"));

        cfg.prices.csv_path = Some("prices.csv".to_string());
        let errors = cfg.validate();
        assert!(errors.is_empty(), "csv with path should be valid: {errors:?}");
    }

    #[test]
    fn validation_catches_bad_strategy() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.optimizer.strategy = "simplex".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "optimizer.strategy"));
    }

    #[test]
    fn validation_catches_overfilling_inflow() {
        // Inflow far above what p_min can pass: the must-run trajectory
        // overflows the band within the day.
        let mut cfg = ScenarioConfig::baseline();
        cfg.plant.inflow_m3s = 5.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "plant.inflow_m3s"));
    }

    #[test]
    fn validation_catches_unreachable_floor() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.optimizer.final_volume_floor_m3 = Some(49_000.0);
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "optimizer.final_volume_floor_m3")
        );
    }

    #[test]
    fn reachable_floor_is_accepted() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.optimizer.final_volume_floor_m3 = Some(20_000.0);
        let errors = cfg.validate();
        assert!(errors.is_empty(), "floor 20000 should be valid: {errors:?}");
    }

    #[test]
    fn wet_week_is_longer_and_benchmarked() {
        let base = ScenarioConfig::baseline();
        let wet = ScenarioConfig::wet_week();
        assert!(wet.horizon.steps > base.horizon.steps);
        assert!(wet.benchmark.enabled);
        assert!(wet.plant.inflow_m3s > base.plant.inflow_m3s);
    }

    #[test]
    fn tight_band_narrows_the_reservoir() {
        let base = ScenarioConfig::baseline();
        let tight = ScenarioConfig::tight_band();
        let base_width = base.plant.s_max_m3 - base.plant.s_min_m3;
        let tight_width = tight.plant.s_max_m3 - tight.plant.s_min_m3;
        assert!(tight_width < base_width);
    }

    #[test]
    fn plant_parameters_carry_step_length() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.horizon.step_seconds = 900.0;
        let params = cfg.plant_parameters();
        assert_eq!(params.step_seconds, 900.0);
        assert_eq!(params.p_min, cfg.plant.p_min_mw);
    }

    #[test]
    fn strategy_accessor_parses_names() {
        let mut cfg = ScenarioConfig::baseline();
        assert_eq!(cfg.strategy(), Strategy::Auto);
        cfg.optimizer.strategy = "greedy".to_string();
        assert_eq!(cfg.strategy(), Strategy::Greedy);
    }
}

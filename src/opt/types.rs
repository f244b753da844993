//! Core types shared across the dispatch optimization pipeline.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::storage;

/// Physical parameters of a reservoir-fed hydro plant.
///
/// Units: generation bounds in MW, volumes in m³, `kappa` in (m³/s)/MW
/// (turbine flow per unit of generation), `inflow` in m³/s, `step_seconds`
/// the length of one scheduling step (3600 for hourly dispatch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantParameters {
    /// Minimum (must-run) generation per step (MW).
    pub p_min: f64,
    /// Maximum generation per step (MW).
    pub p_max: f64,
    /// Reservoir volume at the start of the horizon (m³).
    pub s0: f64,
    /// Lower reservoir bound (m³).
    pub s_min: f64,
    /// Upper reservoir bound (m³).
    pub s_max: f64,
    /// Flow conversion factor ((m³/s)/MW).
    pub kappa: f64,
    /// Natural inflow into the reservoir (m³/s).
    pub inflow: f64,
    /// Duration of one scheduling step (s).
    pub step_seconds: f64,
}

impl PlantParameters {
    /// Checks the bound invariants, returning the first violation found.
    ///
    /// Comparisons are written so that NaN in any bound is also rejected.
    ///
    /// # Errors
    ///
    /// Returns [`OptError::InvalidParameters`] when `p_min >= p_max`,
    /// `s_min >= s_max`, `s0` lies outside `[s_min, s_max]`, or
    /// `kappa`/`step_seconds` are not strictly positive.
    pub fn validate(&self) -> Result<(), OptError> {
        if !(self.p_min < self.p_max) {
            return Err(OptError::InvalidParameters {
                reason: format!("p_min ({}) must be < p_max ({})", self.p_min, self.p_max),
            });
        }
        if !(self.s_min < self.s_max) {
            return Err(OptError::InvalidParameters {
                reason: format!("s_min ({}) must be < s_max ({})", self.s_min, self.s_max),
            });
        }
        if !(self.s_min <= self.s0 && self.s0 <= self.s_max) {
            return Err(OptError::InvalidParameters {
                reason: format!(
                    "s0 ({}) must lie within [s_min, s_max] = [{}, {}]",
                    self.s0, self.s_min, self.s_max
                ),
            });
        }
        if !(self.kappa > 0.0) {
            return Err(OptError::InvalidParameters {
                reason: format!("kappa ({}) must be > 0", self.kappa),
            });
        }
        if !(self.step_seconds > 0.0) {
            return Err(OptError::InvalidParameters {
                reason: format!("step_seconds ({}) must be > 0", self.step_seconds),
            });
        }
        Ok(())
    }

    /// Reservoir volume change over one step at a given generation level (m³).
    pub fn step_volume_delta(&self, power_mw: f64) -> f64 {
        (self.inflow - self.kappa * power_mw) * self.step_seconds
    }
}

/// A generation schedule with its derived flow and volume trajectories.
///
/// `power_mw` and `flow_m3s` have one entry per step; `volume_m3` has one
/// extra leading entry holding the initial reservoir volume, so
/// `volume_m3[t + 1]` is the volume after step `t`.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    /// Generation per step (MW).
    pub power_mw: Vec<f64>,
    /// Turbine flow per step, `kappa * power_mw[t]` (m³/s).
    pub flow_m3s: Vec<f64>,
    /// Reservoir trajectory, length `horizon() + 1` (m³).
    pub volume_m3: Vec<f64>,
}

impl Schedule {
    /// Builds a schedule from a generation trajectory, deriving flow and
    /// the reservoir trajectory from the plant parameters.
    pub fn from_power(power_mw: Vec<f64>, params: &PlantParameters) -> Self {
        let flow_m3s = power_mw.iter().map(|p| params.kappa * p).collect();
        let volume_m3 = storage::simulate(&power_mw, params);
        Self {
            power_mw,
            flow_m3s,
            volume_m3,
        }
    }

    /// Number of scheduling steps.
    pub fn horizon(&self) -> usize {
        self.power_mw.len()
    }

    /// Revenue of the schedule against a price series of the same length.
    pub fn revenue(&self, prices: &[f64]) -> f64 {
        self.power_mw
            .iter()
            .zip(prices)
            .map(|(p, price)| p * price)
            .sum()
    }
}

/// Strategy requested from the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Try the exact LP path, fall back to the heuristic on any failure.
    Auto,
    /// Same fallback behavior as `Auto`, but states the intent explicitly.
    LinearProgram,
    /// Heuristic only, no LP attempt.
    Greedy,
}

impl Strategy {
    /// Parses a strategy name as used in scenario files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(Self::Auto),
            "lp" => Some(Self::LinearProgram),
            "greedy" => Some(Self::Greedy),
            _ => None,
        }
    }
}

/// Which path actually produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMethod {
    LinearProgramming,
    GreedyHeuristic,
}

impl OptimizeMethod {
    /// Stable wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinearProgramming => "linear_programming",
            Self::GreedyHeuristic => "greedy_heuristic",
        }
    }
}

impl fmt::Display for OptimizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced before any solve attempt begins.
#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    /// Plant bounds are malformed; never silently corrected.
    InvalidParameters { reason: String },
    /// Fewer price points than the requested horizon.
    InsufficientData { requested: usize, available: usize },
}

impl fmt::Display for OptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { reason } => {
                write!(f, "invalid plant parameters: {reason}")
            }
            Self::InsufficientData {
                requested,
                available,
            } => {
                write!(
                    f,
                    "insufficient price data: {requested} steps requested, {available} available"
                )
            }
        }
    }
}

impl Error for OptError {}

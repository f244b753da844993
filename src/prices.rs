//! Price series sources: synthetic daily curve, CSV ingestion, and
//! forecast perturbation.

use std::io::Read;
use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Synthetic hourly price generator with a sinusoidal daily shape.
///
/// Produces `base + amp * sin(2π * day_pos + phase) + noise`, floored at
/// zero. With `noise_std = 0` the series is a pure deterministic sinusoid;
/// otherwise the noise is Gaussian, seeded, and reproducible.
#[derive(Debug, Clone)]
pub struct PriceModel {
    /// Mean price level (USD/MWh).
    pub base_usd_mwh: f64,
    /// Amplitude of the daily swing (USD/MWh).
    pub amp_usd_mwh: f64,
    /// Phase offset of the daily shape (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (USD/MWh).
    pub noise_std: f64,
    /// Steps per price day.
    pub steps_per_day: usize,
    /// Noise generator.
    rng: StdRng,
}

impl PriceModel {
    /// Creates a price model seeded for reproducible noise.
    pub fn new(
        base_usd_mwh: f64,
        amp_usd_mwh: f64,
        phase_rad: f64,
        noise_std: f64,
        steps_per_day: usize,
        seed: u64,
    ) -> Self {
        Self {
            base_usd_mwh,
            amp_usd_mwh,
            phase_rad,
            noise_std,
            steps_per_day: steps_per_day.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Price at a timestep, advancing the noise stream.
    pub fn price_at(&mut self, timestep: usize) -> f64 {
        let day_pos = (timestep % self.steps_per_day) as f64 / self.steps_per_day as f64;
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let noise = gaussian(&mut self.rng, self.noise_std);
        (self.base_usd_mwh + self.amp_usd_mwh * angle.sin() + noise).max(0.0)
    }

    /// Generates a series of the given length.
    pub fn generate(&mut self, steps: usize) -> Vec<f64> {
        (0..steps).map(|t| self.price_at(t)).collect()
    }
}

/// Realized series plus seeded Gaussian error, floored at zero.
///
/// Stands in for a day-ahead forecast when no real forecast is supplied.
pub fn perturb(series: &[f64], noise_std: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    series
        .iter()
        .map(|&p| (p + gaussian(&mut rng, noise_std)).max(0.0))
        .collect()
}

// simple Gaussian-ish noise via Box-Muller
fn gaussian(rng: &mut StdRng, std: f64) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std
}

/// Reads a price series from CSV.
///
/// The price is taken from the last column of each row, so both
/// single-column files and `hour,price` files work. A first row that does
/// not parse as a number is treated as a header and skipped.
///
/// # Errors
///
/// Returns a message naming the offending row when a later row fails to
/// parse.
pub fn read_prices(reader: impl Read) -> Result<Vec<f64>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut prices = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| format!("row {}: {e}", row + 1))?;
        let field = record.iter().last().unwrap_or("");
        match field.parse::<f64>() {
            Ok(price) => prices.push(price),
            // Header row
            Err(_) if row == 0 => continue,
            Err(_) => {
                return Err(format!("row {}: \"{field}\" is not a number", row + 1));
            }
        }
    }
    Ok(prices)
}

/// [`read_prices`] from a file path.
pub fn read_price_file(path: &Path) -> Result<Vec<f64>, String> {
    let file = std::fs::File::open(path)
        .map_err(|e| format!("cannot read \"{}\": {e}", path.display()))?;
    read_prices(file)
}

//! Price-ranked constructive schedule builder.
//!
//! Fast path and fallback when no exact LP solve is wanted or possible.
//! Produces a feasible schedule, not a provably optimal one.

use std::cmp::Ordering;

use super::storage::{self, VOLUME_EPS};
use super::types::{PlantParameters, Schedule};

/// Builds a feasible schedule by raising generation in the best-priced
/// hours first.
///
/// Starts from the all-`p_min` trajectory (the caller keeps that baseline
/// inside the storage band; scenario validation rejects plants where it is
/// not). Step indices are then visited in descending price order, ties in
/// ascending time order, and each visited step is tentatively raised to
/// `p_max`. The raise is kept only if the full-horizon reservoir trajectory
/// stays inside `[s_min, s_max]`; the whole horizon is re-checked because a
/// later deficit can be caused by an earlier raise. O(T²) overall.
pub fn build_schedule(prices: &[f64], params: &PlantParameters) -> Schedule {
    build_schedule_with_floor(prices, params, None)
}

/// [`build_schedule`] with an optional floor on the final reservoir volume.
///
/// When `final_volume_floor` is set, a raise is additionally rejected if it
/// would leave the end-of-horizon volume below the floor.
pub fn build_schedule_with_floor(
    prices: &[f64],
    params: &PlantParameters,
    final_volume_floor: Option<f64>,
) -> Schedule {
    let mut power = vec![params.p_min; prices.len()];

    let mut order: Vec<usize> = (0..prices.len()).collect();
    // Stable sort keeps ascending time order between equal prices.
    order.sort_by(|&i, &j| prices[j].partial_cmp(&prices[i]).unwrap_or(Ordering::Equal));

    for &t in &order {
        let previous = power[t];
        power[t] = params.p_max;
        let volume = storage::simulate(&power, params);
        if !accepts(&volume, params, final_volume_floor) {
            power[t] = previous;
        }
    }

    Schedule::from_power(power, params)
}

fn accepts(volume: &[f64], params: &PlantParameters, final_volume_floor: Option<f64>) -> bool {
    if !storage::within_band(volume, params) {
        return false;
    }
    match (final_volume_floor, volume.last()) {
        (Some(floor), Some(&last)) => last >= floor - VOLUME_EPS,
        _ => true,
    }
}

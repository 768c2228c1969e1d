// wayfinder_core/src/models/ranging.rs

use crate::config::RangingConfig;
use crate::facility::Beacon;
use crate::messages::RangeReading;
use crate::types::Point2D;
use rand::distributions::Open01;
use rand::Rng;
use std::f64::consts::TAU;

/// The smallest reading set the trilateration estimator can work with.
pub const MIN_READINGS: usize = 3;

/// Simulates UWB-style range measurements from fixed beacons to the agent.
///
/// Each in-range beacon produces one reading: the true Euclidean distance plus
/// zero-mean Gaussian noise, floored at zero. Only the closest
/// `max(3, max_beacons)` readings are kept, closest first.
#[derive(Debug, Clone)]
pub struct RangeSimulator {
    pub noise_std_dev: f64,
    pub max_beacons: usize,
    pub range_scale: f64,
}

impl RangeSimulator {
    pub fn new(config: &RangingConfig) -> Self {
        Self {
            noise_std_dev: config.noise_std_dev,
            max_beacons: config.max_beacons,
            range_scale: config.range_scale,
        }
    }

    /// Number of readings kept after sorting.
    pub fn reading_cap(&self) -> usize {
        self.max_beacons.max(MIN_READINGS)
    }

    pub fn simulate<R: Rng + ?Sized>(
        &self,
        true_position: &Point2D,
        beacons: &[Beacon],
        rng: &mut R,
    ) -> Vec<RangeReading> {
        let mut readings: Vec<RangeReading> = beacons
            .iter()
            .filter_map(|beacon| {
                let true_distance = nalgebra::distance(true_position, &beacon.position);
                if true_distance > beacon.max_range * self.range_scale {
                    return None;
                }
                let noise = self.noise_std_dev * standard_normal(rng);
                Some(RangeReading {
                    beacon_id: beacon.id.clone(),
                    beacon_position: beacon.position,
                    measured_distance: (true_distance + noise).max(0.0),
                })
            })
            .collect();

        // Stable sort: equal distances keep declaration order.
        readings.sort_by(|a, b| a.measured_distance.total_cmp(&b.measured_distance));
        readings.truncate(self.reading_cap());
        readings
    }
}

/// Draws one sample from N(0, 1) with the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Open01 excludes 0, so ln(u1) stays finite.
    let u1: f64 = rng.sample(Open01);
    let u2: f64 = rng.sample(Open01);
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

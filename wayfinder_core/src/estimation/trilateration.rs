// wayfinder_core/src/estimation/trilateration.rs

use crate::config::EstimatorConfig;
use crate::error::EstimationError;
use crate::estimation::{PositionEstimator, PositionFix, SolveStatus};
use crate::messages::RangeReading;
use crate::models::ranging::MIN_READINGS;
use crate::types::Point2D;
use nalgebra::{Matrix2, Vector2};

/// Gauss-Newton nonlinear least squares on the range residuals
/// `r_i = ||p - b_i|| - d_i`.
///
/// Each iteration accumulates the 2x2 normal equations `JᵀJ Δ = Jᵀr` and solves
/// them in closed form. A near-zero determinant ends the solve early with the
/// current estimate.
#[derive(Debug, Clone)]
pub struct GaussNewtonTrilateration {
    pub max_iterations: usize,
    pub convergence_tolerance: f64,
    pub singular_threshold: f64,
    pub min_distance: f64,
}

impl GaussNewtonTrilateration {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            convergence_tolerance: config.convergence_tolerance,
            singular_threshold: config.singular_threshold,
            min_distance: config.min_distance,
        }
    }

    /// Accumulates `JᵀJ` and `Jᵀr` at the point `p`.
    fn normal_equations(&self, p: &Point2D, readings: &[RangeReading]) -> (Matrix2<f64>, Vector2<f64>) {
        let mut jtj = Matrix2::zeros();
        let mut jtr = Vector2::zeros();

        for reading in readings {
            let diff = p - reading.beacon_position;
            let norm = diff.norm();
            // d r_i / d p = (p - b_i) / ||p - b_i||
            let jacobian_row = diff / norm.max(self.min_distance);
            let residual = norm - reading.measured_distance;

            jtj += jacobian_row * jacobian_row.transpose();
            jtr += jacobian_row * residual;
        }

        (jtj, jtr)
    }
}

impl Default for GaussNewtonTrilateration {
    fn default() -> Self {
        Self::new(&EstimatorConfig::default())
    }
}

impl PositionEstimator for GaussNewtonTrilateration {
    fn estimate(
        &self,
        readings: &[RangeReading],
        initial_guess: Option<Point2D>,
    ) -> Result<PositionFix, EstimationError> {
        if readings.len() < MIN_READINGS {
            return Err(EstimationError::InsufficientBeacons {
                available: readings.len(),
                required: MIN_READINGS,
            });
        }

        let mut p = initial_guess.unwrap_or_else(|| beacon_centroid(readings));
        let mut status = SolveStatus::IterationLimit;
        let mut iterations = 0;

        for _ in 0..self.max_iterations {
            let (jtj, jtr) = self.normal_equations(&p, readings);

            let det = jtj.determinant();
            if det.abs() < self.singular_threshold {
                status = SolveStatus::DegenerateGeometry;
                break;
            }

            // Closed-form 2x2 inverse.
            let inverse = Matrix2::new(jtj[(1, 1)], -jtj[(0, 1)], -jtj[(1, 0)], jtj[(0, 0)]) / det;
            let delta = inverse * jtr;
            p -= delta;
            iterations += 1;

            if delta.x.abs() + delta.y.abs() < self.convergence_tolerance {
                status = SolveStatus::Converged;
                break;
            }
        }

        Ok(PositionFix {
            position: p,
            iterations,
            status,
            rms_residual: rms_residual(&p, readings),
            beacons_used: readings.len(),
        })
    }
}

/// Mean of the beacon positions behind `readings`.
pub fn beacon_centroid(readings: &[RangeReading]) -> Point2D {
    let sum = readings
        .iter()
        .fold(Vector2::<f64>::zeros(), |acc, r| acc + r.beacon_position.coords);
    Point2D::from(sum / readings.len().max(1) as f64)
}

fn rms_residual(p: &Point2D, readings: &[RangeReading]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = readings
        .iter()
        .map(|r| (nalgebra::distance(p, &r.beacon_position) - r.measured_distance).powi(2))
        .sum();
    (sum_sq / readings.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ranging::RangeSimulator;
    use crate::facility::Beacon;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn exact_readings(beacons: &[(f64, f64)], p: Point2D) -> Vec<RangeReading> {
        beacons
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let position = Point2D::new(x, y);
                RangeReading {
                    beacon_id: format!("b{i}"),
                    beacon_position: position,
                    measured_distance: nalgebra::distance(&p, &position),
                }
            })
            .collect()
    }

    #[test]
    fn test_noiseless_three_beacons_converge() {
        let truth = Point2D::new(7.0, 5.0);
        let readings = exact_readings(&[(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)], truth);

        let fix = GaussNewtonTrilateration::default()
            .estimate(&readings, None)
            .unwrap();

        assert_abs_diff_eq!(fix.position.x, truth.x, epsilon = 1e-3);
        assert_abs_diff_eq!(fix.position.y, truth.y, epsilon = 1e-3);
        assert_eq!(fix.status, SolveStatus::Converged);
        assert!(fix.rms_residual < 1e-3);
        assert_eq!(fix.beacons_used, 3);
    }

    #[test]
    fn test_noiseless_corner_beacons_converge_across_facility() {
        let corners = [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)];
        let estimator = GaussNewtonTrilateration::default();
        for truth in [
            Point2D::new(3.0, 4.0),
            Point2D::new(15.0, 12.0),
            Point2D::new(18.0, 2.0),
        ] {
            let fix = estimator
                .estimate(&exact_readings(&corners, truth), None)
                .unwrap();
            assert_abs_diff_eq!(fix.position.x, truth.x, epsilon = 1e-3);
            assert_abs_diff_eq!(fix.position.y, truth.y, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_initial_guess_is_used() {
        let truth = Point2D::new(12.0, 9.0);
        let readings = exact_readings(&[(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)], truth);
        let fix = GaussNewtonTrilateration::default()
            .estimate(&readings, Some(truth))
            .unwrap();
        // Starting on the answer converges in a single update.
        assert_eq!(fix.iterations, 1);
        assert_eq!(fix.status, SolveStatus::Converged);
    }

    #[test]
    fn test_fewer_than_three_readings_fail() {
        let readings = exact_readings(&[(0.0, 0.0), (20.0, 0.0)], Point2D::new(5.0, 5.0));
        let err = GaussNewtonTrilateration::default()
            .estimate(&readings, None)
            .unwrap_err();
        assert_eq!(
            err,
            EstimationError::InsufficientBeacons {
                available: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_collinear_beacons_report_degenerate_geometry() {
        let readings = exact_readings(
            &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)],
            Point2D::new(5.0, 3.0),
        );
        let fix = GaussNewtonTrilateration::default()
            .estimate(&readings, None)
            .unwrap();
        assert_eq!(fix.status, SolveStatus::DegenerateGeometry);
        assert!(fix.position.x.is_finite() && fix.position.y.is_finite());
        // The centroid is on the beacon line, so the first system is already singular.
        assert_eq!(fix.iterations, 0);
        assert_abs_diff_eq!(fix.position.x, 10.0);
    }

    #[test]
    fn test_guess_on_beacon_does_not_divide_by_zero() {
        let truth = Point2D::new(6.0, 8.0);
        let readings = exact_readings(&[(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)], truth);
        let fix = GaussNewtonTrilateration::default()
            .estimate(&readings, Some(Point2D::new(0.0, 0.0)))
            .unwrap();
        assert!(fix.position.x.is_finite() && fix.position.y.is_finite());
    }

    #[test]
    fn test_noisy_readings_stay_close() {
        let beacons: Vec<Beacon> = [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Beacon {
                id: format!("b{i}"),
                position: Point2D::new(x, y),
                max_range: 40.0,
            })
            .collect();
        let simulator = RangeSimulator {
            noise_std_dev: 0.1,
            max_beacons: 4,
            range_scale: 1.0,
        };
        let estimator = GaussNewtonTrilateration::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let truth = Point2D::new(8.0, 13.0);

        for _ in 0..50 {
            let readings = simulator.simulate(&truth, &beacons, &mut rng);
            let fix = estimator.estimate(&readings, None).unwrap();
            assert!(nalgebra::distance(&fix.position, &truth) < 1.0);
        }
    }
}

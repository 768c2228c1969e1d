// wayfinder_core/src/facility.rs

//! The static description of the walkable space. It is supplied by the host,
//! validated once, and then only read.

use crate::error::FacilityError;
use crate::types::Point2D;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =========================================================================
// == Facility Data Structures ==
// =========================================================================

/// Integer extents of the facility. Every coordinate lies in `[0,width) x [0,height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilityBounds {
    pub width: u32,
    pub height: u32,
}

impl FacilityBounds {
    /// Clamps a point into the facility, keeping it strictly inside the far edges.
    pub fn clamp(&self, point: Point2D) -> Point2D {
        let max_x = (self.width as f64 - 1.0).max(0.0);
        let max_y = (self.height as f64 - 1.0).max(0.0);
        Point2D::new(point.x.clamp(0.0, max_x), point.y.clamp(0.0, max_y))
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// An axis-aligned rectangle given by its four corners, in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleRegion {
    pub corners: [Point2D; 4],
}

impl ObstacleRegion {
    pub fn from_corners(corners: [Point2D; 4]) -> Self {
        Self { corners }
    }

    /// Returns `(min, max)` over the corner points.
    pub fn extent(&self) -> (Point2D, Point2D) {
        let mut min = self.corners[0];
        let mut max = self.corners[0];
        for c in &self.corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        (min, max)
    }

    pub fn area(&self) -> f64 {
        let (min, max) = self.extent();
        (max.x - min.x) * (max.y - min.y)
    }
}

/// A named group of obstacles, e.g. "Dairy" or "Checkout lanes".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub obstacles: Vec<ObstacleRegion>,
}

/// A fixed ranging beacon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Beacon {
    pub id: String,
    pub position: Point2D,
    pub max_range: f64,
}

/// Entrances, checkouts and service points. The engine only reads their positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointFeature {
    pub id: String,
    pub position: Point2D,
    #[serde(default)]
    pub label: Option<String>,
}

/// # FacilityModel
/// The root of the layout description. `bounds` and `beacons` are required;
/// a layout without them fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilityModel {
    #[serde(default)]
    pub name: String,
    pub bounds: FacilityBounds,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub beacons: Vec<Beacon>,
    #[serde(default)]
    pub entrances: Vec<PointFeature>,
    #[serde(default)]
    pub checkouts: Vec<PointFeature>,
    #[serde(default)]
    pub service_points: Vec<PointFeature>,
}

impl FacilityModel {
    pub fn new(bounds: FacilityBounds, beacons: Vec<Beacon>) -> Self {
        Self {
            name: String::new(),
            bounds,
            sections: Vec::new(),
            beacons,
            entrances: Vec::new(),
            checkouts: Vec::new(),
            service_points: Vec::new(),
        }
    }

    pub fn with_section(mut self, name: impl Into<String>, obstacles: Vec<ObstacleRegion>) -> Self {
        self.sections.push(Section {
            name: name.into(),
            obstacles,
        });
        self
    }

    /// Iterates over every obstacle in every section.
    pub fn obstacles(&self) -> impl Iterator<Item = &ObstacleRegion> {
        self.sections.iter().flat_map(|s| s.obstacles.iter())
    }

    pub fn beacon(&self, id: &str) -> Option<&Beacon> {
        self.beacons.iter().find(|b| b.id == id)
    }

    /// Checks the layout once at load time.
    pub fn validate(&self) -> Result<(), FacilityError> {
        if self.bounds.width == 0 || self.bounds.height == 0 {
            return Err(FacilityError::InvalidBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }

        if self.beacons.is_empty() {
            return Err(FacilityError::NoBeacons);
        }

        let mut seen = HashSet::new();
        for beacon in &self.beacons {
            if !seen.insert(beacon.id.as_str()) {
                return Err(FacilityError::DuplicateBeacon(beacon.id.clone()));
            }
            if !is_finite(&beacon.position) {
                return Err(FacilityError::NonFiniteCoordinate(format!(
                    "beacon '{}'",
                    beacon.id
                )));
            }
            if !beacon.max_range.is_finite() || beacon.max_range <= 0.0 {
                return Err(FacilityError::InvalidBeaconRange {
                    id: beacon.id.clone(),
                    max_range: beacon.max_range,
                });
            }
        }

        for section in &self.sections {
            for (index, obstacle) in section.obstacles.iter().enumerate() {
                if !obstacle.corners.iter().all(is_finite) {
                    return Err(FacilityError::NonFiniteCoordinate(format!(
                        "obstacle {} in section '{}'",
                        index, section.name
                    )));
                }
                if obstacle.area() <= 0.0 {
                    return Err(FacilityError::DegenerateObstacle {
                        section: section.name.clone(),
                        index,
                    });
                }
            }
        }

        let features = self
            .entrances
            .iter()
            .chain(&self.checkouts)
            .chain(&self.service_points);
        for feature in features {
            if !is_finite(&feature.position) {
                return Err(FacilityError::NonFiniteCoordinate(format!(
                    "feature '{}'",
                    feature.id
                )));
            }
        }

        Ok(())
    }
}

fn is_finite(p: &Point2D) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

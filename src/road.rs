//! Road segment primitives consumed from the host's road network.
//!
//! The road network itself is owned and parsed elsewhere; the engine only
//! sees individual geometric pieces, each tagged with its road, drivable
//! lanes and arc-length range.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::math::{Point2d, Vector2d};
use crate::util::{Aabb, Interval};

/// Identifies a road in the host's network.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoadId(pub u32);

/// A lane number within a road, signed as in OpenDRIVE
/// (negative lanes run right of the reference line).
pub type Lane = i32;

/// Step length used when integrating a spiral pose, in m.
const SPIRAL_STEP: f64 = 0.5;

/// The geometric shape of a road segment.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentGeometry {
    /// A straight segment.
    Line {
        /// Start point of the segment.
        origin: Point2d,
        /// Heading of the segment in radians.
        heading: f64,
    },
    /// A clothoid segment, whose curvature varies linearly with arc-length.
    Spiral {
        /// Start point of the segment.
        origin: Point2d,
        /// Heading at the start point in radians.
        heading: f64,
        /// Curvature at the start point in 1/m.
        curv_start: f64,
        /// Curvature change per metre of arc-length.
        curv_rate: f64,
    },
}

/// One geometric piece of road.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoadSegmentPrimitive {
    /// The road this segment belongs to.
    pub road: RoadId,
    /// The drivable lanes carried by the segment.
    pub lanes: SmallVec<[Lane; 4]>,
    /// Arc-length range of the segment along its road.
    pub s_range: Interval<f64>,
    /// The shape of the segment.
    pub geometry: SegmentGeometry,
}

impl RoadSegmentPrimitive {
    /// Creates a straight segment.
    pub fn line(
        road: RoadId,
        lanes: impl IntoIterator<Item = Lane>,
        s_range: Interval<f64>,
        origin: Point2d,
        heading: f64,
    ) -> Self {
        Self {
            road,
            lanes: lanes.into_iter().collect(),
            s_range,
            geometry: SegmentGeometry::Line { origin, heading },
        }
    }

    /// Creates a clothoid segment.
    pub fn spiral(
        road: RoadId,
        lanes: impl IntoIterator<Item = Lane>,
        s_range: Interval<f64>,
        origin: Point2d,
        heading: f64,
        curv_start: f64,
        curv_rate: f64,
    ) -> Self {
        Self {
            road,
            lanes: lanes.into_iter().collect(),
            s_range,
            geometry: SegmentGeometry::Spiral {
                origin,
                heading,
                curv_start,
                curv_rate,
            },
        }
    }

    /// Length of the segment in m.
    pub fn length(&self) -> f64 {
        self.s_range.length()
    }

    /// Samples the segment pose at arc-length `s` along the road.
    ///
    /// Returns the world position and the heading at that position. For a
    /// spiral the heading is quadratic in arc-length and the position has no
    /// closed form, so it is integrated with the composite midpoint rule.
    pub fn sample_s(&self, s: f64) -> (Point2d, f64) {
        let ds = s - self.s_range.min;
        match self.geometry {
            SegmentGeometry::Line { origin, heading } => {
                let dir = Vector2d::new(heading.cos(), heading.sin());
                (origin + dir * ds, heading)
            }
            SegmentGeometry::Spiral {
                origin,
                heading,
                curv_start,
                curv_rate,
            } => {
                let theta = |u: f64| heading + curv_start * u + 0.5 * curv_rate * u * u;
                let steps = usize::max(1, (ds.abs() / SPIRAL_STEP).ceil() as usize);
                let h = ds / steps as f64;
                let mut pos = origin;
                for i in 0..steps {
                    let mid = theta((i as f64 + 0.5) * h);
                    pos += Vector2d::new(mid.cos(), mid.sin()) * h;
                }
                (pos, theta(ds))
            }
        }
    }

    /// The axis-aligned box spanned by the segment's two endpoints,
    /// used to clip intersection candidates.
    pub fn end_box(&self) -> Aabb {
        let (a, _) = self.sample_s(self.s_range.min);
        let (b, _) = self.sample_s(self.s_range.max);
        Aabb::from_corners(a, b)
    }

    /// A bounding box covering the whole segment, for spatial indexing.
    pub fn bounding_box(&self) -> Aabb {
        match self.geometry {
            SegmentGeometry::Line { .. } => self.end_box(),
            SegmentGeometry::Spiral { .. } => {
                // A spiral can bulge past its endpoint box.
                let mut aabb = self.end_box();
                let samples = usize::max(2, (self.length() / (8.0 * SPIRAL_STEP)).ceil() as usize);
                for i in 1..samples {
                    let s = self.s_range.lerp(i as f64 / samples as f64);
                    aabb.include(self.sample_s(s).0);
                }
                aabb
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn line_pose() {
        let seg = RoadSegmentPrimitive::line(
            RoadId(1),
            [-1, 1],
            Interval::new(100.0, 300.0),
            Point2d::new(10.0, 20.0),
            std::f64::consts::FRAC_PI_2,
        );
        let (p, hdg) = seg.sample_s(150.0);
        assert_approx_eq!(p.x, 10.0, 1e-9);
        assert_approx_eq!(p.y, 70.0, 1e-9);
        assert_approx_eq!(hdg, std::f64::consts::FRAC_PI_2, 1e-9);
    }

    #[test]
    fn spiral_with_zero_curvature_is_straight() {
        let seg = RoadSegmentPrimitive::spiral(
            RoadId(1),
            [1],
            Interval::new(0.0, 50.0),
            Point2d::new(0.0, 0.0),
            0.0,
            0.0,
            0.0,
        );
        let (p, hdg) = seg.sample_s(50.0);
        assert_approx_eq!(p.x, 50.0, 1e-9);
        assert_approx_eq!(p.y, 0.0, 1e-9);
        assert_approx_eq!(hdg, 0.0, 1e-9);
    }

    #[test]
    fn constant_curvature_spiral_traces_a_circle() {
        // curv_rate 0 degenerates to an arc of radius 1/curv_start.
        let radius = 40.0;
        let quarter = std::f64::consts::FRAC_PI_2 * radius;
        let seg = RoadSegmentPrimitive::spiral(
            RoadId(2),
            [1],
            Interval::new(0.0, quarter),
            Point2d::new(0.0, 0.0),
            0.0,
            1.0 / radius,
            0.0,
        );
        let (p, hdg) = seg.sample_s(quarter);
        assert_approx_eq!(p.x, radius, 1e-2);
        assert_approx_eq!(p.y, radius, 1e-2);
        assert_approx_eq!(hdg, std::f64::consts::FRAC_PI_2, 1e-9);
    }

    #[test]
    fn spiral_bounding_box_covers_the_bulge() {
        // A half-circle arc: the apex lies outside the endpoint box.
        let radius = 40.0;
        let half = std::f64::consts::PI * radius;
        let seg = RoadSegmentPrimitive::spiral(
            RoadId(2),
            [1],
            Interval::new(0.0, half),
            Point2d::new(0.0, 0.0),
            0.0,
            1.0 / radius,
            0.0,
        );
        let aabb = seg.bounding_box();
        assert!(aabb.y.max > 1.9 * radius);
        assert!(aabb.x.max > 0.9 * radius);
    }
}

//! The elliptical spawn region that follows the central object.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::CentralObjectState;
use crate::math::Point2d;
use crate::util::{Aabb, Interval};

/// A rotated ellipse in world space.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ellipse {
    /// Centre of the ellipse.
    pub centre: Point2d,
    /// Orientation of the semi-major axis, in radians.
    pub heading: f64,
    /// Semi-major axis length in m.
    pub smja: f64,
    /// Semi-minor axis length in m.
    pub smna: f64,
}

impl Ellipse {
    /// Evaluates the implicit ellipse equation at `p`.
    ///
    /// Negative inside the boundary, zero on it, positive outside.
    pub fn eval(&self, p: Point2d) -> f64 {
        let (sin_a, cos_a) = self.heading.sin_cos();
        let dx = p.x - self.centre.x;
        let dy = p.y - self.centre.y;
        let e1 = (dx * cos_a + dy * sin_a) / self.smja;
        let e2 = (dx * sin_a - dy * cos_a) / self.smna;
        e1 * e1 + e2 * e2 - 1.0
    }

    /// Returns true if `p` lies strictly inside the boundary.
    pub fn contains(&self, p: Point2d) -> bool {
        self.eval(p) < 0.0
    }

    /// The axis-aligned bounding box of the rotated ellipse.
    pub fn bounding_box(&self) -> Aabb {
        let (sin_a, cos_a) = self.heading.sin_cos();
        let ext_x = ((self.smja * cos_a).powi(2) + (self.smna * sin_a).powi(2)).sqrt();
        let ext_y = ((self.smja * sin_a).powi(2) + (self.smna * cos_a).powi(2)).sqrt();
        Aabb {
            x: Interval::disc(self.centre.x, ext_x),
            y: Interval::disc(self.centre.y, ext_y),
        }
    }
}

/// The inner, mid and outer spawn boundaries for one tick.
///
/// The outer axes come straight from configuration. The inner ellipse is the
/// configured inner radius scaled to preserve the outer eccentricity, and
/// the mid ellipse is the annulus midline, where new vehicles are placed.
#[derive(Copy, Clone, Debug)]
pub struct EllipseRegion {
    pub inner: Ellipse,
    pub mid: Ellipse,
    pub outer: Ellipse,
}

impl EllipseRegion {
    /// Derives the region for this tick from the central object pose.
    pub(crate) fn from_central(
        central: &CentralObjectState,
        inner_radius: f64,
        smja: f64,
        smna: f64,
    ) -> Self {
        let inner_smja = inner_radius;
        let inner_smna = inner_radius * smna / smja;
        let ellipse = |smja, smna| Ellipse {
            centre: central.pos,
            heading: central.heading,
            smja,
            smna,
        };
        Self {
            inner: ellipse(inner_smja, inner_smna),
            mid: ellipse(0.5 * (inner_smja + smja), 0.5 * (inner_smna + smna)),
            outer: ellipse(smja, smna),
        }
    }

    /// Returns true if `p` lies in the annulus between the inner and outer
    /// boundaries, where spawning is permitted.
    pub fn in_annulus(&self, p: Point2d) -> bool {
        !self.inner.contains(p) && self.outer.eval(p) <= 0.0
    }
}

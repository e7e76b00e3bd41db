//! Intersection of ellipse boundaries with road segments.
//!
//! Straight segments reduce to a closed-form quadratic after substituting
//! the line into the rotated-ellipse implicit equation. Spirals have no
//! closed form and fall back to Brent root-finding over arc-length. Either
//! way, solutions are clipped against the segment's endpoint box before
//! they are reported.

use arrayvec::ArrayVec;
use cgmath::InnerSpace;

use crate::ellipse::Ellipse;
use crate::math::{brent_zero, solve_quadratic, Point2d, Vector2d, SMALL_NUMBER};
use crate::road::{RoadSegmentPrimitive, SegmentGeometry};

/// A solved boundary/road crossing.
#[derive(Copy, Clone, Debug)]
pub struct IntersectionPoint {
    /// World position of the crossing.
    pub pos: Point2d,
    /// Arc-length of the crossing along the segment's road, in m.
    pub s: f64,
}

/// Computes the crossings between `segment` and the boundary of `ellipse`.
///
/// Returns zero, one or two points. When the endpoint box clips one of two
/// raw solutions, the survivor is promoted to the single result.
pub fn intersect(segment: &RoadSegmentPrimitive, ellipse: &Ellipse) -> ArrayVec<IntersectionPoint, 2> {
    match segment.geometry {
        SegmentGeometry::Line { origin, heading } => line_intersect(segment, origin, heading, ellipse),
        SegmentGeometry::Spiral { .. } => spiral_intersect(segment, ellipse),
    }
}

/// Closed-form line/ellipse intersection.
///
/// With the line as `y = m·x + q` and the ellipse in implicit form, the
/// crossings are the roots of `A·x² + B·x + C = 0`. A vertical line breaks
/// the `y = m·x + q` parametrization, so a separate coefficient set solves
/// for `y` with `x` held at the line origin; both branches agree in the
/// near-vertical boundary region.
fn line_intersect(
    segment: &RoadSegmentPrimitive,
    origin: Point2d,
    heading: f64,
    ellipse: &Ellipse,
) -> ArrayVec<IntersectionPoint, 2> {
    let h = ellipse.centre.x;
    let k = ellipse.centre.y;
    let (sin_t, cos_t) = ellipse.heading.sin_cos();
    let (smja, smna) = (ellipse.smja, ellipse.smna);

    let mut raw = ArrayVec::<Point2d, 2>::new();
    if heading.cos().abs() > SMALL_NUMBER {
        let m = heading.tan();
        let q = origin.y - m * origin.x;

        // x-coefficient and constant term of each ellipse term after the
        // substitution y = m·x + q.
        let f1 = (m * sin_t + cos_t) / smja;
        let g1 = (-h * cos_t + (q - k) * sin_t) / smja;
        let f2 = (-m * cos_t + sin_t) / smna;
        let g2 = (-h * sin_t - (q - k) * cos_t) / smna;

        let a = f1 * f1 + f2 * f2;
        let b = 2.0 * (g1 * f1 + g2 * f2);
        let c = g1 * g1 + g2 * g2 - 1.0;
        for x in solve_quadratic(a, b, c) {
            raw.push(Point2d::new(x, m * x + q));
        }
    } else {
        // Vertical line: solve for y with x fixed at the line origin.
        let u = origin.x - h;
        let a1 = sin_t / smja;
        let b1 = (u * cos_t - k * sin_t) / smja;
        let a2 = -cos_t / smna;
        let b2 = (u * sin_t + k * cos_t) / smna;

        let va = a1 * a1 + a2 * a2;
        let vb = 2.0 * (a1 * b1 + a2 * b2);
        let vc = b1 * b1 + b2 * b2 - 1.0;
        for y in solve_quadratic(va, vb, vc) {
            raw.push(Point2d::new(origin.x, y));
        }
    }

    // Clip against the segment's own extent; a surviving point keeps its
    // position in the (ascending) solution order.
    let end_box = segment.end_box();
    let dir = Vector2d::new(heading.cos(), heading.sin());
    raw.into_iter()
        .filter(|p| end_box.contains(*p))
        .map(|p| IntersectionPoint {
            pos: p,
            s: segment.s_range.min + (p - origin).dot(dir),
        })
        .collect()
}

/// Spiral/ellipse intersection via root-finding over arc-length.
///
/// Whether a spiral degenerates to a line is decided by whoever built the
/// segment, not here. No sign change across the segment's arc-length range
/// means no crossing is reported, as does a root-finder that runs out of
/// iterations.
fn spiral_intersect(segment: &RoadSegmentPrimitive, ellipse: &Ellipse) -> ArrayVec<IntersectionPoint, 2> {
    let mut out = ArrayVec::new();
    let f = |s: f64| ellipse.eval(segment.sample_s(s).0);
    if let Some(s) = brent_zero(segment.s_range.min, segment.s_range.max, SMALL_NUMBER, f) {
        let (pos, _) = segment.sample_s(s);
        if segment.end_box().contains(pos) {
            out.push(IntersectionPoint { pos, s });
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::road::RoadId;
    use crate::util::Interval;
    use assert_approx_eq::assert_approx_eq;

    fn ellipse(smja: f64, smna: f64) -> Ellipse {
        Ellipse {
            centre: Point2d::new(0.0, 0.0),
            heading: 0.0,
            smja,
            smna,
        }
    }

    fn line_between(a: Point2d, b: Point2d) -> RoadSegmentPrimitive {
        let delta = b - a;
        let length = delta.magnitude();
        RoadSegmentPrimitive::line(
            RoadId(1),
            [1],
            Interval::new(0.0, length),
            a,
            delta.y.atan2(delta.x),
        )
    }

    #[test]
    fn line_outside_reachable_extent_misses() {
        // Vertical line at x = 100 against a 50 x 30 ellipse.
        let seg = line_between(Point2d::new(100.0, 0.0), Point2d::new(100.0, 100.0));
        assert!(intersect(&seg, &ellipse(50.0, 30.0)).is_empty());
    }

    #[test]
    fn major_axis_line_crosses_twice() {
        let seg = line_between(Point2d::new(-100.0, 0.0), Point2d::new(100.0, 0.0));
        let points = intersect(&seg, &ellipse(50.0, 30.0));
        assert_eq!(points.len(), 2);
        assert_approx_eq!(points[0].pos.x, -50.0, 1e-9);
        assert_approx_eq!(points[0].pos.y, 0.0, 1e-9);
        assert_approx_eq!(points[1].pos.x, 50.0, 1e-9);
        assert_approx_eq!(points[1].pos.y, 0.0, 1e-9);
        assert_approx_eq!(points[0].s, 50.0, 1e-9);
        assert_approx_eq!(points[1].s, 150.0, 1e-9);
    }

    #[test]
    fn tangent_line_touches_once() {
        let seg = line_between(Point2d::new(-100.0, 30.0), Point2d::new(100.0, 30.0));
        let points = intersect(&seg, &ellipse(50.0, 30.0));
        assert_eq!(points.len(), 1);
        assert_approx_eq!(points[0].pos.x, 0.0, 1e-9);
        assert_approx_eq!(points[0].pos.y, 30.0, 1e-9);
    }

    #[test]
    fn vertical_chord_crosses_twice() {
        let e = ellipse(50.0, 30.0);
        let seg = line_between(Point2d::new(40.0, -100.0), Point2d::new(40.0, 100.0));
        let points = intersect(&seg, &e);
        assert_eq!(points.len(), 2);
        for p in &points {
            assert_approx_eq!(p.pos.x, 40.0, 1e-9);
            assert_approx_eq!(e.eval(p.pos), 0.0, 1e-9);
        }
        assert_approx_eq!(points[0].pos.y, -18.0, 1e-9);
        assert_approx_eq!(points[1].pos.y, 18.0, 1e-9);
    }

    #[test]
    fn near_vertical_branch_agrees_with_vertical() {
        // The two parametrizations must not disagree across the epsilon
        // boundary, or a rotating road segment would flicker.
        let e = Ellipse {
            centre: Point2d::new(5.0, -3.0),
            heading: 0.4,
            smja: 50.0,
            smna: 30.0,
        };
        let vertical = line_between(Point2d::new(20.0, -120.0), Point2d::new(20.0, 120.0));
        let hdg = std::f64::consts::FRAC_PI_2 - 1e-5;
        let slanted = RoadSegmentPrimitive::line(
            RoadId(1),
            [1],
            Interval::new(0.0, 240.0),
            Point2d::new(20.0, -120.0),
            hdg,
        );

        let a = intersect(&vertical, &e);
        let b = intersect(&slanted, &e);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_approx_eq!(pa.pos.x, pb.pos.x, 1e-2);
            assert_approx_eq!(pa.pos.y, pb.pos.y, 1e-2);
        }
    }

    #[test]
    fn clipping_promotes_the_surviving_point() {
        // Segment stops at the centre, so only the near crossing remains.
        let seg = line_between(Point2d::new(-100.0, 0.0), Point2d::new(0.0, 0.0));
        let points = intersect(&seg, &ellipse(50.0, 30.0));
        assert_eq!(points.len(), 1);
        assert_approx_eq!(points[0].pos.x, -50.0, 1e-9);
        assert_approx_eq!(points[0].s, 50.0, 1e-9);
    }

    #[test]
    fn solutions_satisfy_ellipse_and_segment_extent() {
        let e = Ellipse {
            centre: Point2d::new(12.0, 7.0),
            heading: 0.7,
            smja: 45.0,
            smna: 22.0,
        };
        let seg = line_between(Point2d::new(-90.0, -40.0), Point2d::new(110.0, 55.0));
        let end_box = seg.end_box();
        for p in intersect(&seg, &e) {
            assert_approx_eq!(e.eval(p.pos), 0.0, 1e-9);
            assert!(end_box.contains(p.pos));
            assert!(seg.s_range.contains(p.s));
        }
    }

    #[test]
    fn spiral_crossing_is_found_by_root_search() {
        let e = ellipse(50.0, 30.0);
        // A gentle clothoid entering the ellipse from the left.
        let seg = RoadSegmentPrimitive::spiral(
            RoadId(2),
            [1],
            Interval::new(0.0, 60.0),
            Point2d::new(-80.0, 0.0),
            0.0,
            0.0,
            1e-4,
        );
        let points = intersect(&seg, &e);
        assert_eq!(points.len(), 1);
        assert_approx_eq!(e.eval(points[0].pos), 0.0, 1e-6);
        assert!(points[0].s > 25.0 && points[0].s < 35.0);
    }

    #[test]
    fn spiral_without_sign_change_reports_nothing() {
        // Entirely inside the ellipse: both bracket ends evaluate negative.
        let e = ellipse(50.0, 30.0);
        let seg = RoadSegmentPrimitive::spiral(
            RoadId(2),
            [1],
            Interval::new(0.0, 20.0),
            Point2d::new(-10.0, 0.0),
            0.0,
            0.0,
            1e-4,
        );
        assert!(intersect(&seg, &e).is_empty());
    }
}

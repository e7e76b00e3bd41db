//! Converts ellipse boundary crossings into lane-qualified spawn candidates.

use arrayvec::ArrayVec;
use itertools::iproduct;

use crate::ellipse::Ellipse;
use crate::index::RoadGeometryIndex;
use crate::math::Point2d;
use crate::road::{Lane, RoadId};
use crate::solver;

/// A lane-qualified spawn position produced for one tick.
#[derive(Copy, Clone, Debug)]
pub struct SpawnCandidate {
    /// World position of the candidate.
    pub pos: Point2d,
    /// Road heading at the candidate position, in radians.
    pub heading: f64,
    /// Road to spawn on.
    pub road: RoadId,
    /// Lane to spawn in.
    pub lane: Lane,
    /// Arc-length along the road in m.
    pub s: f64,
}

/// Collects the spawn candidates sitting on the boundary of `ellipse`.
///
/// Queries the index with the ellipse bounding box, solves each returned
/// segment against the boundary, and expands every surviving crossing over
/// the segment's drivable lanes. Segments carrying no drivable lane are
/// discarded. Candidates come out in index traversal order; ties are not
/// special-cased.
pub fn select(index: &dyn RoadGeometryIndex, ellipse: &Ellipse) -> Vec<SpawnCandidate> {
    let mut candidates = Vec::new();
    for segment in index.query(&ellipse.bounding_box()) {
        if segment.lanes.is_empty() {
            continue;
        }
        let points: ArrayVec<_, 2> = solver::intersect(segment, ellipse)
            .into_iter()
            .map(|point| (point, segment.sample_s(point.s).1))
            .collect();
        for ((point, heading), lane) in iproduct!(points.iter(), segment.lanes.iter()) {
            candidates.push(SpawnCandidate {
                pos: point.pos,
                heading: *heading,
                road: segment.road,
                lane: *lane,
                s: point.s,
            });
        }
    }
    candidates
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::index::RTreeIndex;
    use crate::road::RoadSegmentPrimitive;
    use crate::util::Interval;
    use assert_approx_eq::assert_approx_eq;

    fn boundary() -> Ellipse {
        Ellipse {
            centre: Point2d::new(0.0, 0.0),
            heading: 0.0,
            smja: 50.0,
            smna: 30.0,
        }
    }

    #[test]
    fn candidates_expand_over_lanes() {
        let index = RTreeIndex::new(vec![RoadSegmentPrimitive::line(
            RoadId(7),
            [-1, 1],
            Interval::new(0.0, 200.0),
            Point2d::new(-100.0, 0.0),
            0.0,
        )]);
        let candidates = select(&index, &boundary());
        // Two crossings, two lanes each.
        assert_eq!(candidates.len(), 4);
        assert_approx_eq!(candidates[0].pos.x, -50.0, 1e-9);
        assert_eq!(candidates[0].lane, -1);
        assert_eq!(candidates[1].lane, 1);
        assert_approx_eq!(candidates[2].pos.x, 50.0, 1e-9);
        for c in &candidates {
            assert_eq!(c.road, RoadId(7));
            assert_approx_eq!(c.heading, 0.0, 1e-9);
        }
    }

    #[test]
    fn segments_without_lanes_are_discarded() {
        let index = RTreeIndex::new(vec![RoadSegmentPrimitive::line(
            RoadId(7),
            [],
            Interval::new(0.0, 200.0),
            Point2d::new(-100.0, 0.0),
            0.0,
        )]);
        assert!(select(&index, &boundary()).is_empty());
    }

    #[test]
    fn far_segments_produce_no_candidates() {
        let index = RTreeIndex::new(vec![RoadSegmentPrimitive::line(
            RoadId(7),
            [1],
            Interval::new(0.0, 200.0),
            Point2d::new(2000.0, 2000.0),
            0.0,
        )]);
        assert!(select(&index, &boundary()).is_empty());
    }

    #[test]
    fn spiral_segments_contribute_candidates() {
        let index = RTreeIndex::new(vec![RoadSegmentPrimitive::spiral(
            RoadId(9),
            [1],
            Interval::new(0.0, 60.0),
            Point2d::new(-80.0, 0.0),
            0.0,
            0.0,
            1e-4,
        )]);
        let candidates = select(&index, &boundary());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].road, RoadId(9));
        assert!(candidates[0].s > 25.0 && candidates[0].s < 35.0);
    }
}

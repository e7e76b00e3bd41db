//! Spatial index over road segment primitives.
//!
//! The host owns the road network; the engine only needs a range query
//! returning the segments that might cross a boundary's bounding box. The
//! bundled implementation wraps an R-tree bulk-loaded from the host's
//! segments once, before the action starts; it is read-only afterwards.

use rstar::{RTree, RTreeObject, AABB};

use crate::road::RoadSegmentPrimitive;
use crate::util::Aabb;

/// Range query over road segment primitives.
pub trait RoadGeometryIndex {
    /// Returns the segments whose bounding boxes overlap `area`.
    ///
    /// May return no results. Order is index traversal order; callers must
    /// not rely on anything stronger.
    fn query(&self, area: &Aabb) -> Vec<&RoadSegmentPrimitive>;
}

/// Entry stored in the R-tree: a segment with its precomputed envelope.
struct SegmentEntry {
    envelope: AABB<[f64; 2]>,
    segment: RoadSegmentPrimitive,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree backed implementation of [`RoadGeometryIndex`].
pub struct RTreeIndex {
    tree: RTree<SegmentEntry>,
}

impl RTreeIndex {
    /// Bulk-loads the index from the host's road segments.
    pub fn new(segments: Vec<RoadSegmentPrimitive>) -> Self {
        let entries = segments
            .into_iter()
            .map(|segment| SegmentEntry {
                envelope: to_envelope(&segment.bounding_box()),
                segment,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed segments.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl RoadGeometryIndex for RTreeIndex {
    fn query(&self, area: &Aabb) -> Vec<&RoadSegmentPrimitive> {
        self.tree
            .locate_in_envelope_intersecting(&to_envelope(area))
            .map(|entry| &entry.segment)
            .collect()
    }
}

fn to_envelope(aabb: &Aabb) -> AABB<[f64; 2]> {
    AABB::from_corners([aabb.x.min, aabb.y.min], [aabb.x.max, aabb.y.max])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::road::RoadId;
    use crate::util::Interval;

    fn line(road: u32, x: f64) -> RoadSegmentPrimitive {
        RoadSegmentPrimitive::line(
            RoadId(road),
            [1],
            Interval::new(0.0, 100.0),
            Point2d::new(x, 0.0),
            std::f64::consts::FRAC_PI_2,
        )
    }

    #[test]
    fn query_returns_overlapping_segments_only() {
        let index = RTreeIndex::new(vec![line(1, 0.0), line(2, 50.0), line(3, 500.0)]);
        assert_eq!(index.len(), 3);

        let area = Aabb::from_corners(Point2d::new(-10.0, -10.0), Point2d::new(60.0, 60.0));
        let hits = index.query(&area);
        assert_eq!(hits.len(), 2);
        for segment in &hits {
            assert!(segment.bounding_box().overlaps(&area));
        }
    }

    #[test]
    fn query_may_be_empty() {
        let index = RTreeIndex::new(vec![line(1, 0.0)]);
        let area = Aabb::from_corners(Point2d::new(1000.0, 1000.0), Point2d::new(1100.0, 1100.0));
        assert!(index.query(&area).is_empty());
    }
}

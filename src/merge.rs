use geo::{Coordinate, LineString, Polygon};
use slog_scope::info;

use crate::coord;
use crate::ring::RingIndex;

/// One raw coastline line, open or closed, in world coordinates. The
/// origin identifier range is carried along purely for diagnostics on
/// lines that never close
#[derive(Debug, Clone)]
pub struct CoastSegment {
    first_id: u64,
    last_id: u64,
    points: Vec<Coordinate<f64>>,
}

impl CoastSegment {
    pub fn new(origin_id: u64, points: Vec<Coordinate<f64>>) -> Self {
        Self::with_id_range(origin_id, origin_id, points)
    }

    pub fn with_id_range(first_id: u64, last_id: u64, points: Vec<Coordinate<f64>>) -> Self {
        CoastSegment {
            first_id,
            last_id,
            points,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    pub fn points(&self) -> &[Coordinate<f64>] {
        &self.points
    }

    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    pub fn first_id(&self) -> u64 {
        self.first_id
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }
}

/// Seam to the external line-merging subsystem. Open segments go in one
/// at a time; on completion every merged result (closed or not) comes
/// back exactly once through the callback
pub trait SegmentMerger {
    fn add(&mut self, segment: CoastSegment);

    /// Drains the merger, emitting each resulting line
    fn merge(&mut self, emit: &mut dyn FnMut(CoastSegment));
}

/// Routes merger output into the ring index, recording lines that never
/// closed as diagnostics
pub(crate) struct RingCollector<'a> {
    index: &'a mut RingIndex,
    unmerged_count: usize,
    unmerged_points: usize,
}

impl<'a> RingCollector<'a> {
    pub fn new(index: &'a mut RingIndex) -> Self {
        RingCollector {
            index,
            unmerged_count: 0,
            unmerged_points: 0,
        }
    }

    pub fn accept(&mut self, line: CoastSegment) {
        if line.is_closed() {
            add_ring(self.index, &line);
            return;
        }

        if line.first_id() == line.last_id() {
            info!("not merged coastline"; "way" => line.first_id(), "points" => line.points_count());
        } else {
            info!(
                "not merged coastline";
                "way_from" => line.first_id(),
                "way_to" => line.last_id(),
                "points" => line.points_count()
            );
        }
        self.unmerged_count += 1;
        self.unmerged_points += line.points_count();
    }

    pub fn has_unmerged(&self) -> bool {
        self.unmerged_count != 0
    }

    pub fn unmerged_count(&self) -> usize {
        self.unmerged_count
    }

    pub fn unmerged_points(&self) -> usize {
        self.unmerged_points
    }
}

/// Quantizes a closed line and inserts it into the index. The
/// duplicated closing vertex is dropped; the polygon type closes the
/// ring itself
pub(crate) fn add_ring(index: &mut RingIndex, line: &CoastSegment) {
    let points = line.points();
    if points.is_empty() {
        return;
    }

    let open_end = if points.first() == points.last() {
        points.len() - 1
    } else {
        points.len()
    };

    let exterior: LineString<f64> = points[..open_end].iter().map(|c| coord::to_grid(*c)).collect();
    index.insert(Polygon::new(exterior, Vec::new()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    #[test]
    fn closed_segment_detection() {
        let closed = CoastSegment::new(1, vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)]);
        assert!(closed.is_closed());

        let open = CoastSegment::new(2, vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)]);
        assert!(!open.is_closed());

        // too short to enclose anything even if the endpoints touch
        let degenerate = CoastSegment::new(3, vec![c(0.0, 0.0), c(0.0, 0.0)]);
        assert!(!degenerate.is_closed());
    }

    #[test]
    fn collector_indexes_closed_rings() {
        let mut index = RingIndex::default();
        let mut collector = RingCollector::new(&mut index);

        collector.accept(CoastSegment::new(
            10,
            vec![c(1.0, 1.0), c(1.0, 2.0), c(2.0, 2.0), c(2.0, 1.0), c(1.0, 1.0)],
        ));

        assert!(!collector.has_unmerged());
        assert_eq!(index.len(), 1);

        // duplicated closing vertex dropped, then re-closed by the
        // polygon type: 4 distinct corners + 1
        let ring = index.iter().next().unwrap();
        assert_eq!(ring.polygon().exterior().num_coords(), 5);
    }

    #[test]
    fn collector_counts_lines_that_never_closed() {
        let mut index = RingIndex::default();
        let mut collector = RingCollector::new(&mut index);

        collector.accept(CoastSegment::with_id_range(
            7,
            9,
            vec![c(0.0, 0.0), c(5.0, 0.0), c(5.0, 5.0)],
        ));

        assert!(collector.has_unmerged());
        assert_eq!(collector.unmerged_count(), 1);
        assert_eq!(collector.unmerged_points(), 3);
        assert!(index.is_empty());
    }
}

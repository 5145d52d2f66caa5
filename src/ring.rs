use geo::{LineString, Polygon};
use rstar::{RTree, RTreeObject, AABB};

/// A closed coastline ring on the quantized grid, keyed by its
/// bounding rectangle. The rectangle is cached at insertion so envelope
/// lookups stay cheap during the split phase
pub struct IndexedRing {
    polygon: Polygon<f64>,
    bbox: AABB<[f64; 2]>,
}

impl IndexedRing {
    pub(crate) fn new(polygon: Polygon<f64>) -> Self {
        debug_assert!(polygon.exterior().num_coords() > 0);
        let bbox = bounding_box(polygon.exterior());
        IndexedRing { polygon, bbox }
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn bbox(&self) -> AABB<[f64; 2]> {
        self.bbox
    }
}

impl RTreeObject for IndexedRing {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox
    }
}

fn bounding_box(ring: &LineString<f64>) -> AABB<[f64; 2]> {
    let mut min = [f64::MAX, f64::MAX];
    let mut max = [f64::MIN, f64::MIN];
    for c in &ring.0 {
        min[0] = min[0].min(c.x);
        min[1] = min[1].min(c.y);
        max[0] = max[0].max(c.x);
        max[1] = max[1].max(c.y);
    }
    AABB::from_corners(min, max)
}

/// Spatial index over every closed ring discovered so far. Append-only:
/// fully built before the split phase starts reading it, then shared
/// read-only between workers
#[derive(Default)]
pub struct RingIndex {
    tree: RTree<IndexedRing>,
}

impl RingIndex {
    pub fn insert(&mut self, ring: Polygon<f64>) {
        self.tree.insert(IndexedRing::new(ring));
    }

    /// Visits every ring whose bounding rectangle intersects `rect`.
    /// Overlap is tested on bounding rectangles only, so callers must
    /// expect false positives
    pub fn for_each_in_rect<'a>(&'a self, rect: &AABB<[f64; 2]>, mut f: impl FnMut(&'a IndexedRing)) {
        for ring in self.tree.locate_in_envelope_intersecting(rect) {
            f(ring);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedRing> {
        self.tree.iter()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn rect_ring(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        let exterior: LineString<f64> = vec![
            (min_x, min_y),
            (min_x, max_y),
            (max_x, max_y),
            (max_x, min_y),
        ]
        .into_iter()
        .collect();
        Polygon::new(exterior, Vec::new())
    }

    fn overlaps(a: &[f64; 4], b: &[f64; 4]) -> bool {
        a[0] <= b[2] && b[0] <= a[2] && a[1] <= b[3] && b[1] <= a[3]
    }

    #[test]
    fn query_never_misses_an_overlapping_rectangle() {
        let mut rng = StdRng::seed_from_u64(0xC0A57);
        let mut index = RingIndex::default();
        let mut boxes = Vec::new();

        for _ in 0..100 {
            let x = rng.gen_range(0.0, 900.0);
            let y = rng.gen_range(0.0, 900.0);
            let w = rng.gen_range(1.0, 80.0);
            let h = rng.gen_range(1.0, 80.0);
            boxes.push([x, y, x + w, y + h]);
            index.insert(rect_ring(x, y, x + w, y + h));
        }

        for _ in 0..50 {
            let x = rng.gen_range(0.0, 900.0);
            let y = rng.gen_range(0.0, 900.0);
            let query = [x, y, x + rng.gen_range(1.0, 200.0), y + rng.gen_range(1.0, 200.0)];

            let mut expected: Vec<[f64; 4]> = boxes
                .iter()
                .filter(|b| overlaps(b, &query))
                .copied()
                .collect();

            let mut found = Vec::new();
            index.for_each_in_rect(
                &AABB::from_corners([query[0], query[1]], [query[2], query[3]]),
                |ring| {
                    let bbox = ring.bbox();
                    found.push([bbox.lower()[0], bbox.lower()[1], bbox.upper()[0], bbox.upper()[1]]);
                },
            );

            let key = |b: &[f64; 4]| (b[0].to_bits(), b[1].to_bits(), b[2].to_bits(), b[3].to_bits());
            expected.sort_by_key(key);
            found.sort_by_key(key);
            assert_eq!(expected, found);
        }
    }

    #[test]
    fn bounding_rect_overlap_is_enough_for_a_hit() {
        // triangle hugging the top-left of its bounding rect
        let triangle: LineString<f64> = vec![(0.0, 0.0), (0.0, 100.0), (10.0, 0.0)]
            .into_iter()
            .collect();
        let mut index = RingIndex::default();
        index.insert(Polygon::new(triangle, Vec::new()));

        // the query only touches the geometry-free corner of the bbox;
        // the index must still report the ring (false positives are the
        // caller's problem)
        let mut hits = 0;
        index.for_each_in_rect(&AABB::from_corners([8.0, 80.0], [9.0, 90.0]), |_| hits += 1);
        assert_eq!(hits, 1);

        // clear of the bbox entirely: no hit
        let mut far_hits = 0;
        index.for_each_in_rect(&AABB::from_corners([200.0, 200.0], [210.0, 210.0]), |_| {
            far_hits += 1
        });
        assert_eq!(far_hits, 0);
    }
}

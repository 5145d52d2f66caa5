use geo::{Coordinate, LineString, MultiPolygon, Polygon};
use geo_booleanop::boolean::BooleanOp;
use itertools::Itertools;
use rstar::{Envelope, AABB};

use crate::coord;
use crate::ring::IndexedRing;

/// Water remainder of one grid cell, built up by subtracting every land
/// ring the index reports for it. Starts from the cell rectangle (the
/// "fully water" hypothesis).
///
/// Rings wholly inside the cell rectangle skip the boolean primitive
/// and are appended as separate rings; the emitted ring set is read
/// with the even-odd rule, so such a ring punches a land hole. The
/// containment test is against the original cell rectangle only, and
/// appended rings take no part in later boolean ops.
pub struct CellDifference {
    cell_bbox: AABB<[f64; 2]>,
    water: MultiPolygon<f64>,
    islands: Vec<Polygon<f64>>,
    water_points: usize,
    island_points: usize,
}

impl CellDifference {
    pub fn new((min, max): (Coordinate<f64>, Coordinate<f64>)) -> Self {
        let exterior: LineString<f64> = vec![
            (min.x, min.y),
            (min.x, max.y),
            (max.x, max.y),
            (max.x, min.y),
        ]
        .into_iter()
        .collect();
        let rect = Polygon::new(exterior, Vec::new());
        let water_points = polygon_points(&rect);

        CellDifference {
            cell_bbox: AABB::from_corners([min.x, min.y], [max.x, max.y]),
            water: MultiPolygon(vec![rect]),
            islands: Vec::new(),
            water_points,
            island_points: 0,
        }
    }

    pub fn cell_bbox(&self) -> AABB<[f64; 2]> {
        self.cell_bbox
    }

    /// Subtracts one land ring from the accumulated water area
    pub fn subtract(&mut self, ring: &IndexedRing) {
        if self.cell_bbox.contains_envelope(&ring.bbox()) {
            // wholly inside the cell, becomes an even-odd hole without
            // running the boolean primitive
            self.island_points += polygon_points(ring.polygon());
            self.islands.push(ring.polygon().clone());
        } else {
            self.water = self.water.difference(ring.polygon());
            self.water_points = self.water.0.iter().map(polygon_points).sum();
        }
    }

    /// Running vertex count over everything produced so far, closing
    /// vertices excluded. Drives the refinement check
    pub fn points_count(&self) -> usize {
        self.water_points + self.island_points
    }

    pub fn polygons_count(&self) -> usize {
        self.water.0.len() + self.islands.len()
    }

    /// Accepted geometry back in world coordinates, even-odd ring set
    pub fn into_world_polygons(self) -> Vec<Polygon<f64>> {
        self.water
            .0
            .into_iter()
            .chain(self.islands)
            .map(|p| polygon_to_world(&p))
            .collect_vec()
    }
}

pub(crate) fn polygon_points(polygon: &Polygon<f64>) -> usize {
    ring_points(polygon.exterior()) + polygon.interiors().iter().map(ring_points).sum::<usize>()
}

fn ring_points(ring: &LineString<f64>) -> usize {
    // closed rings carry a duplicated last vertex
    ring.num_coords().saturating_sub(1)
}

fn line_to_world(line: &LineString<f64>) -> LineString<f64> {
    line.0.iter().map(|c| coord::to_world(*c)).collect()
}

fn polygon_to_world(polygon: &Polygon<f64>) -> Polygon<f64> {
    Polygon::new(
        line_to_world(polygon.exterior()),
        polygon.interiors().iter().map(line_to_world).collect(),
    )
}

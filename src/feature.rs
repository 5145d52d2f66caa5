use geo::Polygon;
use parking_lot::Mutex;

use crate::diff::polygon_points;

/// Area type tag the downstream feature encoder understands
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AreaType {
    Coastline,
}

/// Finished water geometry for one grid cell: an even-odd ring set in
/// world coordinates, addressed by the cell's stable id
#[derive(Debug, Clone)]
pub struct CoastFeature {
    cell: i64,
    area_type: AreaType,
    polygons: Vec<Polygon<f64>>,
}

impl CoastFeature {
    pub(crate) fn new(cell: i64, polygons: Vec<Polygon<f64>>) -> Self {
        CoastFeature {
            cell,
            area_type: AreaType::Coastline,
            polygons,
        }
    }

    pub fn cell(&self) -> i64 {
        self.cell
    }

    pub fn area_type(&self) -> AreaType {
        self.area_type
    }

    /// Even-odd ring set in world coordinates
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    pub fn points_count(&self) -> usize {
        self.polygons.iter().map(polygon_points).sum()
    }
}

/// Thread-safe sink collecting features as cells complete. Cells finish
/// in no particular order; the lock is held only for the append
#[derive(Default)]
pub struct FeatureCollector {
    features: Mutex<Vec<CoastFeature>>,
}

impl FeatureCollector {
    pub fn emit(&self, feature: CoastFeature) {
        self.features.lock().push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_features(self) -> Vec<CoastFeature> {
        self.features.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn unit_square() -> Polygon<f64> {
        let exterior: LineString<f64> = vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
            .into_iter()
            .collect();
        Polygon::new(exterior, Vec::new())
    }

    #[test]
    fn collector_keeps_every_emitted_feature() {
        let collector = FeatureCollector::default();
        assert!(collector.is_empty());

        collector.emit(CoastFeature::new(3, vec![unit_square()]));
        collector.emit(CoastFeature::new(8, vec![unit_square(), unit_square()]));
        assert_eq!(collector.len(), 2);

        let features = collector.into_features();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].area_type(), AreaType::Coastline);
        assert_eq!(features[1].points_count(), 8);
    }
}

use slog_scope::{debug, info};
use thiserror::Error;

use crate::cell::CellId;
use crate::feature::{CoastFeature, FeatureCollector};
use crate::merge::{self, CoastSegment, RingCollector, SegmentMerger};
use crate::params::CoastParams;
use crate::ring::RingIndex;
use crate::splitter;

#[derive(Debug, Error)]
pub enum CoastError {
    #[error("no usable worker threads detected")]
    NoWorkerThreads,

    #[error("degenerate geometry for cell {cell:?}: {polygons} polygons, {points} points")]
    DegenerateCell {
        cell: CellId,
        polygons: usize,
        points: usize,
    },
}

/// Turns raw coastline segments into per-cell water area features.
///
/// Closed input goes straight into the ring index; open input is
/// handed to the external merger and collected on `finish`. Once the
/// index is complete, `features` runs the multithreaded split pass
pub struct CoastlineGenerator<M> {
    params: CoastParams,
    merger: M,
    index: RingIndex,
}

impl<M: SegmentMerger> CoastlineGenerator<M> {
    pub fn new(params: CoastParams, merger: M) -> Self {
        CoastlineGenerator {
            params,
            merger,
            index: RingIndex::default(),
        }
    }

    /// Routes one raw coastline record
    pub fn process(&mut self, segment: CoastSegment) {
        if segment.is_closed() {
            merge::add_ring(&mut self.index, &segment);
        } else {
            self.merger.add(segment);
        }
    }

    /// Completes the merge phase. Returns false if any coastline never
    /// closed; the rings that did merge stay available for `features`
    pub fn finish(&mut self) -> bool {
        let Self { merger, index, .. } = self;
        let mut collector = RingCollector::new(index);
        merger.merge(&mut |line| collector.accept(line));

        if collector.has_unmerged() {
            info!("total not merged coasts"; "count" => collector.unmerged_count());
            info!("total points in not merged coasts"; "points" => collector.unmerged_points());
            return false;
        }
        true
    }

    /// Runs the region-difference pass over the whole world and returns
    /// every accepted cell feature
    pub fn features(&self) -> Result<Vec<CoastFeature>, CoastError> {
        let threads = self.params.threads.unwrap_or_else(num_cpus::get);
        if threads == 0 {
            return Err(CoastError::NoWorkerThreads);
        }

        debug!("computing coastline features"; "rings" => self.index.len(), "threads" => threads);

        let depth = self.params.stable_cell_depth();
        let sink = FeatureCollector::default();
        splitter::process(
            threads,
            self.params.start_level,
            self.params.max_level,
            self.params.max_cell_points,
            &self.index,
            |cell, diff| {
                let polygons = diff.polygons_count();
                let points = diff.points_count();

                // anything this small means the merge or index phase
                // fed us garbage
                if polygons == 0 || points < 3 {
                    return Err(CoastError::DegenerateCell {
                        cell,
                        polygons,
                        points,
                    });
                }

                sink.emit(CoastFeature::new(cell.to_int64(depth), diff.into_world_polygons()));
                Ok(())
            },
        )?;

        Ok(sink.into_features())
    }

    pub fn ring_count(&self) -> usize {
        self.index.len()
    }
}

//! Coastline assembly for the offline map generator: stitches raw
//! coastline segments into closed land rings, then splits the world
//! into per-cell water area features with a multithreaded quadtree
//! pass.

mod cell;
mod coord;
mod diff;
mod feature;
mod generator;
mod merge;
mod params;
mod ring;
mod splitter;

pub mod logging;

pub use cell::CellId;
pub use feature::{AreaType, CoastFeature, FeatureCollector};
pub use generator::{CoastError, CoastlineGenerator};
pub use merge::{CoastSegment, SegmentMerger};
pub use params::CoastParams;
pub use ring::{IndexedRing, RingIndex};

/// Catch-all result for configuration loading
pub type BoxedResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

//! Spatial Index Module
//!
//! A 2-D bounding-box index over feature ids, kept consistent with the
//! engine's feature map by the single-writer command loop: every id in the
//! map has exactly one entry here, keyed by the feature's current rectangle.

pub mod rtree;


pub use rtree::SpatialIndex;

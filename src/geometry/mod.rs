// src/geometry/mod.rs

pub mod clipping;
pub mod polygon;
pub mod properties;

pub use clipping::{HalfPlane, clip, clip_halfplane};
pub use polygon::Polygon;
pub use properties::{Orientation, PolygonProperties};

/// Toleranz für geometrische Vergleiche.
pub const EPSILON: f64 = 1e-9;

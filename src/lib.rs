// src/lib.rs

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod navigator;
pub mod tessellation;
pub mod tree;
pub mod types;

// Re-exports für einfache Verwendung
pub use error::{TreemapError, TreemapResult};
pub use types::Point2D;

// Öffentliche API
pub mod prelude {
    pub use super::{
        boundary::CircularBoundary,
        error::{TreemapError, TreemapResult},
        geometry::{Orientation, Polygon, PolygonProperties},
        navigator::{NavigationOutcome, Navigator},
        tessellation::{
            Cell, Relaxation, RelaxationStats, Site, TessellationConfig, tessellate,
        },
        tree::{NodeId, NodeRecord, TreeNode, WeightTree},
        types::Point2D,
    };
}

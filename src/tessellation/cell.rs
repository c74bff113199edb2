// src/tessellation/cell.rs

use crate::geometry::Polygon;
use crate::tree::NodeId;
use crate::types::Point2D;

/// Ergebniszelle eines Geschwisterknotens.
///
/// Ein leeres Polygon mit Fläche 0 ist der darstellbare "unsichtbare"
/// Zustand, etwa bei degenerierter Boundary oder einem aus der Partition
/// gedrängten Seed. Renderer überspringen solche Zellen.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Knoten, zu dem diese Zelle gehört
    pub node: NodeId,
    /// Finale Seed-Position der Relaxation
    pub seed: Point2D,
    /// Power-Gewicht des Seeds in der Laguerre-Metrik
    pub power_weight: f64,
    /// Zellpolygon, auf die Boundary geclippt
    pub polygon: Polygon,
    /// Flächen-gewichteter Schwerpunkt des Polygons
    pub centroid: Point2D,
    /// Tatsächliche Fläche
    pub area: f64,
    /// Sollfläche gemäß Gewichtsanteil
    pub target_area: f64,
}

impl Cell {
    pub fn is_visible(&self) -> bool {
        !self.polygon.is_degenerate() && self.area > 0.0
    }

    /// Relativer Flächenfehler gegenüber der Sollfläche.
    pub fn relative_error(&self) -> f64 {
        if self.target_area > 0.0 {
            (self.area - self.target_area).abs() / self.target_area
        } else {
            0.0
        }
    }
}

// src/geometry/polygon.rs

use crate::types::Point2D;
use std::fmt;

/// Polygon als offene Vertexliste ohne duplizierten Schlusspunkt.
///
/// Die Kante vom letzten zum ersten Vertex ist implizit. Ein leeres oder
/// degeneriertes Polygon (< 3 Vertices) ist ein gültiger Wert und bedeutet
/// "nicht darstellbar", kein Fehler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2D>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point2D>) -> Self {
        Self { vertices }
    }

    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Weniger als 3 Vertices spannen keine Fläche auf.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Achsenparallele Bounding Box, `None` für leere Polygone.
    pub fn bounds(&self) -> Option<(Point2D, Point2D)> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for vertex in &self.vertices[1..] {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
        }

        Some((min, max))
    }

    /// Kanten als Paare aufeinanderfolgender Vertices, inklusive Schlusskante.
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({} vertices)", self.vertices.len())
    }
}

impl From<Vec<Point2D>> for Polygon {
    fn from(vertices: Vec<Point2D>) -> Self {
        Self::new(vertices)
    }
}

impl From<Polygon> for Vec<Point2D> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}

impl IntoIterator for Polygon {
    type Item = Point2D;
    type IntoIter = std::vec::IntoIter<Point2D>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.into_iter()
    }
}

impl<'a> IntoIterator for &'a Polygon {
    type Item = &'a Point2D;
    type IntoIter = std::slice::Iter<'a, Point2D>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}

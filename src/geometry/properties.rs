// src/geometry/properties.rs

use super::{EPSILON, Polygon};
use crate::types::Point2D;

/// Trait für abgeleitete Polygon-Eigenschaften
pub trait PolygonProperties {
    /// Vorzeichenbehaftete Fläche (Shoelace-Formel); positiv bei CCW-Umlauf
    fn signed_area(&self) -> f64;

    /// Betrag der Fläche; Polygone mit < 3 Vertices haben Fläche 0
    fn area(&self) -> f64;

    /// Umfang des Polygons
    fn perimeter(&self) -> f64;

    /// Flächen-gewichteter Schwerpunkt
    fn centroid(&self) -> Option<Point2D>;

    /// Prüft ob ein Punkt innerhalb des Polygons liegt (Ray-Casting)
    fn contains_point(&self, point: Point2D) -> bool;

    /// Prüft ob das Polygon konvex ist
    fn is_convex(&self) -> bool;

    /// Umlaufsinn
    fn orientation(&self) -> Orientation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

impl PolygonProperties for Polygon {
    fn signed_area(&self) -> f64 {
        let vertices = self.vertices();
        if vertices.len() < 3 {
            return 0.0;
        }

        let n = vertices.len();
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += vertices[i].x * vertices[j].y;
            area -= vertices[j].x * vertices[i].y;
        }

        area * 0.5
    }

    fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    fn perimeter(&self) -> f64 {
        let vertices = self.vertices();
        if vertices.len() < 2 {
            return 0.0;
        }

        let n = vertices.len();
        (0..n)
            .map(|i| vertices[i].distance_to(vertices[(i + 1) % n]))
            .sum()
    }

    /// Flächen-gewichteter Schwerpunkt: jede Kante trägt ihren Mittelpunkt
    /// gewichtet mit dem Kreuzterm `x_i*y_{i+1} - x_{i+1}*y_i` bei,
    /// normalisiert mit `6 * signed_area`. Ein reines Vertex-Mittel wäre nur
    /// für regelmäßige Polygone korrekt und verschiebt den Schwerpunkt in
    /// Richtung dichter Vertexfolgen.
    fn centroid(&self) -> Option<Point2D> {
        let vertices = self.vertices();
        match vertices.len() {
            0 => return None,
            1 => return Some(vertices[0]),
            2 => return Some((vertices[0] + vertices[1]) / 2.0),
            _ => {}
        }

        let n = vertices.len();
        let mut area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;

        for i in 0..n {
            let p1 = vertices[i];
            let p2 = vertices[(i + 1) % n];
            let cross = p1.x * p2.y - p2.x * p1.y;
            area += cross;
            cx += (p1.x + p2.x) * cross;
            cy += (p1.y + p2.y) * cross;
        }

        if area.abs() < EPSILON {
            // Degeneriert: Fallback auf arithmetisches Mittel
            let sum = vertices.iter().fold(Point2D::ZERO, |acc, v| acc + *v);
            return Some(sum / n as f64);
        }

        area *= 0.5;
        Some(Point2D::new(cx / (6.0 * area), cy / (6.0 * area)))
    }

    fn contains_point(&self, point: Point2D) -> bool {
        let vertices = self.vertices();
        if vertices.len() < 3 {
            return false;
        }

        let n = vertices.len();
        let mut inside = false;
        let mut j = n - 1;

        for i in 0..n {
            let vi = vertices[i];
            let vj = vertices[j];

            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    fn is_convex(&self) -> bool {
        let vertices = self.vertices();
        let n = vertices.len();
        if n < 3 {
            return false;
        }

        let mut sign = None;

        for i in 0..n {
            let p1 = vertices[i];
            let p2 = vertices[(i + 1) % n];
            let p3 = vertices[(i + 2) % n];

            let cross = (p2.x - p1.x) * (p3.y - p2.y) - (p2.y - p1.y) * (p3.x - p2.x);

            if cross.abs() > EPSILON {
                let current_sign = cross > 0.0;
                match sign {
                    None => sign = Some(current_sign),
                    Some(s) if s != current_sign => return false,
                    _ => {}
                }
            }
        }

        true
    }

    fn orientation(&self) -> Orientation {
        let area = self.signed_area();
        if area.abs() < EPSILON {
            Orientation::Collinear
        } else if area > 0.0 {
            Orientation::CounterClockwise
        } else {
            Orientation::Clockwise
        }
    }
}

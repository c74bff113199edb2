// src/geometry/clipping.rs

use super::{EPSILON, Polygon};
use crate::types::Point2D;
use nalgebra::Vector2;

/// Halbebene `normal · x <= offset`.
///
/// Kern des Power-Diagramms: jede Zelle ist der Schnitt der Boundary mit den
/// Power-Bisektor-Halbebenen gegen alle anderen Seeds.
#[derive(Debug, Clone, Copy)]
pub struct HalfPlane {
    pub normal: Vector2<f64>,
    pub offset: f64,
}

impl HalfPlane {
    /// Halbebene der Punkte links der gerichteten Kante `a -> b`.
    pub fn left_of_edge(a: Point2D, b: Point2D) -> Self {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        Self {
            normal: Vector2::new(dy, -dx),
            offset: dy * a.x - dx * a.y,
        }
    }

    /// Power-Bisektor zwischen zwei gewichteten Seeds: die Menge der Punkte
    /// mit `|x - p_i|^2 - w_i <= |x - p_j|^2 - w_j`, also näher an Seed `i`
    /// im Power-Abstand.
    pub fn power_bisector(p_i: Point2D, w_i: f64, p_j: Point2D, w_j: f64) -> Self {
        let normal = 2.0 * (p_j.to_vector() - p_i.to_vector());
        let offset = p_j.norm_squared() - p_i.norm_squared() + w_i - w_j;
        Self { normal, offset }
    }

    pub fn contains(&self, point: Point2D) -> bool {
        self.normal.dot(&point.to_vector()) <= self.offset + EPSILON
    }

    /// Schnittpunkt der Strecke `s -> e` mit der Randgeraden der Halbebene.
    fn intersect_segment(&self, s: Point2D, e: Point2D) -> Option<Point2D> {
        let d = e.to_vector() - s.to_vector();
        let denominator = self.normal.dot(&d);

        if denominator.abs() < EPSILON {
            return None;
        }

        let t = (self.offset - self.normal.dot(&s.to_vector())) / denominator;
        Some(s.lerp(e, t))
    }
}

/// Clippt ein Polygon gegen eine Halbebene (ein Sutherland-Hodgman-Durchlauf).
/// Ein leeres Ergebnis ist ein Wert, kein Fehler.
pub fn clip_halfplane(subject: &Polygon, plane: &HalfPlane) -> Polygon {
    let input = subject.vertices();
    if input.is_empty() {
        return Polygon::empty();
    }

    let mut output = Vec::with_capacity(input.len() + 1);
    let mut s = input[input.len() - 1];

    for &e in input {
        if plane.contains(e) {
            if !plane.contains(s) {
                // Eintretende Kante
                if let Some(intersection) = plane.intersect_segment(s, e) {
                    output.push(intersection);
                }
            }
            output.push(e);
        } else if plane.contains(s) {
            // Austretende Kante
            if let Some(intersection) = plane.intersect_segment(s, e) {
                output.push(intersection);
            }
        }
        s = e;
    }

    if output.len() >= 3 {
        Polygon::new(output)
    } else {
        Polygon::empty()
    }
}

/// Sutherland-Hodgman-Clipping gegen einen konvexen, CCW orientierten
/// Clipper. Für konvexe Clipper ist das Verfahren exakt und total; das
/// Ergebnis ist leer, wenn der Schnitt leer ist.
pub fn clip(subject: &Polygon, clipper: &Polygon) -> Polygon {
    if subject.is_empty() || clipper.is_degenerate() {
        return Polygon::empty();
    }

    let mut clipped = subject.clone();
    for (a, b) in clipper.edges() {
        if clipped.is_empty() {
            break;
        }
        clipped = clip_halfplane(&clipped, &HalfPlane::left_of_edge(a, b));
    }

    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PolygonProperties;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(size, 0.0),
            Point2D::new(size, size),
            Point2D::new(0.0, size),
        ])
    }

    #[test]
    fn test_halfplane_splits_square() {
        // Senkrechter Schnitt bei x = 1 behält die linke Hälfte.
        let plane = HalfPlane {
            normal: nalgebra::Vector2::new(1.0, 0.0),
            offset: 1.0,
        };
        let clipped = clip_halfplane(&square(2.0), &plane);
        assert_relative_eq!(clipped.area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_halfplane_keeps_contained_polygon() {
        let plane = HalfPlane {
            normal: nalgebra::Vector2::new(1.0, 0.0),
            offset: 10.0,
        };
        let clipped = clip_halfplane(&square(2.0), &plane);
        assert_relative_eq!(clipped.area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_halfplane_rejects_outside_polygon() {
        let plane = HalfPlane {
            normal: nalgebra::Vector2::new(1.0, 0.0),
            offset: -1.0,
        };
        assert!(clip_halfplane(&square(2.0), &plane).is_empty());
    }

    #[test]
    fn test_clip_overlapping_squares() {
        let subject = square(2.0);
        let clipper = Polygon::new(vec![
            Point2D::new(1.0, 1.0),
            Point2D::new(3.0, 1.0),
            Point2D::new(3.0, 3.0),
            Point2D::new(1.0, 3.0),
        ]);

        let clipped = clip(&subject, &clipper);
        assert_relative_eq!(clipped.area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clip_disjoint_is_empty() {
        let subject = square(1.0);
        let clipper = Polygon::new(vec![
            Point2D::new(5.0, 5.0),
            Point2D::new(6.0, 5.0),
            Point2D::new(6.0, 6.0),
            Point2D::new(5.0, 6.0),
        ]);
        assert!(clip(&subject, &clipper).is_empty());
    }

    #[test]
    fn test_power_bisector_unweighted_is_perpendicular_bisector() {
        let plane = HalfPlane::power_bisector(
            Point2D::new(0.0, 0.0),
            0.0,
            Point2D::new(2.0, 0.0),
            0.0,
        );
        // Ohne Gewichte liegt die Grenze bei x = 1.
        assert!(plane.contains(Point2D::new(0.5, 0.3)));
        assert!(!plane.contains(Point2D::new(1.5, -0.3)));
        assert!(plane.contains(Point2D::new(1.0, 7.0)));
    }

    #[test]
    fn test_power_bisector_shifts_with_weight() {
        // Höheres Gewicht auf Seed i schiebt die Grenze zu Seed j.
        let plane = HalfPlane::power_bisector(
            Point2D::new(0.0, 0.0),
            2.0,
            Point2D::new(2.0, 0.0),
            0.0,
        );
        assert!(plane.contains(Point2D::new(1.2, 0.0)));
        assert!(!plane.contains(Point2D::new(1.6, 0.0)));
    }
}

// src/tessellation/power_diagram.rs

use crate::geometry::{EPSILON, HalfPlane, Polygon, clip_halfplane};
use crate::types::Point2D;

/// Baut die Zellen des Power-Diagramms (Laguerre-Voronoi) der Seeds.
///
/// Zelle `i` ist der Schnitt der Boundary mit den Power-Bisektor-Halbebenen
/// gegen alle anderen Seeds. Der Schnitt konvexer Mengen ist konvex, die
/// Zellen überlappen nicht und füllen die Boundary lückenlos. Mit lauter
/// Null-Gewichten entsteht das gewöhnliche Voronoi-Diagramm.
///
/// Eine Zelle kann leer ausfallen, wenn ihr Seed im Power-Abstand überall
/// unterliegt; das ist ein gültiger Zustand, kein Fehler.
pub fn power_cells(seeds: &[Point2D], powers: &[f64], boundary: &Polygon) -> Vec<Polygon> {
    debug_assert_eq!(seeds.len(), powers.len());

    seeds
        .iter()
        .enumerate()
        .map(|(i, &seed)| {
            let mut cell = boundary.clone();

            for (j, &other) in seeds.iter().enumerate() {
                if i == j {
                    continue;
                }
                if cell.is_empty() {
                    break;
                }

                if seed.distance_squared_to(other) < EPSILON {
                    // Zusammenfallende Seeds haben keinen Bisektor; der
                    // niedrigere Index behält die Zelle.
                    if powers[i] < powers[j] || (powers[i] == powers[j] && i > j) {
                        cell = Polygon::empty();
                    }
                    continue;
                }

                let bisector = HalfPlane::power_bisector(seed, powers[i], other, powers[j]);
                cell = clip_halfplane(&cell, &bisector);
            }

            cell
        })
        .collect()
}

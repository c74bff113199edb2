// src/tessellation/engine.rs

use super::cell::Cell;
use super::config::TessellationConfig;
use super::power_diagram::power_cells;
use crate::boundary::CircularBoundary;
use crate::error::TreemapResult;
use crate::geometry::{Polygon, PolygonProperties};
use crate::tree::{MIN_WEIGHT, NodeId, WeightTree};
use crate::types::Point2D;
use std::f64::consts::{PI, TAU};
use tracing::{debug, warn};

/// Ein Geschwisterknoten als Eingabe der Tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub node: NodeId,
    pub weight: f64,
}

impl Site {
    pub fn new(node: NodeId, weight: f64) -> Self {
        Self { node, weight }
    }

    /// Sites für die direkten Kinder eines Knotens, in Baumreihenfolge.
    pub fn for_children(tree: &WeightTree, parent: NodeId) -> Vec<Site> {
        tree.children(parent)
            .iter()
            .filter_map(|&id| tree.node(id).map(|node| Site::new(id, node.weight)))
            .collect()
    }
}

/// Kennzahlen einer einzelnen Iteration.
#[derive(Debug, Clone)]
pub struct IterationStats {
    pub iteration: usize,
    /// Maximaler relativer Flächenfehler über alle Zellen
    pub max_relative_error: f64,
    /// Summe der Seed-Bewegungen dieser Iteration
    pub total_movement: f64,
}

/// Statistiken über einen Relaxationslauf.
#[derive(Debug, Clone, Default)]
pub struct RelaxationStats {
    pub iterations: Vec<IterationStats>,
    pub converged: bool,
    pub final_iteration: usize,
}

/// Power-Diagramm-Lloyd-Relaxation.
///
/// Jede Iteration baut das Power-Diagramm der Seeds, clippt es auf die
/// Boundary, zieht jeden Seed gedämpft Richtung Zellschwerpunkt und
/// korrigiert sein Power-Gewicht über das Log-Verhältnis von Soll- zu
/// Istfläche. Reine Zentroid-Relaxation ohne Gewichtskorrektur konvergiert
/// gegen gleich große Zellen und ignoriert damit die Eingabegewichte;
/// der Gewichtsschritt ist deshalb fester Bestandteil der Schleife.
///
/// Die Schleife ist als Stepper ausgelegt: `step()` führt genau eine
/// Iteration aus, so dass interaktive Aufrufer zwischen Iterationen
/// abgeben und veraltete Läufe verwerfen können.
pub struct Relaxation {
    config: TessellationConfig,
    boundary: Polygon,
    center: Point2D,
    sites: Vec<Site>,
    targets: Vec<f64>,
    seeds: Vec<Point2D>,
    powers: Vec<f64>,
    polygons: Vec<Polygon>,
    areas: Vec<f64>,
    iteration: usize,
    done: bool,
    stats: RelaxationStats,
}

impl Relaxation {
    pub fn new(
        sites: Vec<Site>,
        boundary_config: &CircularBoundary,
        config: &TessellationConfig,
    ) -> TreemapResult<Self> {
        boundary_config.validate()?;
        config.validate()?;

        let boundary = boundary_config.generate();
        let boundary_area = boundary.area();
        let center = boundary_config.center();
        let n = sites.len();

        let weights: Vec<f64> = sites.iter().map(|site| effective_weight(site.weight)).collect();
        let weight_sum: f64 = weights.iter().sum();

        let mut relaxation = Self {
            config: config.clone(),
            center,
            targets: weights
                .iter()
                .map(|w| boundary_area * w / weight_sum)
                .collect(),
            seeds: Vec::with_capacity(n),
            powers: vec![0.0; n],
            polygons: vec![Polygon::empty(); n],
            areas: vec![0.0; n],
            iteration: 0,
            done: false,
            stats: RelaxationStats::default(),
            sites,
            boundary,
        };

        // Degenerierte Boundary: nichts zu zeichnen, alle Zellen bleiben leer.
        if relaxation.boundary.is_degenerate() || boundary_area <= 0.0 {
            relaxation.targets = vec![0.0; n];
            relaxation.done = true;
            return Ok(relaxation);
        }

        match n {
            0 => relaxation.done = true,
            1 => {
                // Ein einzelnes Kind bekommt die gesamte Boundary, keine
                // Iteration nötig.
                relaxation.seeds.push(center);
                relaxation.polygons[0] = relaxation.boundary.clone();
                relaxation.areas[0] = boundary_area;
                relaxation.stats.converged = true;
                relaxation.done = true;
            }
            _ => {
                // Deterministische Startkonfiguration: Seeds gleichmäßig auf
                // einem Kreis um das Boundary-Zentrum, dadurch ordnungs-
                // unabhängig und frei von zusammenfallenden Seeds.
                let radius = config.initial_radius_fraction
                    * boundary_config.width.min(boundary_config.height);
                for i in 0..n {
                    let angle = (i as f64 / n as f64) * TAU;
                    relaxation.seeds.push(Point2D::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    ));
                }
            }
        }

        Ok(relaxation)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn stats(&self) -> &RelaxationStats {
        &self.stats
    }

    /// Führt eine Iteration aus. Liefert `false`, sobald der Lauf
    /// konvergiert ist oder das Iterationsbudget erschöpft hat.
    pub fn step(&mut self) -> bool {
        if self.done {
            return false;
        }

        let n = self.sites.len();

        // a/b. Partition aufbauen und auf die Boundary clippen
        self.polygons = power_cells(&self.seeds, &self.powers, &self.boundary);

        // c. Flächen und Schwerpunkte messen
        let mut max_relative_error: f64 = 0.0;
        let mut total_movement = 0.0;

        for i in 0..n {
            let mut area = self.polygons[i].area();
            if !area.is_finite() {
                self.recover_seed(i);
                self.polygons[i] = Polygon::empty();
                area = 0.0;
            }
            self.areas[i] = area;
            max_relative_error =
                max_relative_error.max((area - self.targets[i]).abs() / self.targets[i]);

            // d. Seed gedämpft Richtung Schwerpunkt ziehen; leere Zellen
            // lassen ihren Seed stehen.
            if let Some(centroid) = self.polygons[i].centroid() {
                if centroid.is_finite() {
                    let blended = self.seeds[i].lerp(centroid, 1.0 - self.config.centroid_damping);
                    total_movement += self.seeds[i].distance_to(blended);
                    self.seeds[i] = blended;
                }
            }
            if !self.seeds[i].is_finite() {
                self.recover_seed(i);
            }
        }

        // e. Power-Gewichte über das Log-Verhältnis von Soll zu Ist
        // nachführen: zu kleine Zellen gewinnen Power, zu große verlieren.
        self.update_powers();

        self.iteration += 1;
        self.stats.iterations.push(IterationStats {
            iteration: self.iteration,
            max_relative_error,
            total_movement,
        });
        self.stats.final_iteration = self.iteration;

        // f. Konvergenzprüfung auf den eben gemessenen Flächen
        if max_relative_error < self.config.convergence_tolerance {
            debug!(
                iteration = self.iteration,
                max_relative_error, "tessellation converged"
            );
            self.stats.converged = true;
            self.done = true;
        } else if self.iteration >= self.config.max_iterations {
            debug!(
                iteration = self.iteration,
                max_relative_error, "iteration budget exhausted before convergence"
            );
            self.done = true;
        }

        !self.done
    }

    fn update_powers(&mut self) {
        let n = self.sites.len();

        for i in 0..n {
            let log_ratio = if self.areas[i] > 0.0 {
                (self.targets[i] / self.areas[i]).ln()
            } else {
                // Leere Zelle: maximal zulässiger Wachstumsschritt
                self.config.max_log_step
            };

            // Skala am quadrierten Sollradius der Zelle orientiert, damit
            // die Korrektur in der Power-Metrik (Länge im Quadrat) liegt und
            // große wie kleine Zellen mit vergleichbarer Rate nachziehen.
            let scale = self.targets[i] / PI;
            let step = log_ratio.clamp(-self.config.max_log_step, self.config.max_log_step);
            self.powers[i] += scale * self.config.weight_damping * step;

            if !self.powers[i].is_finite() {
                warn!(
                    cell = i,
                    "power weight diverged, resetting seed to neutral power"
                );
                self.powers[i] = 0.0;
            }
        }

        // Betrag am Abstand zum nächsten Seed deckeln, damit kein Seed
        // seine Nachbarn in einer einzigen Iteration verschluckt.
        for i in 0..n {
            let nearest_sq = (0..n)
                .filter(|&j| j != i)
                .map(|j| self.seeds[i].distance_squared_to(self.seeds[j]))
                .fold(f64::INFINITY, f64::min);
            if nearest_sq.is_finite() {
                self.powers[i] = self.powers[i].clamp(-nearest_sq, nearest_sq);
            }
        }

        // Power-Diagramme sind invariant unter gemeinsamer Verschiebung der
        // Gewichte; Zentrierung auf Mittel 0 verhindert Drift.
        let mean = self.powers.iter().sum::<f64>() / n as f64;
        for power in &mut self.powers {
            *power -= mean;
        }
    }

    /// NumericInstability-Pfad: Seed und Power-Gewicht auf neutrale Werte
    /// zurücksetzen und mit den verbleibenden Iterationen weitermachen.
    fn recover_seed(&mut self, i: usize) {
        warn!(cell = i, "non-finite geometry, resetting seed");
        self.seeds[i] = self.center;
        self.powers[i] = 0.0;
    }

    /// Läuft bis Konvergenz oder Iterationsbudget und emittiert die Zellen.
    pub fn run(mut self) -> (Vec<Cell>, RelaxationStats) {
        while self.step() {}
        self.into_result()
    }

    pub fn into_result(self) -> (Vec<Cell>, RelaxationStats) {
        let cells = self
            .sites
            .iter()
            .enumerate()
            .map(|(i, site)| {
                let polygon = self.polygons[i].clone();
                let seed = self.seeds.get(i).copied().unwrap_or(self.center);
                let centroid = polygon
                    .centroid()
                    .filter(Point2D::is_finite)
                    .unwrap_or(seed);
                Cell {
                    node: site.node,
                    seed,
                    power_weight: self.powers[i],
                    centroid,
                    area: self.areas[i],
                    target_area: self.targets[i],
                    polygon,
                }
            })
            .collect();

        (cells, self.stats)
    }
}

fn effective_weight(weight: f64) -> f64 {
    if !weight.is_finite() || weight < MIN_WEIGHT {
        MIN_WEIGHT
    } else {
        weight
    }
}

/// Tesselliert eine Geschwisterliste innerhalb der kreisförmigen Boundary.
/// Reine Funktion ihrer Eingaben; die Startkonfiguration ist deterministisch.
pub fn tessellate(
    sites: Vec<Site>,
    boundary: &CircularBoundary,
    config: &TessellationConfig,
) -> TreemapResult<(Vec<Cell>, RelaxationStats)> {
    Ok(Relaxation::new(sites, boundary, config)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sites_with_weights(weights: &[f64]) -> (WeightTree, Vec<Site>) {
        let mut tree = WeightTree::new("root", 1.0);
        let root = tree.root();
        for (i, &w) in weights.iter().enumerate() {
            tree.add_child(root, format!("child-{i}"), w).unwrap();
        }
        let sites = Site::for_children(&tree, root);
        (tree, sites)
    }

    fn boundary_800() -> CircularBoundary {
        CircularBoundary::new(800.0, 800.0).with_padding(10.0)
    }

    #[test]
    fn test_empty_input_yields_no_cells() {
        let (cells, _) = tessellate(
            Vec::new(),
            &boundary_800(),
            &TessellationConfig::default(),
        )
        .unwrap();
        assert!(cells.is_empty());
    }

    #[test]
    fn test_single_sibling_fills_boundary() {
        let (_tree, sites) = sites_with_weights(&[42.0]);
        let boundary_config = boundary_800();
        let expected = boundary_config.generate();

        let (cells, stats) =
            tessellate(sites, &boundary_config, &TessellationConfig::default()).unwrap();

        assert_eq!(cells.len(), 1);
        assert!(stats.converged);
        assert!(stats.iterations.is_empty());
        assert_eq!(cells[0].polygon, expected);
        assert_relative_eq!(cells[0].area, expected.area(), max_relative = 1e-12);
    }

    #[test]
    fn test_cells_partition_boundary() {
        let (_tree, sites) = sites_with_weights(&[5.0, 3.0, 2.0, 1.0, 1.0]);
        let boundary_config = boundary_800();
        let boundary_area = boundary_config.generate().area();

        let (cells, _) =
            tessellate(sites, &boundary_config, &TessellationConfig::default()).unwrap();

        let total: f64 = cells.iter().map(|c| c.area).sum();
        assert_relative_eq!(total, boundary_area, max_relative = 1e-6);

        for cell in &cells {
            assert!(cell.polygon.is_convex());
            assert!(cell.is_visible());
        }
    }

    #[test]
    fn test_equal_weights_yield_equal_areas() {
        let (_tree, sites) = sites_with_weights(&[1.0; 5]);
        let boundary_config = boundary_800();
        let config = TessellationConfig::default();
        let boundary_area = boundary_config.generate().area();

        let (cells, stats) = tessellate(sites, &boundary_config, &config).unwrap();

        // Symmetrische Startkonfiguration mit gleichen Gewichten ergibt
        // kongruente Zellen.
        assert!(stats.converged);
        let areas: Vec<f64> = cells.iter().map(|c| c.area).collect();
        let max = areas.iter().cloned().fold(f64::MIN, f64::max);
        let min = areas.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max - min <= config.convergence_tolerance * boundary_area / 5.0);
    }

    #[test]
    fn test_weighted_scenario_matches_targets() {
        // Kreis mit Radius 390, Gewichte [7000, 2000, 800, 200].
        let (_tree, sites) = sites_with_weights(&[7000.0, 2000.0, 800.0, 200.0]);
        let boundary_config = boundary_800();
        let config = TessellationConfig::default().with_max_iterations(150);
        let boundary_area = boundary_config.generate().area();

        let (cells, stats) = tessellate(sites.clone(), &boundary_config, &config).unwrap();

        let total: f64 = cells.iter().map(|c| c.area).sum();
        assert_relative_eq!(total, boundary_area, max_relative = 1e-6);

        let shares = [0.7, 0.2, 0.08, 0.02];
        for (cell, share) in cells.iter().zip(shares) {
            assert_relative_eq!(cell.target_area, boundary_area * share, max_relative = 1e-9);
            assert!(cell.relative_error() < 0.05);
        }

        // Flächen folgen der Gewichtsordnung.
        assert!(cells[0].area > cells[1].area);
        assert!(cells[1].area > cells[2].area);
        assert!(cells[2].area > cells[3].area);
        assert!(stats.final_iteration <= 150);
    }

    #[test]
    fn test_skewed_weights_do_not_starve_small_cells() {
        // Zwei Größenordnungen Unterschied.
        let (_tree, sites) = sites_with_weights(&[100.0, 1.0]);
        let boundary_config = boundary_800();
        let config = TessellationConfig::default().with_max_iterations(300);
        let boundary_area = boundary_config.generate().area();

        let (cells, _) = tessellate(sites, &boundary_config, &config).unwrap();

        // Ohne Gewichtskorrektur läge die Aufteilung bei 50/50.
        assert!(cells[0].area >= 0.93 * boundary_area);
        assert!(cells[1].area > 0.0);
        assert!(cells[1].area <= 0.04 * boundary_area);
        assert!(cells[1].is_visible());
    }

    #[test]
    fn test_invalid_weights_are_corrected() {
        // Direkt konstruierte Sites umgehen die Korrektur beim Baumaufbau
        // und treffen die des Engines.
        let (_tree, raw) = sites_with_weights(&[1.0, 1.0, 1.0]);
        let sites = vec![
            Site::new(raw[0].node, f64::NAN),
            Site::new(raw[1].node, -5.0),
            Site::new(raw[2].node, 2.0),
        ];
        let (cells, _) = tessellate(
            sites,
            &boundary_800(),
            &TessellationConfig::default(),
        )
        .unwrap();

        assert_eq!(cells.len(), 3);
        for cell in &cells {
            assert!(cell.area.is_finite());
            assert!(cell.target_area.is_finite());
            assert!(cell.seed.is_finite());
        }
        // Der gültige Knoten dominiert die korrigierten.
        assert!(cells[2].target_area > cells[0].target_area);
    }

    #[test]
    fn test_degenerate_boundary_yields_invisible_cells() {
        let (_tree, sites) = sites_with_weights(&[3.0, 1.0]);
        let boundary_config = CircularBoundary::new(100.0, 100.0).with_padding(80.0);

        let (cells, _) = tessellate(
            sites,
            &boundary_config,
            &TessellationConfig::default(),
        )
        .unwrap();

        assert_eq!(cells.len(), 2);
        for cell in &cells {
            assert!(cell.polygon.is_empty());
            assert!(!cell.is_visible());
            assert_relative_eq!(cell.area, 0.0);
        }
    }

    #[test]
    fn test_tessellation_is_deterministic() {
        let (_tree, sites) = sites_with_weights(&[4.0, 2.0, 1.0]);
        let boundary_config = boundary_800();
        let config = TessellationConfig::default();

        let (first, _) = tessellate(sites.clone(), &boundary_config, &config).unwrap();
        let (second, _) = tessellate(sites, &boundary_config, &config).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_stepper_can_be_driven_manually() {
        let (_tree, sites) = sites_with_weights(&[2.0, 1.0]);
        let mut relaxation = Relaxation::new(
            sites,
            &boundary_800(),
            &TessellationConfig::default(),
        )
        .unwrap();

        let mut steps = 0;
        while relaxation.step() {
            steps += 1;
        }
        assert!(relaxation.is_done());
        assert!(steps < 50);

        let (cells, stats) = relaxation.into_result();
        assert_eq!(cells.len(), 2);
        assert_eq!(stats.iterations.len(), stats.final_iteration);
    }
}

// src/navigator/mod.rs

use crate::boundary::CircularBoundary;
use crate::error::TreemapResult;
use crate::tessellation::{Cell, Relaxation, RelaxationStats, Site, TessellationConfig};
use crate::tree::{NodeId, WeightTree};
use crate::types::Point2D;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Ergebnis einer Navigationsanfrage.
///
/// Verfehlte Vorbedingungen entstehen durch veraltete UI-Zustände und sind
/// deshalb gemeldete No-Ops, keine Fehler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Zustand gewechselt, Zellen wurden neu berechnet
    Recomputed,
    /// Ziel war ein Blatt; der Selektions-Handler wurde benachrichtigt,
    /// der Zustand ist unverändert
    LeafSelected(NodeId),
    /// Anfrage hatte keine Wirkung
    Ignored,
}

type LeafHandler = Box<dyn FnMut(NodeId)>;

/// Stack-basierte Navigation über dem Baum.
///
/// Hält den aktuell angezeigten Knoten samt Pfadhistorie und berechnet bei
/// jedem Übergang die Zellen der direkten Kinder neu. Der Quellbaum wird
/// geteilt und nie verändert; pro Navigator gibt es genau einen gültigen
/// Lauf, erkennbar an der Epoche.
pub struct Navigator {
    tree: Arc<WeightTree>,
    viewport: CircularBoundary,
    config: TessellationConfig,
    current: NodeId,
    history: Vec<NodeId>,
    epoch: u64,
    cells: Vec<Cell>,
    stats: RelaxationStats,
    leaf_handler: Option<LeafHandler>,
}

impl Navigator {
    pub fn new(
        tree: Arc<WeightTree>,
        viewport: CircularBoundary,
        config: TessellationConfig,
    ) -> TreemapResult<Self> {
        viewport.validate()?;
        config.validate()?;

        let mut navigator = Self {
            current: tree.root(),
            tree,
            viewport,
            config,
            history: Vec::new(),
            epoch: 0,
            cells: Vec::new(),
            stats: RelaxationStats::default(),
            leaf_handler: None,
        };
        navigator.recompute();
        Ok(navigator)
    }

    /// Registriert den externen Handler für Blatt-Selektionen. Der
    /// Rückgabewert des Handlers wird ignoriert (fire and forget).
    pub fn on_leaf_selected(&mut self, handler: impl FnMut(NodeId) + 'static) {
        self.leaf_handler = Some(Box::new(handler));
    }

    /// Steigt in ein direktes Kind des aktuellen Knotens ab.
    ///
    /// Blätter lösen statt der Navigation eine Selektions-Benachrichtigung
    /// aus; Knoten, die kein direktes Kind sind, werden ignoriert.
    #[instrument(level = "debug", skip(self))]
    pub fn drill_down(&mut self, child: NodeId) -> NavigationOutcome {
        if !self.tree.children(self.current).contains(&child) {
            warn!(?child, current = ?self.current, "drill_down target is not a child of the current node");
            return NavigationOutcome::Ignored;
        }

        if self.tree.is_leaf(child) {
            if let Some(handler) = self.leaf_handler.as_mut() {
                handler(child);
            }
            return NavigationOutcome::LeafSelected(child);
        }

        self.history.push(self.current);
        self.current = child;
        self.recompute();
        NavigationOutcome::Recomputed
    }

    /// Kehrt zum zuletzt besuchten Knoten zurück; No-Op an der Wurzel.
    #[instrument(level = "debug", skip(self))]
    pub fn drill_up(&mut self) -> NavigationOutcome {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                self.recompute();
                NavigationOutcome::Recomputed
            }
            None => {
                debug!("drill_up with empty history ignored");
                NavigationOutcome::Ignored
            }
        }
    }

    /// Springt bedingungslos zur Wurzel zurück.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> NavigationOutcome {
        self.current = self.tree.root();
        self.history.clear();
        self.recompute();
        NavigationOutcome::Recomputed
    }

    /// Ändert die Boundary-Parameter und berechnet die aktuelle Ebene neu.
    pub fn set_viewport(&mut self, width: f64, height: f64, padding: f64) -> TreemapResult<()> {
        let viewport = CircularBoundary::new(width, height).with_padding(padding);
        viewport.validate()?;
        self.viewport = viewport;
        self.recompute();
        Ok(())
    }

    pub fn current_level(&self) -> NodeId {
        self.current
    }

    /// Pfad von der Wurzel zum aktuellen Knoten, Wurzel zuerst.
    pub fn breadcrumb(&self) -> Vec<NodeId> {
        let mut path = self.history.clone();
        path.push(self.current);
        path
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn stats(&self) -> &RelaxationStats {
        &self.stats
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn tree(&self) -> &WeightTree {
        &self.tree
    }

    /// Zelle unter einem Punkt, etwa für die Klick-Zuordnung eines
    /// Render-Kollaborateurs.
    pub fn hit_node(&self, point: Point2D) -> Option<NodeId> {
        use crate::geometry::PolygonProperties;
        self.cells
            .iter()
            .find(|cell| cell.polygon.contains_point(point))
            .map(|cell| cell.node)
    }

    /// Beginnt einen kooperativen Lauf für die aktuelle Ebene.
    ///
    /// Der Aufrufer treibt den Stepper selbst und liefert das Ergebnis über
    /// [`Navigator::install`] ab; dort entscheidet die Epoche, ob der Lauf
    /// noch gültig ist. So existiert pro Navigator höchstens ein gültiger
    /// Lauf, überholte Ergebnisse werden verworfen.
    pub fn begin_recompute(&mut self) -> TreemapResult<(u64, Relaxation)> {
        self.epoch += 1;
        let relaxation = Relaxation::new(
            Site::for_children(&self.tree, self.current),
            &self.viewport,
            &self.config,
        )?;
        Ok((self.epoch, relaxation))
    }

    /// Übernimmt das Ergebnis eines Laufs, sofern seine Epoche noch aktuell
    /// ist. Veraltete Ergebnisse werden verworfen und mit `false` quittiert.
    pub fn install(&mut self, epoch: u64, cells: Vec<Cell>, stats: RelaxationStats) -> bool {
        if epoch != self.epoch {
            debug!(
                stale = epoch,
                current = self.epoch,
                "discarding tessellation result from a superseded run"
            );
            return false;
        }
        self.cells = cells;
        self.stats = stats;
        true
    }

    fn recompute(&mut self) {
        match self.begin_recompute() {
            Ok((epoch, relaxation)) => {
                let (cells, stats) = relaxation.run();
                self.install(epoch, cells, stats);
            }
            Err(err) => {
                // Konfigurationen sind beim Eintritt validiert; sollte es
                // dennoch hierher kommen, bleibt die Ebene leer statt zu
                // crashen.
                error!(error = %err, "tessellation rejected validated configuration");
                self.cells.clear();
                self.stats = RelaxationStats::default();
            }
        }
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("current", &self.current)
            .field("history", &self.history)
            .field("epoch", &self.epoch)
            .field("cells", &self.cells.len())
            .finish()
    }
}

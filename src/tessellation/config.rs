// src/tessellation/config.rs

use crate::error::{TreemapError, TreemapResult};

/// Konfiguration der Power-Diagramm-Relaxation.
///
/// Die Defaults entsprechen den dokumentierten Konstanten: 50 Iterationen,
/// 1% relative Flächentoleranz, Seed-Kreis bei einem Viertel der kleineren
/// Viewport-Kante, Positions-Blend 0.7 alt / 0.3 neu.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellationConfig {
    /// Maximale Anzahl von Iterationen
    pub max_iterations: usize,
    /// Konvergenz, wenn der maximale relative Flächenfehler darunter liegt
    pub convergence_tolerance: f64,
    /// Radius des Seed-Kreises als Anteil von `min(width, height)`
    pub initial_radius_fraction: f64,
    /// Anteil der alten Position beim Zentroid-Blend
    pub centroid_damping: f64,
    /// Dämpfung der Power-Gewichtskorrektur
    pub weight_damping: f64,
    /// Schranke für den Log-Verhältnis-Schritt der Gewichtskorrektur;
    /// verhindert Aufschaukeln bei stark verfehlten oder leeren Zellen
    pub max_log_step: f64,
}

impl TessellationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    pub fn with_initial_radius_fraction(mut self, fraction: f64) -> Self {
        self.initial_radius_fraction = fraction;
        self
    }

    pub fn with_centroid_damping(mut self, damping: f64) -> Self {
        self.centroid_damping = damping;
        self
    }

    pub fn with_weight_damping(mut self, damping: f64) -> Self {
        self.weight_damping = damping;
        self
    }

    pub fn validate(&self) -> TreemapResult<()> {
        if self.max_iterations == 0 {
            return Err(TreemapError::InvalidConfiguration {
                message: "Need at least 1 iteration".to_string(),
            });
        }

        if !(self.convergence_tolerance.is_finite() && self.convergence_tolerance > 0.0) {
            return Err(TreemapError::InvalidConfiguration {
                message: "Convergence tolerance must be positive".to_string(),
            });
        }

        if !(0.0..=0.5).contains(&self.initial_radius_fraction)
            || self.initial_radius_fraction == 0.0
        {
            return Err(TreemapError::InvalidConfiguration {
                message: "Initial radius fraction must be in (0, 0.5]".to_string(),
            });
        }

        if !(0.0..1.0).contains(&self.centroid_damping) {
            return Err(TreemapError::InvalidConfiguration {
                message: "Centroid damping must be in [0, 1)".to_string(),
            });
        }

        if !(self.weight_damping > 0.0 && self.weight_damping <= 1.0) {
            return Err(TreemapError::InvalidConfiguration {
                message: "Weight damping must be in (0, 1]".to_string(),
            });
        }

        if !(self.max_log_step.is_finite() && self.max_log_step > 0.0) {
            return Err(TreemapError::InvalidConfiguration {
                message: "Max log step must be positive".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            convergence_tolerance: 0.01,
            initial_radius_fraction: 0.25,
            centroid_damping: 0.7,
            weight_damping: 0.3,
            max_log_step: 1.0,
        }
    }
}

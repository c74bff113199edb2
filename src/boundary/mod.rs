// src/boundary/mod.rs

use crate::error::{TreemapError, TreemapResult};
use crate::geometry::Polygon;
use crate::types::Point2D;
use tracing::warn;

/// Mindestanzahl an Segmenten, damit geclippte Zellränder nicht sichtbar
/// facettieren.
pub const MIN_SEGMENTS: usize = 100;

/// Erzeugt die kreisförmige Clip-Region als geordnetes Polygon.
///
/// Radius ist `max(0, min(width, height) / 2 - padding)`, Mittelpunkt liegt
/// in der Mitte des Viewports. Löst der Radius zu 0 auf, entsteht ein
/// degeneriertes Ein-Punkt-Polygon; Aufrufer behandeln das als "keine
/// darstellbare Fläche".
#[derive(Debug, Clone, PartialEq)]
pub struct CircularBoundary {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub segments: usize,
}

impl CircularBoundary {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    pub fn validate(&self) -> TreemapResult<()> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(TreemapError::InvalidConfiguration {
                message: format!(
                    "Boundary dimensions must be positive, got {}x{}",
                    self.width, self.height
                ),
            });
        }

        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(TreemapError::InvalidConfiguration {
                message: format!("Padding must be non-negative, got {}", self.padding),
            });
        }

        if self.segments < MIN_SEGMENTS {
            return Err(TreemapError::InvalidConfiguration {
                message: format!("Need at least {} boundary segments", MIN_SEGMENTS),
            });
        }

        Ok(())
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn radius(&self) -> f64 {
        (self.width.min(self.height) / 2.0 - self.padding).max(0.0)
    }

    pub fn generate(&self) -> Polygon {
        let radius = self.radius();
        let center = self.center();

        if radius <= 0.0 {
            warn!(
                width = self.width,
                height = self.height,
                padding = self.padding,
                "padding swallows the viewport, boundary degenerates to a point"
            );
            return Polygon::new(vec![center]);
        }

        let vertices = (0..self.segments)
            .map(|i| {
                let angle = (i as f64 / self.segments as f64) * std::f64::consts::TAU;
                Point2D::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            })
            .collect();

        Polygon::new(vertices)
    }
}

impl Default for CircularBoundary {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            padding: 5.0,
            segments: MIN_SEGMENTS,
        }
    }
}

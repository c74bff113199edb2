// src/tree/record.rs

use serde::{Deserialize, Serialize};

/// Rekursives Eingabe-Record für den Baumaufbau.
///
/// Fehlendes Gewicht bedeutet 1. Die Aliase decken das in
/// Visualisierungsdaten übliche `name`/`value`/`children`-Schema ab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(alias = "name")]
    pub label: String,

    #[serde(default, alias = "value")]
    pub weight: Option<f64>,

    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn leaf(label: impl Into<String>, weight: f64) -> Self {
        Self {
            label: label.into(),
            weight: Some(weight),
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<NodeRecord>) -> Self {
        Self {
            label: label.into(),
            weight: None,
            children,
        }
    }
}

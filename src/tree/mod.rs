// src/tree/mod.rs

pub mod record;

pub use record::NodeRecord;

use crate::error::{TreemapError, TreemapResult};
use generational_arena::Arena;
use tracing::warn;

/// Stabile Knoten-Identität. Knotenvergleich ist ein Id-Vergleich und
/// überlebt damit Serialisierung und Prozessgrenzen, anders als
/// Objektidentität.
pub type NodeId = generational_arena::Index;

/// Kleinstes positives Gewicht. Negative oder nicht-endliche Gewichte werden
/// hierauf korrigiert statt einen Fehler auszulösen.
pub const MIN_WEIGHT: f64 = 1e-9;

/// Knoten der gewichteten Hierarchie.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub weight: f64,
    /// `None` für die Wurzel
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-basierter Baum mit stabilen Ids.
///
/// Wird einmal aus verschachtelten Records aufgebaut und danach nur noch
/// gelesen; die Tessellation leitet Ergebnisse ab, ohne den Baum je zu
/// verändern.
#[derive(Debug)]
pub struct WeightTree {
    arena: Arena<TreeNode>,
    root: NodeId,
}

impl WeightTree {
    pub fn new(root_label: impl Into<String>, root_weight: f64) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            label: root_label.into(),
            weight: sanitize_weight(root_weight),
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    /// Baut den Baum rekursiv aus einem verschachtelten Eingabe-Record auf.
    pub fn from_record(record: &NodeRecord) -> Self {
        let mut tree = Self::new(record.label.clone(), record.weight.unwrap_or(1.0));
        let root = tree.root;
        for child in &record.children {
            tree.insert_record(child, root);
        }
        tree
    }

    fn insert_record(&mut self, record: &NodeRecord, parent: NodeId) {
        let id = self
            .add_child(parent, record.label.clone(), record.weight.unwrap_or(1.0))
            .expect("parent id stammt aus dieser Arena");
        for child in &record.children {
            self.insert_record(child, id);
        }
    }

    pub fn add_child(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        weight: f64,
    ) -> TreemapResult<NodeId> {
        if !self.arena.contains(parent) {
            return Err(TreemapError::UnknownNode(parent));
        }

        let id = self.arena.insert(TreeNode {
            label: label.into(),
            weight: sanitize_weight(weight),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.arena[parent].children.push(id);
        Ok(id)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    /// Direkte Kinder in Einfügereihenfolge; leer für unbekannte Ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.arena.get(id).is_none_or(|node| node.children.is_empty())
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Tiefensuche in Vorordnung über den gesamten Baum.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter {
            tree: self,
            stack: vec![self.root],
        }
    }
}

fn sanitize_weight(weight: f64) -> f64 {
    if !weight.is_finite() || weight < 0.0 {
        warn!(weight, "invalid node weight corrected to epsilon");
        MIN_WEIGHT
    } else {
        weight
    }
}

pub struct TreeIter<'a> {
    tree: &'a WeightTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id)?;
        // Kinder in umgekehrter Reihenfolge stapeln, damit die Ausgabe
        // links-nach-rechts läuft.
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> WeightTree {
        let mut tree = WeightTree::new("root", 1.0);
        let root = tree.root();
        let a = tree.add_child(root, "a", 3.0).unwrap();
        tree.add_child(a, "a1", 2.0).unwrap();
        tree.add_child(a, "a2", 1.0).unwrap();
        tree.add_child(root, "b", 1.0).unwrap();
        tree
    }

    #[test]
    fn test_children_in_insertion_order() {
        let tree = sample_tree();
        let labels: Vec<_> = tree
            .children(tree.root())
            .iter()
            .map(|&id| tree.node(id).unwrap().label.as_str())
            .collect();
        assert_eq!(labels, ["a", "b"]);
    }

    #[test]
    fn test_leaf_detection() {
        let tree = sample_tree();
        assert!(!tree.is_leaf(tree.root()));
        let a = tree.children(tree.root())[0];
        assert!(!tree.is_leaf(a));
        assert!(tree.is_leaf(tree.children(a)[0]));
    }

    #[test]
    fn test_preorder_iteration() {
        let tree = sample_tree();
        let labels: Vec<_> = tree.iter().map(|(_, node)| node.label.as_str()).collect();
        assert_eq!(labels, ["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_negative_weight_corrected() {
        let mut tree = WeightTree::new("root", 1.0);
        let id = tree.add_child(tree.root(), "bad", -4.0).unwrap();
        assert_eq!(tree.node(id).unwrap().weight, MIN_WEIGHT);

        let nan = tree.add_child(tree.root(), "nan", f64::NAN).unwrap();
        assert_eq!(tree.node(nan).unwrap().weight, MIN_WEIGHT);
    }

    #[test]
    fn test_add_child_to_unknown_parent_fails() {
        let mut other = WeightTree::new("other", 1.0);
        let foreign = other.add_child(other.root(), "x", 1.0).unwrap();
        // Id aus einer fremden Arena mit höherem Index existiert hier nicht.
        let mut tree = WeightTree::new("root", 1.0);
        assert!(tree.add_child(foreign, "y", 1.0).is_err());
    }
}

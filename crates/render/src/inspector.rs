use std::collections::BTreeMap;

use vizlab_common::NodeId;
use vizlab_scene::Scene;

/// Read-only queries against a scene for debugging and developer UI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mut by_geometry = BTreeMap::new();
        for node in scene.nodes().values() {
            *by_geometry.entry(node.geometry.label()).or_insert(0) += 1;
        }
        SceneSummary {
            nodes: scene.node_count(),
            visible_nodes: scene.visible_nodes().count(),
            groups: scene.groups().len(),
            hidden_groups: scene.groups().values().filter(|g| !g.visible).count(),
            lights: scene.lights.len(),
            pending_events: scene.events().len(),
            by_geometry,
        }
    }

    /// Ids of every node in insertion order.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeId> {
        scene.nodes().keys().copied().collect()
    }
}

/// Counts describing a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub nodes: usize,
    pub visible_nodes: usize,
    pub groups: usize,
    pub hidden_groups: usize,
    pub lights: usize,
    pub pending_events: usize,
    /// Node count per geometry label.
    pub by_geometry: BTreeMap<&'static str, usize>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} visible={} groups={} hidden_groups={} lights={} pending_events={}",
            self.nodes, self.visible_nodes, self.groups, self.hidden_groups, self.lights, self.pending_events
        )?;
        for (label, count) in &self.by_geometry {
            write!(f, " {label}={count}")?;
        }
        Ok(())
    }
}

use crate::geometry::Geometry;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vizlab_common::{Color, GroupId, NodeId, Transform};

/// Surface shading for a mesh node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Lit by the scene's lights.
    Standard {
        color: Color,
        wireframe: bool,
        double_sided: bool,
    },
    /// Colored by surface normal, ignores lights.
    Normal,
    /// Flat color, ignores lights.
    Basic {
        color: Color,
        wireframe: bool,
        double_sided: bool,
    },
}

impl Material {
    pub fn standard(color: Color) -> Self {
        Self::Standard {
            color,
            wireframe: false,
            double_sided: false,
        }
    }

    pub fn basic(color: Color) -> Self {
        Self::Basic {
            color,
            wireframe: false,
            double_sided: false,
        }
    }

    pub fn wireframe(&self) -> bool {
        match self {
            Self::Standard { wireframe, .. } | Self::Basic { wireframe, .. } => *wireframe,
            Self::Normal => false,
        }
    }

    pub fn set_wireframe(&mut self, on: bool) {
        if let Self::Standard { wireframe, .. } | Self::Basic { wireframe, .. } = self {
            *wireframe = on;
        }
    }

    pub fn double_sided(&self) -> bool {
        match self {
            Self::Standard { double_sided, .. } | Self::Basic { double_sided, .. } => *double_sided,
            Self::Normal => false,
        }
    }

    pub fn with_double_sided(mut self) -> Self {
        if let Self::Standard { double_sided, .. } | Self::Basic { double_sided, .. } = &mut self {
            *double_sided = true;
        }
        self
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Standard { color, .. } | Self::Basic { color, .. } => Some(*color),
            Self::Normal => None,
        }
    }

    pub fn set_color(&mut self, new: Color) {
        if let Self::Standard { color, .. } | Self::Basic { color, .. } = self {
            *color = new;
        }
    }
}

/// A mesh placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
    pub group: Option<GroupId>,
    pub visible: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::default(),
            group: None,
            visible: true,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }
}

/// A named collection of nodes with a shared visibility switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub visible: bool,
}

/// Scene lighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    /// Parallel light shining from `position` toward `target`.
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
        target: Vec3,
    },
    Ambient { color: Color, intensity: f32 },
}

impl Light {
    /// Directional light in its default placement: straight down onto the origin.
    pub fn directional(color: Color, intensity: f32) -> Self {
        Self::Directional {
            color,
            intensity,
            position: Vec3::Y,
            target: Vec3::ZERO,
        }
    }
}

/// Perspective camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Move the camera, keeping its viewing direction.
    pub fn set_position(&mut self, position: Vec3) {
        let dir = self.target - self.position;
        self.position = position;
        self.target = position + dir;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.position;
        let mut target = self.target;
        if (target - eye).length_squared() < f32::EPSILON {
            target = eye + Vec3::NEG_Z;
        }
        Mat4::look_at_rh(eye, target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect.max(1e-4), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// A record of every structural change to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    GroupAdded { id: GroupId, name: String },
    GroupVisibility { id: GroupId, visible: bool },
    GroupCleared { id: GroupId, removed: usize },
    NodeAdded { id: NodeId, group: Option<GroupId> },
    NodeRemoved { id: NodeId },
}

/// The retained scene: background, camera, lights, groups and mesh nodes.
///
/// Nodes are keyed by sequentially allocated ids, so iteration order is
/// insertion order and seeded builds are reproducible.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// `None` clears to transparent black.
    pub background: Option<Color>,
    pub camera: Camera,
    pub lights: Vec<Light>,
    groups: BTreeMap<GroupId, Group>,
    nodes: BTreeMap<NodeId, Node>,
    next_node: u64,
    next_group: u64,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn groups(&self) -> &BTreeMap<GroupId, Group> {
        &self.groups
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn add_group(&mut self, name: impl Into<String>) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        let name = name.into();
        self.groups.insert(
            id,
            Group {
                name: name.clone(),
                visible: true,
            },
        );
        self.event_log.push(SceneEvent::GroupAdded { id, name });
        id
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Show or hide a group. Returns false if the group does not exist.
    pub fn set_group_visible(&mut self, id: GroupId, visible: bool) -> bool {
        let Some(group) = self.groups.get_mut(&id) else {
            return false;
        };
        if group.visible != visible {
            group.visible = visible;
            self.event_log
                .push(SceneEvent::GroupVisibility { id, visible });
        }
        true
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.event_log.push(SceneEvent::NodeAdded {
            id,
            group: node.group,
        });
        self.nodes.insert(id, node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id);
        if node.is_some() {
            self.event_log.push(SceneEvent::NodeRemoved { id });
        }
        node
    }

    /// Remove every node in a group, keeping the group itself. Returns how many went.
    pub fn clear_group(&mut self, id: GroupId) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.group != Some(id));
        let removed = before - self.nodes.len();
        self.event_log.push(SceneEvent::GroupCleared { id, removed });
        tracing::debug!(group = %id, removed, "cleared group");
        removed
    }

    pub fn nodes_in_group(&self, id: GroupId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.group == Some(id))
            .map(|(nid, node)| (*nid, node))
    }

    /// Mutable access to every node in a group, for live material edits.
    pub fn for_each_in_group(&mut self, id: GroupId, mut f: impl FnMut(&mut Node)) {
        for node in self.nodes.values_mut().filter(|n| n.group == Some(id)) {
            f(node);
        }
    }

    pub fn is_visible(&self, node: &Node) -> bool {
        node.visible
            && node
                .group
                .and_then(|g| self.groups.get(&g))
                .is_none_or(|g| g.visible)
    }

    /// Nodes that should be drawn this frame, in insertion order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| self.is_visible(node))
            .map(|(id, node)| (*id, node))
    }

    /// Deterministic FNV hash of node ids and transforms, for reproducibility checks.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, node) in &self.nodes {
            mix(&mut h, &id.0.to_le_bytes());
            let t = &node.transform;
            for v in t
                .position
                .to_array()
                .into_iter()
                .chain(t.rotation.to_array())
                .chain(t.scale.to_array())
            {
                mix(&mut h, &v.to_le_bytes());
            }
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Node {
        Node::new("cube", Geometry::cube(1.0), Material::standard(Color::WHITE))
    }

    #[test]
    fn scene_starts_empty() {
        let s = Scene::new();
        assert_eq!(s.node_count(), 0);
        assert!(s.groups().is_empty());
        assert!(s.background.is_none());
    }

    #[test]
    fn add_and_remove_node() {
        let mut s = Scene::new();
        let id = s.add_node(cube());
        assert_eq!(s.node_count(), 1);
        assert!(s.get(id).is_some());
        assert!(s.remove(id).is_some());
        assert!(s.remove(id).is_none());
        assert_eq!(s.events().len(), 2);
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut s = Scene::new();
        let ids: Vec<NodeId> = (0..5).map(|_| s.add_node(cube())).collect();
        let keys: Vec<NodeId> = s.nodes().keys().copied().collect();
        assert_eq!(ids, keys);
    }

    #[test]
    fn hidden_group_hides_its_nodes() {
        let mut s = Scene::new();
        let g = s.add_group("markers");
        s.add_node(cube().in_group(g));
        s.add_node(cube());
        assert_eq!(s.visible_nodes().count(), 2);

        assert!(s.set_group_visible(g, false));
        assert_eq!(s.visible_nodes().count(), 1);
        assert!(!s.set_group_visible(GroupId(99), false));
    }

    #[test]
    fn clear_group_only_touches_members() {
        let mut s = Scene::new();
        let a = s.add_group("a");
        let b = s.add_group("b");
        for _ in 0..3 {
            s.add_node(cube().in_group(a));
        }
        s.add_node(cube().in_group(b));

        assert_eq!(s.clear_group(a), 3);
        assert_eq!(s.nodes_in_group(a).count(), 0);
        assert_eq!(s.nodes_in_group(b).count(), 1);
        assert!(s.group(a).is_some());
    }

    #[test]
    fn for_each_in_group_edits_material() {
        let mut s = Scene::new();
        let g = s.add_group("g");
        let id = s.add_node(cube().in_group(g));
        let red = Color::from_hex(0xff0000);
        s.for_each_in_group(g, |n| n.material.set_color(red));
        assert_eq!(s.get(id).unwrap().material.color(), Some(red));
    }

    #[test]
    fn state_hash_tracks_transforms() {
        let mut s1 = Scene::new();
        let mut s2 = Scene::new();
        s1.add_node(cube().at(Vec3::X));
        s2.add_node(cube().at(Vec3::X));
        assert_eq!(s1.state_hash(), s2.state_hash());

        s2.add_node(cube());
        assert_ne!(s1.state_hash(), s2.state_hash());
    }

    #[test]
    fn material_accessors() {
        let mut m = Material::basic(Color::WHITE).with_double_sided();
        assert!(m.double_sided());
        m.set_wireframe(true);
        assert!(m.wireframe());

        let mut n = Material::Normal;
        n.set_wireframe(true);
        assert!(!n.wireframe());
        assert!(n.color().is_none());
    }

    #[test]
    fn camera_set_position_keeps_direction() {
        let mut cam = Camera::default();
        cam.set_position(Vec3::new(0.0, 0.0, 7.0));
        assert_eq!(cam.target, Vec3::new(0.0, 0.0, 6.0));
        let vp = cam.view_projection(16.0 / 9.0);
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn degenerate_camera_target_is_safe() {
        let cam = Camera {
            target: Vec3::ZERO,
            ..Camera::default()
        };
        assert!(cam.view_matrix().is_finite());
    }
}

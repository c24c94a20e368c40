use crate::Demo;
use glam::Vec3;
use vizlab_common::Color;
use vizlab_common::NodeId;
use vizlab_panel::ControlPanel;
use vizlab_scene::{Geometry, Material, Node, Scene};

const BACKGROUND: u32 = 0xd7b8bc;

fn test_sphere() -> Node {
    Node::new("testSphere", Geometry::sphere(1.0), Material::Normal)
}

/// The starting template: one normal-shaded sphere in front of a camera at
/// the origin. Nothing moves.
pub struct StillSphere {
    panel: ControlPanel,
}

impl StillSphere {
    pub fn new() -> Self {
        Self {
            panel: ControlPanel::new(),
        }
    }
}

impl Default for StillSphere {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for StillSphere {
    fn name(&self) -> &'static str {
        "template"
    }

    fn title(&self) -> &'static str {
        "Template"
    }

    fn build(&mut self, scene: &mut Scene) {
        scene.background = Some(Color::from_hex(BACKGROUND));
        scene.add_node(test_sphere().at(Vec3::new(0.0, 0.0, -5.0)));
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    fn update(&mut self, _scene: &mut Scene, _elapsed: f32) {}

    fn orbit_controls(&self) -> bool {
        false
    }
}

/// A normal-shaded sphere circling the origin.
pub struct OrbitingSphere {
    panel: ControlPanel,
    sphere: Option<NodeId>,
}

impl OrbitingSphere {
    pub fn new() -> Self {
        Self {
            panel: ControlPanel::new(),
            sphere: None,
        }
    }
}

impl Default for OrbitingSphere {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for OrbitingSphere {
    fn name(&self) -> &'static str {
        "prototype1"
    }

    fn title(&self) -> &'static str {
        "Orbiting Sphere"
    }

    fn build(&mut self, scene: &mut Scene) {
        scene.background = Some(Color::from_hex(BACKGROUND));
        scene.camera.set_position(Vec3::new(0.0, 0.0, 7.0));
        self.sphere = Some(scene.add_node(test_sphere()));
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    fn update(&mut self, scene: &mut Scene, elapsed: f32) {
        let Some(node) = self.sphere.and_then(|id| scene.get_mut(id)) else {
            return;
        };
        node.transform.position.z = elapsed.sin();
        node.transform.position.x = elapsed.cos();
    }

    fn orbit_controls(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_position(scene: &Scene) -> Vec3 {
        scene.nodes().values().next().unwrap().transform.position
    }

    #[test]
    fn template_sphere_stays_in_front_of_camera() {
        let mut demo = StillSphere::new();
        let mut scene = Scene::new();
        demo.build(&mut scene);
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.camera.position, Vec3::ZERO);
        assert_eq!(sphere_position(&scene), Vec3::new(0.0, 0.0, -5.0));

        demo.update(&mut scene, 3.0);
        assert_eq!(sphere_position(&scene), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn sphere_traces_unit_circle() {
        let mut demo = OrbitingSphere::new();
        let mut scene = Scene::new();
        demo.build(&mut scene);
        assert_eq!(scene.node_count(), 1);

        for t in [0.0_f32, 0.7, 2.5] {
            demo.update(&mut scene, t);
            let p = sphere_position(&scene);
            assert!((p.x - t.cos()).abs() < 1e-6);
            assert!((p.z - t.sin()).abs() < 1e-6);
            assert!((Vec3::new(p.x, 0.0, p.z).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn camera_backs_off_along_z() {
        let mut demo = OrbitingSphere::new();
        let mut scene = Scene::new();
        demo.build(&mut scene);
        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 7.0));
        assert!(scene.camera.target.z < 7.0);
        assert!(!demo.orbit_controls());
    }
}

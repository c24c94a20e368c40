use crate::Demo;
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;
use vizlab_common::{Color, NodeId, Transform};
use vizlab_panel::{ControlPanel, PanelAction};
use vizlab_scene::{Geometry, Material, Node, Scene};

/// Torus knot on a wireframe floor, with sliders for its orbit and spin.
pub struct TorusKnotPlayground {
    panel: ControlPanel,
    knot: Option<NodeId>,
    plane: Option<NodeId>,
}

impl TorusKnotPlayground {
    pub fn new() -> Self {
        let mut panel = ControlPanel::new();
        panel
            .add_folder("Torus Knot")
            .toggle("play", "Animate", false)
            .slider("height", "Height", 1.0, -5.0, 5.0, 0.5)
            .slider("speed", "Speed", 1.0, 1.0, 10.0, 0.1)
            .slider("distance", "Distance", 1.0, 1.0, 5.0, 0.1)
            .slider("scale", "Scale", 1.0, 1.0, 5.0, 0.1)
            .slider("rotation_speed", "Rotation Speed", 1.0, 1.0, 20.0, 0.1);
        panel
            .add_folder("Plane")
            .toggle("wireframe", "Toggle Wireframe", true);

        Self {
            panel,
            knot: None,
            plane: None,
        }
    }

    fn value(&self, key: &str, default: f32) -> f32 {
        self.panel.slider(key).unwrap_or(default)
    }
}

impl Default for TorusKnotPlayground {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for TorusKnotPlayground {
    fn name(&self) -> &'static str {
        "prototype2"
    }

    fn title(&self) -> &'static str {
        "Torus Knot Playground"
    }

    fn build(&mut self, scene: &mut Scene) {
        scene.background = Some(Color::from_hex(0xd7b8bc));
        scene.camera.position = Vec3::new(0.0, 2.0, 6.0);
        scene.camera.look_at(Vec3::ZERO);

        self.knot = Some(scene.add_node(
            Node::new("torusKnot", Geometry::torus_knot(0.5, 0.2), Material::Normal).at(Vec3::new(0.0, 1.0, 0.0)),
        ));

        let mut floor = Material::basic(Color::WHITE).with_double_sided();
        floor.set_wireframe(true);
        self.plane = Some(
            scene.add_node(
                Node::new(
                    "plane",
                    Geometry::Plane {
                        width: 10.0,
                        height: 10.0,
                        width_segments: 50,
                        height_segments: 50,
                    },
                    floor,
                )
                .with_transform(Transform::default().with_euler(FRAC_PI_2, 0.0, 0.0)),
            ),
        );
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    fn update(&mut self, scene: &mut Scene, elapsed: f32) {
        for action in self.panel.drain_actions() {
            if action == PanelAction::Changed("wireframe".into()) {
                let on = self.panel.toggle("wireframe").unwrap_or(true);
                if let Some(plane) = self.plane.and_then(|id| scene.get_mut(id)) {
                    plane.material.set_wireframe(on);
                }
            }
        }

        let height = self.value("height", 1.0);
        let playing = self.panel.toggle("play").unwrap_or(false);
        let speed = self.value("speed", 1.0);
        let distance = self.value("distance", 1.0);
        let scale = self.value("scale", 1.0);
        let rotation_speed = self.value("rotation_speed", 1.0);

        let Some(knot) = self.knot.and_then(|id| scene.get_mut(id)) else {
            return;
        };
        knot.transform.position.y = height;
        if playing {
            knot.transform.position.z = (elapsed * speed).sin() * distance;
            knot.transform.position.x = (elapsed * speed).cos() * distance;
            knot.transform.scale = Vec3::splat(scale);
            knot.transform.rotation = Quat::from_rotation_y(elapsed * rotation_speed);
        }
    }
}

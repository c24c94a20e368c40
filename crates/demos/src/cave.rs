use crate::Demo;
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};
use vizlab_common::{Color, NodeId, Transform};
use vizlab_panel::{ControlPanel, PanelAction};
use vizlab_scene::{Geometry, Light, Material, Node, Scene};

/// Handles into a built cave: the animated mouth and the movable light.
#[derive(Debug, Clone, Copy)]
struct Cave {
    mouth: NodeId,
    light: usize,
}

/// Wall, mouth, eyes and a white directional light. `face_x` is how far the
/// face sits in front of the wall along +X.
fn build_cave(scene: &mut Scene, face_x: f32) -> Cave {
    scene.add_node(
        Node::new("wall", Geometry::plane(15.5, 7.5), Material::standard(Color::WHITE).with_double_sided())
            .with_transform(Transform::default().with_euler(0.0, FRAC_PI_2, 0.0)),
    );

    let mouth = scene.add_node(
        Node::new(
            "mouth",
            Geometry::Torus {
                radius: 1.2,
                tube: 0.3,
                radial_segments: 10,
                tubular_segments: 20,
                arc: 3.2,
            },
            Material::Normal,
        )
        .with_transform(Transform::from_position(Vec3::new(face_x, 0.8, 0.0)).with_euler(PI, FRAC_PI_2, 0.0)),
    );

    let eye = |side: f32| Node::new("eye", Geometry::sphere(0.45), Material::Normal).at(Vec3::new(face_x, 2.0, side * 0.8));
    scene.add_node(eye(1.0));
    scene.add_node(eye(-1.0));

    let light = scene.lights.len();
    scene.lights.push(Light::Directional {
        color: Color::WHITE,
        intensity: 0.5,
        position: Vec3::new(20.0, 4.0, 0.0),
        target: Vec3::ZERO,
    });

    Cave { mouth, light }
}

/// A cave face lit by a light the user can move.
pub struct CaveLight {
    panel: ControlPanel,
    cave: Option<Cave>,
}

impl CaveLight {
    pub fn new() -> Self {
        let mut panel = ControlPanel::new();
        panel
            .add_folder("Light Position")
            .slider("light_y", "Y", 4.0, -10.0, 10.0, 0.1)
            .slider("light_z", "Z", 0.0, -10.0, 10.0, 0.1);
        Self { panel, cave: None }
    }
}

impl Default for CaveLight {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for CaveLight {
    fn name(&self) -> &'static str {
        "prototype3"
    }

    fn title(&self) -> &'static str {
        "Cave Light"
    }

    fn build(&mut self, scene: &mut Scene) {
        scene.background = Some(Color::BLACK);
        scene.camera.position = Vec3::new(10.0, 2.0, 7.5);
        scene.camera.look_at(Vec3::ZERO);
        self.cave = Some(build_cave(scene, 6.0));
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    fn update(&mut self, scene: &mut Scene, _elapsed: f32) {
        self.panel.drain_actions();
        let Some(cave) = self.cave else {
            return;
        };
        let y = self.panel.slider("light_y").unwrap_or(4.0);
        let z = self.panel.slider("light_z").unwrap_or(0.0);
        if let Some(Light::Directional { position, .. }) = scene.lights.get_mut(cave.light) {
            position.y = y;
            position.z = z;
        }
    }
}

/// Which fixed viewpoint the camera is held at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    One,
    Two,
}

impl Part {
    fn camera_position(self) -> Vec3 {
        match self {
            Part::One => Vec3::new(7.0, 0.0, 0.0),
            Part::Two => Vec3::new(20.0, -5.0, 0.0),
        }
    }
}

/// A cave face with two camera viewpoints and four latching animations.
///
/// Once pressed, an animation button stays on for the rest of the run.
pub struct CaveParts {
    panel: ControlPanel,
    cave: Option<Cave>,
    part: Part,
    /// first, second, third, fourth
    latched: [bool; 4],
    /// Mouth Euler angles; each spinning axis is overwritten with the clock.
    mouth_euler: Vec3,
}

const ANIMATIONS: [&str; 4] = ["first", "second", "third", "fourth"];

impl CaveParts {
    pub fn new() -> Self {
        let mut panel = ControlPanel::new();
        panel
            .add_folder("Parts")
            .button("part_one", "Part One")
            .button("part_two", "Part Two");
        panel
            .add_folder("Animations")
            .button("first", "First")
            .button("second", "Second")
            .button("third", "Third")
            .button("fourth", "Fourth");
        Self {
            panel,
            cave: None,
            part: Part::Two,
            latched: [false; 4],
            mouth_euler: Vec3::new(PI, FRAC_PI_2, 0.0),
        }
    }

    fn handle(&mut self, action: PanelAction) {
        let PanelAction::Pressed(key) = action else {
            return;
        };
        match key.as_str() {
            "part_one" => self.part = Part::One,
            "part_two" => self.part = Part::Two,
            other => {
                if let Some(i) = ANIMATIONS.iter().position(|a| *a == other) {
                    self.latched[i] = true;
                }
            }
        }
    }
}

impl Default for CaveParts {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for CaveParts {
    fn name(&self) -> &'static str {
        "assignment1"
    }

    fn title(&self) -> &'static str {
        "Cave Parts"
    }

    fn build(&mut self, scene: &mut Scene) {
        scene.camera.position = self.part.camera_position();
        scene.camera.look_at(Vec3::ZERO);
        self.cave = Some(build_cave(scene, 8.0));
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    fn update(&mut self, scene: &mut Scene, elapsed: f32) {
        for action in self.panel.drain_actions() {
            self.handle(action);
        }

        scene.camera.position = self.part.camera_position();
        scene.camera.look_at(Vec3::ZERO);

        let Some(cave) = self.cave else {
            return;
        };
        let [first, second, third, fourth] = self.latched;
        if first {
            self.mouth_euler.y = elapsed;
        }
        if second {
            self.mouth_euler.z = elapsed;
        }
        if third {
            self.mouth_euler.x = elapsed;
        }
        let euler = self.mouth_euler;
        if let Some(mouth) = scene.get_mut(cave.mouth) {
            mouth.transform.rotation = Quat::from_euler(glam::EulerRot::XYZ, euler.x, euler.y, euler.z);
            if fourth {
                mouth.transform.position.z = (1.5 * elapsed).sin() * 2.0;
            }
        }
    }
}

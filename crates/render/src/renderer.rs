use std::fmt::Write;

use glam::Mat4;
use vizlab_scene::{Light, Material, Scene};

/// Viewport parameters that are not part of the scene itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl RenderView {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// View-projection for the scene camera at this viewport's aspect.
    pub fn view_projection(&self, scene: &Scene) -> Mat4 {
        scene.camera.view_projection(self.aspect())
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    type Output;

    /// Render one frame of `scene` into `view`.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of a scene.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Print every visible node, not only the summary lines.
    pub list_nodes: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self { list_nodes: true }
    }

    pub fn summary_only() -> Self {
        Self { list_nodes: false }
    }
}

fn material_label(material: &Material) -> String {
    let kind = match material {
        Material::Standard { .. } => "standard",
        Material::Normal => "normal",
        Material::Basic { .. } => "basic",
    };
    let mut label = kind.to_string();
    if let Some(color) = material.color() {
        label.push(' ');
        label.push_str(&color.to_hex_string());
    }
    if material.wireframe() {
        label.push_str(" wire");
    }
    label
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        tracing::trace!(nodes = scene.node_count(), "debug text render");
        let mut out = String::new();
        let background = scene
            .background
            .map(|c| c.to_hex_string())
            .unwrap_or_else(|| "none".into());
        let _ = writeln!(
            out,
            "=== Scene (nodes={}, visible={}, background={background}) ===",
            scene.node_count(),
            scene.visible_nodes().count()
        );

        let cam = &scene.camera;
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} viewport={}x{}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.target.x,
            cam.target.y,
            cam.target.z,
            cam.fov_degrees,
            view.width,
            view.height
        );

        for light in &scene.lights {
            match light {
                Light::Directional {
                    color,
                    intensity,
                    position,
                    ..
                } => {
                    let _ = writeln!(
                        out,
                        "Light: directional {} x{intensity:.2} at ({:.1}, {:.1}, {:.1})",
                        color.to_hex_string(),
                        position.x,
                        position.y,
                        position.z
                    );
                }
                Light::Ambient { color, intensity } => {
                    let _ = writeln!(out, "Light: ambient {} x{intensity:.2}", color.to_hex_string());
                }
            }
        }

        for (id, group) in scene.groups() {
            let _ = writeln!(
                out,
                "Group {id} {:?}: {} nodes{}",
                group.name,
                scene.nodes_in_group(*id).count(),
                if group.visible { "" } else { " (hidden)" }
            );
        }

        if self.list_nodes {
            for (id, node) in scene.visible_nodes() {
                let p = node.transform.position;
                let _ = writeln!(
                    out,
                    "  [{id}] {} {} {} pos=({:.2}, {:.2}, {:.2})",
                    node.name,
                    node.geometry.label(),
                    material_label(&node.material),
                    p.x,
                    p.y,
                    p.z
                );
            }
        }

        out
    }
}

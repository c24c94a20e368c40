//! Demo scenes.
//!
//! Every demo builds its scene once, exposes a control panel, and is then
//! driven by a per-frame `update` with the seconds elapsed since start.
//!
//! # Invariants
//! - A demo only mutates the scene it built.
//! - Panel actions are consumed on the update following the edit.

mod cave;
mod knot;
mod orbit;
mod wordviz;

use vizlab_panel::ControlPanel;
use vizlab_scene::Scene;
use vizlab_textviz::WordVizConfig;

pub use cave::{CaveLight, CaveParts};
pub use knot::TorusKnotPlayground;
pub use orbit::{OrbitingSphere, StillSphere};
pub use wordviz::{SentenceViz, WordOccurrenceViz};

/// A self-contained scene with its own controls and animation.
pub trait Demo {
    /// Registry name, e.g. `"prototype2"`.
    fn name(&self) -> &'static str;

    /// Window title.
    fn title(&self) -> &'static str;

    /// Populate an empty scene.
    fn build(&mut self, scene: &mut Scene);

    fn panel(&self) -> &ControlPanel;

    fn panel_mut(&mut self) -> &mut ControlPanel;

    /// Advance one frame. `elapsed` is seconds since the demo started.
    fn update(&mut self, scene: &mut Scene, elapsed: f32);

    /// Whether the user may orbit the camera with the mouse.
    fn orbit_controls(&self) -> bool {
        true
    }
}

/// Errors from the demo registry.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("unknown demo {0:?} (expected one of: {list})", list = DEMO_NAMES.join(", "))]
    UnknownDemo(String),
}

/// Options that parameterize demo construction.
#[derive(Debug, Clone, Default)]
pub struct DemoOptions {
    /// Marker placement seed; `None` keeps each demo's default.
    pub seed: Option<u64>,
    /// Replaces the default word-occurrence configuration.
    pub word_viz: Option<WordVizConfig>,
}

pub const DEMO_NAMES: &[&str] = &[
    "template",
    "prototype1",
    "prototype2",
    "prototype3",
    "prototype4",
    "assignment1",
    "assignment2",
];

pub fn demo_names() -> &'static [&'static str] {
    DEMO_NAMES
}

/// Instantiate a demo by registry name.
pub fn create_demo(name: &str, options: &DemoOptions) -> Result<Box<dyn Demo>, DemoError> {
    let demo: Box<dyn Demo> = match name {
        "template" => Box::new(StillSphere::new()),
        "prototype1" => Box::new(OrbitingSphere::new()),
        "prototype2" => Box::new(TorusKnotPlayground::new()),
        "prototype3" => Box::new(CaveLight::new()),
        "prototype4" => Box::new(SentenceViz::new(options.seed)),
        "assignment1" => Box::new(CaveParts::new()),
        "assignment2" => {
            let mut config = options.word_viz.clone().unwrap_or_default();
            if let Some(seed) = options.seed {
                config.seed = seed;
            }
            Box::new(WordOccurrenceViz::new(config))
        }
        other => return Err(DemoError::UnknownDemo(other.to_string())),
    };
    tracing::info!(demo = name, "created demo");
    Ok(demo)
}

/// Create a demo and build it into a fresh scene.
pub fn launch(name: &str, options: &DemoOptions) -> Result<(Box<dyn Demo>, Scene), DemoError> {
    let mut demo = create_demo(name, options)?;
    let mut scene = Scene::new();
    demo.build(&mut scene);
    tracing::debug!(demo = name, nodes = scene.node_count(), "built scene");
    Ok((demo, scene))
}

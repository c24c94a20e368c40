//! Renderer-agnostic interface over a [`vizlab_scene::Scene`].
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Output depends only on the scene and the view it is given.

mod inspector;
mod renderer;

pub use inspector::{SceneInspector, SceneSummary};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

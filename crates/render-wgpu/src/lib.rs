//! wgpu render backend for vizlab scenes.
//!
//! Draws every visible scene node as an instance of a cached primitive mesh,
//! lit by the scene's lights. Mouse orbiting is handled by [`OrbitCamera`].
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - Orbit state lives outside the scene and yields to scripted camera moves.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;

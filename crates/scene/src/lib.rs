//! Scene graph: the retained state every demo builds and the renderers read.
//!
//! # Invariants
//! - All node and group mutations flow through `Scene` methods and are logged.
//! - Node iteration order is insertion order (sequential ids in a BTreeMap).
//! - A node is drawn only if both it and its group are visible.

pub mod geometry;
pub mod scene;

pub use geometry::{Geometry, MeshData};
pub use scene::{Camera, Group, Light, Material, Node, Scene, SceneEvent};

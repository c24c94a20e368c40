//! Shared types for vizlab: node and group ids, spatial transforms, colors.

mod color;
mod types;

pub use color::{Color, ColorError};
pub use types::{GroupId, NodeId, Transform};

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a mesh node, allocated sequentially by its scene.
///
/// Sequential ids keep node iteration in insertion order, so a seeded
/// scene build produces the same draw order and state hash every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Identifier for a node group, allocated sequentially by its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Set rotation from XYZ Euler angles in radians.
    pub fn with_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
        self
    }

    /// Orient the node so its local +Z axis points at `target`.
    ///
    /// A target equal to the current position leaves the rotation untouched.
    pub fn look_at(&mut self, target: Vec3) {
        let mut z = target - self.position;
        if z.length_squared() == 0.0 {
            return;
        }
        z = z.normalize();

        let mut x = Vec3::Y.cross(z);
        if x.length_squared() == 0.0 {
            // Target straight above or below: nudge off the up axis.
            z.z += 0.0001;
            z = z.normalize();
            x = Vec3::Y.cross(z);
        }
        x = x.normalize();
        let y = z.cross(x);

        self.rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

use glam::Vec3;
use std::f32::consts::{PI, TAU};
use vizlab_scene::Camera;

const MIN_POLAR: f32 = 1e-3;
const MIN_RADIUS: f32 = 0.5;
const MAX_RADIUS: f32 = 90.0;

/// Mouse-driven orbit around the camera target, with damping.
///
/// Orbit state lives outside the scene. Each `update` first checks whether
/// something else (a scripted camera move) repositioned the camera since the
/// last update, and if so re-derives its spherical coordinates from it.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    radius: f32,
    /// Azimuth around +Y, measured from +Z toward +X.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    /// Fraction of the pending motion applied per update. 1.0 disables damping.
    pub damping: f32,
    /// Radians of orbit per pixel of drag, relative to viewport height.
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    last: Option<(Vec3, Vec3)>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            damping: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            last: None,
        }
    }
}

impl OrbitCamera {
    pub fn from_camera(camera: &Camera) -> Self {
        let mut orbit = Self::default();
        orbit.sync(camera);
        orbit
    }

    /// Snap the orbit to the camera's current position and target, dropping
    /// any motion still being damped out.
    pub fn sync(&mut self, camera: &Camera) {
        self.target = camera.target;
        let offset = camera.position - camera.target;
        self.radius = offset.length().max(MIN_RADIUS);
        self.theta = offset.x.atan2(offset.z);
        self.phi = if offset.length_squared() > 0.0 {
            (offset.y / offset.length()).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.last = Some((camera.position, camera.target));
    }

    /// Queue a drag of `dx`, `dy` pixels in a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let h = height.max(1.0);
        self.delta_theta -= TAU * dx / h * self.rotate_speed;
        self.delta_phi -= TAU * dy / h * self.rotate_speed;
    }

    /// Queue a zoom. Positive `lines` moves toward the target.
    pub fn zoom(&mut self, lines: f32) {
        let step = 0.95_f32.powf(self.zoom_speed * lines.abs());
        if lines > 0.0 {
            self.scale *= step;
        } else if lines < 0.0 {
            self.scale /= step;
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether queued motion remains to be applied.
    pub fn is_moving(&self) -> bool {
        self.delta_theta.abs() > 1e-5 || self.delta_phi.abs() > 1e-5 || (self.scale - 1.0).abs() > 1e-5
    }

    /// Apply one step of queued motion to `camera`.
    pub fn update(&mut self, camera: &mut Camera) {
        if self.last != Some((camera.position, camera.target)) {
            self.sync(camera);
        }

        let d = self.damping.clamp(0.0, 1.0);
        self.theta += self.delta_theta * d;
        self.phi = (self.phi + self.delta_phi * d).clamp(MIN_POLAR, PI - MIN_POLAR);
        self.radius = (self.radius * self.scale).clamp(MIN_RADIUS, MAX_RADIUS);

        self.delta_theta *= 1.0 - d;
        self.delta_phi *= 1.0 - d;
        self.scale = 1.0;

        let offset = Vec3::new(
            self.radius * self.phi.sin() * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.cos(),
        );
        camera.position = self.target + offset;
        camera.target = self.target;
        self.last = Some((camera.position, camera.target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> Camera {
        Camera {
            position,
            target: Vec3::ZERO,
            ..Camera::default()
        }
    }

    #[test]
    fn idle_orbit_leaves_camera_in_place() {
        let mut camera = camera_at(Vec3::new(25.0, 15.0, 0.0));
        let mut orbit = OrbitCamera::from_camera(&camera);
        orbit.update(&mut camera);
        assert!(camera.position.abs_diff_eq(Vec3::new(25.0, 15.0, 0.0), 1e-4));
        assert!(!orbit.is_moving());
    }

    #[test]
    fn drag_keeps_distance_to_target() {
        let mut camera = camera_at(Vec3::new(0.0, 2.0, 6.0));
        let mut orbit = OrbitCamera::from_camera(&camera);
        let r = camera.position.length();
        orbit.rotate(120.0, 30.0, 600.0);
        for _ in 0..10 {
            orbit.update(&mut camera);
        }
        assert!((camera.position.length() - r).abs() < 1e-3);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 7.0));
        let mut orbit = OrbitCamera::from_camera(&camera);
        orbit.rotate(100.0, 0.0, 500.0);
        orbit.update(&mut camera);
        let first = camera.position;
        assert!(orbit.is_moving());
        orbit.update(&mut camera);
        assert_ne!(camera.position, first);
    }

    #[test]
    fn no_damping_applies_at_once() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 7.0));
        let mut orbit = OrbitCamera::from_camera(&camera);
        orbit.damping = 1.0;
        orbit.rotate(100.0, 0.0, 500.0);
        orbit.update(&mut camera);
        assert!(!orbit.is_moving());
    }

    #[test]
    fn zoom_in_shrinks_radius() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut orbit = OrbitCamera::from_camera(&camera);
        orbit.zoom(3.0);
        orbit.update(&mut camera);
        assert!(camera.position.length() < 10.0);
        orbit.zoom(-6.0);
        orbit.update(&mut camera);
        assert!(camera.position.length() > 10.0);
    }

    #[test]
    fn scripted_move_is_respected() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 7.0));
        let mut orbit = OrbitCamera::from_camera(&camera);
        orbit.rotate(50.0, 0.0, 500.0);

        camera.position = Vec3::new(20.0, -5.0, 0.0);
        orbit.update(&mut camera);
        assert!(camera.position.abs_diff_eq(Vec3::new(20.0, -5.0, 0.0), 1e-4));
        assert!(!orbit.is_moving());
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut orbit = OrbitCamera::from_camera(&camera);
        orbit.damping = 1.0;
        orbit.rotate(0.0, -10_000.0, 100.0);
        orbit.update(&mut camera);
        assert!(camera.view_matrix().is_finite());
        assert!(camera.position.y < 5.0 + 1e-3);
    }
}

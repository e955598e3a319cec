use glam::{Mat4, Quat, Vec3};

/// Perspective camera with a cached projection matrix.
///
/// Changing `fov_y_degrees`, `aspect`, `near` or `far` has no effect on the
/// projection until [`update_projection_matrix`](Self::update_projection_matrix)
/// is called.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub position: Vec3,
    pub rotation: Quat,

    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_y_degrees,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 { self.aspect } else { 1.0 };
        self.projection =
            Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far);
    }

    /// Orients the camera so its -Z axis points at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation;
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Maps a clip-space point back to world space.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.world_matrix()
            .transform_point3(self.projection.inverse().project_point3(ndc))
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.01, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_change_needs_explicit_update() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.projection_matrix();
        cam.aspect = 2.0;
        assert_eq!(cam.projection_matrix(), before);
        cam.update_projection_matrix();
        assert_ne!(cam.projection_matrix(), before);
    }

    #[test]
    fn unproject_center_lies_on_view_axis() {
        let mut cam = PerspectiveCamera::default();
        cam.position = Vec3::new(0.0, 0.0, 1.5);
        let p = cam.unproject(Vec3::new(0.0, 0.0, 0.5));
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z < 1.5);
    }

    #[test]
    fn look_at_points_minus_z_at_target() {
        let mut cam = PerspectiveCamera::default();
        cam.position = Vec3::new(3.0, 0.0, 0.0);
        cam.look_at(Vec3::ZERO);
        let forward = cam.rotation * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_X, 1e-5));
    }
}

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local-to-world transform of a scene object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Pre-multiplies `q` onto the current rotation (rotation in parent space).
    #[inline]
    pub fn apply_quaternion(&mut self, q: Quat) {
        self.rotation = (q * self.rotation).normalize();
    }

    /// Applies an XYZ-ordered Euler rotation (radians) in parent space.
    #[inline]
    pub fn apply_euler_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.apply_quaternion(Quat::from_euler(EulerRot::XYZ, x, y, z));
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_quaternion_premultiplies() {
        let mut t = Transform::IDENTITY;
        let a = Quat::from_rotation_x(0.3);
        let b = Quat::from_rotation_y(0.7);
        t.apply_quaternion(a);
        t.apply_quaternion(b);
        assert!(t.rotation.abs_diff_eq(b * a, 1e-6));
    }

    #[test]
    fn matrix_places_origin_at_translation() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.matrix().transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
    }
}

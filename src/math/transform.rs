use glam::{Mat3, Mat4, Quat, Vec3};

/// Rigid transform with a uniform scale, equivalent to the matrix `T * R * S`.
///
/// Every chain link and every scene object owns one of these. Hierarchical
/// edits are expressed as pre-multiplications (`rotate_about`, `scale_about`,
/// `translate`) so that a whole sub-chain can be moved rigidly about a pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    pub fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    /// Translation column of the 4x4 matrix.
    pub fn translation(&self) -> Vec3 {
        self.position
    }

    /// World-space unit axes of the local frame (rotation matrix columns).
    pub fn axes(&self) -> [Vec3; 3] {
        let m = Mat3::from_quat(self.rotation);
        [m.x_axis, m.y_axis, m.z_axis]
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (point * self.scale) + self.position
    }

    /// Pre-multiplies `Translate(pivot) * R * Translate(-pivot)`.
    pub fn rotate_about(&mut self, pivot: Vec3, rotation: Quat) {
        self.position = pivot + rotation * (self.position - pivot);
        self.rotation = (rotation * self.rotation).normalize();
    }

    /// Pre-multiplies `Translate(pivot) * S(factor) * Translate(-pivot)`.
    pub fn scale_about(&mut self, pivot: Vec3, factor: f32) {
        self.position = pivot + (self.position - pivot) * factor;
        self.scale *= factor;
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
            && (self.scale - other.scale).abs() <= max_abs_diff
    }
}

use glam::{Quat, Vec3};

use crate::math::Transform;
use crate::mesh::MeshHandle;

/// One rigid segment of a chain.
///
/// `pivot` is the far end of the link: the point the next link hinges on.
/// `pivot_rotation` accumulates every rotation applied to this link.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: usize,
    pub transform: Transform,
    pub pivot: Vec3,
    pub pivot_rotation: Quat,
    pub mesh: MeshHandle,
}

impl Link {
    pub fn new(id: usize, transform: Transform, pivot: Vec3, mesh: MeshHandle) -> Self {
        Self {
            id,
            transform,
            pivot,
            pivot_rotation: Quat::IDENTITY,
            mesh,
        }
    }

    /// Rotates the link about `center`, carrying its pivot and accumulated rotation along.
    pub fn rotate_about(&mut self, center: Vec3, rotation: Quat) {
        self.transform.rotate_about(center, rotation);
        self.pivot = center + rotation * (self.pivot - center);
        self.pivot_rotation = (rotation * self.pivot_rotation).normalize();
    }

    pub fn scale_about(&mut self, center: Vec3, factor: f32) {
        self.transform.scale_about(center, factor);
        self.pivot = center + (self.pivot - center) * factor;
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.transform.translate(delta);
        self.pivot += delta;
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation()
    }
}

use glam::Vec3;

use super::aabb::Aabb;
use crate::math::Transform;

/// Cross products shorter than this (near-parallel box axes) are not tested.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Oriented bounding box. Derived per query, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub axes: [Vec3; 3],
    pub half_extents: Vec3,
}

impl Obb {
    pub fn new(center: Vec3, axes: [Vec3; 3], half_extents: Vec3) -> Self {
        Self {
            center,
            axes,
            half_extents,
        }
    }

    pub fn from_aabb(aabb: &Aabb, transform: &Transform) -> Self {
        Self {
            center: transform.transform_point(aabb.center()),
            axes: transform.axes(),
            half_extents: aabb.half_extents() * transform.scale.abs(),
        }
    }

    /// Half-length of the box's shadow on `axis`, in units of `|axis|`.
    fn projected_radius(&self, axis: Vec3) -> f32 {
        self.axes
            .iter()
            .zip(self.half_extents.to_array())
            .map(|(a, h)| (*a * h).dot(axis).abs())
            .sum()
    }

    fn separated_on(&self, other: &Self, delta: Vec3, axis: Vec3) -> bool {
        delta.dot(axis).abs() > self.projected_radius(axis) + other.projected_radius(axis)
    }

    /// Separating axis test over the 6 face axes and 9 edge cross products.
    pub fn overlaps(&self, other: &Self) -> bool {
        let delta = other.center - self.center;

        let face_axes = self.axes.iter().chain(other.axes.iter());
        for &axis in face_axes {
            if self.separated_on(other, delta, axis) {
                return false;
            }
        }

        for a in &self.axes {
            for b in &other.axes {
                let axis = a.cross(*b);
                if axis.length_squared() < AXIS_EPSILON {
                    continue;
                }
                if self.separated_on(other, delta, axis) {
                    return false;
                }
            }
        }

        true
    }
}

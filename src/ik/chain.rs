use super::link::Link;
use crate::error::ChainError;
use crate::math::{Transform, EPSILON};
use crate::mesh::MeshHandle;
use glam::{Quat, Vec3};

/// Articulated chain of rigid links hanging off a root anchor.
///
/// Links are stored root-to-tip in a flat vector; every hierarchical edit is a
/// bounded loop over a suffix of that vector. The link count never changes
/// after construction.
#[derive(Debug, Clone)]
pub struct Chain {
    pub(crate) links: Vec<Link>,
    pub(crate) root: Vec3,
    pub(crate) root_rotation: Quat,
    pub(crate) link_length: f32,
    pub(crate) scale: f32,
    pub(crate) inverted: bool,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, index: usize) -> &Link {
        &self.links[index]
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn root(&self) -> Vec3 {
        self.root
    }

    pub fn root_rotation(&self) -> Quat {
        self.root_rotation
    }

    pub fn link_length(&self) -> f32 {
        self.link_length
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Total length of the stretched chain.
    pub fn reach(&self) -> f32 {
        self.links.len() as f32 * self.link_length * self.scale
    }

    /// Translation column of the last link's transform.
    pub fn end_effector_position(&self) -> Vec3 {
        self.last().position()
    }

    /// Free end of the chain: the pivot of the last link.
    pub fn tip(&self) -> Vec3 {
        self.last().pivot
    }

    /// Root anchor followed by every link pivot, base to tip.
    pub fn joint_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        std::iter::once(self.root).chain(self.links.iter().map(|l| l.pivot))
    }

    /// Pivot link `index` rotates about: the previous link's tip, or the root.
    pub fn pivot_before(&self, index: usize) -> Vec3 {
        match index {
            0 => self.root,
            i => self.links[i - 1].pivot,
        }
    }

    pub fn rotation_before(&self, index: usize) -> Quat {
        match index {
            0 => self.root_rotation,
            i => self.links[i - 1].pivot_rotation,
        }
    }

    /// Lowest link centre along the arena's up axis.
    pub fn lowest_point(&self) -> f32 {
        self.links
            .iter()
            .map(|l| l.position().z)
            .fold(f32::INFINITY, f32::min)
    }

    fn last(&self) -> &Link {
        &self.links[self.links.len() - 1]
    }

    /// Rotates links `root_index..` rigidly about the pivot preceding `root_index`.
    ///
    /// Each link's transform, stored pivot and accumulated rotation receive the
    /// same motion, so descendants stay attached to the rotated ancestor.
    pub fn update_joint_transform(&mut self, root_index: usize, rotation: Quat) {
        assert!(
            root_index < self.links.len(),
            "joint index {root_index} out of range for chain of {} links",
            self.links.len()
        );

        let pivot = self.pivot_before(root_index);
        for link in &mut self.links[root_index..] {
            link.rotate_about(pivot, rotation);
        }
    }

    /// Manual bend of one joint: `yaw` about the predecessor's up axis,
    /// `pitch` about the link's own right axis.
    pub fn steer(&mut self, index: usize, yaw: f32, pitch: f32) {
        assert!(
            index < self.links.len(),
            "joint index {index} out of range for chain of {} links",
            self.links.len()
        );

        let yaw_axis = self.rotation_before(index) * Vec3::Y;
        let pitch_axis = self.links[index].pivot_rotation * Vec3::X;
        let rotation =
            Quat::from_axis_angle(pitch_axis, pitch) * Quat::from_axis_angle(yaw_axis, yaw);
        self.update_joint_transform(index, rotation);
    }

    /// Reverses the chain so the tip becomes the new root.
    ///
    /// The root anchor trades places with the last pivot, the remaining pivots
    /// are reversed, and link poses and meshes are mirrored end to end.
    /// Calling it twice gives back the same chain.
    pub fn invert(&mut self) {
        let n = self.links.len();
        let last = n - 1;

        std::mem::swap(&mut self.root, &mut self.links[last].pivot);
        std::mem::swap(&mut self.root_rotation, &mut self.links[last].pivot_rotation);

        for i in 0..last / 2 {
            let j = last - 1 - i;
            let (pivot, rotation) = (self.links[i].pivot, self.links[i].pivot_rotation);
            self.links[i].pivot = self.links[j].pivot;
            self.links[i].pivot_rotation = self.links[j].pivot_rotation;
            self.links[j].pivot = pivot;
            self.links[j].pivot_rotation = rotation;
        }

        for i in 0..n / 2 {
            let j = last - i;
            let (head, tail) = self.links.split_at_mut(j);
            std::mem::swap(&mut head[i].transform, &mut tail[0].transform);
            std::mem::swap(&mut head[i].mesh, &mut tail[0].mesh);
            std::mem::swap(&mut head[i].id, &mut tail[0].id);
        }

        self.inverted = !self.inverted;
        log::debug!("chain inverted, new root at {:?}", self.root);
    }

    /// Uniformly scales the chain about its root anchor.
    pub fn scale(&mut self, factor: f32) {
        assert!(
            factor.is_finite() && factor > 0.0,
            "chain scale factor must be positive, got {factor}"
        );

        let root = self.root;
        for link in &mut self.links {
            link.scale_about(root, factor);
        }
        self.scale *= factor;
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.root += delta;
        for link in &mut self.links {
            link.translate(delta);
        }
    }

    /// Moves the chain vertically so its lowest link rests on `floor_height`.
    pub fn settle_on_floor(&mut self, floor_height: f32) {
        let offset = floor_height - self.lowest_point();
        if offset.abs() > EPSILON {
            self.translate(Vec3::Z * offset);
        }
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            links: self.links.clone(),
            root: self.root,
            root_rotation: self.root_rotation,
            scale: self.scale,
            inverted: self.inverted,
        }
    }

    pub fn restore(&mut self, snapshot: &ChainSnapshot) -> Result<(), ChainError> {
        if snapshot.links.len() != self.links.len() {
            return Err(ChainError::SnapshotLengthMismatch {
                expected: self.links.len(),
                found: snapshot.links.len(),
            });
        }

        self.links.clone_from(&snapshot.links);
        self.root = snapshot.root;
        self.root_rotation = snapshot.root_rotation;
        self.scale = snapshot.scale;
        self.inverted = snapshot.inverted;
        Ok(())
    }
}

/// Verbatim copy of a chain's pose, used to carry the chain across levels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSnapshot {
    pub links: Vec<Link>,
    pub root: Vec3,
    pub root_rotation: Quat,
    pub scale: f32,
    pub inverted: bool,
}

pub struct ChainBuilder {
    link_count: usize,
    link_length: f32,
    root: Vec3,
    direction: Vec3,
    mesh: MeshHandle,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            link_count: 10,
            link_length: 1.6,
            root: Vec3::ZERO,
            direction: Vec3::Y,
            mesh: MeshHandle::default(),
        }
    }

    pub fn links(mut self, link_count: usize) -> Self {
        self.link_count = link_count;
        self
    }

    pub fn link_length(mut self, link_length: f32) -> Self {
        self.link_length = link_length;
        self
    }

    pub fn root(mut self, root: Vec3) -> Self {
        self.root = root;
        self
    }

    pub fn direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    pub fn mesh(mut self, mesh: MeshHandle) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn build(self) -> Result<Chain, ChainError> {
        if self.link_count == 0 {
            return Err(ChainError::NoLinks);
        }
        if !(self.link_length.is_finite() && self.link_length > 0.0) {
            return Err(ChainError::InvalidLinkLength(self.link_length));
        }
        let direction = self.direction.try_normalize().ok_or(ChainError::ZeroDirection)?;

        // link meshes are modelled along +Y
        let orientation = Quat::from_rotation_arc(Vec3::Y, direction);
        let links = (0..self.link_count)
            .map(|i| {
                let center = self.root + direction * self.link_length * (i as f32 + 0.5);
                let pivot = self.root + direction * self.link_length * (i as f32 + 1.0);
                Link::new(
                    i,
                    Transform::from_position_rotation(center, orientation),
                    pivot,
                    self.mesh,
                )
            })
            .collect();

        Ok(Chain {
            links,
            root: self.root,
            root_rotation: Quat::IDENTITY,
            link_length: self.link_length,
            scale: 1.0,
            inverted: false,
        })
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Chain {
        Chain::builder().links(n).link_length(1.0).build().unwrap()
    }

    fn assert_link_eq(a: &Link, b: &Link) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.mesh, b.mesh);
        assert!(a.transform.abs_diff_eq(&b.transform, 1e-5), "{a:?} != {b:?}");
        assert!(a.pivot.abs_diff_eq(b.pivot, 1e-5));
        assert!(
            a.pivot_rotation.abs_diff_eq(b.pivot_rotation, 1e-5)
                || a.pivot_rotation.abs_diff_eq(-b.pivot_rotation, 1e-5)
        );
    }

    #[test]
    fn builder_lays_links_end_to_end() {
        let c = Chain::builder()
            .links(4)
            .link_length(2.0)
            .root(Vec3::new(1.0, 0.0, 0.0))
            .direction(Vec3::X)
            .build()
            .unwrap();

        assert_eq!(c.len(), 4);
        assert!(c.tip().abs_diff_eq(Vec3::new(9.0, 0.0, 0.0), 1e-6));
        assert!(c.end_effector_position().abs_diff_eq(Vec3::new(8.0, 0.0, 0.0), 1e-6));
        assert!(c.link(0).transform.up().abs_diff_eq(Vec3::X, 1e-6));
        assert_eq!(c.reach(), 8.0);
        assert_eq!(c.joint_positions().count(), 5);
    }

    #[test]
    fn builder_rejects_bad_input() {
        assert_eq!(Chain::builder().links(0).build().unwrap_err(), ChainError::NoLinks);
        assert_eq!(
            Chain::builder().link_length(-1.0).build().unwrap_err(),
            ChainError::InvalidLinkLength(-1.0)
        );
        assert_eq!(
            Chain::builder().direction(Vec3::ZERO).build().unwrap_err(),
            ChainError::ZeroDirection
        );
    }

    #[test]
    fn joint_update_moves_only_descendants() {
        let mut c = chain(6);
        c.steer(1, 0.2, 0.4);
        let before = c.clone();
        let rotation = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 1.0).normalize(), 0.6);
        let pivot = before.pivot_before(3);

        c.update_joint_transform(3, rotation);

        for j in 0..3 {
            assert_eq!(c.link(j), before.link(j));
        }
        for j in 3..6 {
            let mut expected = before.link(j).clone();
            expected.transform.rotate_about(pivot, rotation);
            expected.pivot = pivot + rotation * (expected.pivot - pivot);
            expected.pivot_rotation = rotation * expected.pivot_rotation;
            assert_link_eq(c.link(j), &expected);
        }
        assert_eq!(c.root(), before.root());
    }

    #[test]
    fn joint_update_keeps_links_rigid() {
        let mut c = chain(5);
        c.update_joint_transform(0, Quat::from_rotation_z(0.5));
        c.update_joint_transform(2, Quat::from_rotation_x(-1.1));
        c.update_joint_transform(4, Quat::from_rotation_y(0.3));

        let joints: Vec<Vec3> = c.joint_positions().collect();
        for (i, pair) in joints.windows(2).enumerate() {
            assert!(((pair[1] - pair[0]).length() - 1.0).abs() < 1e-5);
            // link centre stays midway between its hinge and its tip
            assert!(c.link(i).position().abs_diff_eq((pair[0] + pair[1]) * 0.5, 1e-5));
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn joint_index_past_the_end_panics() {
        chain(3).update_joint_transform(3, Quat::IDENTITY);
    }

    #[test]
    fn invert_twice_is_identity() {
        for n in [1, 2, 5, 10] {
            let mut c = chain(n);
            c.steer(0, 0.3, -0.2);
            if n > 2 {
                c.update_joint_transform(2, Quat::from_rotation_z(0.9));
            }
            let before = c.clone();

            c.invert();
            assert!(c.is_inverted());
            c.invert();

            assert!(!c.is_inverted());
            assert_eq!(c.root(), before.root());
            assert_eq!(c.root_rotation(), before.root_rotation());
            assert_eq!(c.links(), before.links());
        }
    }

    #[test]
    fn invert_swaps_root_and_tip() {
        let mut c = chain(4);
        c.update_joint_transform(1, Quat::from_rotation_z(0.7));
        let (root, tip) = (c.root(), c.tip());
        let ids: Vec<usize> = c.links().iter().map(|l| l.id).collect();

        c.invert();

        assert_eq!(c.root(), tip);
        assert_eq!(c.tip(), root);
        let reversed: Vec<usize> = c.links().iter().map(|l| l.id).collect();
        assert_eq!(reversed, ids.into_iter().rev().collect::<Vec<_>>());

        // each link still spans its hinge and its tip
        let joints: Vec<Vec3> = c.joint_positions().collect();
        for (i, pair) in joints.windows(2).enumerate() {
            assert!(c.link(i).position().abs_diff_eq((pair[0] + pair[1]) * 0.5, 1e-5));
        }
    }

    #[test]
    fn scale_grows_about_root() {
        let mut c = Chain::builder()
            .links(3)
            .link_length(1.0)
            .root(Vec3::new(0.0, 0.0, 2.0))
            .build()
            .unwrap();
        c.scale(2.0);
        assert_eq!(c.scale_factor(), 2.0);
        assert_eq!(c.reach(), 6.0);
        assert!(c.tip().abs_diff_eq(Vec3::new(0.0, 6.0, 2.0), 1e-6));
        assert_eq!(c.link(0).transform.scale, 2.0);
    }

    #[test]
    fn settle_drops_lowest_link_to_floor() {
        let mut c = Chain::builder()
            .links(3)
            .link_length(1.0)
            .direction(Vec3::Z)
            .root(Vec3::new(0.0, 0.0, 3.0))
            .build()
            .unwrap();
        c.settle_on_floor(0.4);
        assert!((c.lowest_point() - 0.4).abs() < 1e-5);
        assert!((c.root().z - -0.1).abs() < 1e-5);
    }

    #[test]
    fn snapshot_round_trip_and_mismatch() {
        let mut c = chain(4);
        let saved = c.snapshot();
        c.update_joint_transform(0, Quat::from_rotation_x(1.0));
        c.scale(1.5);
        c.invert();

        c.restore(&saved).unwrap();
        assert_eq!(c.snapshot(), saved);

        let err = chain(2).restore(&saved).unwrap_err();
        assert_eq!(err, ChainError::SnapshotLengthMismatch { expected: 2, found: 4 });
    }
}

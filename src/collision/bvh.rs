//! Static bounding-volume tree over a triangle mesh.
//!
//! Built once per mesh in mesh-local space and never touched per frame; the
//! owning object's world transform is applied on the fly during queries.
//! Nodes live in a flat arena with the root at index 0.

use std::ops::Range;

use glam::Vec3;

use super::aabb::Aabb;
use crate::error::MeshError;
use crate::mesh::MeshData;

#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    /// A node holding at most this many faces becomes a leaf.
    pub max_leaf_faces: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { max_leaf_faces: 1 }
    }
}

impl TreeConfig {
    pub fn with_max_leaf_faces(mut self, max_leaf_faces: usize) -> Self {
        self.max_leaf_faces = max_leaf_faces.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    pub aabb: Aabb,
    first_face: u32,
    face_count: u32,
    children: Option<[u32; 2]>,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<(usize, usize)> {
        self.children.map(|[l, r]| (l as usize, r as usize))
    }

    pub fn face_count(&self) -> usize {
        self.face_count as usize
    }

    fn face_range(&self) -> Range<usize> {
        let start = self.first_face as usize;
        start..start + self.face_count as usize
    }
}

#[derive(Debug, Clone)]
pub struct AabbTree {
    nodes: Vec<BvhNode>,
    face_order: Vec<u32>,
}

impl AabbTree {
    pub fn build(mesh: &MeshData) -> Result<Self, MeshError> {
        Self::build_with(mesh, TreeConfig::default())
    }

    pub fn build_with(mesh: &MeshData, config: TreeConfig) -> Result<Self, MeshError> {
        validate(mesh)?;

        let face_bounds: Vec<Aabb> = (0..mesh.face_count())
            .map(|f| Aabb::from_points(mesh.triangle(f)))
            .collect();
        let centroids: Vec<Vec3> = face_bounds.iter().map(Aabb::center).collect();

        let mut face_order: Vec<u32> = (0..mesh.face_count() as u32).collect();
        let mut nodes = Vec::with_capacity(2 * mesh.face_count());

        let builder = Builder {
            face_bounds: &face_bounds,
            centroids: &centroids,
            max_leaf_faces: config.max_leaf_faces.max(1),
        };
        builder.build_recursive(&mut nodes, &mut face_order, 0);

        log::trace!(
            "built aabb tree: {} faces, {} nodes",
            mesh.face_count(),
            nodes.len()
        );

        Ok(Self { nodes, face_order })
    }

    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &BvhNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn bounds(&self) -> Aabb {
        self.root().aabb
    }

    /// Mesh face indices covered by `node`.
    pub fn faces_of(&self, node: &BvhNode) -> &[u32] {
        &self.face_order[node.face_range()]
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, index: usize) -> usize {
        match self.nodes[index].children() {
            None => 1,
            Some((l, r)) => 1 + self.depth_from(l).max(self.depth_from(r)),
        }
    }
}

struct Builder<'a> {
    face_bounds: &'a [Aabb],
    centroids: &'a [Vec3],
    max_leaf_faces: usize,
}

impl Builder<'_> {
    fn build_recursive(&self, nodes: &mut Vec<BvhNode>, order: &mut [u32], offset: usize) -> u32 {
        let aabb = order
            .iter()
            .fold(Aabb::EMPTY, |acc, &f| acc.union(&self.face_bounds[f as usize]));

        let index = nodes.len() as u32;
        nodes.push(BvhNode {
            aabb,
            first_face: offset as u32,
            face_count: order.len() as u32,
            children: None,
        });

        if order.len() <= self.max_leaf_faces {
            return index;
        }

        let axis = self.split_axis(order);
        let mid = order.len() / 2;
        order.select_nth_unstable_by(mid, |&a, &b| {
            self.centroids[a as usize][axis].total_cmp(&self.centroids[b as usize][axis])
        });

        let (left, right) = order.split_at_mut(mid);
        let l = self.build_recursive(nodes, left, offset);
        let r = self.build_recursive(nodes, right, offset + mid);
        nodes[index as usize].children = Some([l, r]);

        index
    }

    /// Longest axis of the centroid bounds.
    fn split_axis(&self, order: &[u32]) -> usize {
        let bounds = Aabb::from_points(order.iter().map(|&f| self.centroids[f as usize]));
        let extent = bounds.max - bounds.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }
}

fn validate(mesh: &MeshData) -> Result<(), MeshError> {
    if mesh.faces.is_empty() {
        return Err(MeshError::Empty);
    }
    if let Some(index) = mesh.vertices.iter().position(|v| !v.is_finite()) {
        return Err(MeshError::NonFiniteVertex { index });
    }
    let vertex_count = mesh.vertices.len();
    for (face, tri) in mesh.faces.iter().enumerate() {
        if let Some(&vertex) = tri.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(MeshError::FaceIndexOutOfRange {
                face,
                vertex,
                vertex_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(outer: &Aabb, inner: &Aabb) -> bool {
        outer.min.cmple(inner.min).all() && outer.max.cmpge(inner.max).all()
    }

    #[test]
    fn root_bounds_match_mesh() {
        let mesh = MeshData::uv_sphere(2.0, 16, 8);
        let tree = AabbTree::build(&mesh).unwrap();
        let expected = Aabb::from_points(mesh.vertices.iter().copied());
        assert!(tree.bounds().min.abs_diff_eq(expected.min, 1e-6));
        assert!(tree.bounds().max.abs_diff_eq(expected.max, 1e-6));
    }

    #[test]
    fn children_are_enclosed_and_partition_faces() {
        let mesh = MeshData::cylinder(0.3, 1.6, 12);
        let tree = AabbTree::build(&mesh).unwrap();

        for node in tree.nodes() {
            if let Some((l, r)) = node.children() {
                let (left, right) = (tree.node(l), tree.node(r));
                assert!(contains(&node.aabb, &left.aabb));
                assert!(contains(&node.aabb, &right.aabb));
                assert_eq!(left.face_count() + right.face_count(), node.face_count());
                assert!(left.face_count() > 0 && right.face_count() > 0);
            }
        }

        assert_eq!(tree.leaf_count(), mesh.face_count());
        let mut seen: Vec<u32> = tree.faces_of(tree.root()).to_vec();
        seen.sort_unstable();
        assert_eq!(seen, (0..mesh.face_count() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn leaf_size_bounds_depth() {
        let mesh = MeshData::uv_sphere(1.0, 24, 12);
        let fine = AabbTree::build(&mesh).unwrap();
        let config = TreeConfig::default().with_max_leaf_faces(8);
        let coarse = AabbTree::build_with(&mesh, config).unwrap();
        assert!(coarse.depth() < fine.depth());
        assert!(coarse.nodes().iter().filter(|n| n.is_leaf()).all(|n| n.face_count() <= 8));
        // median splits keep the tree balanced
        let log2 = (mesh.face_count() as f32).log2().ceil() as usize;
        assert!(fine.depth() <= log2 + 1);
    }

    #[test]
    fn coincident_triangles_still_terminate() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let faces = vec![[0, 1, 2]; 9];
        let tree = AabbTree::build(&MeshData::new(vertices, faces)).unwrap();
        assert_eq!(tree.leaf_count(), 9);
    }

    #[test]
    fn rejects_malformed_meshes() {
        assert_eq!(AabbTree::build(&MeshData::default()).unwrap_err(), MeshError::Empty);

        let bad_index = MeshData::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1, 2]]);
        assert_eq!(
            AabbTree::build(&bad_index).unwrap_err(),
            MeshError::FaceIndexOutOfRange {
                face: 0,
                vertex: 2,
                vertex_count: 2
            }
        );

        let nan = MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::NAN], vec![[0, 1, 2]]);
        assert_eq!(
            AabbTree::build(&nan).unwrap_err(),
            MeshError::NonFiniteVertex { index: 2 }
        );
    }
}

use super::bvh::AabbTree;
use super::obb::Obb;
use crate::math::Transform;

/// Work counters for one tree/tree query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub obb_tests: u32,
    pub leaf_hits: u32,
}

/// Tree-vs-tree overlap queries. Holds no state between calls.
pub struct CollisionEngine;

impl CollisionEngine {
    pub fn test_tree_pair(
        tree_a: &AabbTree,
        transform_a: &Transform,
        tree_b: &AabbTree,
        transform_b: &Transform,
    ) -> bool {
        let mut stats = TraversalStats::default();
        Self::test_tree_pair_counted(tree_a, transform_a, tree_b, transform_b, &mut stats)
    }

    pub fn test_tree_pair_counted(
        tree_a: &AabbTree,
        transform_a: &Transform,
        tree_b: &AabbTree,
        transform_b: &Transform,
        stats: &mut TraversalStats,
    ) -> bool {
        let pair = TreePair {
            tree_a,
            transform_a,
            tree_b,
            transform_b,
        };
        pair.test_nodes(0, 0, stats)
    }
}

struct TreePair<'a> {
    tree_a: &'a AabbTree,
    transform_a: &'a Transform,
    tree_b: &'a AabbTree,
    transform_b: &'a Transform,
}

impl TreePair<'_> {
    fn test_nodes(&self, a: usize, b: usize, stats: &mut TraversalStats) -> bool {
        let node_a = self.tree_a.node(a);
        let node_b = self.tree_b.node(b);

        let obb_a = Obb::from_aabb(&node_a.aabb, self.transform_a);
        let obb_b = Obb::from_aabb(&node_b.aabb, self.transform_b);

        stats.obb_tests += 1;
        if !obb_a.overlaps(&obb_b) {
            return false;
        }

        match (node_a.children(), node_b.children()) {
            (Some((a_left, a_right)), Some((b_left, b_right))) => {
                self.test_nodes(a_left, b_left, stats)
                    || self.test_nodes(a_right, b_right, stats)
                    || self.test_nodes(a_right, b_left, stats)
                    || self.test_nodes(a_left, b_right, stats)
            }
            // leaf boxes are the finest resolution; no triangle test below them
            _ => {
                stats.leaf_hits += 1;
                true
            }
        }
    }
}

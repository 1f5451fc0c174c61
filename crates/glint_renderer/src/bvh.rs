//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over primitive indices. The tree only knows bounding boxes;
//! the caller supplies the exact intersection test per primitive, so the
//! same structure serves any primitive storage.

use crate::Intersection;
use glint_math::{Aabb, Interval, Ray};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitive indices.
    Leaf { primitives: Vec<usize>, bbox: Aabb },
    /// Empty node (no primitives at all).
    Empty,
}

impl BvhNode {
    /// Build a BVH where primitive `i` is bounded by `bounds[i]`.
    pub fn new(bounds: &[Aabb]) -> Self {
        if bounds.is_empty() {
            return BvhNode::Empty;
        }
        Self::build(bounds.iter().copied().enumerate().collect())
    }

    /// Recursive BVH construction.
    ///
    /// Simple median-split approach: sort primitives by centroid on the
    /// axis where centroids spread most, split in half, recurse.
    fn build(mut items: Vec<(usize, Aabb)>) -> Self {
        let n = items.len();

        let bounds = items
            .iter()
            .fold(Aabb::EMPTY, |acc, (_, b)| Aabb::surrounding(&acc, b));

        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                primitives: items.into_iter().map(|(index, _)| index).collect(),
                bbox: bounds,
            };
        }

        let centroid_bounds = items.iter().fold(Aabb::EMPTY, |acc, (_, b)| {
            let c = b.centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        items.sort_unstable_by(|(_, a), (_, b)| {
            a.centroid()[axis]
                .partial_cmp(&b.centroid()[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let right_items = items.split_off(n / 2);
        let left = Self::build(items);
        let right = Self::build(right_items);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Find the primitive with the smallest hit distance along `ray`.
    ///
    /// `test` is called for every primitive whose leaf box the ray enters.
    /// On equal distances the first primitive found wins.
    pub fn nearest_hit<F>(&self, ray: &Ray, mut test: F) -> Option<(usize, Intersection)>
    where
        F: FnMut(usize) -> Option<Intersection>,
    {
        let mut best = None;
        self.visit(ray, Interval::FORWARD, &mut test, &mut best);
        best
    }

    fn visit<F>(
        &self,
        ray: &Ray,
        ray_t: Interval,
        test: &mut F,
        best: &mut Option<(usize, Intersection)>,
    ) where
        F: FnMut(usize) -> Option<Intersection>,
    {
        match self {
            BvhNode::Empty => {}

            BvhNode::Leaf { primitives, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return;
                }

                for &index in primitives {
                    if let Some(hit) = test(index) {
                        let closest = best.map_or(ray_t.max, |(_, h)| h.t);
                        if hit.t < closest {
                            *best = Some((index, hit));
                        }
                    }
                }
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return;
                }

                left.visit(ray, ray_t, test, best);

                // Only check right up to closest hit
                let right_max = best.map_or(ray_t.max, |(_, h)| h.t);
                right.visit(ray, Interval::new(ray_t.min, right_max), test, best);
            }
        }
    }

    /// Number of primitives referenced by the tree.
    pub fn primitive_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { primitives, .. } => primitives.len(),
            BvhNode::Branch { left, right, .. } => left.primitive_count() + right.primitive_count(),
        }
    }
}

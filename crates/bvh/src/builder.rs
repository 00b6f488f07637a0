use cornercull_geom::Aabb;
use glam::Vec3;

/// Default maximum primitives per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 4;

/// Depth at which the builder stops splitting regardless of leaf size.
pub const MAX_DEPTH: usize = 48;

/// Padding added to primitive bounds so grazing hits are never pruned.
const BOUNDS_PADDING: f32 = 1e-3;

/// A node in the flat hierarchy.
///
/// Interior nodes have `count == 0`; their left child is the next node and
/// their right child sits `right_offset` nodes ahead. Leaves reference
/// `count` entries of [`Bvh::indices`] starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub start: u32,
    pub count: u32,
    pub right_offset: u32,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Static bounding volume hierarchy over primitive bounding boxes.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<u32>,
    depth: usize,
}

impl Bvh {
    /// Build with [`DEFAULT_LEAF_SIZE`].
    pub fn build(bounds: &[Aabb]) -> Self {
        Self::with_leaf_size(bounds, DEFAULT_LEAF_SIZE)
    }

    /// Build over `bounds`; primitive `i` is referred to by index `i`.
    pub fn with_leaf_size(bounds: &[Aabb], leaf_size: usize) -> Self {
        let _span = tracing::info_span!("bvh_build", primitives = bounds.len()).entered();
        let mut bvh = Self::default();
        if bounds.is_empty() {
            return bvh;
        }
        let padded: Vec<Aabb> = bounds.iter().map(|b| b.padded(BOUNDS_PADDING)).collect();
        let mut items: Vec<u32> = (0..bounds.len() as u32).collect();
        let mut builder = Builder {
            bounds: &padded,
            leaf_size: leaf_size.max(1),
            nodes: Vec::with_capacity(bounds.len() * 2),
            indices: Vec::with_capacity(bounds.len()),
            depth: 0,
        };
        builder.build(&mut items, 1);
        bvh.nodes = builder.nodes;
        bvh.indices = builder.indices;
        bvh.depth = builder.depth;
        tracing::debug!(nodes = bvh.nodes.len(), depth = bvh.depth, "bvh built");
        bvh
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Primitive indices in leaf order.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of levels; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map(|n| n.bounds).unwrap_or_default()
    }
}

struct Builder<'a> {
    bounds: &'a [Aabb],
    leaf_size: usize,
    nodes: Vec<BvhNode>,
    indices: Vec<u32>,
    depth: usize,
}

impl Builder<'_> {
    fn build(&mut self, items: &mut [u32], depth: usize) {
        self.depth = self.depth.max(depth);
        let bounds = items
            .iter()
            .fold(Aabb::empty(), |acc, &i| acc.merged(&self.bounds[i as usize]));
        let node_index = self.nodes.len();

        if items.len() <= self.leaf_size || depth >= MAX_DEPTH {
            self.push_leaf(bounds, items);
            return;
        }
        let Some(split) = self.split(items) else {
            self.push_leaf(bounds, items);
            return;
        };

        self.nodes.push(BvhNode {
            bounds,
            start: 0,
            count: 0,
            right_offset: 0,
        });
        let (left, right) = items.split_at_mut(split);
        self.build(left, depth + 1);
        let right_index = self.nodes.len();
        self.build(right, depth + 1);
        self.nodes[node_index].right_offset = (right_index - node_index) as u32;
    }

    fn push_leaf(&mut self, bounds: Aabb, items: &[u32]) {
        self.nodes.push(BvhNode {
            bounds,
            start: self.indices.len() as u32,
            count: items.len() as u32,
            right_offset: 0,
        });
        self.indices.extend_from_slice(items);
    }

    /// Pick the axis and split point minimizing
    /// `area(left) * |left| + area(right) * |right|`, leaving `items`
    /// sorted along that axis. Returns the size of the left half.
    fn split(&self, items: &mut [u32]) -> Option<usize> {
        let n = items.len();
        let centroid = |i: u32| self.bounds[i as usize].center();
        let extent = items.iter().fold(Aabb::empty(), |mut acc, &i| {
            acc.expand(centroid(i));
            acc
        });
        if extent.size().max_element() <= 0.0 {
            // All centroids coincide; halve to keep the tree balanced.
            return Some(n / 2);
        }

        let mut best: Option<(f32, usize, usize)> = None;
        let mut suffix = vec![0.0f32; n + 1];
        for axis in 0..3 {
            if extent.size()[axis] <= 0.0 {
                continue;
            }
            sort_by_axis(items, axis, &centroid);
            let mut acc = Aabb::empty();
            for k in (1..n).rev() {
                acc = acc.merged(&self.bounds[items[k] as usize]);
                suffix[k] = acc.surface_area();
            }
            let mut prefix = Aabb::empty();
            for k in 1..n {
                prefix = prefix.merged(&self.bounds[items[k - 1] as usize]);
                let cost = prefix.surface_area() * k as f32 + suffix[k] * (n - k) as f32;
                if best.is_none_or(|(c, _, _)| cost < c) {
                    best = Some((cost, axis, k));
                }
            }
        }
        let (_, axis, k) = best?;
        sort_by_axis(items, axis, &centroid);
        Some(k)
    }
}

fn sort_by_axis(items: &mut [u32], axis: usize, centroid: &impl Fn(u32) -> Vec3) {
    items.sort_by(|&a, &b| centroid(a)[axis].total_cmp(&centroid(b)[axis]));
}

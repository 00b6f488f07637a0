//! Bounding volume hierarchy over static occluders.
//!
//! Built once at load time with a surface-area-heuristic split, stored as a
//! flat depth-first node array, and queried with an iterative traverser.
//!
//! # Invariants
//! - Read-only after construction; concurrent traversals are safe.
//! - Tree depth never exceeds [`MAX_DEPTH`], so the traversal stack is a
//!   fixed-size array.

mod builder;
mod traverse;

pub use builder::{Bvh, BvhNode, DEFAULT_LEAF_SIZE, MAX_DEPTH};
pub use traverse::{STACK_CAPACITY, TraversalMode, Traverser};

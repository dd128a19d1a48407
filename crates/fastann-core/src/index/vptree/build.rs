//! Recursive vantage-point tree construction over a store range.
//!
//! Nodes are laid out in preorder: a node, then its whole left subtree,
//! then its whole right subtree. Each node derives the RNG seeds of its two
//! children from its own RNG, so the shape of a subtree depends only on its
//! seed and its input range. Building the children on separate threads and
//! splicing their arenas back in preorder therefore yields exactly the tree
//! a sequential build would.

use super::params::VpTreeParams;
use super::VpNode;
use crate::distance::Distance;
use crate::error::Result;
use crate::store::StoreSlice;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds the subtree over `slice` into `nodes`, returning its root index.
pub(super) fn build_subtree<D: Distance + ?Sized>(
    nodes: &mut Vec<VpNode>,
    mut slice: StoreSlice<'_>,
    metric: &D,
    seed: u64,
    params: &VpTreeParams,
) -> Result<Option<usize>> {
    let len = slice.len();
    if len == 0 {
        return Ok(None);
    }

    let index = nodes.len();
    nodes.try_reserve(1)?;
    if len == 1 {
        nodes.push(VpNode::leaf(slice.base()));
        return Ok(Some(index));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let pivot = rng.gen_range(0..len);
    slice.swap(0, pivot);

    let median = len / 2;
    let threshold = slice.partition_by_distance(median, metric)?;
    nodes.push(VpNode {
        position: slice.base(),
        threshold,
        left: None,
        right: None,
    });

    let left_seed: u64 = rng.gen();
    let right_seed: u64 = rng.gen();
    let (head, right) = slice.split_at(median);
    let (_, left) = head.split_at(1);

    let (left_root, right_root) = build_children(
        nodes,
        (left, left_seed),
        (right, right_seed),
        metric,
        params,
        len,
    )?;
    nodes[index].left = left_root;
    nodes[index].right = right_root;
    Ok(Some(index))
}

#[cfg(feature = "parallel")]
fn build_children<D: Distance + ?Sized>(
    nodes: &mut Vec<VpNode>,
    left: (StoreSlice<'_>, u64),
    right: (StoreSlice<'_>, u64),
    metric: &D,
    params: &VpTreeParams,
    len: usize,
) -> Result<(Option<usize>, Option<usize>)> {
    if !params.parallel || len < params.parallel_threshold {
        let left_root = build_subtree(nodes, left.0, metric, left.1, params)?;
        let right_root = build_subtree(nodes, right.0, metric, right.1, params)?;
        return Ok((left_root, right_root));
    }

    let (left, right) = rayon::join(
        || build_detached(left.0, metric, left.1, params),
        || build_detached(right.0, metric, right.1, params),
    );
    let (left_arena, left_root) = left?;
    let (right_arena, right_root) = right?;

    let left_root = splice(nodes, left_arena, left_root)?;
    let right_root = splice(nodes, right_arena, right_root)?;
    Ok((left_root, right_root))
}

#[cfg(not(feature = "parallel"))]
fn build_children<D: Distance + ?Sized>(
    nodes: &mut Vec<VpNode>,
    left: (StoreSlice<'_>, u64),
    right: (StoreSlice<'_>, u64),
    metric: &D,
    params: &VpTreeParams,
    _len: usize,
) -> Result<(Option<usize>, Option<usize>)> {
    let left_root = build_subtree(nodes, left.0, metric, left.1, params)?;
    let right_root = build_subtree(nodes, right.0, metric, right.1, params)?;
    Ok((left_root, right_root))
}

/// Builds a subtree into its own arena.
#[cfg(feature = "parallel")]
fn build_detached<D: Distance + ?Sized>(
    slice: StoreSlice<'_>,
    metric: &D,
    seed: u64,
    params: &VpTreeParams,
) -> Result<(Vec<VpNode>, Option<usize>)> {
    let mut arena = Vec::new();
    let root = build_subtree(&mut arena, slice, metric, seed, params)?;
    Ok((arena, root))
}

/// Appends a detached arena, rebasing its child links.
#[cfg(feature = "parallel")]
fn splice(
    nodes: &mut Vec<VpNode>,
    arena: Vec<VpNode>,
    root: Option<usize>,
) -> Result<Option<usize>> {
    let offset = nodes.len();
    nodes.try_reserve(arena.len())?;
    nodes.extend(arena.into_iter().map(|node| VpNode {
        left: node.left.map(|i| i + offset),
        right: node.right.map(|i| i + offset),
        ..node
    }));
    Ok(root.map(|i| i + offset))
}

//! Depth-first branch-and-bound search.

use super::{VpNode, VpTree};
use crate::distance::Distance;
use crate::topk::BoundedTopK;

impl<D: Distance> VpTree<D> {
    /// Visits the subtree rooted at `node`, offering every pivot that
    /// survives the ball-exclusion bounds into `top`.
    pub(super) fn search_node(&self, node: usize, query: &[f32], top: &mut BoundedTopK) {
        let VpNode {
            position,
            threshold,
            left,
            right,
        } = self.nodes[node];

        let d = self.metric.distance(query, self.store.vector(position));
        top.offer(d, self.store.id(position));

        // Near side first so tau shrinks before the far side is tested.
        if d < threshold {
            if let Some(left) = left {
                if d - top.peek_worst() <= threshold {
                    self.search_node(left, query, top);
                }
            }
            if let Some(right) = right {
                if d + top.peek_worst() >= threshold {
                    self.search_node(right, query, top);
                }
            }
        } else {
            if let Some(right) = right {
                if d + top.peek_worst() >= threshold {
                    self.search_node(right, query, top);
                }
            }
            if let Some(left) = left {
                if d - top.peek_worst() <= threshold {
                    self.search_node(left, query, top);
                }
            }
        }
    }
}

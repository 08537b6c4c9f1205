use crate::arena::{Arena, NodeId};
use crate::node::Op;
use super::Step;
use std::collections::HashMap;

/// Layer index of a node that has not been finalised yet.
const UNSET: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    /// Expanded, parents still being processed.
    Entered,
    Finalized,
}

/// Per-build scratch state, sized to the arena and discarded afterwards so nothing
/// leaks from one build into the next.
struct Scratch {
    layer: Vec<usize>,
    visit: Vec<Visit>,
}

impl Scratch {
    fn new(len: usize) -> Self {
        Scratch {
            layer: vec![UNSET; len],
            visit: vec![Visit::Unvisited; len],
        }
    }
}

/// Depth-first post-order traversal from `roots`, bucketing each node by its
/// longest-path layer in the order it is finalised.
///
/// Parent slot 0 is fully explored before slot 1, matching a recursive
/// "visit both parents, then self" traversal.
pub(super) fn layer_nodes(arena: &Arena, roots: &[NodeId]) -> Vec<Vec<(NodeId, Op)>> {
    let ops = arena.ops();
    let mut scratch = Scratch::new(ops.len());
    let mut buckets: Vec<Vec<(NodeId, Op)>> = Vec::new();
    let mut stack: Vec<(NodeId, bool)> = Vec::new();

    for &root in roots {
        assert!(
            arena.contains(root),
            "Root {} does not belong to this arena ({} nodes)",
            root,
            ops.len()
        );
        stack.push((root, false));

        while let Some((id, expanded)) = stack.pop() {
            let index = id.index();
            let op = ops[index];

            if expanded {
                let layer = op
                    .parents()
                    .into_iter()
                    .flatten()
                    .map(|parent| scratch.layer[parent.index()] + 1)
                    .max()
                    .unwrap_or(0);
                scratch.layer[index] = layer;
                scratch.visit[index] = Visit::Finalized;
                if layer >= buckets.len() {
                    buckets.resize_with(layer + 1, Vec::new);
                }
                buckets[layer].push((id, op));
                continue;
            }

            if scratch.visit[index] != Visit::Unvisited {
                continue;
            }
            scratch.visit[index] = Visit::Entered;
            stack.push((id, true));
            let [first, second] = op.parents();
            for parent in [second, first].into_iter().flatten() {
                if scratch.visit[parent.index()] == Visit::Unvisited {
                    stack.push((parent, false));
                }
            }
        }
    }
    buckets
}

/// Turns a layer bucket into steps, flagging every parent slot whose parent receives
/// gradient from more than one distinct node of the same layer.
pub(super) fn mark_contended(bucket: Vec<(NodeId, Op)>) -> Vec<Step> {
    let mut consumers: HashMap<NodeId, usize> = HashMap::new();
    for (_, op) in &bucket {
        let [first, second] = op.grad_parents();
        if let Some(parent) = first {
            *consumers.entry(parent).or_default() += 1;
        }
        // `mul(a, a)` counts once: a single node is never split across workers.
        if let Some(parent) = second.filter(|p| Some(*p) != first) {
            *consumers.entry(parent).or_default() += 1;
        }
    }

    bucket
        .into_iter()
        .map(|(node, op)| {
            let parents = op.grad_parents();
            let contended = |slot: usize| {
                parents[slot].is_some_and(|p| consumers.get(&p).is_some_and(|&n| n > 1))
            };
            Step {
                node,
                op,
                staged: [contended(0), contended(1)],
            }
        })
        .collect()
}

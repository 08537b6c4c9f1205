//! # Node Arena
//!
//! The [`Arena`] owns every node of a computation graph. Nodes are addressed by
//! [`NodeId`], a plain index that stays valid for the whole lifetime of the arena:
//! storage grows by appending fixed-capacity blocks and existing blocks are never
//! moved, resized or freed individually. The arena gives up all of its blocks at once,
//! either when dropped or through [`Arena::teardown`].
//!
//! Each block is reference counted so that a [`Topology`](crate::topology::Topology)
//! built from the arena can hand the value cells to scheduler threads without
//! borrowing the arena itself. A block's memory is returned only once the arena and
//! every topology holding it are gone.

mod cell;

pub(crate) use cell::NodeCell;

use crate::config::RuntimeConfig;
use crate::node::{Node, Op};
use std::fmt;
use std::sync::Arc;

/// Number of nodes per block unless configured otherwise.
pub const DEFAULT_BLOCK_CAPACITY: usize = 65536;

/// Stable handle to a node owned by an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Allocation slot of the node, counted from the first node of the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One fixed-capacity slab of node cells, zero-initialised on creation.
struct Block {
    cells: Box<[NodeCell]>,
}

impl Block {
    fn zeroed(capacity: usize) -> Self {
        Block {
            cells: (0..capacity).map(|_| NodeCell::default()).collect(),
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("capacity", &self.cells.len())
            .finish()
    }
}

/// Shared view over the value cells (`data`, `grad`) of an arena.
///
/// Cloning only clones the block handles; every clone addresses the same cells.
#[derive(Debug, Clone)]
pub(crate) struct NodeStore {
    blocks: Vec<Arc<Block>>,
    block_capacity: usize,
}

impl NodeStore {
    #[inline]
    fn cell(&self, id: NodeId) -> &NodeCell {
        let index = id.index();
        &self.blocks[index / self.block_capacity].cells[index % self.block_capacity]
    }

    #[inline]
    pub(crate) fn data(&self, id: NodeId) -> f64 {
        self.cell(id).data.load()
    }

    #[inline]
    pub(crate) fn grad(&self, id: NodeId) -> f64 {
        self.cell(id).grad.load()
    }

    #[inline]
    pub(crate) fn set_data(&self, id: NodeId, value: f64) {
        self.cell(id).data.store(value);
    }

    #[inline]
    pub(crate) fn set_grad(&self, id: NodeId, value: f64) {
        self.cell(id).grad.store(value);
    }

    #[inline]
    pub(crate) fn add_grad(&self, id: NodeId, delta: f64) {
        self.cell(id).grad.add(delta);
    }

    #[inline]
    pub(crate) fn add_data(&self, id: NodeId, delta: f64) {
        self.cell(id).data.add(delta);
    }
}

/// Owner of all graph nodes. See the [module documentation](self).
#[derive(Debug)]
pub struct Arena {
    store: NodeStore,
    ops: Vec<Op>,
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

impl Arena {
    /// Creates an empty arena with [`DEFAULT_BLOCK_CAPACITY`] nodes per block.
    pub fn new() -> Self {
        Arena::with_block_capacity(DEFAULT_BLOCK_CAPACITY)
    }

    /// Creates an empty arena whose blocks hold `block_capacity` nodes each.
    ///
    /// # Panics
    /// Panics if `block_capacity` is zero. Use [`RuntimeConfig::with_block_capacity`]
    /// for a checked value.
    pub fn with_block_capacity(block_capacity: usize) -> Self {
        assert!(block_capacity > 0, "Arena block capacity must be non-zero");
        Arena {
            store: NodeStore {
                blocks: Vec::new(),
                block_capacity,
            },
            ops: Vec::new(),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Arena::with_block_capacity(config.block_capacity)
    }

    /// Allocates a fresh, zero-initialised leaf node.
    pub fn allocate(&mut self) -> NodeId {
        self.push(Op::Leaf, 0.0)
    }

    /// Allocates a node for `op` with an initial `data` value; `grad` starts at zero.
    pub(crate) fn push(&mut self, op: Op, data: f64) -> NodeId {
        let index = self.ops.len();
        if index % self.store.block_capacity == 0 {
            self.store
                .blocks
                .push(Arc::new(Block::zeroed(self.store.block_capacity)));
            log::trace!(
                "Arena grew to {} blocks ({} nodes each)",
                self.store.blocks.len(),
                self.store.block_capacity
            );
        }
        let id = NodeId(index);
        self.ops.push(op);
        self.store.set_data(id, data);
        id
    }

    /// Number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn num_blocks(&self) -> usize {
        self.store.blocks.len()
    }

    pub fn block_capacity(&self) -> usize {
        self.store.block_capacity
    }

    /// Whether `id` addresses a node of this arena.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.ops.len()
    }

    pub fn op(&self, id: NodeId) -> Op {
        self.ops[id.index()]
    }

    pub fn data(&self, id: NodeId) -> f64 {
        self.check(id);
        self.store.data(id)
    }

    pub fn grad(&self, id: NodeId) -> f64 {
        self.check(id);
        self.store.grad(id)
    }

    /// Overwrites a node's value. Intended for leaves (inputs, weights) between runs.
    pub fn set_data(&self, id: NodeId, value: f64) {
        self.check(id);
        self.store.set_data(id, value);
    }

    pub fn set_grad(&self, id: NodeId, value: f64) {
        self.check(id);
        self.store.set_grad(id, value);
    }

    /// Snapshot of a node's current state.
    pub fn node(&self, id: NodeId) -> Node {
        Node {
            id,
            op: self.op(id),
            data: self.store.data(id),
            grad: self.store.grad(id),
        }
    }

    /// Gives up the arena's handles to every block at once and returns how many blocks
    /// are still held by live topologies.
    ///
    /// Blocks that no topology shares are freed here. Shared blocks stay readable
    /// through those topologies and are freed when the last of them is dropped.
    pub fn teardown(self) -> usize {
        let shared = self
            .store
            .blocks
            .iter()
            .filter(|block| Arc::strong_count(block) > 1)
            .count();
        log::debug!(
            "Tearing down arena: {} nodes in {} blocks, {} still shared",
            self.ops.len(),
            self.store.blocks.len(),
            shared
        );
        shared
    }

    pub(crate) fn store(&self) -> &NodeStore {
        &self.store
    }

    pub(crate) fn ops(&self) -> &[Op] {
        &self.ops
    }

    #[inline]
    fn check(&self, id: NodeId) {
        assert!(
            self.contains(id),
            "Node {} does not belong to this arena ({} nodes)",
            id,
            self.ops.len()
        );
    }
}

#[cfg(test)]
#[path = "arena_test.rs"]
mod tests;

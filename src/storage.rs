use hashbrown::HashMap;

use crate::node::{Node, NodeId};
use crate::signal::Signal;

/// Growth factor for the node array and the structural-hash index. Both are
/// re-reserved in step to avoid repeated reallocation storms while the
/// parser streams gates in.
const GROWTH_FACTOR: f64 = 3.1415;
/// Occupancy threshold that triggers a reserve.
const GROWTH_TRIGGER: f64 = 0.9;

/// Backing store of a graph: the append-only node array, the primary
/// input/output lists, and the structural-hash index mapping an ordered
/// fanin pair to the node that already computes it.
pub struct Storage {
    pub(crate) nodes: Vec<Node>,
    pub(crate) inputs: Vec<NodeId>,
    pub(crate) outputs: Vec<Signal>,
    pub(crate) strash: HashMap<[Signal; 2], NodeId>,
}

impl Storage {
    pub fn new() -> Self {
        // The constant-0 node always occupies index 0.
        Self {
            nodes: vec![Node::constant()],
            inputs: Vec::new(),
            outputs: Vec::new(),
            strash: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, index: NodeId) -> &Node {
        &self.nodes[index as usize]
    }

    /// Appends a node and returns its index.
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        self.reserve_for_append();
        let index = self.nodes.len() as NodeId;
        self.nodes.push(node);
        index
    }

    fn reserve_for_append(&mut self) {
        let size = self.nodes.len();
        if (size as f64) >= GROWTH_TRIGGER * self.nodes.capacity() as f64 {
            let target = (GROWTH_FACTOR * size as f64).ceil() as usize;
            self.nodes.reserve(target.saturating_sub(size));
            self.strash.reserve(target.saturating_sub(self.strash.len()));
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

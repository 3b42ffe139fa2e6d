use std::fmt::Debug;

use log::debug;

use crate::node::{Node, NodeId};
use crate::signal::Signal;
use crate::storage::Storage;

/// An And-Inverter Graph.
///
/// All construction and queries go through the manager, which owns the node
/// storage and the structural-hash index. Building the graph (`create_pi`,
/// `create_and`, `create_po`) is a single-writer phase; afterwards the
/// graph is logically frozen and any number of threads may traverse it and
/// claim nodes through the atomic mark API.
///
/// Structural hashing guarantees that no two live AND nodes share the same
/// ordered fanin pair, and the trivial-rule rewrites in [`create_and`]
/// guarantee that no stored node has a constant or repeated fanin.
///
/// [`create_and`]: Aig::create_and
pub struct Aig {
    storage: Storage,
}

impl Aig {
    pub fn new() -> Self {
        Self {
            storage: Storage::new(),
        }
    }
}

impl Default for Aig {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Aig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aig")
            .field("nodes", &self.node_count())
            .field("pis", &self.pi_count())
            .field("pos", &self.po_count())
            .finish()
    }
}

// Build API. Not thread-safe: the graph has a single writer until it is
// handed over to the workers.
impl Aig {
    /// Returns the constant-0 signal, or constant 1 when `value` is true.
    pub fn get_constant(&self, value: bool) -> Signal {
        Signal::new(0, value)
    }

    /// Appends a fresh primary input and returns its (positive) signal.
    pub fn create_pi(&mut self) -> Signal {
        let ordinal = self.storage.inputs.len() as u32;
        let index = self.storage.push(Node::pi(ordinal));
        self.storage.inputs.push(index);
        debug!("create_pi: n{} (input {})", index, ordinal);
        Signal::new(index, false)
    }

    /// Returns the AND of two signals, reusing an existing node when the
    /// ordered fanin pair is already present.
    pub fn create_and(&mut self, a: Signal, b: Signal) -> Signal {
        // Order inputs.
        let (a, b) = if a.index() > b.index() { (b, a) } else { (a, b) };
        assert!(
            (b.index() as usize) < self.node_count(),
            "create_and: fanin n{} does not exist",
            b.index()
        );

        // Trivial cases.
        if a.index() == b.index() {
            return if a.is_complemented() == b.is_complemented() {
                a
            } else {
                self.get_constant(false)
            };
        }
        if a.index() == 0 {
            return if a.is_complemented() {
                b
            } else {
                self.get_constant(false)
            };
        }

        // Structural hashing.
        let key = [a, b];
        if let Some(&index) = self.storage.strash.get(&key) {
            debug!("create_and({}, {}): strash hit n{}", a, b, index);
            return Signal::new(index, false);
        }

        let index = self.storage.push(Node::and(a, b));
        self.storage.strash.insert(key, index);

        // Increase ref-count of the children.
        self.storage.nodes[a.index() as usize].fanout_size += 1;
        self.storage.nodes[b.index() as usize].fanout_size += 1;

        debug!("create_and({}, {}): new node n{}", a, b, index);
        Signal::new(index, false)
    }

    /// Records a primary output and returns its position in the output
    /// list.
    pub fn create_po(&mut self, signal: Signal) -> u32 {
        assert!(
            (signal.index() as usize) < self.node_count(),
            "create_po: node n{} does not exist",
            signal.index()
        );
        self.storage.nodes[signal.index() as usize].fanout_size += 1;
        let position = self.storage.outputs.len() as u32;
        self.storage.outputs.push(signal);
        debug!("create_po: output {} <- {}", position, signal);
        position
    }
}

// Accessors.
impl Aig {
    pub fn node_count(&self) -> usize {
        self.storage.node_count()
    }

    pub fn pi_count(&self) -> usize {
        self.storage.inputs.len()
    }

    pub fn po_count(&self) -> usize {
        self.storage.outputs.len()
    }

    pub fn and_count(&self) -> usize {
        self.node_count() - self.pi_count() - 1
    }

    pub fn is_constant(&self, n: NodeId) -> bool {
        n == 0
    }

    /// A node is a primary input iff both fanin slots carry the same
    /// sentinel word and that word is a valid input ordinal. Callers check
    /// `is_constant` first, as the constant node shares the all-zero
    /// encoding.
    pub fn is_pi(&self, n: NodeId) -> bool {
        let fanins = &self.storage.node(n).fanins;
        fanins[0].raw() == fanins[1].raw() && fanins[0].raw() < self.storage.inputs.len() as u32
    }

    pub fn is_complemented(&self, s: Signal) -> bool {
        s.is_complemented()
    }

    pub fn get_node(&self, s: Signal) -> NodeId {
        s.index()
    }

    pub fn make_signal(&self, n: NodeId) -> Signal {
        Signal::new(n, false)
    }

    /// Number of fanins: 2 for AND nodes, 0 for the constant and PIs.
    pub fn fanin_size(&self, n: NodeId) -> u32 {
        if self.is_constant(n) || self.is_pi(n) {
            0
        } else {
            2
        }
    }

    /// Number of live references to `n` (fanins of other nodes plus
    /// primary outputs).
    pub fn fanout_size(&self, n: NodeId) -> u32 {
        self.storage.node(n).fanout_size
    }

    /// Invokes `f` for every node index in creation order.
    pub fn foreach_node(&self, mut f: impl FnMut(NodeId)) {
        for n in 0..self.node_count() as NodeId {
            f(n);
        }
    }

    /// Invokes `f` with both fanins of `n`, first slot first. Does nothing
    /// for the constant node and PIs. `f` may return `false` to stop after
    /// the first fanin.
    pub fn foreach_fanin(&self, n: NodeId, mut f: impl FnMut(Signal) -> bool) {
        if self.is_constant(n) || self.is_pi(n) {
            return;
        }
        let fanins = self.storage.node(n).fanins;
        if !f(fanins[0]) {
            return;
        }
        f(fanins[1]);
    }

    /// Invokes `f` for every primary output signal in declaration order.
    pub fn foreach_po(&self, mut f: impl FnMut(Signal)) {
        for &output in &self.storage.outputs {
            f(output);
        }
    }
}

// Mark API. The only concurrent mutation of the shared graph: workers
// claim nodes through a CAS on the per-node mark word and never block.
impl Aig {
    /// Atomically claims node `n` for `thread_id`.
    ///
    /// Returns true when the node was unclaimed (and is now owned by
    /// `thread_id`) or already owned by the same thread; false when another
    /// thread owns it. Never blocks.
    pub fn check_and_mark(&self, n: NodeId, thread_id: u32) -> bool {
        assert_ne!(thread_id, 0, "thread id 0 means unclaimed");
        self.storage.node(n).try_mark(thread_id)
    }

    /// Reads the mark word of `n`: 0 when unclaimed, otherwise the owner's
    /// thread id.
    pub fn mark(&self, n: NodeId) -> u32 {
        self.storage.node(n).mark()
    }

    /// Releases node `n` back to the unclaimed state. Owner only.
    pub fn reset_mark(&self, n: NodeId) {
        self.storage.node(n).clear_mark();
    }
}

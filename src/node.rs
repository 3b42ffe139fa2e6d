use std::sync::atomic::{AtomicU32, Ordering};

use crate::signal::Signal;

/// Index of a node in the graph's storage.
pub type NodeId = u32;

/// A single graph node.
///
/// # Fields
///
/// - `fanins`: the two fanin signals of an AND node. The constant node and
///   primary inputs reuse these slots for their sentinel encoding (see
///   below).
/// - `fanout_size`: number of live references to this node (fanins of other
///   nodes plus primary outputs). Only ever incremented; the graph does not
///   delete nodes.
/// - `mark`: atomic claim word. 0 means unclaimed; any other value is the
///   id of the thread that owns the node for cut exploration.
///
/// # Memory layout
///
/// ```text
/// +--------+--------+-------------+------+
/// | fanin0 | fanin1 | fanout_size | mark |
/// +--------+--------+-------------+------+
///     4B       4B         4B         4B    = 16 bytes total
/// ```
///
/// # Sentinel encoding
///
/// A primary input stores its input ordinal (position in the PI list) in
/// both fanin slots. A node is a PI iff both slots carry the same raw word
/// and that word is less than the number of declared inputs. The constant
/// node at index 0 carries zeros.
#[derive(Debug)]
pub struct Node {
    pub(crate) fanins: [Signal; 2],
    pub(crate) fanout_size: u32,
    mark: AtomicU32,
}

// Constructors
impl Node {
    pub(crate) fn constant() -> Self {
        Self {
            fanins: [Signal::from_raw(0); 2],
            fanout_size: 0,
            mark: AtomicU32::new(0),
        }
    }

    pub(crate) fn pi(ordinal: u32) -> Self {
        Self {
            fanins: [Signal::from_raw(ordinal); 2],
            fanout_size: 0,
            mark: AtomicU32::new(0),
        }
    }

    pub(crate) fn and(fanin0: Signal, fanin1: Signal) -> Self {
        debug_assert!(fanin0.index() <= fanin1.index(), "fanins must be ordered");
        Self {
            fanins: [fanin0, fanin1],
            fanout_size: 0,
            mark: AtomicU32::new(0),
        }
    }
}

// Mark word. The compare-and-swap here is the sole concurrent mutation of
// the shared graph once the build phase is over.
impl Node {
    /// Claims the node for `thread_id`. Succeeds when the node is unclaimed
    /// (CAS from 0, acquire on success) or already owned by the same
    /// thread.
    pub(crate) fn try_mark(&self, thread_id: u32) -> bool {
        match self
            .mark
            .compare_exchange(0, thread_id, Ordering::Acquire, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(owner) => owner == thread_id,
        }
    }

    pub(crate) fn mark(&self) -> u32 {
        self.mark.load(Ordering::Acquire)
    }

    pub(crate) fn clear_mark(&self) {
        self.mark.store(0, Ordering::Release);
    }
}

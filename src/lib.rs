//! # aig-rs: a concurrent And-Inverter Graph engine
//!
//! **`aig-rs`** builds And-Inverter Graphs from textual netlists, hashes
//! structurally equivalent gates on construction, and enumerates *cuts* of
//! each node from many worker threads in parallel --- without a single lock
//! on the graph itself.
//!
//! ## What is an AIG?
//!
//! An And-Inverter Graph is a compact representation of a Boolean network:
//! a DAG whose internal nodes all compute the AND of two edges, with
//! inversions carried on the edges rather than as nodes. Any combinational
//! circuit can be expressed this way, which makes the AIG the workhorse
//! data structure of logic synthesis and equivalence checking.
//!
//! ## Key features
//!
//! - **Manager-centric architecture**: all construction and queries go
//!   through the [`Aig`][crate::aig::Aig] manager, which enforces
//!   structural sharing and the ordered-fanin invariant.
//! - **Lock-free claims**: each node carries an atomic mark word. Workers
//!   claim nodes with a single compare-and-swap and a failed claim is a
//!   return value, never a blocked thread.
//! - **Greedy cut expansion**: [`cut::create_cut`] grows a cut towards the
//!   inputs, preferring shared fanins, bounded by a target width.
//! - **Bounded task pool**: a worker pool over an MPMC queue with
//!   semaphore backpressure and a drain-on-drop guarantee; submitting from
//!   inside a task cannot deadlock.
//!
//! ## Quick start
//!
//! ```rust
//! use aig_rs::aig::Aig;
//! use aig_rs::cut;
//!
//! // n5 = (x0 & x1) & (x1 & x2)
//! let mut aig = Aig::new();
//! let x0 = aig.create_pi();
//! let x1 = aig.create_pi();
//! let x2 = aig.create_pi();
//! let n3 = aig.create_and(x0, x1);
//! let n4 = aig.create_and(x1, x2);
//! let n5 = aig.create_and(n3, n4);
//! aig.create_po(n5);
//!
//! // Claim n5 for thread 1 and expand a cut towards the inputs.
//! let root = aig.get_node(n5);
//! let leaves = cut::create_cut(&aig, root, 1);
//! assert!(cut::is_trivial(&aig, &leaves));
//!
//! // Hand the claimed region back.
//! cut::release_cut(&aig, root, 1);
//! ```
//!
//! ## Core components
//!
//! - **[`aig`]**: the manager --- construction, structural hashing, and the
//!   atomic mark API.
//! - **[`cut`]**: cut expansion over a claimed region of the graph.
//! - **[`pool`]** / **[`queue`]** / **[`sync`]**: the concurrency
//!   substrate the workers run on.
//! - **[`netlist`]** / **[`diagnostics`]**: the netlist reader and its
//!   diagnostic sink.

pub mod aig;
pub mod cut;
pub mod diagnostics;
pub mod dot;
pub mod netlist;
pub mod node;
pub mod pool;
pub mod queue;
pub mod signal;
pub mod storage;
pub mod sync;

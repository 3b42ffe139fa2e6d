//! Cross-module scenarios: graph construction, cut enumeration under
//! contention, and pool shutdown.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use aig_rs::aig::Aig;
use aig_rs::cut;
use aig_rs::diagnostics::DiagnosticEngine;
use aig_rs::netlist::{read_netlist, AigBuilder};
use aig_rs::node::NodeId;
use aig_rs::pool::TaskPool;
use aig_rs::signal::Signal;

/// x0 x1 x2; n4 = x0 & x1; n5 = x1 & x2; n6 = n4 & n5; po(n6).
fn three_input_chain() -> (Aig, NodeId) {
    let mut aig = Aig::new();
    let x0 = aig.create_pi();
    let x1 = aig.create_pi();
    let x2 = aig.create_pi();
    let n4 = aig.create_and(x0, x1);
    let n5 = aig.create_and(x1, x2);
    let n6 = aig.create_and(n4, n5);
    aig.create_po(n6);
    (aig, 6)
}

/// A deeper graph: a balanced AND tree over `width` inputs.
fn and_tree(width: usize) -> (Aig, NodeId) {
    let mut aig = Aig::new();
    let mut layer: Vec<Signal> = (0..width).map(|_| aig.create_pi()).collect();
    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| {
                if pair.len() == 2 {
                    aig.create_and(pair[0], pair[1])
                } else {
                    pair[0]
                }
            })
            .collect();
    }
    aig.create_po(layer[0]);
    let root = aig.get_node(layer[0]);
    (aig, root)
}

#[test]
fn small_aig_determinism() {
    let (aig, root) = three_input_chain();

    assert_eq!(aig.node_count(), 7);
    assert_eq!(aig.fanout_size(2), 2); // x1 feeds both inner ANDs
    assert_eq!(aig.fanout_size(4), 1);
    assert_eq!(aig.fanout_size(5), 1);
    assert_eq!(aig.fanout_size(root), 1); // the PO reference
}

#[test]
fn structural_hashing_reuses_nodes() {
    let (mut aig, _) = three_input_chain();
    let before = aig.node_count();

    let x0 = aig.make_signal(1);
    let x1 = aig.make_signal(2);
    let again = aig.create_and(x0, x1);
    assert_eq!(aig.get_node(again), 4);
    assert!(!again.is_complemented());
    assert_eq!(aig.node_count(), before);
}

#[test]
fn trivial_rules() {
    let mut aig = Aig::new();
    let x0 = aig.create_pi();

    assert_eq!(aig.create_and(x0, !x0), aig.get_constant(false));
    assert_eq!(aig.create_and(x0, x0), x0);
    assert_eq!(aig.create_and(aig.get_constant(true), x0), x0);
    assert_eq!(
        aig.create_and(aig.get_constant(false), x0),
        aig.get_constant(false)
    );
}

#[test]
fn cut_covers_and_release_clears() {
    let (aig, root) = three_input_chain();

    let leaves = cut::create_cut(&aig, root, 1);
    assert!(!leaves.is_empty());
    // Leaves are a subset of the PIs.
    for &leaf in &leaves {
        assert!(aig.is_pi(leaf), "leaf n{} is not a PI", leaf);
        assert_eq!(aig.mark(leaf), 1);
    }
    // Every path from the root reaches a leaf before any PI.
    let mut pending = vec![root];
    while let Some(n) = pending.pop() {
        if leaves.contains(&n) {
            continue;
        }
        assert!(!aig.is_pi(n) && !aig.is_constant(n));
        aig.foreach_fanin(n, |fi| {
            pending.push(aig.get_node(fi));
            true
        });
    }

    cut::release_cut(&aig, root, 1);
    aig.foreach_node(|n| assert_eq!(aig.mark(n), 0));
}

#[test]
fn concurrent_claim_exclusion() {
    let (aig, root) = three_input_chain();
    let aig = Arc::new(aig);
    let start = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [1u32, 2u32]
        .into_iter()
        .map(|thread_id| {
            let aig = Arc::clone(&aig);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                cut::create_cut(&aig, root, thread_id)
            })
        })
        .collect();

    let cuts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = cuts.iter().filter(|c| !c.is_empty()).collect();
    assert_eq!(winners.len(), 1, "exactly one thread wins the root claim");

    // The winner releases; a retry by the loser now succeeds.
    let winner_id = if cuts[0].is_empty() { 2 } else { 1 };
    let loser_id = 3 - winner_id;
    cut::release_cut(&aig, root, winner_id);
    let retry = cut::create_cut(&aig, root, loser_id);
    assert!(!retry.is_empty());
    cut::release_cut(&aig, root, loser_id);
    aig.foreach_node(|n| assert_eq!(aig.mark(n), 0));
}

#[test]
fn pool_drains_all_tasks_on_drop() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let pool = TaskPool::new(6);
        for _ in 0..256 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
    assert_eq!(counter.load(Ordering::Relaxed), 256);
}

#[test]
fn parallel_enumeration_releases_everything() {
    let (aig, _) = and_tree(64);
    let aig = Arc::new(aig);
    let enumerated = Arc::new(AtomicUsize::new(0));
    let attempts = Arc::new(AtomicUsize::new(0));

    fn claim_id() -> u32 {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        thread_local! {
            static ID: u32 = NEXT.fetch_add(1, Ordering::Relaxed);
        }
        ID.with(|id| *id)
    }

    {
        let pool = TaskPool::new(4);
        aig.foreach_node(|n| {
            if aig.is_constant(n) {
                return;
            }
            let aig = Arc::clone(&aig);
            let enumerated = Arc::clone(&enumerated);
            let attempts = Arc::clone(&attempts);
            pool.submit(move || {
                attempts.fetch_add(1, Ordering::Relaxed);
                let thread_id = claim_id();
                let leaves = cut::create_cut(&aig, n, thread_id);
                if !leaves.is_empty() {
                    enumerated.fetch_add(1, Ordering::Relaxed);
                    cut::release_cut(&aig, n, thread_id);
                }
            });
        });
    }

    assert_eq!(attempts.load(Ordering::Relaxed), aig.node_count() - 1);
    assert!(enumerated.load(Ordering::Relaxed) > 0);
    // Winners released their claims and losers never held any.
    aig.foreach_node(|n| assert_eq!(aig.mark(n), 0));
}

#[test]
fn netlist_to_cuts_round_trip() {
    let text = "\
module top( a, b, c, y );
  input a, b, c;
  output y;
  wire t0, t1;
  assign t0 = a & b;
  assign t1 = b & c;
  assign y = t0 & ~t1;
endmodule
";
    let mut aig = Aig::new();
    let diag = DiagnosticEngine::silent();
    let mut builder = AigBuilder::new(&mut aig, &diag);
    read_netlist(text.as_bytes(), &mut builder).unwrap();

    assert_eq!(diag.reported(), 0);
    assert_eq!(aig.pi_count(), 3);
    assert_eq!(aig.and_count(), 3);
    assert_eq!(aig.po_count(), 1);

    // Enumerate a cut for every AND node, sequentially.
    aig.foreach_node(|n| {
        if aig.is_constant(n) || aig.is_pi(n) {
            return;
        }
        let leaves = cut::create_cut(&aig, n, 1);
        assert!(!leaves.is_empty());
        cut::release_cut(&aig, n, 1);
    });
    aig.foreach_node(|n| assert_eq!(aig.mark(n), 0));
}

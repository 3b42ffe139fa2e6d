//! Cut enumeration over a claimed region of the shared graph.
//!
//! A *cut* of a node `n` is a set of ancestors such that every path from
//! `n` to a primary input passes through the set, and every member is
//! reachable from `n`. Workers claim nodes exclusively through the graph's
//! atomic mark word, expand the frontier greedily, and release the whole
//! claimed sub-DAG when done. Claim contention is never fatal: a losing
//! `create_cut` returns an empty cut and the caller retries later or moves
//! on.

use log::trace;

use crate::aig::Aig;
use crate::node::NodeId;

/// Default target cut width.
pub const SIZE_LIMIT: usize = 6;

/// Bound on consecutive oversize rounds in [`expand`] before giving up on
/// shrinking the cut back under the limit.
const MAX_ITERATIONS: u32 = 5;

/// A cut: node indices in insertion order, owned by the caller.
pub type Cut = Vec<NodeId>;

/// Returns true iff every leaf is a primary input or the constant.
pub fn is_trivial(aig: &Aig, cut: &[NodeId]) -> bool {
    cut.iter()
        .all(|&n| aig.is_constant(n) || aig.is_pi(n))
}

/// Computes one cut of `n` on behalf of `thread_id`.
///
/// Claims `n` first; when some other worker already owns it, returns an
/// empty cut, which the caller treats as "try later". On success every
/// node of the returned cut, and every interior node between `n` and the
/// cut, is marked with `thread_id` until [`release_cut`] is called.
pub fn create_cut(aig: &Aig, n: NodeId, thread_id: u32) -> Cut {
    if !aig.check_and_mark(n, thread_id) {
        return Vec::new();
    }

    let mut cut = vec![n];
    expand(aig, &mut cut, SIZE_LIMIT, thread_id);
    cut
}

/// Cost-free expansion: repeatedly replaces a leaf by its fanins whenever
/// that introduces at most one new leaf (all other fanins already belong
/// to `thread_id`).
///
/// A leaf whose outside fanin is claimed by another thread stays in the
/// cut; removing it would break the covering property. Returns true iff
/// the resulting cut is trivial.
pub fn expand0(aig: &Aig, cut: &mut Cut, thread_id: u32) -> bool {
    let mut trivial = true;
    let mut changed = true;

    // Leaves derived during a pass; appended after the pass so the scan
    // order stays stable.
    let mut new_leaves: Vec<NodeId> = Vec::with_capacity(16);

    // Expand towards the inputs until a fix-point is reached.
    while changed {
        trivial = true;
        changed = false;

        let mut i = 0;
        while i < cut.len() {
            let leaf = cut[i];
            debug_assert!(!aig.is_constant(leaf));
            debug_assert_eq!(aig.mark(leaf), thread_id);

            if aig.is_pi(leaf) {
                i += 1;
                continue;
            }

            // At least one leaf is not a PI.
            trivial = false;

            // Count how many fanins of this leaf are already ours and
            // remember the one outside, if any.
            let mut inside = 0u32;
            let mut expansion_point = None;
            aig.foreach_fanin(leaf, |fi| {
                let m = aig.get_node(fi);
                if aig.mark(m) == thread_id {
                    inside += 1;
                } else {
                    expansion_point = Some(m);
                }
                true
            });

            // Two or more fanins outside: expanding here is not cost-free.
            if inside + 1 < aig.fanin_size(leaf) {
                i += 1;
                continue;
            }

            if let Some(point) = expansion_point {
                if !aig.check_and_mark(point, thread_id) {
                    // Another thread owns the fanin; the leaf stays.
                    i += 1;
                    continue;
                }
                new_leaves.push(point);
            }

            cut.remove(i);
            changed = true;
        }

        cut.append(&mut new_leaves);
    }

    trace!("expand0: cut {:?} trivial={}", cut, trivial);
    trivial
}

/// Picks the next node to pull into a non-trivial cut: the fanin referenced
/// most often by the current leaves, ties broken by the larger fanout in
/// the underlying graph, then by first-seen order.
pub(crate) fn select_next_fanin(aig: &Aig, cut: &[NodeId]) -> NodeId {
    debug_assert!(!cut.is_empty(), "cut must not be empty");
    debug_assert!(!is_trivial(aig, cut));

    // Reference counts in first-seen order. Cuts are small, so a linear
    // scan beats a hash map here.
    let mut candidates: Vec<(NodeId, u32)> = Vec::new();
    for &leaf in cut {
        if aig.is_constant(leaf) || aig.is_pi(leaf) {
            continue;
        }
        aig.foreach_fanin(leaf, |fi| {
            let m = aig.get_node(fi);
            if aig.is_constant(m) {
                return true;
            }
            match candidates.iter_mut().find(|(node, _)| *node == m) {
                Some((_, count)) => *count += 1,
                None => candidates.push((m, 1)),
            }
            true
        });
    }

    assert!(
        !candidates.is_empty(),
        "a non-trivial cut always has an expandable fanin"
    );

    let mut best = candidates[0];
    for &(node, count) in &candidates[1..] {
        if count > best.1
            || (count == best.1 && aig.fanout_size(node) > aig.fanout_size(best.0))
        {
            best = (node, count);
        }
    }
    best.0
}

/// Bounded best-fanin expansion of a seed cut whose members are already
/// claimed by `thread_id`.
///
/// Alternates pulling in the best fanin with cost-free expansion, keeping
/// the last cut that fit `size_limit`. Stops when the cut is trivial, or
/// after [`MAX_ITERATIONS`] consecutive oversize rounds, or after the same
/// number of consecutive failed claims; if some cut ever fit the limit,
/// that one is returned, otherwise the oversize cut is left as-is.
pub fn expand(aig: &Aig, cut: &mut Cut, size_limit: usize, thread_id: u32) {
    if expand0(aig, cut, thread_id) {
        return;
    }

    let mut best_cut: Option<Cut> = None;
    if cut.len() <= size_limit {
        best_cut = Some(cut.clone());
    }

    let mut iterations = 0u32;
    let mut stalled = 0u32;
    loop {
        let next = select_next_fanin(aig, cut);
        if aig.check_and_mark(next, thread_id) {
            cut.push(next);
            stalled = 0;
        } else {
            // On a failed claim we still re-run expand0: the frontier may
            // give way elsewhere. A few fruitless rounds in a row mean the
            // region is walled in by another worker, so stop rather than
            // spin until that worker releases.
            stalled += 1;
        }

        let trivial = expand0(aig, cut, thread_id);
        debug_assert_eq!(trivial, is_trivial(aig, cut));

        iterations = if cut.len() > size_limit {
            iterations + 1
        } else {
            0
        };
        if cut.len() <= size_limit
            && best_cut.as_ref().map_or(true, |best| best.len() <= size_limit)
        {
            best_cut = Some(cut.clone());
        }

        if trivial
            || stalled >= MAX_ITERATIONS
            || (cut.len() > size_limit && iterations >= MAX_ITERATIONS)
        {
            break;
        }
    }

    match best_cut {
        Some(best) => *cut = best,
        None => debug_assert!(cut.len() > size_limit),
    }
}

/// Clears the marks of the claimed sub-DAG rooted at `n`.
///
/// Walks fanins through nodes marked with `thread_id` and stops at anything
/// it does not own, so regions claimed by other workers are untouched. Uses
/// an explicit work-list: the claimed region of a deep graph can exceed any
/// reasonable call stack.
pub fn release_cut(aig: &Aig, n: NodeId, thread_id: u32) {
    let mut pending = vec![n];
    while let Some(m) = pending.pop() {
        if aig.mark(m) != thread_id {
            continue;
        }
        aig.reset_mark(m);
        aig.foreach_fanin(m, |fi| {
            pending.push(aig.get_node(fi));
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    /// x0 x1 x2; n4 = x0 & x1; n5 = x1 & x2; n6 = n4 & n5.
    fn three_input_chain() -> (Aig, NodeId) {
        let mut aig = Aig::new();
        let x0 = aig.create_pi();
        let x1 = aig.create_pi();
        let x2 = aig.create_pi();
        let n4 = aig.create_and(x0, x1);
        let n5 = aig.create_and(x1, x2);
        let n6 = aig.create_and(n4, n5);
        aig.create_po(n6);
        let root = aig.get_node(n6);
        (aig, root)
    }

    /// Checks the covering property: every path from `root` towards the
    /// inputs crosses the cut.
    fn assert_covering(aig: &Aig, root: NodeId, cut: &[NodeId]) {
        let mut pending = vec![root];
        while let Some(n) = pending.pop() {
            if cut.contains(&n) {
                continue;
            }
            assert!(
                !aig.is_constant(n) && !aig.is_pi(n),
                "path from n{} escapes the cut at n{}",
                root,
                n
            );
            aig.foreach_fanin(n, |fi| {
                pending.push(aig.get_node(fi));
                true
            });
        }
    }

    #[test]
    fn test_cut_of_root_is_trivial() {
        let (aig, root) = three_input_chain();

        let cut = create_cut(&aig, root, 1);
        assert!(!cut.is_empty());
        assert!(is_trivial(&aig, &cut));
        assert_covering(&aig, root, &cut);

        // Every leaf is one of the three PIs and carries our mark.
        for &leaf in &cut {
            assert!(aig.is_pi(leaf));
            assert_eq!(aig.mark(leaf), 1);
        }

        release_cut(&aig, root, 1);
        aig.foreach_node(|n| assert_eq!(aig.mark(n), 0));
    }

    #[test]
    fn test_claim_denied_returns_empty_cut() {
        let (aig, root) = three_input_chain();

        let cut = create_cut(&aig, root, 1);
        assert!(!cut.is_empty());

        // The root is owned by thread 1, so thread 2 is turned away.
        assert!(create_cut(&aig, root, 2).is_empty());

        release_cut(&aig, root, 1);
        let retry = create_cut(&aig, root, 2);
        assert!(!retry.is_empty());
        release_cut(&aig, root, 2);
    }

    #[test]
    fn test_reclaim_by_same_owner() {
        let (aig, root) = three_input_chain();

        let first = create_cut(&aig, root, 1);
        // The same thread may reclaim its own node.
        let again = create_cut(&aig, root, 1);
        assert!(!first.is_empty());
        assert!(!again.is_empty());
        release_cut(&aig, root, 1);
    }

    #[test]
    fn test_expand0_is_idempotent() {
        let (aig, root) = three_input_chain();
        assert!(aig.check_and_mark(root, 1));

        let mut cut = vec![root];
        expand0(&aig, &mut cut, 1);
        let once = cut.clone();
        expand0(&aig, &mut cut, 1);
        assert_eq!(cut, once);

        release_cut(&aig, root, 1);
    }

    #[test]
    fn test_expand0_blocked_by_foreign_claim() {
        let (aig, root) = three_input_chain();

        // Thread 2 grabs one fanin of the root first.
        let mut fanins = Vec::new();
        aig.foreach_fanin(root, |fi| {
            fanins.push(aig.get_node(fi));
            true
        });
        assert!(aig.check_and_mark(fanins[0], 2));

        let cut = create_cut(&aig, root, 1);
        assert!(!cut.is_empty());
        // The cut still covers the root even though expansion was blocked.
        assert_covering(&aig, root, &cut);
        assert!(cut.contains(&fanins[0]) || !is_trivial(&aig, &cut));

        release_cut(&aig, root, 1);
        release_cut(&aig, fanins[0], 2);
        aig.foreach_node(|n| assert_eq!(aig.mark(n), 0));
    }

    #[test]
    fn test_select_next_fanin_prefers_shared_fanin() {
        let (aig, root) = three_input_chain();
        assert!(aig.check_and_mark(root, 1));

        // Make both AND fanins of the root the current leaves. Each of
        // them references x1, so x1 is the most-referenced candidate.
        let mut fanins = Vec::new();
        aig.foreach_fanin(root, |fi| {
            fanins.push(aig.get_node(fi));
            true
        });
        for &f in &fanins {
            assert!(aig.check_and_mark(f, 1));
        }
        let picked = select_next_fanin(&aig, &fanins);
        assert_eq!(aig.fanout_size(picked), 2);

        release_cut(&aig, root, 1);
    }

    #[test]
    fn test_cut_respects_size_limit() {
        // A wide AND tree over 16 inputs: the trivial cut has 16 leaves,
        // so expansion must fall back to the best cut within the limit.
        let mut aig = Aig::new();
        let mut layer: Vec<Signal> = (0..16).map(|_| aig.create_pi()).collect();
        while layer.len() > 1 {
            layer = layer
                .chunks(2)
                .map(|pair| aig.create_and(pair[0], pair[1]))
                .collect();
        }
        let root_signal = layer[0];
        aig.create_po(root_signal);
        let root = aig.get_node(root_signal);

        let cut = create_cut(&aig, root, 1);
        assert!(!cut.is_empty());
        assert!(cut.len() <= SIZE_LIMIT);
        assert_covering(&aig, root, &cut);

        release_cut(&aig, root, 1);
        aig.foreach_node(|n| assert_eq!(aig.mark(n), 0));
    }

    #[test]
    fn test_cut_of_pi_is_the_pi() {
        let (aig, _) = three_input_chain();
        let pi = 1;
        assert!(aig.is_pi(pi));

        let cut = create_cut(&aig, pi, 3);
        assert_eq!(cut, vec![pi]);
        assert!(is_trivial(&aig, &cut));

        release_cut(&aig, pi, 3);
        assert_eq!(aig.mark(pi), 0);
    }
}

//! Causality bundle minimization.
//!
//! A candidate bundle collects every event that can immediately precede
//! its target. Minimization splits it until every remaining bundle is
//! pairwise conflicting: while two members are not in conflict, the bundle
//! is replaced by two copies, each missing one of them. Bundles without
//! such a pair are final. A final bundle strictly contained in another
//! final bundle for the same target is dropped.
//!
//! The surviving bundles are exactly the maximal cliques of the conflict
//! graph restricted to the candidate members. A maximal clique can never
//! hold both members of a split pair, so it always survives into one side
//! of every split and ends up final; any smaller final bundle lies inside
//! one of those cliques and is filtered. The result therefore does not
//! depend on which pair is split first.
//!
//! A maximal clique need not be a cause set of the original system. With
//! `{a, d} -> t`, `{b, c} -> t` and conflicts `a # d`, `b # c`, `c # d`,
//! all four events are candidates for `t` and `{c, d}` is a third maximal
//! clique. The derived structure then demands one of `c`, `d` before `t`,
//! so the trace `a b t` is lost.

use std::collections::BTreeSet;

use evstruct_structure::ConflictGraph;
use evstruct_types::{CausalityBundle, Event};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which non-conflicting pair the worklist splits first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitOrder {
    /// The smallest pair in member order.
    #[default]
    FirstPair,
    /// The largest pair in member order.
    LastPair,
}

/// The pair `bundle` would be split on, if any.
pub fn split_pair<'b>(
    bundle: &'b CausalityBundle,
    conflicts: &ConflictGraph,
    order: SplitOrder,
) -> Option<(&'b Event, &'b Event)> {
    let mut pairs = bundle
        .member_pairs()
        .filter(|(first, second)| !conflicts.in_conflict(first, second));
    match order {
        SplitOrder::FirstPair => pairs.next(),
        SplitOrder::LastPair => pairs.last(),
    }
}

/// Split one candidate bundle into its pairwise-conflicting bundles.
///
/// A bundle that is already pairwise conflicting comes back unchanged.
pub fn minimize_bundle(
    bundle: CausalityBundle,
    conflicts: &ConflictGraph,
    order: SplitOrder,
) -> BTreeSet<CausalityBundle> {
    let mut worklist = vec![bundle];
    let mut seen: BTreeSet<CausalityBundle> = BTreeSet::new();
    let mut finals: BTreeSet<CausalityBundle> = BTreeSet::new();

    while let Some(current) = worklist.pop() {
        if seen.contains(&current) {
            continue;
        }
        match split_pair(&current, conflicts, order) {
            None => {
                finals.insert(current.clone());
            }
            Some((first, second)) => {
                worklist.extend(current.without(first));
                worklist.extend(current.without(second));
            }
        }
        seen.insert(current);
    }

    let maximal: BTreeSet<CausalityBundle> = finals
        .iter()
        .filter(|bundle| {
            !finals.iter().any(|other| {
                other.len() > bundle.len() && bundle.members().is_subset(other.members())
            })
        })
        .cloned()
        .collect();
    debug!(
        explored = seen.len(),
        finals = finals.len(),
        kept = maximal.len(),
        "Minimized bundle"
    );
    maximal
}

/// Minimize every candidate bundle.
pub fn minimize_bundles(
    candidates: impl IntoIterator<Item = CausalityBundle>,
    conflicts: &ConflictGraph,
    order: SplitOrder,
) -> BTreeSet<CausalityBundle> {
    candidates
        .into_iter()
        .flat_map(|candidate| minimize_bundle(candidate, conflicts, order))
        .collect()
}

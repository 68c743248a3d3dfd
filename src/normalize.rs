//! Per-state weight renormalization in the log semiring.
//!
//! Pruned or interpolated grammars often leave states whose outgoing
//! probability mass no longer sums to one. Re-scaling each state's arcs by
//! the log-sum of their weights restores a locally normalized machine
//! without touching its topology.

use anyhow::Result;
use rustfst::fst_impls::VectorFst;
use rustfst::prelude::*;

/// Rescale every state's outgoing arcs so their weights log-sum to one.
/// States whose mass is already degenerate (no arcs, or an infinite sum)
/// are left alone. Returns the number of states rescaled.
pub fn normalize_weights(fst: &mut VectorFst<LogWeight>, verbose: bool) -> Result<usize> {
    let mut rescaled = 0;
    let states: Vec<StateId> = fst.states_iter().collect();
    for state in states {
        let mut total = LogWeight::zero();
        let trs = fst.get_trs(state)?;
        for tr in trs.trs() {
            total.plus_assign(&tr.weight)?;
        }
        if !total.value().is_finite() {
            continue;
        }
        if verbose {
            println!("state: {} log mass: {}", state, total.value());
        }
        let mut it = fst.tr_iter_mut(state)?;
        for idx in 0..it.len() {
            let weight = LogWeight::new(it[idx].weight.value() - total.value());
            it.set_weight(idx, weight)?;
        }
        rescaled += 1;
    }
    Ok(rescaled)
}

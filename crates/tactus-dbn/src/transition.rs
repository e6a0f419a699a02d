//! Sparse transition model over the tempo/phase/bar lattice.
//!
//! Transitions are never materialized as a dense matrix; each state's
//! predecessors are enumerated once at build time and stored CSR-style
//! (`pointers` into parallel `prev_states`/`log_probs` arrays). Within a
//! beat the phase advances deterministically, so interior states have a
//! single predecessor; at a phase wrap the tempo may step by at most one
//! interval and the bar position advances, so wrap states have a handful of
//! predecessors. Decoding cost stays proportional to lattice size.

use crate::state_space::BarStateSpace;
use crate::{Error, Result};

/// Predecessor-indexed sparse transition table.
#[derive(Debug, Clone)]
pub struct TransitionModel {
    pointers: Vec<usize>,
    prev_states: Vec<u32>,
    log_probs: Vec<f64>,
}

impl TransitionModel {
    /// Build the transition table for a lattice.
    ///
    /// `transition_lambda` shapes the tempo-change penalty
    /// `exp(-lambda * |delta interval| / interval_from)`, normalized over
    /// the at-most-three tempo options of each source state.
    /// `meter_change_prob` is the probability of switching to another meter
    /// hypothesis at a bar boundary; it is ignored with a single hypothesis.
    pub fn new(
        space: &BarStateSpace,
        transition_lambda: f32,
        meter_change_prob: f32,
    ) -> Result<Self> {
        if !transition_lambda.is_finite() || transition_lambda <= 0.0 {
            return Err(Error::config("transition_lambda", "must be > 0"));
        }
        if !meter_change_prob.is_finite() || !(0.0..1.0).contains(&meter_change_prob) {
            return Err(Error::config("meter_change_prob", "must be in [0, 1)"));
        }

        let beat = space.beat();
        let num_tempi = beat.num_tempi();
        let lambda = transition_lambda as f64;

        // Normalized tempo-step weights per source tempo: stay, or one
        // interval up/down where the grid allows it.
        let mut steps: Vec<Vec<(usize, f64)>> = Vec::with_capacity(num_tempi);
        for from in 0..num_tempi {
            let lo = from.saturating_sub(1);
            let hi = (from + 1).min(num_tempi - 1);
            let from_interval = beat.interval(from) as f64;
            let mut options: Vec<(usize, f64)> = (lo..=hi)
                .map(|to| {
                    let delta = (beat.interval(to) as f64 - from_interval).abs();
                    (to, (-lambda * delta / from_interval).exp())
                })
                .collect();
            let z: f64 = options.iter().map(|(_, w)| w).sum();
            for (_, w) in options.iter_mut() {
                *w /= z;
            }
            steps.push(options);
        }

        let n = space.num_states();
        let num_meters = space.num_meters();
        let switch = if num_meters > 1 {
            meter_change_prob as f64
        } else {
            0.0
        };
        let mut preds: Vec<Vec<(u32, f64)>> = vec![Vec::new(); n];
        let mut outgoing = vec![0.0f64; n];

        // Deterministic phase advance inside a beat.
        for meter in 0..num_meters {
            for bar in 1..=space.beats_per_bar(meter) {
                for tempo in 0..num_tempi {
                    let first = space.first_state(meter, bar, tempo);
                    for phase in 1..beat.interval(tempo) {
                        preds[first + phase].push(((first + phase - 1) as u32, 0.0));
                        outgoing[first + phase - 1] += 1.0;
                    }
                }
            }
        }

        // Beat-boundary edges: tempo step, bar advance, optional meter
        // switch when a bar completes.
        for meter in 0..num_meters {
            let bars = space.beats_per_bar(meter);
            for bar in 1..=bars {
                for from in 0..num_tempi {
                    let src = space.last_state(meter, bar, from);
                    for &(to, weight) in &steps[from] {
                        if bar < bars {
                            let succ = space.first_state(meter, bar + 1, to);
                            preds[succ].push((src as u32, weight.ln()));
                            outgoing[src] += weight;
                        } else {
                            let stay = weight * (1.0 - switch);
                            let succ = space.first_state(meter, 1, to);
                            preds[succ].push((src as u32, stay.ln()));
                            outgoing[src] += stay;
                            if switch > 0.0 {
                                let share = weight * switch / (num_meters - 1) as f64;
                                for other in (0..num_meters).filter(|&o| o != meter) {
                                    let succ = space.first_state(other, 1, to);
                                    preds[succ].push((src as u32, share.ln()));
                                    outgoing[src] += share;
                                }
                            }
                        }
                    }
                }
            }
        }

        for (state, sum) in outgoing.iter().enumerate() {
            if (sum - 1.0).abs() > 1e-6 {
                return Err(Error::Model(format!(
                    "outgoing transition probabilities of state {state} sum to {sum}"
                )));
            }
        }

        // Flatten to CSR; predecessors sorted ascending so argmax ties
        // resolve to the lowest state index.
        let mut pointers = Vec::with_capacity(n + 1);
        let mut prev_states = Vec::new();
        let mut log_probs = Vec::new();
        pointers.push(0);
        for list in preds.iter_mut() {
            list.sort_unstable_by_key(|&(prev, _)| prev);
            for &(prev, lp) in list.iter() {
                prev_states.push(prev);
                log_probs.push(lp);
            }
            pointers.push(prev_states.len());
        }

        tracing::debug!(
            "transition model: {} states, {} edges",
            n,
            prev_states.len()
        );

        Ok(Self {
            pointers,
            prev_states,
            log_probs,
        })
    }

    pub fn num_states(&self) -> usize {
        self.pointers.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.prev_states.len()
    }

    /// Predecessors of a state with their transition log-probabilities,
    /// in ascending state order.
    pub fn predecessors(&self, state: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.pointers[state];
        let end = self.pointers[state + 1];
        self.prev_states[start..end]
            .iter()
            .zip(self.log_probs[start..end].iter())
            .map(|(&prev, &lp)| (prev as usize, lp))
    }
}

//! Maximum-a-posteriori lattice decoding.
//!
//! A single forward pass accumulates the best path log-probability per
//! state with back-pointers, then backtracks from the best terminal state.
//! Transitions are sparse (each state has a handful of predecessors), so a
//! frame costs time proportional to the number of lattice edges. The
//! back-pointer table is `num_frames x lattice_size` and is owned by one
//! decode call exclusively.

use crate::observation::ObservationModel;
use crate::transition::TransitionModel;
use crate::{Error, Result};

/// Hidden Markov model: transition table, observation model, initial
/// distribution.
#[derive(Debug, Clone)]
pub struct Hmm {
    transition: TransitionModel,
    observation: ObservationModel,
    /// Log prior per state.
    initial: Vec<f64>,
}

impl Hmm {
    /// Build a model with a uniform initial distribution (no known
    /// anacrusis).
    pub fn new(transition: TransitionModel, observation: ObservationModel) -> Self {
        let n = transition.num_states();
        let uniform = -(n as f64).ln();
        Self {
            transition,
            observation,
            initial: vec![uniform; n],
        }
    }

    /// Replace the initial distribution with a caller-supplied prior.
    /// The prior is normalized; zero entries become unreachable starts.
    pub fn with_prior(mut self, prior: &[f64]) -> Result<Self> {
        if prior.len() != self.transition.num_states() {
            return Err(Error::Model(format!(
                "prior length {} does not match lattice size {}",
                prior.len(),
                self.transition.num_states()
            )));
        }
        if prior.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(Error::Model(
                "prior must contain finite non-negative values".to_string(),
            ));
        }
        let total: f64 = prior.iter().sum();
        if total <= 0.0 {
            return Err(Error::Model("prior must have positive mass".to_string()));
        }
        self.initial = prior
            .iter()
            .map(|&p| {
                if p > 0.0 {
                    (p / total).ln()
                } else {
                    f64::NEG_INFINITY
                }
            })
            .collect();
        Ok(self)
    }

    pub fn num_states(&self) -> usize {
        self.transition.num_states()
    }

    pub fn observation_model(&self) -> &ObservationModel {
        &self.observation
    }

    /// Decode the most probable state path for a (beat, downbeat)
    /// activation sequence; the second channel is ignored in the beat-only
    /// variant.
    ///
    /// Returns one state per frame plus the terminal log-probability. Ties
    /// are broken deterministically: the lowest state index wins, both in
    /// the per-state predecessor argmax and in the terminal argmax.
    pub fn viterbi(&self, observations: &[[f32; 2]]) -> (Vec<usize>, f64) {
        let n = self.transition.num_states();
        let num_frames = observations.len();
        if num_frames == 0 {
            return (Vec::new(), f64::NEG_INFINITY);
        }

        let logs = self
            .observation
            .frame_logs(observations[0][0], observations[0][1]);
        let mut previous: Vec<f64> = (0..n)
            .map(|state| self.initial[state] + self.observation.density(&logs, state))
            .collect();
        let mut current = vec![f64::NEG_INFINITY; n];
        let mut backptr = vec![0u32; n * (num_frames - 1)];

        for frame in 1..num_frames {
            let logs = self
                .observation
                .frame_logs(observations[frame][0], observations[frame][1]);
            let row = &mut backptr[(frame - 1) * n..frame * n];
            for state in 0..n {
                let mut best = f64::NEG_INFINITY;
                let mut best_prev = state as u32;
                for (prev, lp) in self.transition.predecessors(state) {
                    let score = previous[prev] + lp;
                    if score > best {
                        best = score;
                        best_prev = prev as u32;
                    }
                }
                current[state] = best + self.observation.density(&logs, state);
                row[state] = best_prev;
            }
            std::mem::swap(&mut previous, &mut current);
        }

        let mut best_state = 0usize;
        let mut best_log = f64::NEG_INFINITY;
        for (state, &score) in previous.iter().enumerate() {
            if score > best_log {
                best_log = score;
                best_state = state;
            }
        }

        let mut path = vec![0usize; num_frames];
        let mut state = best_state;
        for frame in (1..num_frames).rev() {
            path[frame] = state;
            state = backptr[(frame - 1) * n + state] as usize;
        }
        path[0] = state;

        tracing::debug!(
            "viterbi: {} frames over {} states, log prob {:.3}",
            num_frames,
            n,
            best_log
        );
        (path, best_log)
    }
}

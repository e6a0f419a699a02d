//! Observation model: per-frame activations to per-state log densities.
//!
//! Activation values are clamped away from 0 and 1 before taking
//! logarithms, so degenerate classifier output never produces `-inf`
//! everywhere. Each state carries a precomputed class (beat, downbeat, or
//! neither) and a log-denominator, so evaluating a frame costs a few `ln`
//! calls plus one subtraction per state.

use crate::state_space::BarStateSpace;
use crate::{Error, Result};

/// Clamp bound keeping activations strictly inside (0, 1).
const ACTIVATION_EPS: f64 = 1e-9;

/// How the non-beat probability mass is spread over phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ObservationNorm {
    /// Only phase 0 is a beat; the non-beat mass `(1 - a)` is spread
    /// uniformly over the remaining `interval - 1` phases of each tempo,
    /// keeping the model a proper distribution per tempo. The per-frame
    /// `ln(interval - 1)` penalty grows with the interval, so over long
    /// weak stretches this norm pulls the decoder toward the fastest
    /// admissible tempo.
    TempoSpread,
    /// The first `interval / lambda` phases count as the beat and the
    /// non-beat mass is spread over a fixed `lambda - 1` denominator,
    /// independent of tempo.
    Fixed(u32),
}

impl Default for ObservationNorm {
    /// `Fixed(16)`: the tempo-independent non-beat denominator keeps the
    /// per-frame penalty equal across tempi, so tempo choice is driven by
    /// beat alignment alone.
    fn default() -> Self {
        Self::Fixed(16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateClass {
    NoBeat,
    Beat,
    Downbeat,
}

/// Per-frame log values shared by every state.
#[derive(Debug, Clone, Copy)]
pub struct FrameLogs {
    beat: f64,
    downbeat: f64,
    none: f64,
}

/// Maps activations to `log P(activation | state)`.
#[derive(Debug, Clone)]
pub struct ObservationModel {
    class: Vec<StateClass>,
    spread: Vec<f64>,
    norm: ObservationNorm,
    downbeat: bool,
}

impl ObservationModel {
    /// Precompute the class and log-denominator of every lattice state.
    /// `downbeat` selects the two-channel variant where bar-position-1 beat
    /// states consume the downbeat channel.
    pub fn new(space: &BarStateSpace, norm: ObservationNorm, downbeat: bool) -> Result<Self> {
        if let ObservationNorm::Fixed(lambda) = norm {
            if lambda < 2 {
                return Err(Error::config("observation", "fixed lambda must be >= 2"));
            }
        }
        let n = space.num_states();
        let mut class = Vec::with_capacity(n);
        let mut spread = Vec::with_capacity(n);
        for index in 0..n {
            let state = space.state(index);
            let interval = space.beat().interval(state.tempo);
            let in_beat = match norm {
                ObservationNorm::TempoSpread => state.phase == 0,
                ObservationNorm::Fixed(lambda) => state.phase * (lambda as usize) < interval,
            };
            let state_class = if !in_beat {
                StateClass::NoBeat
            } else if downbeat && state.bar_position == 1 {
                StateClass::Downbeat
            } else {
                StateClass::Beat
            };
            let denom = match (state_class, norm) {
                (StateClass::NoBeat, ObservationNorm::TempoSpread) => ((interval - 1) as f64).ln(),
                (StateClass::NoBeat, ObservationNorm::Fixed(lambda)) => {
                    ((lambda - 1) as f64).ln()
                }
                (StateClass::Beat, ObservationNorm::TempoSpread) if downbeat => {
                    // Remaining beat mass is shared by the non-downbeat
                    // positions of this meter.
                    ((space.beats_per_bar(state.meter) - 1) as f64).ln()
                }
                _ => 0.0,
            };
            class.push(state_class);
            spread.push(denom);
        }
        Ok(Self {
            class,
            spread,
            norm,
            downbeat,
        })
    }

    /// Compute the shared log values for one frame. The second channel is
    /// ignored in the beat-only variant.
    pub fn frame_logs(&self, beat_act: f32, downbeat_act: f32) -> FrameLogs {
        let b = (beat_act as f64).clamp(ACTIVATION_EPS, 1.0 - ACTIVATION_EPS);
        if !self.downbeat {
            return FrameLogs {
                beat: b.ln(),
                downbeat: f64::NEG_INFINITY,
                none: (1.0 - b).ln(),
            };
        }
        let d = (downbeat_act as f64).clamp(ACTIVATION_EPS, 1.0 - ACTIVATION_EPS);
        let beat = match self.norm {
            // Downbeat boost relative to the beat channel: the beat factor
            // b times the non-downbeat share (1 - d/b) reduces to b - d.
            ObservationNorm::TempoSpread => (b - d).max(ACTIVATION_EPS).ln(),
            ObservationNorm::Fixed(_) => b.ln(),
        };
        FrameLogs {
            beat,
            downbeat: d.ln(),
            none: (1.0 - b - d).max(ACTIVATION_EPS).ln(),
        }
    }

    /// `log P(activation | state)` for one state of one frame.
    #[inline]
    pub fn density(&self, logs: &FrameLogs, state: usize) -> f64 {
        match self.class[state] {
            StateClass::NoBeat => logs.none - self.spread[state],
            StateClass::Beat => logs.beat - self.spread[state],
            StateClass::Downbeat => logs.downbeat,
        }
    }

    /// Whether a state lies in the beat range (used for beat correction).
    pub fn is_beat_state(&self, state: usize) -> bool {
        self.class[state] != StateClass::NoBeat
    }
}

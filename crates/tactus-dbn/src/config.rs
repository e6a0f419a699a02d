//! Decoder configuration.
//!
//! A [`DbnConfig`] fully determines the lattice (tempo grid, meter
//! hypotheses) and the transition/observation models. Validation happens up
//! front via [`DbnConfig::validate`]; errors name the offending field so an
//! invalid option is easy to locate. Config objects are cheap to clone and
//! reusable across any number of decode calls.

use crate::observation::ObservationNorm;
use crate::{Error, Result};

/// Configuration for [`BeatTracker`](crate::BeatTracker) and
/// [`DownbeatTracker`](crate::DownbeatTracker).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(deny_unknown_fields)
)]
pub struct DbnConfig {
    /// Activation frame rate in frames per second.
    pub fps: f32,
    /// Slowest tempo hypothesis in beats per minute.
    pub min_bpm: f32,
    /// Fastest tempo hypothesis in beats per minute.
    pub max_bpm: f32,
    /// Smoothness of tempo continuity: larger values penalize tempo change
    /// between consecutive beats more strongly.
    pub transition_lambda: f32,
    /// How the non-beat probability mass is spread over phases.
    pub observation: ObservationNorm,
    /// Beats-per-bar hypotheses (downbeat variant only).
    pub beats_per_bar: Vec<usize>,
    /// Probability of switching to another meter hypothesis at a bar
    /// boundary. 0.0 disables switching; the decoder still picks the best
    /// hypothesis via the terminal argmax.
    pub meter_change_prob: f32,
    /// Activations below this value are trimmed from both ends of the
    /// sequence before decoding. 0.0 keeps the full sequence.
    pub threshold: f32,
    /// Snap each reported beat to the activation maximum within its decoded
    /// beat-state run.
    pub correct: bool,
}

impl Default for DbnConfig {
    fn default() -> Self {
        Self {
            fps: 100.0,
            min_bpm: 55.0,
            max_bpm: 215.0,
            transition_lambda: 100.0,
            observation: ObservationNorm::Fixed(16),
            beats_per_bar: vec![3, 4],
            meter_change_prob: 0.0,
            threshold: 0.0,
            correct: false,
        }
    }
}

impl DbnConfig {
    /// Check every field, reporting the first offending one by name.
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(Error::config("fps", "must be > 0"));
        }
        if !self.min_bpm.is_finite() || self.min_bpm <= 0.0 {
            return Err(Error::config("min_bpm", "must be > 0"));
        }
        if !self.max_bpm.is_finite() || self.max_bpm <= self.min_bpm {
            return Err(Error::config("max_bpm", "must be > min_bpm"));
        }
        if !self.transition_lambda.is_finite() || self.transition_lambda <= 0.0 {
            return Err(Error::config("transition_lambda", "must be > 0"));
        }
        if let ObservationNorm::Fixed(lambda) = self.observation {
            if lambda < 2 {
                return Err(Error::config("observation", "fixed lambda must be >= 2"));
            }
        }
        if self.beats_per_bar.is_empty() {
            return Err(Error::config(
                "beats_per_bar",
                "must contain at least one meter",
            ));
        }
        if self.beats_per_bar.contains(&0) {
            return Err(Error::config("beats_per_bar", "all values must be > 0"));
        }
        if !self.meter_change_prob.is_finite() || !(0.0..1.0).contains(&self.meter_change_prob) {
            return Err(Error::config("meter_change_prob", "must be in [0, 1)"));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::config("threshold", "must be in [0, 1]"));
        }
        Ok(())
    }
}

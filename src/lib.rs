//! # Tactus
//!
//! Beat and downbeat tracking from classifier activations.
//!
//! An upstream classifier turns audio into a per-frame probability
//! sequence; this crate decodes that sequence into beat (and optionally
//! downbeat) timestamps with a dynamic-Bayesian-network lattice over
//! (tempo, phase within beat, position within bar), solved by Viterbi
//! decoding:
//! - **`tactus-dbn`**: state space, transition and observation models,
//!   Viterbi engine, beat/downbeat extraction
//! - **`tactus-dsp`**: the stateless transfer functions classifier
//!   front-ends apply to raw network output
//!
//! ## Example
//!
//! ```rust
//! use tactus::prelude::*;
//!
//! // Pulse every 25 frames at 100 fps = 240 bpm.
//! let mut activations = vec![0.02f32; 300];
//! for frame in (0..300).step_by(25) {
//!     activations[frame] = 0.9;
//! }
//!
//! let config = DbnConfig {
//!     min_bpm: 200.0,
//!     max_bpm: 300.0,
//!     ..DbnConfig::default()
//! };
//! let beats = track_beats(&activations, &config).unwrap();
//! assert!(!beats.is_empty());
//! ```

mod error;

pub use error::{Error, Result};

pub use tactus_dbn::{
    BarStateSpace, BeatStateSpace, BeatTracker, DbnConfig, DecodedBeat, DownbeatTracker, Hmm,
    ObservationModel, ObservationNorm, State,
};
pub use tactus_dsp as dsp;

/// Decode beat timestamps (seconds) from a single-channel activation
/// sequence. Builds a fresh [`BeatTracker`]; keep a tracker around when
/// decoding many sequences with the same configuration.
pub fn track_beats(activations: &[f32], config: &DbnConfig) -> Result<Vec<f32>> {
    Ok(BeatTracker::new(config.clone())?.track(activations)?)
}

/// Decode beats with bar positions from beat and downbeat activation
/// channels.
pub fn track_downbeats(
    beat: &[f32],
    downbeat: &[f32],
    config: &DbnConfig,
) -> Result<Vec<DecodedBeat>> {
    Ok(DownbeatTracker::new(config.clone())?.track(beat, downbeat)?)
}

/// Common imports for working with tactus.
pub mod prelude {
    pub use crate::{
        track_beats, track_downbeats, BeatTracker, DbnConfig, DecodedBeat, DownbeatTracker, Error,
        ObservationNorm, Result, State,
    };
}

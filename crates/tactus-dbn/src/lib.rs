//! # Tactus DBN
//!
//! Dynamic-Bayesian-network beat and downbeat tracking: converts a
//! per-frame activation sequence from an upstream classifier into beat
//! (and optionally downbeat) timestamps.
//!
//! The decoder searches a hidden-state lattice over (tempo, phase within
//! beat, position within bar):
//! - **State space**: one phase state per frame of every admissible
//!   inter-beat interval, replicated per meter hypothesis for downbeats
//! - **Transition model**: deterministic phase advance, tempo steps of at
//!   most one interval at beat boundaries, sparse predecessor enumeration
//! - **Observation model**: activation-derived log densities, clamped away
//!   from 0 and 1
//! - **Viterbi engine**: single forward pass with back-pointers, exact
//!   backtracking, deterministic tie-breaking
//! - **Extraction**: phase-wrap frames become beats, bar position 1 marks
//!   downbeats
//!
//! ## Example
//!
//! ```rust
//! use tactus_dbn::{BeatTracker, DbnConfig};
//!
//! // Pulse every 20 frames at 100 fps = 300 bpm.
//! let mut activations = vec![0.02f32; 200];
//! for frame in (0..200).step_by(20) {
//!     activations[frame] = 0.95;
//! }
//!
//! let config = DbnConfig {
//!     min_bpm: 250.0,
//!     max_bpm: 350.0,
//!     ..DbnConfig::default()
//! };
//! let tracker = BeatTracker::new(config).unwrap();
//! let beats = tracker.track(&activations).unwrap();
//! assert!(!beats.is_empty());
//! ```

pub mod config;
pub mod hmm;
pub mod observation;
pub mod state_space;
pub mod tracker;
pub mod transition;

mod error;

pub use config::DbnConfig;
pub use error::{Error, Result};
pub use hmm::Hmm;
pub use observation::{FrameLogs, ObservationModel, ObservationNorm};
pub use state_space::{BarStateSpace, BeatStateSpace, State};
pub use tracker::{BeatTracker, DecodedBeat, DownbeatTracker};
pub use transition::TransitionModel;

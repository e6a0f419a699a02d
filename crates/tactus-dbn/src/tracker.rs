//! Beat and downbeat trackers: build-once lattices plus path extraction.
//!
//! A tracker owns its state space, transition model and observation model
//! and can decode any number of activation sequences. Decode calls share no
//! mutable state, so independent calls may run on separate threads.

use crate::config::DbnConfig;
use crate::hmm::Hmm;
use crate::observation::ObservationModel;
use crate::state_space::{BarStateSpace, BeatStateSpace, State};
use crate::transition::TransitionModel;
use crate::{Error, Result};

/// One decoded beat of the downbeat variant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DecodedBeat {
    /// Beat instant in seconds.
    pub time_sec: f32,
    /// 1-based position within the decoded bar.
    pub beat_in_bar: u32,
    /// Whether this beat is a downbeat (`beat_in_bar == 1`).
    pub is_downbeat: bool,
}

/// Beat tracker over a tempo/phase lattice.
///
/// Internally a single-meter one-beat "bar" lattice, so the decoder itself
/// is shared with [`DownbeatTracker`].
#[derive(Debug, Clone)]
pub struct BeatTracker {
    config: DbnConfig,
    space: BarStateSpace,
    hmm: Hmm,
}

impl BeatTracker {
    pub fn new(config: DbnConfig) -> Result<Self> {
        config.validate()?;
        let (space, hmm) = build_lattice(&config, &[1], false)?;
        Ok(Self { config, space, hmm })
    }

    pub fn config(&self) -> &DbnConfig {
        &self.config
    }

    /// Number of states in the lattice; fixed once the configuration is
    /// fixed, independent of sequence length.
    pub fn lattice_size(&self) -> usize {
        self.space.num_states()
    }

    /// Decode the full state path for an activation sequence, one state per
    /// frame. Threshold trimming is not applied here.
    pub fn decode_path(&self, activations: &[f32]) -> Result<Vec<State>> {
        validate_channel(activations, "activations")?;
        let observations = beat_observations(activations);
        let (path, _) = self.hmm.viterbi(&observations);
        Ok(path.iter().map(|&s| self.space.state(s)).collect())
    }

    /// Convert a beat activation sequence into beat timestamps (seconds),
    /// strictly increasing.
    pub fn track(&self, activations: &[f32]) -> Result<Vec<f32>> {
        validate_channel(activations, "activations")?;
        let (range, offset) = match trim_range(activations, self.config.threshold) {
            Some(trimmed) => trimmed,
            None => return Ok(Vec::new()),
        };
        let trimmed = &activations[range];
        let observations = beat_observations(trimmed);
        let (path, _) = self.hmm.viterbi(&observations);

        let frames = if self.config.correct {
            corrected_beat_frames(&path, self.hmm.observation_model(), |frame| trimmed[frame])
        } else {
            beat_frames(&path, &self.space)
        };
        Ok(frames
            .iter()
            .map(|&frame| (frame + offset) as f32 / self.config.fps)
            .collect())
    }
}

/// Joint beat/downbeat tracker over a meter × bar-position × tempo × phase
/// lattice.
#[derive(Debug, Clone)]
pub struct DownbeatTracker {
    config: DbnConfig,
    space: BarStateSpace,
    hmm: Hmm,
}

impl DownbeatTracker {
    pub fn new(config: DbnConfig) -> Result<Self> {
        config.validate()?;
        let beats_per_bar = config.beats_per_bar.clone();
        let (space, hmm) = build_lattice(&config, &beats_per_bar, true)?;
        Ok(Self { config, space, hmm })
    }

    pub fn config(&self) -> &DbnConfig {
        &self.config
    }

    pub fn lattice_size(&self) -> usize {
        self.space.num_states()
    }

    /// Decode the full state path for a two-channel activation sequence.
    pub fn decode_path(&self, beat: &[f32], downbeat: &[f32]) -> Result<Vec<State>> {
        let observations = downbeat_observations(beat, downbeat)?;
        let (path, _) = self.hmm.viterbi(&observations);
        Ok(path.iter().map(|&s| self.space.state(s)).collect())
    }

    /// Convert beat and downbeat activation channels into decoded beats
    /// with bar positions; timestamps are strictly increasing.
    pub fn track(&self, beat: &[f32], downbeat: &[f32]) -> Result<Vec<DecodedBeat>> {
        let observations = downbeat_observations(beat, downbeat)?;
        // Trim on the stronger channel so a leading downbeat also counts.
        let strength: Vec<f32> = observations.iter().map(|o| o[0].max(o[1])).collect();
        let (range, offset) = match trim_range(&strength, self.config.threshold) {
            Some(trimmed) => trimmed,
            None => return Ok(Vec::new()),
        };
        let observations = &observations[range];
        let (path, _) = self.hmm.viterbi(observations);

        let frames = if self.config.correct {
            corrected_beat_frames(&path, self.hmm.observation_model(), |frame| {
                observations[frame][0].max(observations[frame][1])
            })
        } else {
            beat_frames(&path, &self.space)
        };
        Ok(frames
            .iter()
            .map(|&frame| {
                let bar = self.space.bar_of(path[frame]);
                DecodedBeat {
                    time_sec: (frame + offset) as f32 / self.config.fps,
                    beat_in_bar: bar as u32,
                    is_downbeat: bar == 1,
                }
            })
            .collect())
    }
}

fn build_lattice(
    config: &DbnConfig,
    beats_per_bar: &[usize],
    downbeat: bool,
) -> Result<(BarStateSpace, Hmm)> {
    let beat = BeatStateSpace::new(config.fps, config.min_bpm, config.max_bpm)?;
    let space = BarStateSpace::new(beat, beats_per_bar)?;
    let meter_change = if downbeat { config.meter_change_prob } else { 0.0 };
    let transition = TransitionModel::new(&space, config.transition_lambda, meter_change)?;
    let observation = ObservationModel::new(&space, config.observation, downbeat)?;
    tracing::debug!(
        "lattice: {} states, {} tempi (intervals {}..={} frames), {} meter hypotheses",
        space.num_states(),
        space.beat().num_tempi(),
        space.beat().interval(0),
        space.beat().interval(space.beat().num_tempi() - 1),
        space.num_meters()
    );
    Ok((space, Hmm::new(transition, observation)))
}

fn validate_channel(values: &[f32], name: &str) -> Result<()> {
    if values.is_empty() {
        return Err(Error::Input(format!("{name} must not be empty")));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::Input(format!("{name} contains non-finite values")));
    }
    Ok(())
}

fn beat_observations(activations: &[f32]) -> Vec<[f32; 2]> {
    activations.iter().map(|&a| [a, 0.0]).collect()
}

fn downbeat_observations(beat: &[f32], downbeat: &[f32]) -> Result<Vec<[f32; 2]>> {
    validate_channel(beat, "beat activations")?;
    validate_channel(downbeat, "downbeat activations")?;
    if beat.len() != downbeat.len() {
        return Err(Error::Input(format!(
            "beat and downbeat channels must have equal length ({} != {})",
            beat.len(),
            downbeat.len()
        )));
    }
    Ok(beat
        .iter()
        .zip(downbeat.iter())
        .map(|(&b, &d)| [b, d])
        .collect())
}

/// Frame range surviving the activation threshold, plus its start offset.
/// `None` when every frame falls below the threshold.
fn trim_range(strength: &[f32], threshold: f32) -> Option<(std::ops::Range<usize>, usize)> {
    if threshold <= 0.0 {
        return Some((0..strength.len(), 0));
    }
    let first = strength.iter().position(|&v| v >= threshold)?;
    let last = strength.iter().rposition(|&v| v >= threshold)?;
    Some((first..last + 1, first))
}

/// Frames of the decoded path where the phase wraps to 0.
fn beat_frames(path: &[usize], space: &BarStateSpace) -> Vec<usize> {
    path.iter()
        .enumerate()
        .filter(|(_, &state)| space.phase_of(state) == 0)
        .map(|(frame, _)| frame)
        .collect()
}

/// Snap each beat to the activation maximum within its run of beat-range
/// states.
fn corrected_beat_frames(
    path: &[usize],
    observation: &ObservationModel,
    strength: impl Fn(usize) -> f32,
) -> Vec<usize> {
    let mut frames = Vec::new();
    let mut run_start: Option<usize> = None;
    for frame in 0..=path.len() {
        let in_beat = frame < path.len() && observation.is_beat_state(path[frame]);
        match (run_start, in_beat) {
            (None, true) => run_start = Some(frame),
            (Some(start), false) => {
                let mut best_frame = start;
                let mut best = f32::MIN;
                for candidate in start..frame {
                    let value = strength(candidate);
                    if value > best {
                        best = value;
                        best_frame = candidate;
                    }
                }
                frames.push(best_frame);
                run_start = None;
            }
            _ => {}
        }
    }
    frames
}

//! Tempo/phase/bar state space enumeration.
//!
//! The lattice is the discrete hidden-state space the decoder searches: one
//! group of phase states per admissible inter-beat interval, optionally
//! replicated per (meter hypothesis, bar position) as tagged variants of a
//! single flat index space. The lattice depends only on configuration, never
//! on the activation sequence, so a state space is built once and reused
//! across decode calls.

use crate::{Error, Result};

/// One decoded lattice state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct State {
    /// Index into the interval grid (0 = shortest interval = fastest tempo).
    pub tempo: usize,
    /// Frames since the last beat; 0 means this frame is a beat.
    pub phase: usize,
    /// Index into the configured meter hypotheses.
    pub meter: usize,
    /// 1-based position within the bar; 1 is the downbeat.
    pub bar_position: usize,
}

/// Tempo × phase state space spanning one beat period per tempo.
///
/// Intervals are the integer frame counts between `round(fps * 60 /
/// max_bpm)` and `round(fps * 60 / min_bpm)`, each contributing `interval`
/// phase states.
#[derive(Debug, Clone)]
pub struct BeatStateSpace {
    intervals: Vec<usize>,
    first_states: Vec<usize>,
    last_states: Vec<usize>,
    num_states: usize,
}

impl BeatStateSpace {
    pub fn new(fps: f32, min_bpm: f32, max_bpm: f32) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::config("fps", "must be > 0"));
        }
        if !min_bpm.is_finite() || min_bpm <= 0.0 {
            return Err(Error::config("min_bpm", "must be > 0"));
        }
        if !max_bpm.is_finite() || max_bpm <= min_bpm {
            return Err(Error::config("max_bpm", "must be > min_bpm"));
        }
        let min_interval = ((fps as f64 * 60.0 / max_bpm as f64).round() as usize).max(1);
        let max_interval = ((fps as f64 * 60.0 / min_bpm as f64).round() as usize).max(min_interval);

        // A single-interval grid is degenerate but legal.
        let intervals: Vec<usize> = (min_interval..=max_interval).collect();
        let mut first_states = Vec::with_capacity(intervals.len());
        let mut last_states = Vec::with_capacity(intervals.len());
        let mut offset = 0usize;
        for &interval in &intervals {
            first_states.push(offset);
            last_states.push(offset + interval - 1);
            offset += interval;
        }
        Ok(Self {
            intervals,
            first_states,
            last_states,
            num_states: offset,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_tempi(&self) -> usize {
        self.intervals.len()
    }

    /// Inter-beat interval (in frames) of a tempo index.
    pub fn interval(&self, tempo: usize) -> usize {
        self.intervals[tempo]
    }

    pub fn intervals(&self) -> &[usize] {
        &self.intervals
    }

    /// Index of the phase-0 (beat) state of a tempo.
    pub fn first_state(&self, tempo: usize) -> usize {
        self.first_states[tempo]
    }

    /// Index of the last-phase state of a tempo.
    pub fn last_state(&self, tempo: usize) -> usize {
        self.last_states[tempo]
    }

    /// Tempo and phase of a flat beat-space index.
    pub fn tempo_phase(&self, state: usize) -> (usize, usize) {
        // Tempo grids are small (tens of entries); a scan is fine.
        let tempo = self
            .first_states
            .iter()
            .rposition(|&first| first <= state)
            .unwrap_or(0);
        (tempo, state - self.first_states[tempo])
    }
}

/// Flat meter × bar-position × tempo × phase lattice.
///
/// Each meter hypothesis contributes `beats_per_bar` copies of the beat
/// state space; total size is `beat.num_states() * sum(beats_per_bar)`.
/// The beat-only variant uses a single one-beat "bar" (`beats_per_bar =
/// [1]`), which keeps the decoder meter-agnostic.
#[derive(Debug, Clone)]
pub struct BarStateSpace {
    beat: BeatStateSpace,
    beats_per_bar: Vec<usize>,
    meter_offsets: Vec<usize>,
    num_states: usize,
}

impl BarStateSpace {
    pub fn new(beat: BeatStateSpace, beats_per_bar: &[usize]) -> Result<Self> {
        if beats_per_bar.is_empty() {
            return Err(Error::config(
                "beats_per_bar",
                "must contain at least one meter",
            ));
        }
        if beats_per_bar.contains(&0) {
            return Err(Error::config("beats_per_bar", "all values must be > 0"));
        }
        let mut meter_offsets = Vec::with_capacity(beats_per_bar.len());
        let mut offset = 0usize;
        for &beats in beats_per_bar {
            meter_offsets.push(offset);
            offset += beats * beat.num_states();
        }
        Ok(Self {
            beat,
            beats_per_bar: beats_per_bar.to_vec(),
            meter_offsets,
            num_states: offset,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_meters(&self) -> usize {
        self.beats_per_bar.len()
    }

    pub fn beats_per_bar(&self, meter: usize) -> usize {
        self.beats_per_bar[meter]
    }

    pub fn beat(&self) -> &BeatStateSpace {
        &self.beat
    }

    /// Flat index of the phase-0 state of `(meter, bar, tempo)`.
    /// `bar` is 1-based.
    pub fn first_state(&self, meter: usize, bar: usize, tempo: usize) -> usize {
        self.meter_offsets[meter]
            + (bar - 1) * self.beat.num_states()
            + self.beat.first_state(tempo)
    }

    /// Flat index of the last-phase state of `(meter, bar, tempo)`.
    pub fn last_state(&self, meter: usize, bar: usize, tempo: usize) -> usize {
        self.meter_offsets[meter] + (bar - 1) * self.beat.num_states() + self.beat.last_state(tempo)
    }

    /// Decompose a flat index into its tagged state tuple.
    pub fn state(&self, index: usize) -> State {
        let meter = self
            .meter_offsets
            .iter()
            .rposition(|&offset| offset <= index)
            .unwrap_or(0);
        let within = index - self.meter_offsets[meter];
        let bar_position = within / self.beat.num_states() + 1;
        let (tempo, phase) = self.beat.tempo_phase(within % self.beat.num_states());
        State {
            tempo,
            phase,
            meter,
            bar_position,
        }
    }

    pub fn interval_of(&self, index: usize) -> usize {
        self.beat.interval(self.state(index).tempo)
    }

    pub fn phase_of(&self, index: usize) -> usize {
        self.state(index).phase
    }

    pub fn bar_of(&self, index: usize) -> usize {
        self.state(index).bar_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_grid_spans_bpm_range() {
        let space = BeatStateSpace::new(100.0, 55.0, 215.0).unwrap();
        // round(6000/215) = 28, round(6000/55) = 109
        assert_eq!(space.interval(0), 28);
        assert_eq!(space.interval(space.num_tempi() - 1), 109);
        assert_eq!(space.num_tempi(), 109 - 28 + 1);
        let expected: usize = (28..=109).sum();
        assert_eq!(space.num_states(), expected);
    }

    #[test]
    fn lattice_size_is_deterministic() {
        let a = BeatStateSpace::new(100.0, 55.0, 215.0).unwrap();
        let b = BeatStateSpace::new(100.0, 55.0, 215.0).unwrap();
        assert_eq!(a.num_states(), b.num_states());
        assert_eq!(a.intervals(), b.intervals());
    }

    #[test]
    fn degenerate_single_interval_grid() {
        let space = BeatStateSpace::new(100.0, 55.0, 55.0001).unwrap();
        assert_eq!(space.num_tempi(), 1);
        assert_eq!(space.num_states(), space.interval(0));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(BeatStateSpace::new(100.0, 0.0, 215.0).is_err());
        assert!(BeatStateSpace::new(100.0, 215.0, 55.0).is_err());
        assert!(BeatStateSpace::new(0.0, 55.0, 215.0).is_err());
    }

    #[test]
    fn tempo_phase_round_trip() {
        let space = BeatStateSpace::new(100.0, 120.0, 240.0).unwrap();
        for tempo in 0..space.num_tempi() {
            for phase in 0..space.interval(tempo) {
                let index = space.first_state(tempo) + phase;
                assert_eq!(space.tempo_phase(index), (tempo, phase));
            }
        }
    }

    #[test]
    fn bar_lattice_size_and_decomposition() {
        let beat = BeatStateSpace::new(100.0, 120.0, 240.0).unwrap();
        let per_meter = beat.num_states();
        let space = BarStateSpace::new(beat, &[3, 4]).unwrap();
        assert_eq!(space.num_states(), per_meter * 7);

        for index in 0..space.num_states() {
            let state = space.state(index);
            assert!(state.bar_position >= 1);
            assert!(state.bar_position <= space.beats_per_bar(state.meter));
            assert!(state.phase < space.beat().interval(state.tempo));
            let reconstructed =
                space.first_state(state.meter, state.bar_position, state.tempo) + state.phase;
            assert_eq!(reconstructed, index);
        }
    }

    #[test]
    fn empty_meter_set_is_rejected() {
        let beat = BeatStateSpace::new(100.0, 120.0, 240.0).unwrap();
        assert!(BarStateSpace::new(beat.clone(), &[]).is_err());
        assert!(BarStateSpace::new(beat, &[4, 0]).is_err());
    }
}

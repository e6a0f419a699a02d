//! End-to-end tracker tests over synthetic activation sequences.

use approx::assert_relative_eq;
use tactus::prelude::*;

/// Impulse train: `high` every `period` frames, `low` elsewhere.
fn pulse_train(len: usize, period: usize, high: f32, low: f32) -> Vec<f32> {
    (0..len)
        .map(|i| if i % period == 0 { high } else { low })
        .collect()
}

fn narrow_config(min_bpm: f32, max_bpm: f32) -> DbnConfig {
    DbnConfig {
        min_bpm,
        max_bpm,
        ..DbnConfig::default()
    }
}

/// Pulse every 20 frames at 100 fps: beats at ~0.2 s spacing.
#[test]
fn impulse_train_yields_evenly_spaced_beats() {
    let activations = pulse_train(200, 20, 1.0, 0.0);
    let beats = track_beats(&activations, &narrow_config(250.0, 350.0)).unwrap();

    assert!(
        (9..=11).contains(&beats.len()),
        "expected ~10 beats, got {}",
        beats.len()
    );
    for pair in beats.windows(2) {
        assert_relative_eq!(pair[1] - pair[0], 0.2, epsilon = 0.03);
    }
}

/// Gaps between emitted beats always correspond to admissible intervals.
#[test]
fn beat_gaps_stay_within_the_tempo_range() {
    let config = DbnConfig::default(); // 55-215 bpm, intervals 28..=109
    let activations = pulse_train(600, 50, 0.9, 0.02);
    let beats = track_beats(&activations, &config).unwrap();

    assert!(beats.len() >= 2);
    let mut previous = f32::NEG_INFINITY;
    for &time in &beats {
        assert!(time > previous, "timestamps must be strictly increasing");
        previous = time;
    }
    for pair in beats.windows(2) {
        let frames = (config.fps * (pair[1] - pair[0])).round() as usize;
        assert!(
            (28..=109).contains(&frames),
            "gap of {frames} frames outside the admissible interval range"
        );
    }
}

/// Strong downbeat pulse every 4th beat with a {4} meter hypothesis.
#[test]
fn every_fourth_beat_is_a_downbeat() {
    let config = DbnConfig {
        beats_per_bar: vec![4],
        ..narrow_config(200.0, 300.0)
    };
    let beat = pulse_train(1000, 25, 0.9, 0.02);
    let downbeat: Vec<f32> = (0..1000)
        .map(|i| if i % 100 == 0 { 0.8 } else { 0.01 })
        .collect();

    let beats = track_downbeats(&beat, &downbeat, &config).unwrap();
    assert!(beats.len() >= 35);

    let flagged: Vec<usize> = beats
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_downbeat)
        .map(|(i, _)| i)
        .collect();
    assert!(flagged.len() >= 8);
    for pair in flagged.windows(2) {
        assert_eq!(pair[1] - pair[0], 4, "downbeats must be 4 beats apart");
    }
    for b in &beats {
        assert_eq!(b.is_downbeat, b.beat_in_bar == 1);
    }
}

/// A meter hypothesis set {3, 4} picks the hypothesis fitting the input.
#[test]
fn meter_hypotheses_resolve_to_the_best_fit() {
    let config = DbnConfig {
        beats_per_bar: vec![3, 4],
        ..narrow_config(200.0, 300.0)
    };
    let tracker = DownbeatTracker::new(config).unwrap();

    // Downbeat every 3rd beat.
    let beat = pulse_train(900, 25, 0.9, 0.02);
    let downbeat: Vec<f32> = (0..900)
        .map(|i| if i % 75 == 0 { 0.8 } else { 0.01 })
        .collect();
    let beats = tracker.track(&beat, &downbeat).unwrap();
    let flagged: Vec<usize> = beats
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_downbeat)
        .map(|(i, _)| i)
        .collect();
    assert!(flagged.len() >= 8);
    for pair in flagged.windows(2) {
        assert_eq!(pair[1] - pair[0], 3, "downbeats must be 3 beats apart");
    }
}

/// A degenerate single-tempo lattice decodes without error.
#[test]
fn degenerate_tempo_range_still_decodes() {
    let config = narrow_config(55.0, 55.0001);
    let tracker = BeatTracker::new(config).unwrap();
    assert_eq!(tracker.lattice_size(), 109); // round(6000 / 55) = 109

    let activations = pulse_train(300, 109, 0.9, 0.02);
    let path = tracker.decode_path(&activations).unwrap();
    assert_eq!(path.len(), 300);
    let beats = tracker.track(&activations).unwrap();
    assert!(!beats.is_empty());
}

/// All-zero activations still produce a full-length path and a
/// non-crashing beat list.
#[test]
fn all_zero_activations_decode_cleanly() {
    let tracker = BeatTracker::new(narrow_config(200.0, 300.0)).unwrap();
    let activations = vec![0.0f32; 250];

    let path = tracker.decode_path(&activations).unwrap();
    assert_eq!(path.len(), 250);

    let beats = tracker.track(&activations).unwrap();
    let mut previous = f32::NEG_INFINITY;
    for &time in &beats {
        assert!(time > previous);
        previous = time;
    }
}

/// Identical input and configuration produce identical output.
#[test]
fn decoding_is_idempotent() {
    let config = narrow_config(200.0, 300.0);
    let activations = pulse_train(500, 25, 0.9, 0.02);

    let first = track_beats(&activations, &config).unwrap();
    let second = track_beats(&activations, &config).unwrap();
    assert_eq!(first, second);

    // Also across distinct tracker instances.
    let tracker = BeatTracker::new(config).unwrap();
    let third = tracker.track(&activations).unwrap();
    assert_eq!(first, third);
}

/// Lattice size depends only on the configuration.
#[test]
fn lattice_size_is_config_deterministic() {
    let config = DbnConfig::default();
    let a = BeatTracker::new(config.clone()).unwrap();
    let b = BeatTracker::new(config.clone()).unwrap();
    assert_eq!(a.lattice_size(), b.lattice_size());

    let da = DownbeatTracker::new(config.clone()).unwrap();
    let db = DownbeatTracker::new(config).unwrap();
    assert_eq!(da.lattice_size(), db.lattice_size());
    // Downbeat lattice: beat lattice x sum of beats_per_bar {3, 4}.
    assert_eq!(da.lattice_size(), a.lattice_size() * 7);
}

/// Mid-sequence tempo change: a stiff transition model holds one tempo,
/// a loose one follows the change.
#[test]
fn transition_lambda_trades_smoothness_for_fit() {
    // Intervals 18..=32 frames; 1500 frames at period 30, then 1500 at
    // period 20.
    let mut activations = Vec::with_capacity(3000);
    for i in 0..1500usize {
        activations.push(if i % 30 == 0 { 0.9 } else { 0.02 });
    }
    for i in 0..1500usize {
        activations.push(if i % 20 == 0 { 0.9 } else { 0.02 });
    }

    let gaps = |beats: &[f32]| -> Vec<usize> {
        beats
            .windows(2)
            .map(|pair| (100.0 * (pair[1] - pair[0])).round() as usize)
            .collect()
    };

    let stiff = narrow_config(187.0, 333.0);
    let stiff = DbnConfig {
        transition_lambda: 5000.0,
        ..stiff
    };
    let stiff_gaps = gaps(&track_beats(&activations, &stiff).unwrap());
    let min = stiff_gaps.iter().min().unwrap();
    let max = stiff_gaps.iter().max().unwrap();
    assert!(
        max - min <= 2,
        "stiff decoder should hold one tempo, gaps ranged {min}..{max}"
    );

    let loose = DbnConfig {
        transition_lambda: 1.0,
        ..narrow_config(187.0, 333.0)
    };
    let loose_gaps = gaps(&track_beats(&activations, &loose).unwrap());
    assert!(
        loose_gaps.iter().take(3).all(|&g| g >= 28),
        "loose decoder should start near the 30-frame period: {loose_gaps:?}"
    );
    let tail: Vec<usize> = loose_gaps.iter().rev().take(3).copied().collect();
    assert!(
        tail.iter().all(|&g| g <= 22),
        "loose decoder should end near the 20-frame period: {tail:?}"
    );
}

/// Downbeat tracking requires matching channel shapes.
#[test]
fn channel_shape_errors_are_surfaced() {
    let tracker = DownbeatTracker::new(narrow_config(200.0, 300.0)).unwrap();
    assert!(tracker.track(&[], &[]).is_err());
    assert!(tracker.track(&[0.5, 0.5, 0.5], &[0.5, 0.5]).is_err());

    let beats = BeatTracker::new(narrow_config(200.0, 300.0)).unwrap();
    assert!(beats.track(&[]).is_err());
}

/// Invalid configurations are rejected before any decoding work and do not
/// poison previously built trackers.
#[test]
fn invalid_configuration_is_rejected_up_front() {
    assert!(BeatTracker::new(DbnConfig {
        min_bpm: 300.0,
        max_bpm: 200.0,
        ..DbnConfig::default()
    })
    .is_err());
    assert!(DownbeatTracker::new(DbnConfig {
        beats_per_bar: vec![],
        ..DbnConfig::default()
    })
    .is_err());

    let good = BeatTracker::new(narrow_config(200.0, 300.0)).unwrap();
    assert!(good.track(&pulse_train(100, 25, 0.9, 0.02)).is_ok());
}

//! Decode beats and downbeats from two-channel activations.
//!
//! Run with:
//! ```bash
//! cargo run --example track_downbeats
//! ```

use tactus::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    // A 4/4 pattern: beat pulse every 25 frames, downbeat pulse on every
    // 4th beat.
    let num_frames = 1200;
    let beat: Vec<f32> = (0..num_frames)
        .map(|i| if i % 25 == 0 { 0.9 } else { 0.02 })
        .collect();
    let downbeat: Vec<f32> = (0..num_frames)
        .map(|i| if i % 100 == 0 { 0.8 } else { 0.01 })
        .collect();

    let config = DbnConfig {
        min_bpm: 180.0,
        max_bpm: 320.0,
        beats_per_bar: vec![3, 4],
        ..DbnConfig::default()
    };
    let tracker = DownbeatTracker::new(config)?;
    let beats = tracker.track(&beat, &downbeat)?;

    println!("decoded {} beats:", beats.len());
    for b in &beats {
        let marker = if b.is_downbeat { " <- downbeat" } else { "" };
        println!("  {:.2} s (beat {} of bar){}", b.time_sec, b.beat_in_bar, marker);
    }
    Ok(())
}

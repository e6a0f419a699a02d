//! Decode beat timestamps from a synthetic activation sequence.
//!
//! Run with:
//! ```bash
//! cargo run --example track_beats
//! ```

use tactus::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    // Simulate classifier output: a sharp activation peak every 25 frames
    // (240 bpm at 100 fps) over a noisy floor.
    let num_frames = 1000;
    let activations: Vec<f32> = (0..num_frames)
        .map(|i| if i % 25 == 0 { 0.92 } else { 0.03 })
        .collect();

    let config = DbnConfig {
        min_bpm: 180.0,
        max_bpm: 320.0,
        ..DbnConfig::default()
    };
    let tracker = BeatTracker::new(config)?;
    let beats = tracker.track(&activations)?;

    println!("decoded {} beats from {} frames:", beats.len(), num_frames);
    for time in &beats {
        println!("  {time:.2} s");
    }
    Ok(())
}

// Stateless Decode Harness - Library Root
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Test harness for stateless request-based video decoders: frames are
// decoded in bitstream order and shown in presentation order.

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod preset;
pub mod schedule;

use anyhow::{Context, Result};
use tracing::info;

use config::HarnessConfig;
use engine::{SliceDirectory, SoftwareDecoder, TraceDisplay};
use pipeline::{FramePacer, PipelineDriver, PlaybackReport, PlaybackStats};
use schedule::{validate_capacity, DISPLAY_QUEUE_CAPACITY};

/// Load and validate the configured preset, then play it through the
/// software engines.
pub async fn run_harness(config: &HarnessConfig) -> Result<PlaybackStats> {
    let preset = config.load_preset().context("Unable to load preset")?;
    let gops = validate_capacity(&preset, DISPLAY_QUEUE_CAPACITY)
        .context("Preset does not fit the display queue")?;

    info!("[PRESET] {}", preset.summary());
    info!("[PRESET] {} GOPs, display queue capacity {}", gops.len(), DISPLAY_QUEUE_CAPACITY);
    info!("[CONFIG] {}", config.summary(&preset));

    let slices = SliceDirectory::new(config.slices_dir(&preset), &config.slices_format)?;
    let decoder = SoftwareDecoder::new(preset.codec, preset.buffers_count)
        .with_latency(config.decode_latency);
    let pacer = FramePacer::new(config.pacing_mode());

    let mut driver = PipelineDriver::new(
        preset,
        slices,
        decoder,
        TraceDisplay::new(),
        pacer,
        config.pipeline_options(),
    );
    let stats = driver.run().await.context("Playback failed")?.clone();

    if let Some(path) = &config.report {
        PlaybackReport::new(driver.preset(), &stats).save(path)?;
    }

    Ok(stats)
}

// Stateless Decode Harness - Playback Statistics
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Counters collected by the pipeline driver, and the JSON report written
// with `--report` once playback ends.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::preset::Preset;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackStats {
    /// Presentation sequence of the first pass.
    pub display_order: Vec<usize>,
    /// Decode sequence of the first pass.
    pub decode_order: Vec<usize>,
    pub frames_decoded: usize,
    pub frames_displayed: usize,
    /// Decoded but never presented (no POC successor).
    pub frames_skipped: usize,
    /// Display queue entries lost to a full queue.
    pub frames_dropped: usize,
    pub pacing_misses: usize,
    pub passes: usize,
    pub decode_time: Duration,
    pub display_time: Duration,
}

fn average_us(total: Duration, count: usize) -> u64 {
    if count == 0 {
        0
    } else {
        (total.as_micros() / count as u128) as u64
    }
}

impl PlaybackStats {
    pub fn record_decode(&mut self, index: usize, elapsed: Duration) {
        if self.passes == 0 {
            self.decode_order.push(index);
        }
        self.frames_decoded += 1;
        self.decode_time += elapsed;
    }

    pub fn record_display(&mut self, index: usize, elapsed: Duration) {
        if self.passes == 0 {
            self.display_order.push(index);
        }
        self.frames_displayed += 1;
        self.display_time += elapsed;
    }

    pub fn average_decode_us(&self) -> u64 {
        average_us(self.decode_time, self.frames_decoded)
    }

    pub fn average_display_us(&self) -> u64 {
        average_us(self.display_time, self.frames_displayed)
    }

    pub fn status_report(&self) -> String {
        format!(
            "Playback Report:\n  Passes: {}\n  Decoded: {} (avg {} us)\n  Displayed: {} (avg {} us)\n  Skipped: {}\n  Dropped: {}\n  Pacing misses: {}",
            self.passes,
            self.frames_decoded,
            self.average_decode_us(),
            self.frames_displayed,
            self.average_display_us(),
            self.frames_skipped,
            self.frames_dropped,
            self.pacing_misses,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackReport {
    pub preset: String,
    pub codec: String,
    pub frames_count: usize,
    pub display_order: Vec<usize>,
    pub decode_order: Vec<usize>,
    pub frames_decoded: usize,
    pub frames_displayed: usize,
    pub frames_skipped: usize,
    pub frames_dropped: usize,
    pub pacing_misses: usize,
    pub passes: usize,
    pub average_decode_us: u64,
    pub average_display_us: u64,
}

impl PlaybackReport {
    pub fn new(preset: &Preset, stats: &PlaybackStats) -> Self {
        Self {
            preset: preset.name.clone(),
            codec: preset.codec.to_string(),
            frames_count: preset.frames_count(),
            display_order: stats.display_order.clone(),
            decode_order: stats.decode_order.clone(),
            frames_decoded: stats.frames_decoded,
            frames_displayed: stats.frames_displayed,
            frames_skipped: stats.frames_skipped,
            frames_dropped: stats.frames_dropped,
            pacing_misses: stats.pacing_misses,
            passes: stats.passes,
            average_decode_us: stats.average_decode_us(),
            average_display_us: stats.average_display_us(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create report dir {:?}", dir))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("Failed to write report {:?}", path))?;
        info!("[REPORT] Playback report saved: {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("Failed to read report {:?}", path))?;
        serde_json::from_str(&data).with_context(|| format!("Failed to parse report {:?}", path))
    }
}

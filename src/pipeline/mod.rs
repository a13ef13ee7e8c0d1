// Stateless Decode Harness - Pipeline Driver
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Single-threaded control loop interleaving decode and display work.
// Frames are decoded in bitstream order and shown in the order the GOP
// scheduler put into the display queue. When the queue head lies ahead of
// the decode cursor the driver decodes ahead; when it lies behind, the
// frame is already decoded and is displayed straight away (catch-up).

pub mod pacing;
pub mod stats;

use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::engine::{DisplayEngine, SliceDirectory, VideoEngine, DECODE_TIMEOUT};
use crate::error::{DecodeError, DisplayError, PipelineError};
use crate::preset::classify::frame_controls;
use crate::preset::Preset;
use crate::schedule::SchedulerState;

pub use pacing::{FramePacer, PacingMode, PacingOutcome};
pub use stats::{PlaybackReport, PlaybackStats};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Suppress per-frame logging.
    pub quiet: bool,
    /// Restart from frame 0 once every expected frame was shown.
    pub loop_playback: bool,
    /// Stop looping after this many passes. `None` loops forever.
    pub passes: Option<usize>,
}

/// Decode and display positions, both in bitstream order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursors {
    pub decode: usize,
    pub display: usize,
}

pub struct PipelineDriver<V, D> {
    preset: Preset,
    slices: SliceDirectory,
    video: V,
    display: D,
    pacer: FramePacer,
    scheduler: SchedulerState,
    options: PipelineOptions,
    cursors: Cursors,
    stats: PlaybackStats,
}

impl<V: VideoEngine, D: DisplayEngine> PipelineDriver<V, D> {
    pub fn new(
        preset: Preset,
        slices: SliceDirectory,
        video: V,
        display: D,
        pacer: FramePacer,
        options: PipelineOptions,
    ) -> Self {
        Self {
            preset,
            slices,
            video,
            display,
            pacer,
            scheduler: SchedulerState::default(),
            options,
            cursors: Cursors::default(),
            stats: PlaybackStats::default(),
        }
    }

    /// Replace the scheduler, e.g. to run with a different queue capacity.
    pub fn with_scheduler(mut self, scheduler: SchedulerState) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    /// Play the preset to completion. Engines are released whatever the
    /// outcome.
    pub async fn run(&mut self) -> Result<&PlaybackStats, PipelineError> {
        let result = self.run_loop().await;

        self.video.release();
        self.display.release();

        match result {
            Ok(()) => {
                info!("[PIPELINE] {}", self.stats.status_report());
                Ok(&self.stats)
            }
            Err(e) => Err(e),
        }
    }

    async fn run_loop(&mut self) -> Result<(), PipelineError> {
        let frames_count = self.preset.frames_count();

        // Lowered at scheduling time when a GOP presents fewer frames than
        // it codes.
        let mut expected = frames_count as isize;
        let mut display_count: usize = 0;
        let mut frame_start: Option<Instant> = None;

        self.cursors = Cursors::default();
        self.scheduler.reset();

        while (display_count as isize) < expected {
            let decode_index = self.cursors.decode;

            if !self.options.quiet {
                info!(
                    "[PIPELINE] Processing frame {}/{}",
                    decode_index + 1,
                    frames_count
                );
            }

            if decode_index < frames_count {
                if let Some(outcome) = self.scheduler.schedule(&self.preset, decode_index)? {
                    expected += outcome.display_delta();
                    self.stats.frames_dropped += outcome.dropped;
                }
            }

            let head = match self.scheduler.next() {
                Ok(head) => head,
                Err(_) if decode_index < self.scheduler.scheduled_until() => {
                    // Trailing frame of a GOP with no presentation slot. It
                    // may still serve as a reference.
                    warn!("[GOP] Frame {} is never displayed, decoding only", decode_index);
                    self.decode_frame(decode_index).await?;
                    self.stats.frames_skipped += 1;
                    self.cursors.decode += 1;
                    continue;
                }
                Err(_) => return Err(PipelineError::EmptySchedule { decode_index }),
            };
            self.cursors.display = head;

            // Decode-ahead keeps the start of the frame being waited on.
            let started = frame_start.take().unwrap_or_else(Instant::now);

            if self.cursors.display >= self.cursors.decode {
                self.decode_frame(decode_index).await?;

                if self.cursors.display > self.cursors.decode {
                    frame_start = Some(started);
                    self.cursors.decode += 1;
                    continue;
                }
            }

            self.scheduler.dequeue()?;
            self.display_frame(self.cursors.display)?;
            display_count += 1;

            if let PacingOutcome::Late(_) = self.pacer.pace(started).await? {
                self.stats.pacing_misses += 1;
            }

            if self.cursors.display >= self.cursors.decode {
                self.cursors.decode += 1;
            }

            if self.options.loop_playback && display_count as isize >= expected {
                self.stats.passes += 1;
                if self
                    .options
                    .passes
                    .is_some_and(|limit| self.stats.passes >= limit)
                {
                    break;
                }

                debug!("[PIPELINE] Looping back to frame 0");
                self.cursors = Cursors::default();
                self.scheduler.reset();
                display_count = 0;
                expected = frames_count as isize;
                frame_start = None;
            }
        }

        if !self.options.loop_playback {
            self.stats.passes += 1;
        }
        Ok(())
    }

    async fn decode_frame(&mut self, index: usize) -> Result<(), PipelineError> {
        let payload = self.slices.load(index).await?;
        if !self.options.quiet {
            info!("[DECODE] Loaded {} bytes of video slice data", payload.len());
        }

        let controls = frame_controls(&self.preset, self.preset.buffers_count, index, payload.len())?;
        let slot = controls.slot;

        let before = Instant::now();
        match timeout(DECODE_TIMEOUT, self.video.decode(&controls, &payload)).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => return Err(PipelineError::Decode { index, source }),
            Err(_) => {
                return Err(PipelineError::Decode {
                    index,
                    source: DecodeError::Timeout { slot },
                })
            }
        }
        let elapsed = before.elapsed();

        if !self.options.quiet {
            info!(
                "[DECODE] Decoded frame {} into slot {} in {} us",
                index,
                slot,
                elapsed.as_micros()
            );
        }
        self.stats.record_decode(index, elapsed);
        Ok(())
    }

    fn display_frame(&mut self, index: usize) -> Result<(), PipelineError> {
        let slot = index % self.preset.buffers_count.max(1);

        let before = Instant::now();
        let surface = self
            .video
            .surface(slot)
            .ok_or_else(|| PipelineError::Display {
                index,
                source: DisplayError::EmptySlot { slot },
            })?;
        self.display
            .show(slot, surface)
            .map_err(|source| PipelineError::Display { index, source })?;
        let elapsed = before.elapsed();

        if !self.options.quiet {
            info!(
                "[DISPLAY] Displayed frame {} from slot {} in {} us",
                index,
                slot,
                elapsed.as_micros()
            );
        }
        self.stats.record_display(index, elapsed);
        Ok(())
    }
}

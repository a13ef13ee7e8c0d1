// Stateless Decode Harness - Frame Pacing
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingMode {
    /// Wait for a line on the input after every displayed frame.
    Interactive,
    /// Hold each frame for `1/fps` seconds, measured from the frame start.
    Fps(u32),
    Unthrottled,
}

impl PacingMode {
    pub fn from_options(interactive: bool, fps: u32) -> Self {
        if interactive {
            PacingMode::Interactive
        } else if fps > 0 {
            PacingMode::Fps(fps)
        } else {
            PacingMode::Unthrottled
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingOutcome {
    OnTime,
    /// Frame overran its period by this much.
    Late(Duration),
    Stepped,
}

pub struct FramePacer {
    mode: PacingMode,
    input: Option<Box<dyn AsyncBufRead + Unpin>>,
}

impl FramePacer {
    /// Pacer reading interactive steps from stdin.
    pub fn new(mode: PacingMode) -> Self {
        let input: Option<Box<dyn AsyncBufRead + Unpin>> = match mode {
            PacingMode::Interactive => Some(Box::new(BufReader::new(tokio::io::stdin()))),
            _ => None,
        };
        Self { mode, input }
    }

    pub fn with_input(mode: PacingMode, input: impl AsyncBufRead + Unpin + 'static) -> Self {
        Self {
            mode,
            input: Some(Box::new(input)),
        }
    }

    pub fn mode(&self) -> PacingMode {
        self.mode
    }

    pub fn period(&self) -> Option<Duration> {
        match self.mode {
            PacingMode::Fps(fps) if fps > 0 => Some(Duration::from_micros(1_000_000 / fps as u64)),
            _ => None,
        }
    }

    /// Hold the frame that started at `frame_start`. Overruns are logged and
    /// returned, never raised.
    pub async fn pace(&mut self, frame_start: Instant) -> Result<PacingOutcome, PipelineError> {
        match self.mode {
            PacingMode::Interactive => {
                if let Some(input) = self.input.as_mut() {
                    let mut line = String::new();
                    // EOF just stops blocking.
                    input.read_line(&mut line).await.map_err(PipelineError::Input)?;
                }
                Ok(PacingOutcome::Stepped)
            }
            PacingMode::Fps(fps) => {
                let Some(period) = self.period() else {
                    return Ok(PacingOutcome::OnTime);
                };
                let elapsed = frame_start.elapsed();
                if elapsed > period {
                    let late = elapsed - period;
                    warn!(
                        "[PACING] Unable to meet {} fps target: {} us late!",
                        fps,
                        late.as_micros()
                    );
                    Ok(PacingOutcome::Late(late))
                } else {
                    tokio::time::sleep(period - elapsed).await;
                    Ok(PacingOutcome::OnTime)
                }
            }
            PacingMode::Unthrottled => Ok(PacingOutcome::OnTime),
        }
    }
}

// Stateless Decode Harness - Error Types
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors raised while resolving and loading a preset.
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("Unable to find preset for name: {name}")]
    UnknownPreset { name: String },

    #[error("Unable to read frame table {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse frame table {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed frame table for preset '{preset}': {reason}")]
    Malformed { preset: String, reason: String },

    #[error("GOP occupancy {occupancy} at frame {start} exceeds display queue capacity {capacity}")]
    GopTooLarge {
        start: usize,
        occupancy: usize,
        capacity: usize,
    },
}

/// Display queue failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("display queue is full")]
    QueueFull,

    #[error("display queue is empty")]
    QueueEmpty,
}

/// Scheduler invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Frame index {index} is too big for frames count: {frames_count}")]
    IndexOutOfRange { index: usize, frames_count: usize },
}

/// Failures reported by a video engine.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Timeout when waiting for decode request on slot {slot}")]
    Timeout { slot: usize },

    #[error("Buffer slot {slot} out of range for {count} buffers")]
    InvalidSlot { slot: usize, count: usize },

    #[error("Empty slice payload for frame {index}")]
    EmptyPayload { index: usize },

    #[error("Frame {index} references slot {slot} which holds no decoded surface")]
    MissingReference { index: usize, slot: usize },

    #[error("Frame {index} references timestamp {timestamp} (frame {frame:?}) which no decoded surface carries")]
    MissingTimestamp {
        index: usize,
        timestamp: u64,
        frame: Option<usize>,
    },

    #[error("Controls for {got} submitted to a {expected} decoder")]
    CodecMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("Decode engine failure: {0}")]
    Engine(String),
}

/// Failures reported by a display engine.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Buffer slot {slot} holds no decoded surface")]
    EmptySlot { slot: usize },

    #[error("Display engine failure: {0}")]
    Engine(String),
}

/// Fatal errors that terminate the pipeline driver.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Unable to get next GOP frame index for display at decode index {decode_index}")]
    EmptySchedule { decode_index: usize },

    #[error("Unable to dequeue next GOP frame index for display: {0}")]
    Queue(#[from] QueueError),

    #[error("Unable to load slice data from {path:?}: {source}")]
    Slice {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid slices filename format '{format}': expected a single %d placeholder")]
    SliceFormat { format: String },

    #[error("Unable to decode video frame {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("Unable to display video frame {index}: {source}")]
    Display {
        index: usize,
        #[source]
        source: DisplayError,
    },

    #[error("Unable to read interactive input: {0}")]
    Input(#[source] std::io::Error),
}

// Stateless Decode Harness - Engine Module
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Seams to the decode device and the display compositor. The pipeline
// driver only talks to these traits; the software engines below stand in
// for the V4L2 request and DRM back ends.

pub mod slices;
pub mod software;

use crate::error::{DecodeError, DisplayError};
use crate::preset::classify::FrameControls;

pub use slices::SliceDirectory;
pub use software::{SoftwareDecoder, TraceDisplay};

/// Upper bound on a single decode request.
pub const DECODE_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(300);

/// A decoded picture sitting in one buffer slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSurface {
    /// Bitstream position of the frame that produced this surface.
    pub decode_index: usize,
    /// Request timestamp, see [`crate::preset::classify::ts_ref_index`].
    pub timestamp: u64,
    /// SHA-256 of the slice payload, hex encoded.
    pub checksum: String,
    pub size: usize,
}

/// Stateless request decoder. One request in flight at a time.
#[allow(async_fn_in_trait)]
pub trait VideoEngine {
    fn buffers_count(&self) -> usize;

    /// Submit one slice and wait for its completion. The caller bounds the
    /// wait with [`DECODE_TIMEOUT`].
    async fn decode(&mut self, controls: &FrameControls, payload: &[u8]) -> Result<(), DecodeError>;

    fn surface(&self, slot: usize) -> Option<&DecodedSurface>;

    /// Best-effort teardown. Called once, on success or failure.
    fn release(&mut self) {}
}

pub trait DisplayEngine {
    /// Hand the surface in `slot` to the compositor.
    fn show(&mut self, slot: usize, surface: &DecodedSurface) -> Result<(), DisplayError>;

    fn release(&mut self) {}
}

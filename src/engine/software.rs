// Stateless Decode Harness - Software Engines
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// In-process models of the decode device and the compositor. The decoder
// does not reconstruct pixels; it fingerprints each slice and checks that
// every reference a request names is present in the slot ring.

use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;

use super::{DecodedSurface, DisplayEngine, VideoEngine};
use crate::error::{DecodeError, DisplayError};
use crate::preset::classify::{index_ref_ts, CodecControls, FrameControls};
use crate::preset::{CodecType, CodingType};

pub struct SoftwareDecoder {
    codec: CodecType,
    surfaces: Vec<Option<DecodedSurface>>,
    /// Simulated time from request queue to completion.
    latency: Duration,
}

impl SoftwareDecoder {
    pub fn new(codec: CodecType, buffers_count: usize) -> Self {
        Self {
            codec,
            surfaces: vec![None; buffers_count.max(1)],
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn require_slot(&self, index: usize, slot: usize) -> Result<(), DecodeError> {
        match self.surfaces.get(slot) {
            Some(Some(_)) => Ok(()),
            Some(None) => Err(DecodeError::MissingReference { index, slot }),
            None => Err(DecodeError::InvalidSlot {
                slot,
                count: self.surfaces.len(),
            }),
        }
    }

    fn require_timestamp(&self, index: usize, ts: u64) -> Result<(), DecodeError> {
        let found = self
            .surfaces
            .iter()
            .flatten()
            .any(|surface| surface.timestamp == ts);
        if found {
            Ok(())
        } else {
            Err(DecodeError::MissingTimestamp {
                index,
                timestamp: ts,
                frame: index_ref_ts(ts),
            })
        }
    }

    fn check_references(&self, controls: &FrameControls) -> Result<(), DecodeError> {
        let index = controls.index;
        match &controls.codec {
            CodecControls::Mpeg2 {
                coding_type,
                forward_ref_slot,
                backward_ref_slot,
                ..
            } => match coding_type {
                CodingType::I => Ok(()),
                CodingType::P => self.require_slot(index, *forward_ref_slot),
                CodingType::B => {
                    self.require_slot(index, *forward_ref_slot)?;
                    self.require_slot(index, *backward_ref_slot)
                }
            },
            CodecControls::H264 { reference_ts, .. } | CodecControls::H265 { reference_ts, .. } => {
                for &ts in reference_ts {
                    self.require_timestamp(index, ts)?;
                }
                Ok(())
            }
        }
    }
}

impl VideoEngine for SoftwareDecoder {
    fn buffers_count(&self) -> usize {
        self.surfaces.len()
    }

    async fn decode(&mut self, controls: &FrameControls, payload: &[u8]) -> Result<(), DecodeError> {
        if controls.codec.codec_name() != self.codec.name() {
            return Err(DecodeError::CodecMismatch {
                expected: self.codec.name(),
                got: controls.codec.codec_name(),
            });
        }
        if controls.slot >= self.surfaces.len() {
            return Err(DecodeError::InvalidSlot {
                slot: controls.slot,
                count: self.surfaces.len(),
            });
        }
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload {
                index: controls.index,
            });
        }
        self.check_references(controls)?;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut hasher = Sha256::new();
        hasher.update(payload);
        let surface = DecodedSurface {
            decode_index: controls.index,
            timestamp: controls.timestamp,
            checksum: format!("{:x}", hasher.finalize()),
            size: payload.len(),
        };
        debug!(
            "[DECODE] Slot {} <- frame {} ({})",
            controls.slot, controls.index, surface.checksum
        );
        self.surfaces[controls.slot] = Some(surface);
        Ok(())
    }

    fn surface(&self, slot: usize) -> Option<&DecodedSurface> {
        self.surfaces.get(slot).and_then(|s| s.as_ref())
    }

    fn release(&mut self) {
        self.surfaces.iter_mut().for_each(|s| *s = None);
    }
}

/// Compositor stand-in that records what was shown.
#[derive(Debug, Default)]
pub struct TraceDisplay {
    shown: Vec<DecodedSurface>,
}

impl TraceDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode indices in the order they were committed.
    pub fn presented(&self) -> Vec<usize> {
        self.shown.iter().map(|s| s.decode_index).collect()
    }
}

impl DisplayEngine for TraceDisplay {
    fn show(&mut self, slot: usize, surface: &DecodedSurface) -> Result<(), DisplayError> {
        debug!("[DISPLAY] Slot {} -> frame {}", slot, surface.decode_index);
        self.shown.push(surface.clone());
        Ok(())
    }
}

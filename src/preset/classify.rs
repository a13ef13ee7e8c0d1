// Stateless Decode Harness - Frame Classifier
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Pure lookups over a preset frame table: coding type, reference
// descriptor, and the per-request control data handed to the decoder.

use super::frame::{CodingType, FramePayload, ReferenceDescriptor};
use super::Preset;
use crate::error::ScheduleError;

/// Buffer timestamp used to tag the decode request for frame `index`.
/// Reference lists address earlier frames by this value.
pub const fn ts_ref_index(index: usize) -> u64 {
    (index as u64 + 1) * 1000
}

/// Inverse of [`ts_ref_index`]. `None` for timestamps below the first frame's.
pub fn index_ref_ts(ts: u64) -> Option<usize> {
    (ts / 1000).checked_sub(1).map(|i| i as usize)
}

fn check_index(preset: &Preset, index: usize) -> Result<(), ScheduleError> {
    if index >= preset.frames_count() {
        return Err(ScheduleError::IndexOutOfRange {
            index,
            frames_count: preset.frames_count(),
        });
    }
    Ok(())
}

/// Coding type of frame `index`. An absent preset classifies as I.
pub fn classify(preset: Option<&Preset>, index: usize) -> Result<CodingType, ScheduleError> {
    let Some(preset) = preset else {
        return Ok(CodingType::I);
    };
    check_index(preset, index)?;
    Ok(preset.frames[index].coding_type())
}

/// Reference descriptor of frame `index`. An absent preset yields a
/// backward reference to frame 0.
pub fn reference_of(
    preset: Option<&Preset>,
    index: usize,
) -> Result<ReferenceDescriptor, ScheduleError> {
    let Some(preset) = preset else {
        return Ok(ReferenceDescriptor::BackwardRef(0));
    };
    check_index(preset, index)?;
    Ok(preset.frames[index].reference())
}

/// Codec-specific controls submitted alongside a slice.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecControls {
    Mpeg2 {
        coding_type: CodingType,
        forward_ref_slot: usize,
        backward_ref_slot: usize,
        top_field_first: bool,
        quantiser_scale_code: u8,
    },
    H264 {
        slice_type: CodingType,
        pic_order_cnt: i32,
        frame_num: u32,
        idr: bool,
        reference_ts: Vec<u64>,
    },
    H265 {
        slice_type: CodingType,
        pic_order_cnt: i32,
        reference_ts: Vec<u64>,
    },
}

impl CodecControls {
    pub fn codec_name(&self) -> &'static str {
        match self {
            CodecControls::Mpeg2 { .. } => "MPEG2",
            CodecControls::H264 { .. } => "H264",
            CodecControls::H265 { .. } => "H265",
        }
    }
}

/// Everything the decoder needs for one request besides the slice bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameControls {
    pub index: usize,
    pub slot: usize,
    pub timestamp: u64,
    pub slice_size: usize,
    pub codec: CodecControls,
}

/// Build the decode controls for frame `index`, mapping reference indices
/// onto the `buffers_count` slot ring.
pub fn frame_controls(
    preset: &Preset,
    buffers_count: usize,
    index: usize,
    slice_size: usize,
) -> Result<FrameControls, ScheduleError> {
    check_index(preset, index)?;
    let buffers_count = buffers_count.max(1);

    let codec = match &preset.frames[index].payload {
        FramePayload::Mpeg2(f) => CodecControls::Mpeg2 {
            coding_type: f.picture_coding_type,
            forward_ref_slot: f.forward_ref_index % buffers_count,
            backward_ref_slot: f.backward_ref_index % buffers_count,
            top_field_first: f.top_field_first,
            quantiser_scale_code: f.quantiser_scale_code,
        },
        FramePayload::H264(f) => CodecControls::H264 {
            slice_type: f.slice_type,
            pic_order_cnt: f.pic_order_cnt,
            frame_num: f.frame_num,
            idr: f.idr,
            reference_ts: f.reference_indices.iter().map(|&i| ts_ref_index(i)).collect(),
        },
        FramePayload::H265(f) => CodecControls::H265 {
            slice_type: f.slice_type,
            pic_order_cnt: f.pic_order_cnt,
            reference_ts: f.reference_indices.iter().map(|&i| ts_ref_index(i)).collect(),
        },
    };

    Ok(FrameControls {
        index,
        slot: index % buffers_count,
        timestamp: ts_ref_index(index),
        slice_size,
        codec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{catalog, FramePayload};

    fn mpeg2_preset() -> Preset {
        let frames: Vec<FramePayload> = serde_json::from_str(
            r#"[
                {"mpeg2": {"picture_coding_type": "I"}},
                {"mpeg2": {"picture_coding_type": "P", "forward_ref_index": 0, "backward_ref_index": 0}},
                {"mpeg2": {"picture_coding_type": "B", "forward_ref_index": 0, "backward_ref_index": 1}},
                {"mpeg2": {"picture_coding_type": "P", "forward_ref_index": 1, "backward_ref_index": 1}},
                {"mpeg2": {"picture_coding_type": "P", "forward_ref_index": 3, "backward_ref_index": 3}},
                {"mpeg2": {"picture_coding_type": "P", "forward_ref_index": 4, "backward_ref_index": 4}},
                {"mpeg2": {"picture_coding_type": "B", "forward_ref_index": 5, "backward_ref_index": 6}},
                {"mpeg2": {"picture_coding_type": "P", "forward_ref_index": 5, "backward_ref_index": 5}}
            ]"#,
        )
        .unwrap();
        Preset::from_info(catalog::find("bbb-mpeg2").unwrap(), frames).unwrap()
    }

    #[test]
    fn test_classify_and_reference() {
        let preset = mpeg2_preset();
        assert_eq!(classify(Some(&preset), 0).unwrap(), CodingType::I);
        assert_eq!(classify(Some(&preset), 2).unwrap(), CodingType::B);
        assert_eq!(
            reference_of(Some(&preset), 2).unwrap(),
            ReferenceDescriptor::BackwardRef(1)
        );
    }

    #[test]
    fn test_absent_preset_is_intra() {
        assert_eq!(classify(None, 42).unwrap(), CodingType::I);
        assert_eq!(reference_of(None, 42).unwrap(), ReferenceDescriptor::BackwardRef(0));
    }

    #[test]
    fn test_out_of_range_reports_error() {
        let preset = mpeg2_preset();
        let err = classify(Some(&preset), 8).unwrap_err();
        assert_eq!(err, ScheduleError::IndexOutOfRange { index: 8, frames_count: 8 });
        assert!(reference_of(Some(&preset), 100).is_err());
    }

    #[test]
    fn test_mpeg2_controls_wrap_reference_slots() {
        let preset = mpeg2_preset();
        let controls = frame_controls(&preset, 6, 6, 512).unwrap();
        assert_eq!(controls.slot, 0);
        assert_eq!(controls.timestamp, 7000);
        assert_eq!(controls.slice_size, 512);
        match controls.codec {
            CodecControls::Mpeg2 { forward_ref_slot, backward_ref_slot, coding_type, .. } => {
                assert_eq!(coding_type, CodingType::B);
                assert_eq!(forward_ref_slot, 5);
                assert_eq!(backward_ref_slot, 0);
            }
            other => panic!("unexpected controls {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_mapping() {
        assert_eq!(ts_ref_index(0), 1000);
        assert_eq!(index_ref_ts(ts_ref_index(17)), Some(17));
        assert_eq!(index_ref_ts(999), None);
        assert_eq!(index_ref_ts(0), None);
    }
}

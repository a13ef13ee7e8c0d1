// Stateless Decode Harness - Frame Model
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Coded pictures as stored in a preset frame table. The per-codec slice
// parameters live in a tagged enum; everything the scheduler needs is
// reached through `coding_type()` and `reference()`.

use serde::{Deserialize, Serialize};

/// Picture coding type of a coded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodingType {
    I,
    P,
    B,
}

/// Codec family of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecType {
    Mpeg2,
    H264,
    H265,
}

impl CodecType {
    pub fn name(&self) -> &'static str {
        match self {
            CodecType::Mpeg2 => "MPEG2",
            CodecType::H264 => "H264",
            CodecType::H265 => "H265",
        }
    }

    /// Which GOP ordering algorithm applies to this codec family.
    pub fn scheduling(&self) -> SchedulingMode {
        match self {
            CodecType::Mpeg2 => SchedulingMode::ReferenceIndex,
            CodecType::H264 | CodecType::H265 => SchedulingMode::PictureOrderCount,
        }
    }
}

impl std::fmt::Display for CodecType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingMode {
    /// Explicit backward-reference decode indices (MPEG-2).
    ReferenceIndex,
    /// Explicit presentation counters (H.264, H.265).
    PictureOrderCount,
}

/// Codec-specific reference information used for presentation ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceDescriptor {
    /// Decode-order index of the frame used for backward prediction.
    BackwardRef(usize),
    /// Presentation-order counter.
    PictureOrderCount(i32),
}

/// MPEG-2 slice parameters relevant to the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mpeg2Frame {
    pub picture_coding_type: CodingType,
    /// Decode index of the forward reference picture.
    #[serde(default)]
    pub forward_ref_index: usize,
    /// Decode index of the backward reference picture.
    #[serde(default)]
    pub backward_ref_index: usize,
    #[serde(default)]
    pub top_field_first: bool,
    #[serde(default)]
    pub quantiser_scale_code: u8,
}

/// H.264 decode and slice parameters relevant to the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H264Frame {
    pub slice_type: CodingType,
    pub pic_order_cnt: i32,
    #[serde(default)]
    pub frame_num: u32,
    #[serde(default)]
    pub idr: bool,
    /// Decode indices of the frames held in the DPB for this picture.
    #[serde(default)]
    pub reference_indices: Vec<usize>,
}

/// H.265 slice parameters relevant to the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H265Frame {
    pub slice_type: CodingType,
    pub pic_order_cnt: i32,
    #[serde(default)]
    pub reference_indices: Vec<usize>,
}

/// Per-codec frame payload as found in `frames.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramePayload {
    Mpeg2(Mpeg2Frame),
    H264(H264Frame),
    H265(H265Frame),
}

impl FramePayload {
    pub fn codec(&self) -> CodecType {
        match self {
            FramePayload::Mpeg2(_) => CodecType::Mpeg2,
            FramePayload::H264(_) => CodecType::H264,
            FramePayload::H265(_) => CodecType::H265,
        }
    }

    pub fn coding_type(&self) -> CodingType {
        match self {
            FramePayload::Mpeg2(f) => f.picture_coding_type,
            FramePayload::H264(f) => f.slice_type,
            FramePayload::H265(f) => f.slice_type,
        }
    }

    pub fn reference(&self) -> ReferenceDescriptor {
        match self {
            FramePayload::Mpeg2(f) => ReferenceDescriptor::BackwardRef(f.backward_ref_index),
            FramePayload::H264(f) => ReferenceDescriptor::PictureOrderCount(f.pic_order_cnt),
            FramePayload::H265(f) => ReferenceDescriptor::PictureOrderCount(f.pic_order_cnt),
        }
    }

    /// Every decode index this frame points at.
    pub fn referenced_indices(&self) -> Vec<usize> {
        match self {
            FramePayload::Mpeg2(f) => vec![f.forward_ref_index, f.backward_ref_index],
            FramePayload::H264(f) => f.reference_indices.clone(),
            FramePayload::H265(f) => f.reference_indices.clone(),
        }
    }
}

/// One coded picture at a fixed decode-order position.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub payload: FramePayload,
}

impl Frame {
    pub fn coding_type(&self) -> CodingType {
        self.payload.coding_type()
    }

    pub fn reference(&self) -> ReferenceDescriptor {
        self.payload.reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_tagged_by_codec() {
        let json = r#"[
            {"mpeg2": {"picture_coding_type": "B", "forward_ref_index": 0, "backward_ref_index": 3}},
            {"h264": {"slice_type": "P", "pic_order_cnt": 4, "reference_indices": [0]}}
        ]"#;
        let frames: Vec<FramePayload> = serde_json::from_str(json).unwrap();

        assert_eq!(frames[0].codec(), CodecType::Mpeg2);
        assert_eq!(frames[0].coding_type(), CodingType::B);
        assert_eq!(frames[0].reference(), ReferenceDescriptor::BackwardRef(3));

        assert_eq!(frames[1].codec(), CodecType::H264);
        assert_eq!(frames[1].reference(), ReferenceDescriptor::PictureOrderCount(4));
        assert_eq!(frames[1].referenced_indices(), vec![0]);
    }

    #[test]
    fn test_scheduling_mode_per_codec() {
        assert_eq!(CodecType::Mpeg2.scheduling(), SchedulingMode::ReferenceIndex);
        assert_eq!(CodecType::H264.scheduling(), SchedulingMode::PictureOrderCount);
        assert_eq!(CodecType::H265.scheduling(), SchedulingMode::PictureOrderCount);
    }
}

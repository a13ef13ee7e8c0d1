// Stateless Decode Harness - Preset Catalog
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::frame::CodecType;

/// Static metadata for a named preset. Frame tables are data and live in
/// `<data-dir>/<name>/frames.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub license: &'static str,
    pub attribution: &'static str,
    pub width: u32,
    pub height: u32,
    pub codec: CodecType,
    pub buffers_count: usize,
}

const CC_BY_3: &str = "Creative Commons Attribution 3.0";
const BLENDER: &str = "Blender Foundation | www.blender.org";
const BBB_H264: &str = "big_buck_bunny_480p_H264_AAC_25fps_1800K.MP4";

pub const CATALOG: &[PresetInfo] = &[
    PresetInfo {
        name: "bbb-mpeg2",
        description: "big_buck_bunny_480p_MPEG2_MP2_25fps_1800K.MPG",
        license: CC_BY_3,
        attribution: BLENDER,
        width: 854,
        height: 480,
        codec: CodecType::Mpeg2,
        buffers_count: 6,
    },
    PresetInfo {
        name: "ed-mpeg2",
        description: "Elephants Dream",
        license: CC_BY_3,
        attribution: BLENDER,
        width: 1280,
        height: 720,
        codec: CodecType::Mpeg2,
        buffers_count: 6,
    },
    PresetInfo {
        name: "bbb-h264-all-i-32",
        description: BBB_H264,
        license: CC_BY_3,
        attribution: BLENDER,
        width: 854,
        height: 480,
        codec: CodecType::H264,
        buffers_count: 16,
    },
    PresetInfo {
        name: "bbb-h264-high-32",
        description: BBB_H264,
        license: CC_BY_3,
        attribution: BLENDER,
        width: 854,
        height: 480,
        codec: CodecType::H264,
        buffers_count: 16,
    },
    PresetInfo {
        name: "bbb-h264-32",
        description: BBB_H264,
        license: CC_BY_3,
        attribution: BLENDER,
        width: 854,
        height: 480,
        codec: CodecType::H264,
        buffers_count: 16,
    },
];

pub fn find(name: &str) -> Option<&'static PresetInfo> {
    CATALOG.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_preset() {
        let p = find("ed-mpeg2").unwrap();
        assert_eq!(p.width, 1280);
        assert_eq!(p.codec, CodecType::Mpeg2);
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_catalog_names_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.name != a.name), "duplicate {}", a.name);
        }
    }
}

// Stateless Decode Harness - Presets
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// A preset is an immutable frame table plus the metadata needed to set up
// the decode and display engines. Presets are loaded once at startup.

pub mod catalog;
pub mod classify;
pub mod frame;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::PresetError;
pub use catalog::PresetInfo;
pub use frame::{CodecType, CodingType, Frame, FramePayload, ReferenceDescriptor, SchedulingMode};

pub const FRAMES_FILE: &str = "frames.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub license: String,
    pub attribution: String,
    pub width: u32,
    pub height: u32,
    pub codec: CodecType,
    pub buffers_count: usize,
    pub frames: Vec<Frame>,
}

/// Self-contained preset as accepted by `--preset-file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub attribution: String,
    pub width: u32,
    pub height: u32,
    pub codec: CodecType,
    pub buffers_count: usize,
    pub frames: Vec<FramePayload>,
}

impl Preset {
    /// Look up a catalog preset and load its frame table from
    /// `<data_dir>/<name>/frames.json`.
    pub fn load(name: &str, data_dir: &Path) -> Result<Self, PresetError> {
        let info = catalog::find(name).ok_or_else(|| PresetError::UnknownPreset {
            name: name.to_string(),
        })?;

        let path = data_dir.join(name).join(FRAMES_FILE);
        let frames: Vec<FramePayload> = read_json(&path)?;
        info!("[PRESET] Loaded {} frames for '{}' from {:?}", frames.len(), name, path);

        Self::from_info(info, frames)
    }

    /// Load a preset that carries its own metadata.
    pub fn from_file(path: &Path) -> Result<Self, PresetError> {
        let file: PresetFile = read_json(path)?;
        info!("[PRESET] Loaded preset '{}' from {:?}", file.name, path);
        Self::from_preset_file(file)
    }

    pub fn from_info(info: &PresetInfo, frames: Vec<FramePayload>) -> Result<Self, PresetError> {
        Self::from_preset_file(PresetFile {
            name: info.name.to_string(),
            description: info.description.to_string(),
            license: info.license.to_string(),
            attribution: info.attribution.to_string(),
            width: info.width,
            height: info.height,
            codec: info.codec,
            buffers_count: info.buffers_count,
            frames,
        })
    }

    pub fn from_preset_file(file: PresetFile) -> Result<Self, PresetError> {
        let preset = Self {
            name: file.name,
            description: file.description,
            license: file.license,
            attribution: file.attribution,
            width: file.width,
            height: file.height,
            codec: file.codec,
            buffers_count: file.buffers_count,
            frames: file
                .frames
                .into_iter()
                .enumerate()
                .map(|(index, payload)| Frame { index, payload })
                .collect(),
        };
        preset.validate()?;
        Ok(preset)
    }

    pub fn frames_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn scheduling(&self) -> SchedulingMode {
        self.codec.scheduling()
    }

    fn malformed(&self, reason: String) -> PresetError {
        PresetError::Malformed {
            preset: self.name.clone(),
            reason,
        }
    }

    /// Structural checks on the frame table. GOP occupancy is checked
    /// separately against the display queue capacity.
    pub fn validate(&self) -> Result<(), PresetError> {
        if self.frames.is_empty() {
            return Err(self.malformed("frame table is empty".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(self.malformed(format!("invalid dimensions {}x{}", self.width, self.height)));
        }
        if self.buffers_count == 0 {
            return Err(self.malformed("buffers count must be at least 1".to_string()));
        }

        for frame in &self.frames {
            if frame.payload.codec() != self.codec {
                return Err(self.malformed(format!(
                    "frame {} is {} but preset codec is {}",
                    frame.index,
                    frame.payload.codec(),
                    self.codec
                )));
            }
            if let Some(bad) = frame
                .payload
                .referenced_indices()
                .into_iter()
                .find(|&r| r >= self.frames.len())
            {
                return Err(self.malformed(format!(
                    "frame {} references index {} beyond {} frames",
                    frame.index,
                    bad,
                    self.frames.len()
                )));
            }
        }

        if self.frames[0].coding_type() != CodingType::I {
            return Err(self.malformed("first frame must be an I frame".to_string()));
        }

        debug!("[PRESET] '{}' validated ({} frames)", self.name, self.frames.len());
        Ok(())
    }

    /// One line per field, logged at startup.
    pub fn summary(&self) -> String {
        format!(
            "Preset:\n Name:         {}\n Description:  {}\n License:      {}\n Attribution:  {}\n Width:        {}\n Height:       {}\n Frames count: {}\n Format:       {}",
            self.name,
            self.description,
            self.license,
            self.attribution,
            self.width,
            self.height,
            self.frames_count(),
            self.codec,
        )
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PresetError> {
    let data = fs::read_to_string(path).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| PresetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Frame tables present under `data_dir`, as `<name>/frames.json` entries.
pub fn discover_frame_tables(data_dir: &Path) -> Vec<(String, PathBuf)> {
    let mut found: Vec<(String, PathBuf)> = WalkDir::new(data_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == FRAMES_FILE)
        .filter_map(|e| {
            let name = e.path().parent()?.file_name()?.to_string_lossy().to_string();
            Some((name, e.path().to_path_buf()))
        })
        .collect();
    found.sort();
    found
}

/// Usage listing: catalog presets, marking those with a frame table on disk.
pub fn presets_usage(data_dir: &Path) -> String {
    let tables = discover_frame_tables(data_dir);
    let mut out = String::from("Presets:\n");
    for p in catalog::CATALOG {
        let available = tables.iter().any(|(name, _)| name == p.name);
        out.push_str(&format!(
            " {}: {}{}\n",
            p.name,
            p.description,
            if available { "" } else { " (no frame table)" }
        ));
    }
    for (name, path) in tables.iter().filter(|(n, _)| catalog::find(n).is_none()) {
        out.push_str(&format!(" {}: uncatalogued frame table at {:?}\n", name, path));
    }
    out
}

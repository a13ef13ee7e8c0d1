// Stateless Decode Harness - Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Resolved run configuration. The binary builds it from the command line
// and environment; the library only ever sees this struct.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::slices::DEFAULT_SLICES_FORMAT;
use crate::pipeline::{PacingMode, PipelineOptions};
use crate::preset::Preset;

pub const DEFAULT_PRESET: &str = "bbb-mpeg2";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DATA_DIR_ENV: &str = "DECODE_HARNESS_DATA_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub preset_name: String,
    /// Self-contained preset file, overrides `preset_name`.
    pub preset_file: Option<PathBuf>,
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/<preset name>`.
    pub slices_path: Option<PathBuf>,
    pub slices_format: String,
    /// 0 = unthrottled.
    pub fps: u32,
    pub interactive: bool,
    pub loop_playback: bool,
    pub passes: Option<usize>,
    pub quiet: bool,
    pub report: Option<PathBuf>,
    pub decode_latency: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            preset_name: DEFAULT_PRESET.to_string(),
            preset_file: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            slices_path: None,
            slices_format: DEFAULT_SLICES_FORMAT.to_string(),
            fps: 0,
            interactive: false,
            loop_playback: false,
            passes: None,
            quiet: false,
            report: None,
            decode_latency: Duration::ZERO,
        }
    }
}

impl HarnessConfig {
    pub fn load_preset(&self) -> Result<Preset, crate::error::PresetError> {
        match &self.preset_file {
            Some(path) => Preset::from_file(path),
            None => Preset::load(&self.preset_name, &self.data_dir),
        }
    }

    pub fn slices_dir(&self, preset: &Preset) -> PathBuf {
        self.slices_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(&preset.name))
    }

    pub fn pacing_mode(&self) -> PacingMode {
        PacingMode::from_options(self.interactive, self.fps)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            quiet: self.quiet,
            loop_playback: self.loop_playback || self.passes.is_some(),
            passes: self.passes,
        }
    }

    pub fn summary(&self, preset: &Preset) -> String {
        let fps = if self.fps > 0 {
            self.fps.to_string()
        } else {
            "unthrottled".to_string()
        };
        format!(
            "Config:\n Data dir:      {}\n Slices path:   {}\n Slices format: {}\n Buffers count: {}\n FPS:           {}\n Interactive:   {}\n Loop:          {}",
            display_path(&self.data_dir),
            display_path(&self.slices_dir(preset)),
            self.slices_format,
            preset.buffers_count,
            fps,
            self.interactive,
            self.pipeline_options().loop_playback,
        )
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{catalog, FramePayload};

    fn preset() -> Preset {
        let frames: Vec<FramePayload> =
            serde_json::from_str(r#"[{"mpeg2": {"picture_coding_type": "I"}}]"#).unwrap();
        Preset::from_info(catalog::find("bbb-mpeg2").unwrap(), frames).unwrap()
    }

    #[test]
    fn test_slices_dir_defaults_under_data_dir() {
        let config = HarnessConfig::default();
        assert_eq!(config.slices_dir(&preset()), PathBuf::from("data/bbb-mpeg2"));

        let config = HarnessConfig {
            slices_path: Some(PathBuf::from("/tmp/slices")),
            ..HarnessConfig::default()
        };
        assert_eq!(config.slices_dir(&preset()), PathBuf::from("/tmp/slices"));
    }

    #[test]
    fn test_pass_limit_implies_looping() {
        let config = HarnessConfig {
            passes: Some(2),
            ..HarnessConfig::default()
        };
        let options = config.pipeline_options();
        assert!(options.loop_playback);
        assert_eq!(options.passes, Some(2));
        assert_eq!(config.pacing_mode(), PacingMode::Unthrottled);
    }

    #[test]
    fn test_summary_mentions_buffers() {
        let summary = HarnessConfig::default().summary(&preset());
        assert!(summary.contains("Buffers count: 6"));
        assert!(summary.contains("unthrottled"));
    }
}

use stateless_decode_harness::config::HarnessConfig;
use stateless_decode_harness::engine::{
    DecodedSurface, DisplayEngine, SliceDirectory, SoftwareDecoder, TraceDisplay, VideoEngine,
};
use stateless_decode_harness::error::{DecodeError, DisplayError, PipelineError};
use stateless_decode_harness::pipeline::{
    FramePacer, PacingMode, PipelineDriver, PipelineOptions, PlaybackReport,
};
use stateless_decode_harness::preset::classify::FrameControls;
use stateless_decode_harness::preset::{catalog, presets_usage, FramePayload, Preset, FRAMES_FILE};
use stateless_decode_harness::run_harness;
use stateless_decode_harness::schedule::{validate_capacity, DISPLAY_QUEUE_CAPACITY};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sdh_playback_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_slices(dir: &Path, count: usize) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        fs::write(dir.join(format!("slice-{}.dump", i)), format!("coded picture {}", i)).unwrap();
    }
}

fn h264_table(pocs: &[(&str, i32)]) -> serde_json::Value {
    serde_json::Value::Array(
        pocs.iter()
            .map(|(t, poc)| serde_json::json!({"h264": {"slice_type": t, "pic_order_cnt": poc}}))
            .collect(),
    )
}

fn h264_preset(pocs: &[(&str, i32)]) -> Preset {
    let frames: Vec<FramePayload> = serde_json::from_value(h264_table(pocs)).unwrap();
    Preset::from_info(catalog::find("bbb-h264-32").unwrap(), frames).unwrap()
}

fn driver_with<V: VideoEngine, D: DisplayEngine>(
    name: &str,
    preset: Preset,
    video: V,
    display: D,
) -> PipelineDriver<V, D> {
    let dir = scratch(name);
    write_slices(&dir, preset.frames_count());
    let slices = SliceDirectory::new(dir, "slice-%d.dump").unwrap();
    let options = PipelineOptions {
        quiet: true,
        ..PipelineOptions::default()
    };
    PipelineDriver::new(
        preset,
        slices,
        video,
        display,
        FramePacer::new(PacingMode::Unthrottled),
        options,
    )
}

/// Decoder that never completes the request for one frame.
struct StallingDecoder {
    inner: SoftwareDecoder,
    stall_at: usize,
}

impl VideoEngine for StallingDecoder {
    fn buffers_count(&self) -> usize {
        self.inner.buffers_count()
    }

    async fn decode(&mut self, controls: &FrameControls, payload: &[u8]) -> Result<(), DecodeError> {
        if controls.index == self.stall_at {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        self.inner.decode(controls, payload).await
    }

    fn surface(&self, slot: usize) -> Option<&DecodedSurface> {
        self.inner.surface(slot)
    }
}

/// Display that fails after a number of successful commits.
#[derive(Default)]
struct FlakyDisplay {
    budget: usize,
    shown: usize,
    released: bool,
}

impl DisplayEngine for FlakyDisplay {
    fn show(&mut self, _slot: usize, _surface: &DecodedSurface) -> Result<(), DisplayError> {
        if self.shown == self.budget {
            return Err(DisplayError::Engine("connector unplugged".to_string()));
        }
        self.shown += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[tokio::test]
async fn test_poc_playback_order() {
    let preset = h264_preset(&[("I", 0), ("P", 2), ("B", 1), ("I", 0), ("P", 1)]);
    let decoder = SoftwareDecoder::new(preset.codec, preset.buffers_count);
    let mut driver = driver_with("poc_order", preset, decoder, TraceDisplay::new());

    let stats = driver.run().await.unwrap().clone();
    assert_eq!(driver.display().presented(), vec![0, 2, 1, 3, 4]);
    assert_eq!(stats.decode_order, vec![0, 1, 2, 3, 4]);
    assert_eq!(stats.frames_skipped, 0);
}

#[tokio::test]
async fn test_trailing_frame_without_poc_successor_is_decoded_not_shown() {
    let preset = h264_preset(&[("I", 0), ("P", 1), ("P", 3), ("I", 0), ("P", 1)]);
    let decoder = SoftwareDecoder::new(preset.codec, preset.buffers_count);
    let mut driver = driver_with("poc_gap", preset, decoder, TraceDisplay::new());

    let stats = driver.run().await.unwrap().clone();
    assert_eq!(driver.display().presented(), vec![0, 1, 3, 4]);
    assert_eq!(stats.decode_order, vec![0, 1, 2, 3, 4]);
    assert_eq!(stats.frames_skipped, 1);
    assert_eq!(stats.frames_displayed, 4);
}

#[tokio::test]
async fn test_long_consecutive_gops_play_without_drops() {
    let mut pocs = Vec::new();
    for _ in 0..2 {
        pocs.push(("I", 0));
        pocs.extend((1..40).map(|poc| ("P", poc)));
    }
    let preset = h264_preset(&pocs);
    validate_capacity(&preset, DISPLAY_QUEUE_CAPACITY).unwrap();

    let decoder = SoftwareDecoder::new(preset.codec, preset.buffers_count);
    let mut driver = driver_with("long_gops", preset, decoder, TraceDisplay::new());
    let stats = driver.run().await.unwrap().clone();

    assert_eq!(stats.frames_displayed, 80);
    assert_eq!(stats.frames_dropped, 0);
    assert_eq!(driver.display().presented(), (0..80).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_decode_timeout_is_fatal() {
    let preset = h264_preset(&[("I", 0), ("P", 1), ("P", 2)]);
    let decoder = StallingDecoder {
        inner: SoftwareDecoder::new(preset.codec, preset.buffers_count),
        stall_at: 1,
    };
    let mut driver = driver_with("timeout", preset, decoder, TraceDisplay::new());

    let err = driver.run().await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Decode {
            index: 1,
            source: DecodeError::Timeout { slot: 1 }
        }
    ));
    assert_eq!(driver.display().presented(), vec![0]);
}

#[tokio::test]
async fn test_display_failure_releases_engines() {
    let preset = h264_preset(&[("I", 0), ("P", 1), ("P", 2)]);
    let decoder = SoftwareDecoder::new(preset.codec, preset.buffers_count);
    let display = FlakyDisplay {
        budget: 2,
        ..FlakyDisplay::default()
    };
    let mut driver = driver_with("flaky", preset, decoder, display);

    let err = driver.run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Display { index: 2, .. }));
    assert!(driver.display().released);
    assert_eq!(driver.display().shown, 2);
    // Decoder surfaces are dropped on release.
    assert!(driver.video().surface(0).is_none());
}

#[tokio::test]
async fn test_harness_end_to_end_with_report() {
    let data_dir = scratch("harness");
    let preset_dir = data_dir.join("bbb-h264-32");
    let pocs = [("I", 0), ("P", 2), ("B", 1), ("P", 3)];
    write_slices(&preset_dir, pocs.len());
    fs::write(
        preset_dir.join(FRAMES_FILE),
        serde_json::to_string(&h264_table(&pocs)).unwrap(),
    )
    .unwrap();

    let report_path = data_dir.join("out").join("report.json");
    let config = HarnessConfig {
        preset_name: "bbb-h264-32".to_string(),
        data_dir: data_dir.clone(),
        quiet: true,
        report: Some(report_path.clone()),
        ..HarnessConfig::default()
    };

    let stats = run_harness(&config).await.unwrap();
    assert_eq!(stats.display_order, vec![0, 2, 1, 3]);

    let report = PlaybackReport::load(&report_path).unwrap();
    assert_eq!(report.preset, "bbb-h264-32");
    assert_eq!(report.display_order, vec![0, 2, 1, 3]);
    assert_eq!(report.frames_displayed, 4);

    let usage = presets_usage(&data_dir);
    assert!(usage.contains(" bbb-h264-32: "));
    assert!(usage.contains("ed-mpeg2: Elephants Dream (no frame table)"));

    let _ = fs::remove_dir_all(&data_dir);
}

#[tokio::test]
async fn test_harness_rejects_unknown_preset() {
    let config = HarnessConfig {
        preset_name: "nope".to_string(),
        data_dir: scratch("unknown"),
        ..HarnessConfig::default()
    };
    let err = run_harness(&config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Unable to find preset for name: nope"));
}

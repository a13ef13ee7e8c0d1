// Stateless Decode Harness - Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use stateless_decode_harness::config::{
    HarnessConfig, DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_PRESET,
};
use stateless_decode_harness::engine::slices::DEFAULT_SLICES_FORMAT;
use stateless_decode_harness::preset::presets_usage;
use stateless_decode_harness::run_harness;

use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "stateless-decode-harness")]
#[command(about = "Stateless decoder request test harness", long_about = None)]
struct Cli {
    /// Preset to play
    #[arg(short = 'P', long, default_value = DEFAULT_PRESET)]
    preset_name: String,

    /// Self-contained preset JSON (metadata and frames)
    #[arg(long)]
    preset_file: Option<PathBuf>,

    /// Root holding `<preset>/frames.json` and slice dumps
    #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Path to the preset slices (default: <data-dir>/<preset>)
    #[arg(short = 's', long)]
    slices_path: Option<PathBuf>,

    /// Slice file name format
    #[arg(short = 'S', long, default_value = DEFAULT_SLICES_FORMAT)]
    slices_format: String,

    /// Display rate in frames per second (0 = unthrottled)
    #[arg(short, long, default_value = "0")]
    fps: u32,

    /// Wait for enter before each new frame
    #[arg(short, long)]
    interactive: bool,

    /// Loop preset frames
    #[arg(short, long = "loop")]
    loop_playback: bool,

    /// Stop after this many passes (implies --loop)
    #[arg(long)]
    loop_count: Option<usize>,

    /// Suppress per-frame output
    #[arg(short, long)]
    quiet: bool,

    /// Write a JSON playback report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Simulated decode latency of the software decoder, in milliseconds
    #[arg(long, default_value = "0")]
    decode_latency_ms: u64,

    /// List known presets and exit
    #[arg(long)]
    list_presets: bool,
}

impl Cli {
    fn into_config(self) -> HarnessConfig {
        HarnessConfig {
            preset_name: self.preset_name,
            preset_file: self.preset_file,
            data_dir: self.data_dir,
            slices_path: self.slices_path,
            slices_format: self.slices_format,
            fps: self.fps,
            interactive: self.interactive,
            loop_playback: self.loop_playback,
            passes: self.loop_count,
            quiet: self.quiet,
            report: self.report,
            decode_latency: Duration::from_millis(self.decode_latency_ms),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[HARNESS PANIC] at {}: {}", location, message);
    }));

    let args = Cli::parse();

    if args.list_presets {
        print!("{}", presets_usage(&args.data_dir));
        return;
    }

    let config = args.into_config();

    match run_harness(&config).await {
        Ok(stats) => {
            info!(
                "[PIPELINE] Done: {} frames displayed over {} pass(es)",
                stats.frames_displayed, stats.passes
            );
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

//! Command line configuration for the two tools.
//!
//! Parsing validates everything up front, so a bad resolution is reported
//! with the usage text before the camera is touched.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::camera::process::{Programs, DEFAULT_STILL_PROGRAM, DEFAULT_VIDEO_PROGRAM};
use crate::settings::{
    Resolution, VideoOptions, DEFAULT_BITRATE, DEFAULT_FRAMERATE, DEFAULT_STILL_RESOLUTION,
    DEFAULT_VIDEO_RESOLUTION, VIDEO_QUALITY,
};

/// Log verbosity, named the way operators know it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum Verbosity {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
}

impl From<Verbosity> for tracing::Level {
    fn from(verbosity: Verbosity) -> tracing::Level {
        match verbosity {
            Verbosity::Debug => tracing::Level::DEBUG,
            Verbosity::Info => tracing::Level::INFO,
            Verbosity::Warning => tracing::Level::WARN,
            Verbosity::Error => tracing::Level::ERROR,
        }
    }
}

/// Record movies with RPi camera module.
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "picam-record", version)]
pub struct RecordConfig {
    /// File path for the video recording.
    pub path: PathBuf,

    /// Duration of the video in seconds. Negative records until interrupted.
    #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
    pub duration: i64,

    /// Resolution of the video to capture.
    #[arg(short, long, default_value = DEFAULT_VIDEO_RESOLUTION)]
    pub resolution: Resolution,

    /// Frames per second.
    #[arg(short, long, default_value_t = DEFAULT_FRAMERATE)]
    pub framerate: u32,

    /// Bitrate of encoded stream in Bit/s.
    #[arg(short, long, default_value_t = DEFAULT_BITRATE)]
    pub bitrate: u32,

    /// Verbosity.
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Verbosity::Warning)]
    pub verbosity: Verbosity,

    /// Program used to record video.
    #[arg(long, default_value = DEFAULT_VIDEO_PROGRAM)]
    pub program: String,
}

impl RecordConfig {
    /// How long to record, `None` meaning until interrupted.
    pub fn duration(&self) -> Option<Duration> {
        u64::try_from(self.duration).ok().map(Duration::from_secs)
    }

    pub fn video_options(&self) -> VideoOptions {
        VideoOptions {
            bitrate: self.bitrate,
            quality: VIDEO_QUALITY,
        }
    }

    pub fn programs(&self) -> Programs {
        Programs {
            video: self.program.clone(),
            ..Programs::default()
        }
    }
}

/// Take snapshots with RPi camera module every x seconds.
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "picam-snap", version)]
pub struct SnapshotConfig {
    /// Directory where the images are stored.
    pub path: PathBuf,

    /// Capture an image every X seconds.
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub seconds: u64,

    /// Resolution of the images to capture.
    #[arg(short, long, default_value = DEFAULT_STILL_RESOLUTION)]
    pub resolution: Resolution,

    /// Verbosity.
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Verbosity::Warning)]
    pub verbosity: Verbosity,

    /// Program used to capture stills.
    #[arg(long, default_value = DEFAULT_STILL_PROGRAM)]
    pub program: String,
}

impl SnapshotConfig {
    pub fn programs(&self) -> Programs {
        Programs {
            still: self.program.clone(),
            ..Programs::default()
        }
    }
}

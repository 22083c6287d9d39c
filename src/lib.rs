//! Record videos and take interval snapshots with the Raspberry Pi camera.
//!
//! The two tools built from this crate, `picam-record` and `picam-snap`, are
//! thin wrappers around [`record::record`] and [`snapshot::run`]. Both take a
//! [`CameraModule`] to open the camera with and a [`Clock`] whose waits can be
//! cut short by an [`Interrupt`].
//!
//! ```no_run
//! use clap::Parser;
//! use picapture::{record, Interrupt, ProcessModule, RecordConfig, SystemClock};
//!
//! let config = RecordConfig::parse_from(["picam-record", "video.h264", "-d", "5"]);
//! let interrupt = Interrupt::new();
//! interrupt.install().unwrap();
//!
//! let mut module = ProcessModule::new(config.programs());
//! record(&mut module, &config, &SystemClock::new(interrupt)).unwrap();
//! ```

pub use camera::process::{ProcessCamera, ProcessModule, Programs};
pub use camera::{Camera, CameraModule};
pub use config::{RecordConfig, SnapshotConfig, Verbosity};
pub use error::{CaptureError, ConfigError, DeviceError, ErrorKind};
pub use interrupt::{Interrupt, Wake};
pub use record::record;
pub use schedule::{Clock, SystemClock};
pub use settings::{CameraSettings, Resolution, VideoOptions, RESOLUTIONS};

pub mod camera;
pub mod config;
mod error;
mod interrupt;
pub mod logging;
pub mod record;
pub mod schedule;
mod settings;
pub mod snapshot;

#[cfg(test)]
mod testing;

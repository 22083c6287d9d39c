use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Sensor modes of the camera module.
///
/// See http://picamera.readthedocs.org/en/latest/fov.html#camera-modes
pub const RESOLUTIONS: [(&str, Resolution); 5] = [
    ("2592x1944", Resolution::new(2592, 1944)),
    ("1920x1080", Resolution::new(1920, 1080)),
    ("1296x972", Resolution::new(1296, 972)),
    ("1296x730", Resolution::new(1296, 730)),
    ("640x480", Resolution::new(640, 480)),
];

pub const DEFAULT_VIDEO_RESOLUTION: &str = "1920x1080";
pub const DEFAULT_STILL_RESOLUTION: &str = "1296x972";
pub const DEFAULT_FRAMERATE: u32 = 30;
pub const DEFAULT_BITRATE: u32 = 10_000_000;

/// Quantisation parameter handed to the h264 encoder.
pub const VIDEO_QUALITY: u32 = 20;

/// Frame size in pixels. Only the entries of [`RESOLUTIONS`] can be parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Resolution {
        Resolution { width, height }
    }
}

impl FromStr for Resolution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RESOLUTIONS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, resolution)| *resolution)
            .ok_or_else(|| ConfigError::UnknownResolution(s.to_owned()))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Settings applied to the camera before capturing.
///
/// ```
/// # use picapture::{CameraSettings, Resolution};
/// let settings = CameraSettings {
///     resolution: "640x480".parse().unwrap(),
///     ..CameraSettings::default()
/// };
/// assert_eq!(settings.resolution, Resolution::new(640, 480));
/// assert_eq!(settings.framerate, 30);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraSettings {
    pub resolution: Resolution,
    // video
    pub framerate: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            resolution: Resolution::new(1920, 1080),
            framerate: DEFAULT_FRAMERATE,
        }
    }
}

/// Encoder options for a single recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoOptions {
    /// Bits per second.
    pub bitrate: u32,
    pub quality: u32,
}

impl Default for VideoOptions {
    fn default() -> Self {
        VideoOptions {
            bitrate: DEFAULT_BITRATE,
            quality: VIDEO_QUALITY,
        }
    }
}

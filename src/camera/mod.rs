use std::path::Path;

use crate::error::CaptureError;
use crate::settings::{Resolution, VideoOptions};

pub mod process;

/// A backend that can open the camera.
///
/// Only one camera may be open at a time. A second `open` is expected to
/// fail in the backend, not here.
pub trait CameraModule {
    type CameraType: Camera;

    fn name(&self) -> &str;
    fn open(&mut self) -> Result<Self::CameraType, CaptureError>;
}

/// An open camera device.
///
/// Setters must be called before recording or capturing. `close` releases
/// the device and is called exactly once by its owner.
pub trait Camera {
    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CaptureError>;
    fn set_framerate(&mut self, framerate: u32) -> Result<(), CaptureError>;

    /// Starts writing an encoded video stream to `path`, replacing any existing file.
    fn start_recording(&mut self, path: &Path, options: &VideoOptions)
        -> Result<(), CaptureError>;
    fn stop_recording(&mut self) -> Result<(), CaptureError>;

    /// Checks on the recording in progress without blocking.
    ///
    /// Returns `Ok(false)` once the recording has ended cleanly by itself and
    /// an error once it has failed. `stop_recording` must still be called
    /// after `Ok(false)`.
    fn poll_recording(&mut self) -> Result<bool, CaptureError>;

    /// Captures one JPEG still to `path`.
    fn capture(&mut self, path: &Path) -> Result<(), CaptureError>;

    fn close(&mut self) -> Result<(), CaptureError>;
}

//! Drives the camera through the `raspivid` and `raspistill` tools.
//!
//! Both tools talk to the MMAL camera component in the VideoCore firmware. A
//! recording is one long-running `raspivid` child process which finalises its
//! output when sent SIGINT. Each still is one short `raspistill` run.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace};

use super::{Camera, CameraModule};
use crate::error::{ended_by_sigint, CaptureError, DeviceError};
use crate::settings::{CameraSettings, Resolution, VideoOptions};

pub const DEFAULT_VIDEO_PROGRAM: &str = "raspivid";
pub const DEFAULT_STILL_PROGRAM: &str = "raspistill";

/// Milliseconds `raspistill` lets exposure and white balance settle before a still.
pub const STILL_SETTLE_MS: u32 = 500;

/// Names of the programs used for video and stills.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Programs {
    pub video: String,
    pub still: String,
}

impl Default for Programs {
    fn default() -> Self {
        Programs {
            video: DEFAULT_VIDEO_PROGRAM.to_owned(),
            still: DEFAULT_STILL_PROGRAM.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProcessModule {
    programs: Programs,
}

impl ProcessModule {
    pub fn new(programs: Programs) -> ProcessModule {
        ProcessModule { programs }
    }
}

impl CameraModule for ProcessModule {
    type CameraType = ProcessCamera;

    fn name(&self) -> &str {
        "process"
    }

    fn open(&mut self) -> Result<ProcessCamera, CaptureError> {
        debug!(
            "opening camera using {} and {}",
            self.programs.video, self.programs.still
        );
        Ok(ProcessCamera {
            programs: self.programs.clone(),
            settings: CameraSettings::default(),
            recording: None,
        })
    }
}

/// Bytes of a recording's stderr kept for error reports.
const STDERR_TAIL: usize = 4096;

struct Recording {
    program: String,
    path: PathBuf,
    child: Child,
    stderr: Option<JoinHandle<Vec<u8>>>,
}

impl Recording {
    fn spawn(program: &str, args: &[OsString], path: &Path) -> Result<Recording, CaptureError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| DeviceError::new(program, format!("failed to start: {}", err)))?;

        // a full pipe would stall the encoder on a long recording
        let stderr = child.stderr.take().map(drain_tail);

        Ok(Recording {
            program: program.to_owned(),
            path: path.to_owned(),
            child,
            stderr,
        })
    }

    /// Asks the encoder to finish the file and waits for it to exit.
    fn finish(mut self) -> Result<(), CaptureError> {
        if self.child.try_wait()?.is_none() {
            let pid = self.child.id() as libc::pid_t;
            trace!("sending SIGINT to {} (pid {})", self.program, pid);
            let result = unsafe { libc::kill(pid, libc::SIGINT) };
            if result != 0 {
                return Err(io::Error::last_os_error().into());
            }
        }

        let status = self.child.wait()?;
        let stderr = self
            .stderr
            .take()
            .and_then(|tail| tail.join().ok())
            .unwrap_or_default();

        if stopped_cleanly(status) {
            debug!("recording saved to {}", self.path.display());
            Ok(())
        } else {
            Err(DeviceError::with_status(
                &self.program,
                format!("recording to {} failed", self.path.display()),
                status,
                &stderr,
            )
            .into())
        }
    }
}

/// Reads `pipe` to the end on its own thread, keeping the last few KiB.
fn drain_tail(mut pipe: ChildStderr) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut tail = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    tail.extend_from_slice(&buf[..n]);
                    if tail.len() > STDERR_TAIL {
                        let excess = tail.len() - STDERR_TAIL;
                        tail.drain(..excess);
                    }
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        tail
    })
}

fn stopped_cleanly(status: ExitStatus) -> bool {
    status.success() || ended_by_sigint(status)
}

pub struct ProcessCamera {
    programs: Programs,
    settings: CameraSettings,
    recording: Option<Recording>,
}

impl ProcessCamera {
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    fn ensure_idle(&self, action: &str) -> Result<(), CaptureError> {
        match self.recording {
            Some(ref recording) => Err(DeviceError::new(
                &recording.program,
                format!("cannot {} while recording", action),
            )
            .into()),
            None => Ok(()),
        }
    }
}

impl Camera for ProcessCamera {
    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CaptureError> {
        self.ensure_idle("change resolution")?;
        self.settings.resolution = resolution;
        Ok(())
    }

    fn set_framerate(&mut self, framerate: u32) -> Result<(), CaptureError> {
        self.ensure_idle("change framerate")?;
        self.settings.framerate = framerate;
        Ok(())
    }

    fn start_recording(
        &mut self,
        path: &Path,
        options: &VideoOptions,
    ) -> Result<(), CaptureError> {
        self.ensure_idle("start another recording")?;

        let program = &self.programs.video;
        let args = video_args(&self.settings, options, path);
        debug!("starting `{} {:?}`", program, args);

        self.recording = Some(Recording::spawn(program, &args, path)?);
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<(), CaptureError> {
        match self.recording.take() {
            Some(recording) => recording.finish(),
            None => Err(DeviceError::new(
                &self.programs.video,
                "no recording in progress".to_owned(),
            )
            .into()),
        }
    }

    fn poll_recording(&mut self) -> Result<bool, CaptureError> {
        let status = match self.recording {
            Some(ref mut recording) => recording.child.try_wait()?,
            None => return Ok(false),
        };
        match status {
            None => Ok(true),
            // left in place for stop_recording to collect
            Some(status) if stopped_cleanly(status) => Ok(false),
            Some(_) => match self.recording.take() {
                Some(recording) => recording.finish().map(|()| false),
                None => Ok(false),
            },
        }
    }

    fn capture(&mut self, path: &Path) -> Result<(), CaptureError> {
        self.ensure_idle("capture a still")?;

        let program = &self.programs.still;
        let args = still_args(&self.settings, path);
        trace!("running `{} {:?}`", program, args);

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| DeviceError::new(program, format!("failed to start: {}", err)))?;

        if !output.status.success() {
            return Err(DeviceError::with_status(
                program,
                format!("capture to {} failed", path.display()),
                output.status,
                &output.stderr,
            )
            .into());
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        let result = match self.recording.take() {
            Some(recording) => recording.finish(),
            None => Ok(()),
        };
        debug!("camera closed");
        result
    }
}

fn video_args(settings: &CameraSettings, options: &VideoOptions, path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--nopreview".to_owned(),
        // record until stopped
        "--timeout".to_owned(),
        "0".to_owned(),
        "--width".to_owned(),
        settings.resolution.width.to_string(),
        "--height".to_owned(),
        settings.resolution.height.to_string(),
        "--framerate".to_owned(),
        settings.framerate.to_string(),
        "--bitrate".to_owned(),
        options.bitrate.to_string(),
        "--qp".to_owned(),
        options.quality.to_string(),
        "--output".to_owned(),
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(path.as_os_str().to_owned());
    args
}

fn still_args(settings: &CameraSettings, path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--nopreview".to_owned(),
        "--timeout".to_owned(),
        STILL_SETTLE_MS.to_string(),
        "--width".to_owned(),
        settings.resolution.width.to_string(),
        "--height".to_owned(),
        settings.resolution.height.to_string(),
        "--encoding".to_owned(),
        "jpg".to_owned(),
        "--output".to_owned(),
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(path.as_os_str().to_owned());
    args
}

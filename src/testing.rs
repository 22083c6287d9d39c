//! Test doubles for the camera and the clock.

use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use parking_lot::Mutex;

use crate::camera::{Camera, CameraModule};
use crate::error::{CaptureError, DeviceError};
use crate::interrupt::Wake;
use crate::schedule::Clock;
use crate::settings::{Resolution, VideoOptions};

/// 2024-03-01 at the given local time.
pub(crate) fn at(hour: u32, min: u32, sec: u32, milli: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_milli_opt(hour, min, sec, milli)
        .unwrap()
}

struct ClockState {
    now: NaiveDateTime,
    waits: Vec<Duration>,
    interrupted: bool,
    /// Raise the interrupt once this many waits have completed.
    interrupt_after: Option<usize>,
}

/// A clock whose waits return at once and advance time by the waited amount.
#[derive(Clone)]
pub(crate) struct FakeClock {
    state: Arc<Mutex<ClockState>>,
}

impl FakeClock {
    pub(crate) fn new(now: NaiveDateTime) -> FakeClock {
        FakeClock {
            state: Arc::new(Mutex::new(ClockState {
                now,
                waits: Vec::new(),
                interrupted: false,
                interrupt_after: None,
            })),
        }
    }

    pub(crate) fn interrupt_after(self, waits: usize) -> FakeClock {
        self.state.lock().interrupt_after = Some(waits);
        self
    }

    pub(crate) fn interrupt(&self) {
        self.state.lock().interrupted = true;
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut state = self.state.lock();
        state.now += TimeDelta::from_std(by).unwrap();
    }

    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.state.lock().waits.clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        self.state.lock().now
    }

    fn wait(&self, limit: Option<Duration>) -> Wake {
        let mut state = self.state.lock();
        if state.interrupted {
            return Wake::Interrupted;
        }
        match limit {
            // nothing else would ever raise the interrupt
            None => {
                state.interrupted = true;
                Wake::Interrupted
            }
            Some(limit) => {
                if state.interrupt_after == Some(state.waits.len()) {
                    state.interrupted = true;
                    return Wake::Interrupted;
                }
                state.now += TimeDelta::from_std(limit).unwrap();
                state.waits.push(limit);
                Wake::Elapsed
            }
        }
    }

    fn interrupted(&self) -> bool {
        self.state.lock().interrupted
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Open,
    SetResolution(Resolution),
    SetFramerate(u32),
    StartRecording(PathBuf, VideoOptions),
    StopRecording,
    Capture(PathBuf, NaiveDateTime),
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fault {
    Open,
    StartRecording,
    /// The recording fails while it is being waited on.
    RecordingFails,
    /// The recording ends cleanly by itself, as on a terminal Ctrl-C.
    RecordingEnds,
    /// Fail the capture with this index.
    Capture(usize),
    /// Raise the interrupt and then fail the capture with this index.
    InterruptedCapture(usize),
    /// Fail the capture with this index as if SIGINT killed it, without
    /// raising the interrupt.
    SigintCapture(usize),
}

/// Records every call made against it.
#[derive(Clone)]
pub(crate) struct MockModule {
    calls: Arc<Mutex<Vec<Call>>>,
    clock: FakeClock,
    capture_latency: Duration,
    fault: Option<Fault>,
}

impl MockModule {
    pub(crate) fn new(clock: FakeClock) -> MockModule {
        MockModule {
            calls: Arc::new(Mutex::new(Vec::new())),
            clock,
            capture_latency: Duration::ZERO,
            fault: None,
        }
    }

    pub(crate) fn with_capture_latency(mut self, latency: Duration) -> MockModule {
        self.capture_latency = latency;
        self
    }

    pub(crate) fn with_fault(mut self, fault: Fault) -> MockModule {
        self.fault = Some(fault);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub(crate) fn captures(&self) -> Vec<(PathBuf, NaiveDateTime)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Capture(path, when) => Some((path.clone(), *when)),
                _ => None,
            })
            .collect()
    }
}

fn fault(message: &str) -> CaptureError {
    DeviceError::new("mock", message.to_owned()).into()
}

impl CameraModule for MockModule {
    type CameraType = MockCamera;

    fn name(&self) -> &str {
        "mock"
    }

    fn open(&mut self) -> Result<MockCamera, CaptureError> {
        self.calls.lock().push(Call::Open);
        if self.fault == Some(Fault::Open) {
            return Err(fault("camera not detected"));
        }
        Ok(MockCamera {
            module: self.clone(),
            captures: 0,
        })
    }
}

pub(crate) struct MockCamera {
    module: MockModule,
    captures: usize,
}

impl MockCamera {
    fn push(&self, call: Call) {
        self.module.calls.lock().push(call);
    }
}

impl Camera for MockCamera {
    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CaptureError> {
        self.push(Call::SetResolution(resolution));
        Ok(())
    }

    fn set_framerate(&mut self, framerate: u32) -> Result<(), CaptureError> {
        self.push(Call::SetFramerate(framerate));
        Ok(())
    }

    fn start_recording(
        &mut self,
        path: &Path,
        options: &VideoOptions,
    ) -> Result<(), CaptureError> {
        self.push(Call::StartRecording(path.to_owned(), options.clone()));
        if self.module.fault == Some(Fault::StartRecording) {
            return Err(fault("out of resources"));
        }
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<(), CaptureError> {
        self.push(Call::StopRecording);
        Ok(())
    }

    fn poll_recording(&mut self) -> Result<bool, CaptureError> {
        match self.module.fault {
            Some(Fault::RecordingFails) => Err(fault("encoder exited")),
            Some(Fault::RecordingEnds) => Ok(false),
            _ => Ok(true),
        }
    }

    fn capture(&mut self, path: &Path) -> Result<(), CaptureError> {
        let index = self.captures;
        self.captures += 1;

        let clock = &self.module.clock;
        self.push(Call::Capture(path.to_owned(), clock.now()));
        clock.advance(self.module.capture_latency);

        match self.module.fault {
            Some(Fault::Capture(n)) if n == index => Err(fault("capture timed out")),
            Some(Fault::InterruptedCapture(n)) if n == index => {
                clock.interrupt();
                Err(fault("killed by signal"))
            }
            Some(Fault::SigintCapture(n)) if n == index => Err(DeviceError::with_status(
                "mock",
                "capture interrupted".to_owned(),
                ExitStatus::from_raw(libc::SIGINT),
                b"",
            )
            .into()),
            _ => Ok(()),
        }
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        self.push(Call::Close);
        Ok(())
    }
}

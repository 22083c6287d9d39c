use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use scopeguard::{guard, ScopeGuard};
use tracing::{debug, error, info};

use crate::camera::{Camera, CameraModule};
use crate::config::RecordConfig;
use crate::error::CaptureError;
use crate::interrupt::Wake;
use crate::schedule::{delay_until, Clock};

/// How often a running recording is checked while waiting on it.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Records one clip as described by `config`.
///
/// Blocks for the configured duration, or until `clock` is interrupted. An
/// interrupt stops the recording early and is not an error. A recording that
/// fails on the device side is reported as soon as it is noticed. The camera
/// is closed exactly once whichever way this returns.
pub fn record<M, C>(module: &mut M, config: &RecordConfig, clock: &C) -> Result<Wake, CaptureError>
where
    M: CameraModule,
    C: Clock,
{
    match config.duration() {
        Some(duration) => info!(
            "Starting to record video for {} seconds.",
            duration.as_secs()
        ),
        None => info!("Starting to record video until interrupted."),
    }
    info!("The movie will be saved as {}.", config.path.display());

    let mut camera = guard(module.open()?, |mut camera| {
        if let Err(err) = camera.close() {
            error!("failed to close camera: {}", err);
        }
    });
    debug!("camera opened with {} backend", module.name());

    let wake = record_clip(&mut *camera, config, clock)?;

    ScopeGuard::into_inner(camera).close()?;
    Ok(wake)
}

fn record_clip<T, C>(camera: &mut T, config: &RecordConfig, clock: &C) -> Result<Wake, CaptureError>
where
    T: Camera,
    C: Clock,
{
    camera.set_resolution(config.resolution)?;
    camera.set_framerate(config.framerate)?;
    camera.start_recording(&config.path, &config.video_options())?;

    let wake = wait_recording(camera, config.duration(), clock)?;
    if wake == Wake::Interrupted {
        info!("Interrupted. Stopping...");
    }

    camera.stop_recording()?;
    Ok(wake)
}

/// Waits out `duration` in slices of [`POLL_INTERVAL`], checking on the
/// recording after each one.
fn wait_recording<T, C>(camera: &mut T, duration: Option<Duration>, clock: &C) -> Result<Wake, CaptureError>
where
    T: Camera,
    C: Clock,
{
    let deadline = duration.map(|duration| {
        TimeDelta::from_std(duration)
            .ok()
            .and_then(|duration| clock.now().checked_add_signed(duration))
            .unwrap_or(NaiveDateTime::MAX)
    });

    loop {
        let slice = match deadline {
            Some(deadline) => {
                let left = delay_until(deadline, clock.now());
                if left.is_zero() {
                    return Ok(Wake::Elapsed);
                }
                left.min(POLL_INTERVAL)
            }
            None => POLL_INTERVAL,
        };

        if clock.wait(Some(slice)) == Wake::Interrupted {
            return Ok(Wake::Interrupted);
        }
        if !camera.poll_recording()? {
            debug!("recording ended by itself");
            return Ok(Wake::Interrupted);
        }
    }
}

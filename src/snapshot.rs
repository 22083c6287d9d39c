use std::io;
use std::path::Path;

use scopeguard::{guard, ScopeGuard};
use tracing::{debug, error, info};

use crate::camera::{Camera, CameraModule};
use crate::config::SnapshotConfig;
use crate::error::{CaptureError, ConfigError};
use crate::interrupt::Wake;
use crate::schedule::{next_boundary, snapshot_path, wait_until, Clock, TIMESTAMP_FORMAT};

/// Captures a still every `config.seconds` until `clock` is interrupted.
///
/// Captures start on a whole second and stay on whole seconds: each target is
/// taken from the time the previous wait ended, so capture latency does not
/// add up. Returns the number of images written. The camera is closed exactly
/// once whichever way this returns.
pub fn run<M, C>(module: &mut M, config: &SnapshotConfig, clock: &C) -> Result<usize, CaptureError>
where
    M: CameraModule,
    C: Clock,
{
    check_directory(&config.path)?;

    info!("Taking pictures every {} seconds.", config.seconds);
    info!(
        "They will be stored as {}.",
        config
            .path
            .join(format!("img{{{}}}.jpg", TIMESTAMP_FORMAT))
            .display()
    );

    let mut camera = guard(module.open()?, |mut camera| {
        if let Err(err) = camera.close() {
            error!("failed to close camera: {}", err);
        }
    });
    debug!("camera opened with {} backend", module.name());

    let captured = capture_loop(&mut *camera, config, clock)?;

    ScopeGuard::into_inner(camera).close()?;
    Ok(captured)
}

fn check_directory(path: &Path) -> Result<(), CaptureError> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("path {} does not exist", path.display()),
        )
        .into());
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory(path.display().to_string()).into());
    }
    Ok(())
}

fn stopping(captured: usize) -> usize {
    info!("Interrupted. Stopping...");
    captured
}

fn capture_loop<T, C>(camera: &mut T, config: &SnapshotConfig, clock: &C) -> Result<usize, CaptureError>
where
    T: Camera,
    C: Clock,
{
    camera.set_resolution(config.resolution)?;

    let mut captured = 0;
    if wait_until(clock, next_boundary(clock.now(), 1)) == Wake::Interrupted {
        return Ok(stopping(captured));
    }

    loop {
        let now = clock.now();
        let until = next_boundary(now, config.seconds);
        let path = snapshot_path(&config.path, now);

        match camera.capture(&path) {
            Ok(()) => {
                captured += 1;
                info!("Captured {}", path.display());
            }
            // the terminal sends the interrupt to the capture process too,
            // possibly before the handler here has run
            Err(err) if err.interrupted() || clock.interrupted() => {
                debug!("capture ended by interrupt: {}", err);
                return Ok(stopping(captured));
            }
            Err(err) => return Err(err),
        }

        if wait_until(clock, until) == Wake::Interrupted {
            return Ok(stopping(captured));
        }
    }
}

use std::error;
use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use crate::settings::RESOLUTIONS;

/// Represents a failure reported by the camera backend.
pub struct DeviceError {
    program: String,
    message: String,
    status: Option<ExitStatus>,
    stderr: String,
}

impl DeviceError {
    pub fn new(program: &str, message: String) -> DeviceError {
        DeviceError {
            program: program.to_owned(),
            message,
            status: None,
            stderr: String::new(),
        }
    }

    pub fn with_status(
        program: &str,
        message: String,
        status: ExitStatus,
        stderr: &[u8],
    ) -> DeviceError {
        DeviceError {
            program: program.to_owned(),
            message,
            status: Some(status),
            stderr: String::from_utf8_lossy(stderr).trim().to_owned(),
        }
    }

    /// The program that reported the failure.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Output the process left on stderr, possibly only its tail.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Whether the process was stopped by SIGINT rather than failing.
    pub fn interrupted(&self) -> bool {
        self.status.map_or(false, ended_by_sigint)
    }

    /// Describes how the backend process ended.
    pub fn status(&self) -> String {
        match self.status {
            None => "not started".to_owned(),
            Some(status) => match (status.code(), status.signal()) {
                (Some(code), _) => format!("exit code {}", code),
                (None, Some(signal)) => format!("killed by signal {}", signal),
                (None, None) => "unknown".to_owned(),
            },
        }
    }
}

/// A terminal Ctrl-C reaches the backend tools as well as this process.
pub(crate) fn ended_by_sigint(status: ExitStatus) -> bool {
    status.signal() == Some(libc::SIGINT) || status.code() == Some(128 + libc::SIGINT)
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.program, self.message)?;

        // no status means the process never ran
        if self.status.is_some() {
            write!(f, " Status: {}", self.status())?;
        }
        if !self.stderr.is_empty() {
            write!(f, " Output: {}", self.stderr)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "DeviceError {{ program: {}, message: {}, status: {}, stderr: {:?} }}",
            self.program,
            self.message,
            self.status(),
            self.stderr,
        )
    }
}

impl error::Error for DeviceError {}

/// Invalid values supplied by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownResolution(String),
    NotADirectory(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::UnknownResolution(value) => {
                let names: Vec<&str> = RESOLUTIONS.iter().map(|(name, _)| *name).collect();
                write!(
                    f,
                    "unknown resolution \"{}\". Resolution should be one of {}",
                    value,
                    names.join(", ")
                )
            }
            ConfigError::NotADirectory(path) => write!(f, "path {} is not a directory", path),
        }
    }
}

impl error::Error for ConfigError {}

/// Represents any error returned when calling a camera function.
#[derive(Debug)]
pub struct CaptureError(Box<ErrorKind>);

impl CaptureError {
    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Whether this is a backend process that was stopped by SIGINT.
    pub fn interrupted(&self) -> bool {
        match *self.kind() {
            ErrorKind::Device(ref err) => err.interrupted(),
            _ => false,
        }
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    Config(ConfigError),
    Device(DeviceError),
    Io(io::Error),
    Signal(ctrlc::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.kind() {
            ErrorKind::Config(ref err) => write!(f, "Config error: {}", err),
            ErrorKind::Device(ref err) => write!(f, "Device error: {}", err),
            ErrorKind::Io(ref err) => write!(f, "IO error: {}", err),
            ErrorKind::Signal(ref err) => write!(f, "Signal error: {}", err),
        }
    }
}

impl error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self.kind() {
            ErrorKind::Config(ref err) => Some(err),
            ErrorKind::Device(ref err) => Some(err),
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Signal(ref err) => Some(err),
        }
    }
}

impl From<ConfigError> for CaptureError {
    fn from(err: ConfigError) -> CaptureError {
        CaptureError(Box::new(ErrorKind::Config(err)))
    }
}

impl From<DeviceError> for CaptureError {
    fn from(err: DeviceError) -> CaptureError {
        CaptureError(Box::new(ErrorKind::Device(err)))
    }
}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> CaptureError {
        CaptureError(Box::new(ErrorKind::Io(err)))
    }
}

impl From<ctrlc::Error> for CaptureError {
    fn from(err: ctrlc::Error) -> CaptureError {
        CaptureError(Box::new(ErrorKind::Signal(err)))
    }
}

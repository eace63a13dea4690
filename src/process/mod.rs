use std::fmt;

pub mod platform;
pub mod sentinel;
pub mod session;
pub mod signal;
mod stream;

pub use platform::ShellProgram;
pub use sentinel::Sentinel;
pub use session::{RunOutcome, Session};
pub use signal::{Interrupter, Terminator};

#[derive(Debug)]
pub enum ProcessError {
    /// The backing shell binary could not be launched at all.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    MissingStream(&'static str),
    /// The backing shell closed its output before echoing the sentinel.
    SessionLost,
    Io(std::io::Error),
}

impl ProcessError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Spawn { .. } | ProcessError::MissingStream(_))
    }
}

impl From<std::io::Error> for ProcessError {
    fn from(e: std::io::Error) -> Self {
        ProcessError::Io(e)
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { program, source } => {
                write!(f, "failed to start backing shell '{}': {}", program, source)
            }
            ProcessError::MissingStream(name) => write!(f, "backing shell has no {} pipe", name),
            ProcessError::SessionLost => write!(f, "backing shell exited unexpectedly"),
            ProcessError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn { source, .. } => Some(source),
            ProcessError::Io(e) => Some(e),
            _ => None,
        }
    }
}

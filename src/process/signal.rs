use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::ShellError;

/// Routes Ctrl-C to the backing shell while a forwarded command runs.
///
/// The backing shell lives in its own process group, so the terminal's
/// SIGINT only reaches the front-end. The handler re-sends it to the group
/// of whichever session is currently armed.
#[derive(Clone, Default)]
pub struct Interrupter {
    target: Arc<AtomicU32>,
}

/// Keeps a session armed for interruption until dropped.
pub struct ArmedGuard<'a> {
    interrupter: &'a Interrupter,
}

impl Interrupter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the process-wide Ctrl-C handler. May only be called once.
    pub fn install(&self, quiet: bool) -> Result<(), ShellError> {
        let target = Arc::clone(&self.target);
        ctrlc::set_handler(move || {
            let pid = target.load(Ordering::SeqCst);
            if pid != 0 {
                forward_interrupt(pid);
            } else if !quiet {
                println!("\nUse 'exit' to exit the shell");
            }
        })?;
        Ok(())
    }

    pub fn arm(&self, pid: u32) -> ArmedGuard<'_> {
        self.target.store(pid, Ordering::SeqCst);
        ArmedGuard { interrupter: self }
    }

    pub fn armed_pid(&self) -> Option<u32> {
        match self.target.load(Ordering::SeqCst) {
            0 => None,
            pid => Some(pid),
        }
    }
}

impl Drop for ArmedGuard<'_> {
    fn drop(&mut self) {
        self.interrupter.target.store(0, Ordering::SeqCst);
    }
}

#[cfg(unix)]
fn forward_interrupt(pid: u32) {
    let Ok(pgid) = i32::try_from(pid) else {
        return;
    };
    tracing::debug!(pgid, "forwarding SIGINT to backing shell");
    // SAFETY: kill(2) has no memory-safety preconditions; a negative pid
    // addresses the process group the session was spawned into.
    if unsafe { libc::kill(-pgid, libc::SIGINT) } != 0 {
        tracing::warn!(
            pgid,
            error = %std::io::Error::last_os_error(),
            "failed to interrupt backing shell"
        );
    }
}

#[cfg(not(unix))]
fn forward_interrupt(pid: u32) {
    // Console control events already reach every process attached to the
    // console, the backing shell included.
    tracing::debug!(pid, "interrupt delivered by the console");
}

/// Ends the front-end on SIGTERM or SIGHUP, taking the backing shell with it.
///
/// Signals are handled on a dedicated thread, whatever the shell loop is
/// blocked on.
#[derive(Clone, Default)]
pub struct Terminator {
    session: Arc<AtomicU32>,
}

impl Terminator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pid of the session to kill on termination.
    pub fn track(&self, pid: u32) {
        self.session.store(pid, Ordering::SeqCst);
    }

    pub fn tracked_pid(&self) -> Option<u32> {
        match self.session.load(Ordering::SeqCst) {
            0 => None,
            pid => Some(pid),
        }
    }

    /// Spawns the thread that waits for SIGTERM and SIGHUP.
    ///
    /// On the first signal the tracked session's process group is killed and
    /// reaped, and the front-end exits with status 128 + signal number.
    #[cfg(unix)]
    pub fn install(&self) -> Result<(), ShellError> {
        use signal_hook::consts::{SIGHUP, SIGTERM};
        use signal_hook::iterator::Signals;
        use std::{process, thread};

        let mut signals =
            Signals::new([SIGTERM, SIGHUP]).map_err(|e| ShellError::Signal(e.to_string()))?;
        let session = Arc::clone(&self.session);

        thread::Builder::new()
            .name("termination".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    let pid = session.load(Ordering::SeqCst);
                    tracing::info!(signal, pid, "termination signal received");
                    if pid != 0 {
                        kill_session(pid);
                    }
                    process::exit(128 + signal);
                }
            })?;
        Ok(())
    }

    /// Console close events already end the front-end and the backing shell.
    #[cfg(not(unix))]
    pub fn install(&self) -> Result<(), ShellError> {
        Ok(())
    }
}

#[cfg(unix)]
fn kill_session(pid: u32) {
    let Ok(pgid) = i32::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions; the session leads its own group.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        tracing::warn!(
            pgid,
            error = %std::io::Error::last_os_error(),
            "failed to kill backing shell"
        );
        return;
    }
    // SAFETY: a null status pointer is allowed; fails with ECHILD if the main thread reaped first.
    unsafe { libc::waitpid(pgid, std::ptr::null_mut(), 0) };
}

use std::io::{self, Read, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use super::sentinel::{LineKind, Sentinel};
use super::stream::{wait_readable, ErrorDrain};
use super::{ProcessError, ShellProgram};

/// The live backing shell: child process, its pipes and its working directory.
///
/// A session owns its child for its whole lifetime. Dropping a session that
/// was not shut down kills and reaps the child.
pub struct Session {
    program: ShellProgram,
    working_dir: Option<PathBuf>,
    sentinel: Sentinel,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: ChildStdout,
    stderr: Option<ErrorDrain>,
    /// stdout bytes read past the last complete line.
    pending: Vec<u8>,
    live: bool,
}

/// What a forwarded command produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// stdout lines forwarded to the terminal, sentinel excluded.
    pub lines: usize,
    /// stderr bytes forwarded to the terminal.
    pub error_bytes: usize,
}

impl Session {
    /// Launches `program` in `working_dir`, or in the inherited directory.
    pub fn start(program: &ShellProgram, working_dir: Option<&Path>) -> Result<Self, ProcessError> {
        let mut command = Command::new(&program.program);
        command
            .args(&program.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());

        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.stderr(Stdio::piped()).process_group(0);
        }
        #[cfg(not(unix))]
        command.stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.program.clone(),
            source,
        })?;

        let streams = match take_streams(&mut child) {
            Ok(streams) => streams,
            Err(e) => {
                reap(&mut child);
                return Err(e);
            }
        };
        let (stdin, stdout, stderr) = streams;

        tracing::info!(
            pid = child.id(),
            shell = %program.display_name(),
            dir = ?working_dir,
            "backing shell started"
        );

        Ok(Session {
            program: program.clone(),
            working_dir: working_dir.map(Path::to_path_buf),
            sentinel: Sentinel::random(),
            child,
            stdin: Some(stdin),
            stdout,
            stderr,
            pending: Vec::new(),
            live: true,
        })
    }

    /// Forwards `command` and copies its output until the sentinel comes back.
    ///
    /// stderr is drained without blocking before stdout is read, whenever it
    /// has data while stdout is awaited, and once more after the sentinel.
    /// Lines are written to `out` byte for byte.
    pub fn run(
        &mut self,
        command: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<RunOutcome, ProcessError> {
        if !self.live {
            return Err(ProcessError::SessionLost);
        }

        let composed = self.sentinel.compose(command);
        tracing::debug!(pid = self.pid(), command, "forwarding command");
        self.send(composed.as_bytes())?;

        let mut outcome = RunOutcome {
            error_bytes: self.drain_errors(err)?,
            ..RunOutcome::default()
        };

        loop {
            let Some(line) = self.next_line(err, &mut outcome.error_bytes)? else {
                tracing::warn!(pid = self.pid(), "backing shell closed stdout before the sentinel");
                self.drain_errors(err)?;
                self.terminate();
                return Err(ProcessError::SessionLost);
            };

            match self.sentinel.classify(&line) {
                LineKind::Output => {
                    out.write_all(&line)?;
                    out.flush()?;
                    outcome.lines += 1;
                }
                LineKind::End(prefix) => {
                    if !prefix.is_empty() {
                        out.write_all(prefix)?;
                        out.write_all(b"\n")?;
                        outcome.lines += 1;
                    }
                    break;
                }
            }
        }
        out.flush()?;

        outcome.error_bytes += self.drain_errors(err)?;
        tracing::debug!(lines = outcome.lines, error_bytes = outcome.error_bytes, "command finished");
        Ok(outcome)
    }

    /// Replaces this session with a fresh one started in `dir`.
    ///
    /// The old child is killed and reaped first. If the new shell cannot be
    /// spawned the session stays dead and the error is returned.
    pub fn restart(&mut self, dir: &Path) -> Result<(), ProcessError> {
        tracing::info!(pid = self.pid(), dir = %dir.display(), "restarting backing shell");
        self.terminate();
        let next = Session::start(&self.program, Some(dir))?;
        *self = next;
        Ok(())
    }

    /// Closes stdin and waits for the shell to exit on its own.
    pub fn shutdown(&mut self) -> Result<(), ProcessError> {
        if !self.live {
            return Ok(());
        }

        drop(self.stdin.take());
        self.live = false;
        let status = self.child.wait()?;
        tracing::info!(pid = self.pid(), %status, "backing shell exited");
        Ok(())
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    pub fn program(&self) -> &ShellProgram {
        &self.program
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), ProcessError> {
        let stdin = self.stdin.as_mut().ok_or(ProcessError::SessionLost)?;
        match stdin.write_all(bytes).and_then(|()| stdin.flush()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::warn!(pid = self.pid(), "backing shell stdin is closed");
                self.terminate();
                Err(ProcessError::SessionLost)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Next stdout line, newline included. `None` once stdout hits EOF.
    ///
    /// A trailing fragment without a newline is returned as the last line.
    fn next_line(
        &mut self,
        err: &mut dyn Write,
        error_bytes: &mut usize,
    ) -> Result<Option<Vec<u8>>, ProcessError> {
        let mut chunk = [0u8; 8192];
        loop {
            if let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
                return Ok(Some(self.pending.drain(..=end).collect()));
            }

            let ready = wait_readable(&self.stdout, self.stderr.as_ref())?;
            if ready.stderr {
                *error_bytes += self.drain_errors(err)?;
            }
            if !ready.stdout {
                continue;
            }

            match self.stdout.read(&mut chunk) {
                Ok(0) if self.pending.is_empty() => return Ok(None),
                Ok(0) => return Ok(Some(mem::take(&mut self.pending))),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn drain_errors(&mut self, err: &mut dyn Write) -> Result<usize, ProcessError> {
        match self.stderr.as_mut() {
            Some(drain) => Ok(drain.drain(err)?),
            None => Ok(0),
        }
    }

    /// Kills and reaps the child. Safe to call more than once.
    fn terminate(&mut self) {
        if !self.live {
            return;
        }

        drop(self.stdin.take());
        self.live = false;
        reap(&mut self.child);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.terminate();
    }
}

type Streams = (ChildStdin, ChildStdout, Option<ErrorDrain>);

fn take_streams(child: &mut Child) -> Result<Streams, ProcessError> {
    let stdin = child.stdin.take().ok_or(ProcessError::MissingStream("stdin"))?;
    let stdout = child.stdout.take().ok_or(ProcessError::MissingStream("stdout"))?;
    let stderr = match child.stderr.take() {
        Some(stderr) => Some(ErrorDrain::new(stderr)?),
        None => None,
    };
    Ok((stdin, stdout, stderr))
}

fn reap(child: &mut Child) {
    // kill fails with InvalidInput once the child has already been reaped
    if let Err(e) = child.kill() {
        tracing::debug!(pid = child.id(), error = %e, "kill skipped");
    }
    match child.wait() {
        Ok(status) => tracing::debug!(pid = child.id(), %status, "backing shell reaped"),
        Err(e) => tracing::warn!(pid = child.id(), error = %e, "failed to reap backing shell"),
    }
}

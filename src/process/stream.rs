use std::io::{self, Read, Write};
use std::process::{ChildStderr, ChildStdout};

/// Error stream of the backing shell, read without ever blocking.
///
/// Only bytes already sitting in the pipe are forwarded. Waiting on stderr
/// while the shell is blocked writing stdout would deadlock both sides.
pub(crate) struct ErrorDrain {
    stderr: ChildStderr,
    closed: bool,
}

impl ErrorDrain {
    pub(crate) fn new(stderr: ChildStderr) -> io::Result<Self> {
        set_nonblocking(&stderr)?;
        Ok(Self {
            stderr,
            closed: false,
        })
    }

    /// Copies whatever is currently buffered to `out`, returning the byte count.
    pub(crate) fn drain(&mut self, out: &mut dyn Write) -> io::Result<usize> {
        if self.closed {
            return Ok(0);
        }

        let mut buf = [0u8; 4096];
        let mut total = 0;
        loop {
            match self.stderr.read(&mut buf) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(n) => {
                    out.write_all(&buf[..n])?;
                    total += n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }
        out.flush()?;
        Ok(total)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Which of the backing shell's output pipes can be read without blocking.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Readiness {
    pub(crate) stdout: bool,
    pub(crate) stderr: bool,
}

/// Blocks until stdout or the still-open stderr has data or hung up.
///
/// A shell writing a lot to stderr stalls until someone reads it, so stderr
/// must be watched for as long as stdout is awaited.
#[cfg(unix)]
pub(crate) fn wait_readable(
    stdout: &ChildStdout,
    stderr: Option<&ErrorDrain>,
) -> io::Result<Readiness> {
    use std::os::unix::io::AsRawFd;

    let watch = |fd| libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // poll(2) skips entries with a negative fd
    let stderr_fd = match stderr {
        Some(drain) if !drain.is_closed() => drain.stderr.as_raw_fd(),
        _ => -1,
    };
    let mut fds = [watch(stdout.as_raw_fd()), watch(stderr_fd)];

    loop {
        // SAFETY: `fds` is a live array of two pollfd entries for the whole call,
        // and both descriptors are owned by pipes that outlive it.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc >= 0 {
            break;
        }
        let e = io::Error::last_os_error();
        if e.kind() != io::ErrorKind::Interrupted {
            return Err(e);
        }
    }

    // POLLHUP and POLLERR count as readable: the next read reports EOF or the error.
    let ready = |entry: &libc::pollfd| entry.fd >= 0 && entry.revents != 0;
    Ok(Readiness {
        stdout: ready(&fds[0]),
        stderr: ready(&fds[1]),
    })
}

#[cfg(not(unix))]
pub(crate) fn wait_readable(
    _stdout: &ChildStdout,
    _stderr: Option<&ErrorDrain>,
) -> io::Result<Readiness> {
    Ok(Readiness {
        stdout: true,
        stderr: false,
    })
}

#[cfg(unix)]
fn set_nonblocking(stderr: &ChildStderr) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let fd = stderr.as_raw_fd();
    // SAFETY: fd is owned by `stderr` and stays open for the duration of both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above; only the O_NONBLOCK bit is added to the existing flags.
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// Anonymous pipes cannot be switched to non-blocking mode here; the session
// lets the shell's stderr go straight to the terminal instead.
#[cfg(not(unix))]
fn set_nonblocking(_stderr: &ChildStderr) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "non-blocking stderr is only available on unix",
    ))
}

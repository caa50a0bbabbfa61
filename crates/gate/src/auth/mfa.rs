// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive one-time-code prompt over the controlling terminal.
//!
//! The MCP transport owns this process's stdin and stdout, so the prompt
//! must never touch either stream: a code read from stdin would really be a
//! protocol frame, and prompt text on stdout would corrupt the frame stream.
//! [`TtyPrompt`] therefore opens `/dev/tty` directly, in non-blocking mode,
//! and drives it through an [`AsyncFd`] readiness loop so the timeout can
//! cancel the read and close the handle.

use std::io;
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::time::Duration;

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use tokio::io::unix::AsyncFd;

use crate::error::AuthError;

/// How long the operator has to type a code before the sign-in attempt fails.
pub const DEFAULT_CODE_TIMEOUT: Duration = Duration::from_secs(120);

const TTY_PATH: &str = "/dev/tty";

/// The control channel a one-time code is read from.
///
/// Injected into the strategy dispatcher so the interactive flow can be
/// exercised without a terminal. Implementations must not read the process's
/// stdin, which belongs to the protocol transport.
#[allow(async_fn_in_trait)]
pub trait CodePrompt {
    /// Cheap pre-flight: can the channel be opened at all? Checked before
    /// any sign-in call is issued.
    fn available(&self) -> Result<(), AuthError>;

    /// Prompt and read one line, bounded by `timeout`.
    async fn read_code(&self, timeout: Duration) -> Result<String, AuthError>;
}

/// [`CodePrompt`] backed by the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtyPrompt;

impl CodePrompt for TtyPrompt {
    fn available(&self) -> Result<(), AuthError> {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(TTY_PATH)
            .map(drop)
            .map_err(|e| AuthError::MfaChannelUnavailable { reason: format!("{TTY_PATH}: {e}") })
    }

    async fn read_code(&self, timeout: Duration) -> Result<String, AuthError> {
        let afd = open_tty()?;
        write_all(&afd, b"vault one-time code: ").await.map_err(channel_err)?;
        let code = read_code_from(&afd, timeout).await?;
        // Move to a fresh line so later tty writers don't append to the echo.
        let _ = write_all(&afd, b"\r\n").await;
        Ok(code)
    }
}

/// Newtype wrapper around `OwnedFd` for use with `AsyncFd`.
#[derive(Debug)]
pub struct TtyFd(pub OwnedFd);

impl AsRawFd for TtyFd {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.0.as_raw_fd()
    }
}

/// Read one line from the channel, bounded by `timeout`.
///
/// Dropping the read on timeout is safe: the fd is non-blocking and no
/// partial state is held outside this future.
pub async fn read_code_from(afd: &AsyncFd<TtyFd>, timeout: Duration) -> Result<String, AuthError> {
    match tokio::time::timeout(timeout, read_line(afd)).await {
        Ok(Ok(line)) => Ok(line.trim().to_owned()),
        Ok(Err(e)) => Err(channel_err(e)),
        Err(_elapsed) => Err(AuthError::MfaTimeout { waited: timeout }),
    }
}

fn open_tty() -> Result<AsyncFd<TtyFd>, AuthError> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(OFlag::O_NOCTTY.bits())
        .open(TTY_PATH)
        .map_err(|e| AuthError::MfaChannelUnavailable { reason: format!("{TTY_PATH}: {e}") })?;
    let fd = OwnedFd::from(file);
    set_nonblocking(&fd).map_err(channel_err)?;
    AsyncFd::new(TtyFd(fd)).map_err(channel_err)
}

fn channel_err(e: io::Error) -> AuthError {
    AuthError::MfaChannelUnavailable { reason: e.to_string() }
}

/// Set the given file descriptor to non-blocking mode.
pub fn set_nonblocking(fd: &impl AsFd) -> io::Result<()> {
    let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(io_err)?;
    let flags = OFlag::from_bits_truncate(flags);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK)).map_err(io_err)?;
    Ok(())
}

async fn read_line(afd: &AsyncFd<TtyFd>) -> io::Result<String> {
    let mut line: Vec<u8> = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        let n = read_chunk(afd, &mut buf).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "terminal closed"));
        }
        for &b in &buf[..n] {
            if b == b'\n' || b == b'\r' {
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            line.push(b);
        }
    }
}

/// Read a chunk of data from the async fd.
async fn read_chunk(afd: &AsyncFd<TtyFd>, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let mut guard = afd.readable().await?;
        match guard.try_io(|inner| {
            let n = nix::unistd::read(&inner.get_ref().0, buf).map_err(io_err)?;
            Ok(n)
        }) {
            Ok(result) => return result,
            Err(_would_block) => continue,
        }
    }
}

/// Write all data to the async fd.
pub async fn write_all(afd: &AsyncFd<TtyFd>, data: &[u8]) -> io::Result<()> {
    let mut offset = 0;
    while offset < data.len() {
        let mut guard = afd.writable().await?;
        match guard.try_io(|inner| {
            let n = nix::unistd::write(&inner.get_ref().0, &data[offset..]).map_err(io_err)?;
            Ok(n)
        }) {
            Ok(Ok(n)) => offset += n,
            Ok(Err(e)) => return Err(e),
            Err(_would_block) => continue,
        }
    }
    Ok(())
}

fn io_err(e: nix::errno::Errno) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

#[cfg(test)]
#[path = "mfa_tests.rs"]
mod tests;

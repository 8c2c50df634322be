//! # Stop signal for the dinner.
//!
//! [`wait_for_stop_signal`] completes when any of these happens first:
//! - the stop byte (default `n`) is read from stdin
//! - stdin reaches end of input
//! - the process receives a termination signal
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! Stdin is read on a dedicated OS thread: a blocked read must never hold up
//! runtime shutdown.

use std::io::{self, BufRead};

use tokio::sync::oneshot;
use tracing::warn;

/// What ended the dinner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopCause {
    /// The stop byte was read.
    StopByte,
    /// Stdin was closed.
    EndOfInput,
    /// An OS termination signal arrived.
    Signal,
}

/// Consumes `reader` up to and including the first `stop` byte.
pub(crate) fn read_until_stop_byte<R: BufRead>(mut reader: R, stop: u8) -> io::Result<StopCause> {
    loop {
        let (found, used) = {
            let buf = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                return Ok(StopCause::EndOfInput);
            }
            match buf.iter().position(|&b| b == stop) {
                Some(at) => (true, at + 1),
                None => (false, buf.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(StopCause::StopByte);
        }
    }
}

/// Starts a thread watching stdin; the receiver resolves once it stops.
fn watch_stdin(stop: u8) -> oneshot::Receiver<StopCause> {
    let (tx, rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("stdin-watcher".into())
        .spawn(move || {
            let cause = match read_until_stop_byte(io::stdin().lock(), stop) {
                Ok(cause) => cause,
                Err(e) => {
                    warn!(error = %e, "stdin unreadable, treating as end of input");
                    StopCause::EndOfInput
                }
            };
            let _ = tx.send(cause);
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not watch stdin, only OS signals will stop the dinner");
    }
    rx
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_os_signal() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when Ctrl-C is received, or `Err` if registration fails.
#[cfg(not(unix))]
pub async fn wait_for_os_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Waits for the stop byte on stdin, end of input, or an OS termination signal.
pub async fn wait_for_stop_signal(stop_byte: u8) -> StopCause {
    let stdin = watch_stdin(stop_byte);
    let from_stdin = async move {
        match stdin.await {
            Ok(cause) => cause,
            Err(_) => std::future::pending().await,
        }
    };
    let from_os = async {
        match wait_for_os_signal().await {
            Ok(()) => StopCause::Signal,
            Err(e) => {
                warn!(error = %e, "could not register OS signal handlers");
                std::future::pending().await
            }
        }
    };

    tokio::select! {
        cause = from_stdin => cause,
        cause = from_os => cause,
    }
}

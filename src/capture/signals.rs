//! Turns process signals into loop events
//!
//! | Signal | Event |
//! |--------|-------|
//! | SIGINT, SIGTERM, SIGHUP | `Shutdown(Interrupt)` |
//! | SIGPIPE sent with `kill` | `Shutdown(BrokenPipe)` |
//! | SIGUSR1 | `Dump` |
//!
//! A write to a closed stdout raises SIGPIPE on the writing thread only,
//! where it stays blocked and pending; the watcher never sees it. That case
//! surfaces as the `EPIPE` write error instead, which ends the loop with
//! `ShutdownReason::OutputClosed`.
//!
//! No signal handler touches the recording state; each one only sends a
//! message to the loop.

use super::{SessionEvent, ShutdownReason};
use crate::error::CaptureError;
use std::sync::mpsc::Sender;

/// Install all signal bridges.
///
/// Must run before any other thread is spawned so that every thread
/// inherits the blocked signal mask.
pub fn install(events: Sender<SessionEvent>) -> Result<(), CaptureError> {
    #[cfg(target_os = "linux")]
    watch_blocked_signals(events.clone())?;

    ctrlc::set_handler(move || {
        let _ = events.send(SessionEvent::Shutdown(ShutdownReason::Interrupt));
    })
    .map_err(|e| CaptureError::Signal(e.to_string()))
}

/// Map a synchronously received signal to its loop event
#[cfg(target_os = "linux")]
pub fn event_for(signal: nix::sys::signal::Signal) -> Option<SessionEvent> {
    use nix::sys::signal::Signal;

    match signal {
        Signal::SIGUSR1 => Some(SessionEvent::Dump),
        Signal::SIGPIPE => Some(SessionEvent::Shutdown(ShutdownReason::BrokenPipe)),
        _ => None,
    }
}

/// Block SIGUSR1 and SIGPIPE and receive them on a watcher thread
#[cfg(target_os = "linux")]
fn watch_blocked_signals(events: Sender<SessionEvent>) -> Result<(), CaptureError> {
    use nix::sys::signal::{SigSet, Signal};
    use std::thread;

    let mut set = SigSet::empty();
    set.add(Signal::SIGUSR1);
    set.add(Signal::SIGPIPE);
    set.thread_block()
        .map_err(|e| CaptureError::Signal(e.to_string()))?;

    thread::Builder::new()
        .name("signal-watcher".to_string())
        .spawn(move || loop {
            let signal = match set.wait() {
                Ok(signal) => signal,
                Err(e) => {
                    log::warn!("waiting for signals failed: {}", e);
                    return;
                }
            };
            log::debug!("received {:?}", signal);
            if let Some(event) = event_for(signal) {
                if events.send(event).is_err() {
                    return;
                }
            }
        })
        .map_err(|e| CaptureError::Signal(e.to_string()))?;
    Ok(())
}

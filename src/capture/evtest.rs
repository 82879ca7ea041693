//! `evtest` subprocess capture
//!
//! `evtest` prints one line per input event, e.g.
//!
//! ```text
//! Event: time 1700000000.123456, type 1 (EV_KEY), code 30 (KEY_A), value 1
//! ```
//!
//! Only key presses (`value 1`) are forwarded; releases, auto-repeats,
//! sync reports and mouse buttons are dropped.
//!
//! The reader thread owns the child once its output ends: it reaps it and
//! reports a non-zero exit as `Shutdown(CaptureFailed)`, which is how a bad
//! event ID or a refused `sudo` surfaces.

use super::{KeySource, SessionEvent, ShutdownReason};
use crate::error::CaptureError;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// Extract the key name from a key-press line of `evtest` output
pub fn parse_evtest_line(line: &str) -> Option<&str> {
    let line = line.trim_end();
    if !line.contains("(KEY") || !line.ends_with("value 1") {
        return None;
    }
    let start = line.rfind("KEY_")? + "KEY_".len();
    let rest = &line[start..];
    let name = &rest[..rest.rfind(')')?];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Forward every key name found in `reader` until it ends.
///
/// Returns the number of keys forwarded. Stops early if the receiving
/// side is gone.
pub fn pump_lines<R, F>(reader: R, events: &Sender<SessionEvent>, extract: F) -> u64
where
    R: BufRead,
    F: Fn(&str) -> Option<&str>,
{
    let mut forwarded = 0;
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("reading key events failed: {}", e);
                break;
            }
        };
        if let Some(name) = extract(&line) {
            if events.send(SessionEvent::key(name)).is_err() {
                break;
            }
            forwarded += 1;
        }
    }
    forwarded
}

/// Shutdown reason for a capture process that has exited.
///
/// Death by signal (Ctrl-C reaches the whole process group) is a normal
/// end of input; a non-zero exit code means the capture never worked.
pub fn closing_reason(status: ExitStatus) -> ShutdownReason {
    match status.code() {
        Some(0) | None => ShutdownReason::InputClosed,
        Some(code) => ShutdownReason::CaptureFailed(code),
    }
}

/// Child process slot shared between the source and its reader thread.
///
/// Holds the child until the reader takes it to reap; a child still in
/// the slot has not been waited on, so its PID is safe to signal.
type ChildSlot = Arc<Mutex<Option<Child>>>;

fn lock_slot(slot: &ChildSlot) -> MutexGuard<'_, Option<Child>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read_until_exit(stdout: ChildStdout, slot: ChildSlot, events: Sender<SessionEvent>) {
    let forwarded = pump_lines(BufReader::new(stdout), &events, parse_evtest_line);
    log::debug!("capture forwarded {} key(s)", forwarded);

    let child = lock_slot(&slot).take();
    let reason = match child {
        Some(mut child) => match child.wait() {
            Ok(status) => {
                log::debug!("capture process exited: {}", status);
                closing_reason(status)
            }
            Err(e) => {
                log::warn!("waiting for capture process failed: {}", e);
                ShutdownReason::InputClosed
            }
        },
        None => ShutdownReason::InputClosed,
    };
    let _ = events.send(SessionEvent::Shutdown(reason));
}

/// Key source backed by an `evtest` child process
pub struct EvtestSource {
    program: String,
    args: Vec<String>,
    child: ChildSlot,
}

impl EvtestSource {
    pub fn new(device: &Path, use_sudo: bool) -> Self {
        let device = device.display().to_string();
        let (program, args) = if use_sudo {
            ("sudo".to_string(), vec!["evtest".to_string(), device])
        } else {
            ("evtest".to_string(), vec![device])
        };
        Self::with_command(program, args)
    }

    /// Source running an arbitrary command that prints `evtest` output
    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: Arc::new(Mutex::new(None)),
        }
    }

    /// The command as it would be typed in a shell
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[cfg(target_os = "linux")]
    fn terminate(child: &mut Child) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // SIGTERM is relayed by sudo; SIGKILL would orphan evtest
        if let Err(e) = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM) {
            log::debug!("SIGTERM to capture process failed: {}", e);
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn terminate(child: &mut Child) {
        if let Err(e) = child.kill() {
            log::debug!("killing capture process failed: {}", e);
        }
    }
}

impl KeySource for EvtestSource {
    fn name(&self) -> &'static str {
        "evtest"
    }

    fn start(&mut self, events: Sender<SessionEvent>) -> Result<(), CaptureError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| CaptureError::Spawn {
                command: self.command_line(),
                source,
            })?;
        let stdout = child.stdout.take().ok_or(CaptureError::NoOutput)?;
        log::info!("capturing with `{}` (pid {})", self.command_line(), child.id());
        *lock_slot(&self.child) = Some(child);

        let slot = Arc::clone(&self.child);
        thread::Builder::new()
            .name("evtest-reader".to_string())
            .spawn(move || read_until_exit(stdout, slot, events))
            .map_err(|source| CaptureError::Spawn {
                command: "evtest reader thread".to_string(),
                source,
            })?;
        Ok(())
    }

    fn stop(&mut self) {
        // Never waits: the reader reaps the child, and may stay blocked
        // if something else still holds the pipe.
        if let Some(child) = lock_slot(&self.child).as_mut() {
            if let Ok(None) = child.try_wait() {
                Self::terminate(child);
            }
        }
    }
}

//! Events delivered to the recording loop

use std::fmt;

/// Why the recording loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Interrupt, terminate or hang-up request
    Interrupt,
    /// SIGPIPE received
    BrokenPipe,
    /// The key event source ended or failed
    InputClosed,
    /// Writing progress output failed
    OutputClosed,
    /// The capture tool exited with this non-zero status
    CaptureFailed(i32),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ShutdownReason::Interrupt => "interrupted",
            ShutdownReason::BrokenPipe => "broken pipe",
            ShutdownReason::InputClosed => "input closed",
            ShutdownReason::OutputClosed => "output closed",
            ShutdownReason::CaptureFailed(code) => {
                return write!(f, "capture tool exited with status {}", code)
            }
        };
        f.write_str(text)
    }
}

/// A message for the recording loop.
///
/// Capture threads and signal watchers only ever send these; all state
/// changes happen on the loop's own thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A key was pressed
    Key(String),
    /// Print the report and keep running
    Dump,
    /// Stop the loop and flush
    Shutdown(ShutdownReason),
}

impl SessionEvent {
    pub fn key(name: impl Into<String>) -> Self {
        SessionEvent::Key(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_display() {
        assert_eq!(ShutdownReason::Interrupt.to_string(), "interrupted");
        assert_eq!(ShutdownReason::InputClosed.to_string(), "input closed");
        assert_eq!(
            ShutdownReason::CaptureFailed(1).to_string(),
            "capture tool exited with status 1"
        );
    }

    #[test]
    fn key_constructor() {
        assert_eq!(SessionEvent::key("A"), SessionEvent::Key("A".to_string()));
    }
}

//! Key event capture and signal bridging

mod event;
pub mod evtest;
pub mod signals;
#[cfg(target_os = "linux")]
pub mod evdev_source;

pub use event::{SessionEvent, ShutdownReason};
pub use evtest::EvtestSource;
#[cfg(target_os = "linux")]
pub use evdev_source::EvdevSource;

use crate::config::{CaptureBackend, CaptureConfig};
use crate::error::CaptureError;
use std::sync::mpsc::Sender;

/// A producer of key press events
pub trait KeySource {
    /// Backend name for log messages
    fn name(&self) -> &'static str;

    /// Attach to the device and begin sending events.
    ///
    /// Sends `Shutdown(InputClosed)` once the input ends.
    fn start(&mut self, events: Sender<SessionEvent>) -> Result<(), CaptureError>;

    /// Detach from the device
    fn stop(&mut self);
}

/// Build the configured key source for an event ID
pub fn open_source(config: &CaptureConfig, event_id: u32) -> Result<Box<dyn KeySource>, CaptureError> {
    let path = config.device_path(event_id);
    match config.backend {
        CaptureBackend::Evtest => Ok(Box::new(EvtestSource::new(&path, config.use_sudo))),
        #[cfg(target_os = "linux")]
        CaptureBackend::Evdev => Ok(Box::new(EvdevSource::new(path))),
        #[cfg(not(target_os = "linux"))]
        CaptureBackend::Evdev => Err(CaptureError::Unsupported("evdev")),
    }
}

/// Parse the event ID argument
pub fn parse_event_id(arg: &str) -> Result<u32, CaptureError> {
    arg.trim()
        .parse()
        .map_err(|_| CaptureError::InvalidDevice(arg.to_string()))
}

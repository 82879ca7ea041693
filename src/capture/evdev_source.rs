//! Direct evdev capture for Linux
//!
//! Reads the device node itself instead of going through `evtest`. Needs
//! read access to `/dev/input/event*` (root or the `input` group).

use super::{KeySource, SessionEvent, ShutdownReason};
use crate::error::CaptureError;
use evdev::{Device, InputEvent, InputEventKind, Key};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;

/// Key name without the `KEY_` prefix; `None` for buttons and unnamed codes
pub fn key_name(key: Key) -> Option<String> {
    let name = format!("{:?}", key);
    name.strip_prefix("KEY_").map(str::to_string)
}

/// Key name of a press event; releases and repeats yield `None`
pub fn key_press_name(event: &InputEvent) -> Option<String> {
    match event.kind() {
        InputEventKind::Key(key) if event.value() == 1 => key_name(key),
        _ => None,
    }
}

/// Key source reading an evdev device node
pub struct EvdevSource {
    path: PathBuf,
    running: bool,
}

impl EvdevSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            running: false,
        }
    }
}

impl KeySource for EvdevSource {
    fn name(&self) -> &'static str {
        "evdev"
    }

    fn start(&mut self, events: Sender<SessionEvent>) -> Result<(), CaptureError> {
        let mut device = Device::open(&self.path).map_err(|source| CaptureError::Device {
            path: self.path.clone(),
            source,
        })?;
        log::info!(
            "capturing from {} ({})",
            self.path.display(),
            device.name().unwrap_or("unnamed device")
        );

        thread::Builder::new()
            .name("evdev-reader".to_string())
            .spawn(move || {
                loop {
                    let batch = match device.fetch_events() {
                        Ok(batch) => batch,
                        Err(e) => {
                            log::warn!("reading input device failed: {}", e);
                            break;
                        }
                    };
                    for event in batch {
                        if let Some(name) = key_press_name(&event) {
                            if events.send(SessionEvent::Key(name)).is_err() {
                                return;
                            }
                        }
                    }
                }
                let _ = events.send(SessionEvent::Shutdown(ShutdownReason::InputClosed));
            })
            .map_err(|source| CaptureError::Device {
                path: self.path.clone(),
                source,
            })?;

        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        // The reader blocks in the kernel until the next event; it is left
        // detached and ends with the process.
        if self.running {
            log::debug!("detaching evdev reader for {}", self.path.display());
            self.running = false;
        }
    }
}

//! Recording session: the store, the rate estimator and the event loop

use crate::capture::{SessionEvent, ShutdownReason};
use crate::config::{Config, DisplayConfig, ReportFormat};
use crate::record::FrequencyStore;
use crate::report::{self, FrequencyReport};
use crate::speed::{self, RateEstimator};
use crate::utils;
use std::io::{self, Write};
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// How often a status line replaces the progress dot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCadence {
    /// Every `n` events
    Fixed(u64),
    /// Derived from the terminal width on every event
    TerminalWidth { margin: u16, fallback: u64 },
}

impl StatusCadence {
    pub fn from_config(config: &DisplayConfig) -> Self {
        match config.status_interval {
            Some(n) => StatusCadence::Fixed(n.max(1)),
            None => StatusCadence::TerminalWidth {
                margin: config.status_margin,
                fallback: config.fallback_interval,
            },
        }
    }

    /// Events between status lines right now
    pub fn interval(&self) -> u64 {
        match *self {
            StatusCadence::Fixed(n) => n.max(1),
            StatusCadence::TerminalWidth { margin, fallback } => {
                utils::status_interval(utils::terminal_columns(), margin, fallback)
            }
        }
    }
}

/// One recording run.
///
/// Owns all mutable state and is only ever driven from one thread; other
/// threads talk to it through [`SessionEvent`]s.
pub struct Session<W: Write> {
    store: FrequencyStore,
    speed: RateEstimator,
    cadence: StatusCadence,
    /// Persist every this many events (0 disables)
    autosave_every: u64,
    report_format: ReportFormat,
    /// Keys typed since the session started
    typed: u64,
    start_time: Instant,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(store: FrequencyStore, speed: RateEstimator, out: W) -> Self {
        let display = DisplayConfig::default();
        Self {
            store,
            speed,
            cadence: StatusCadence::from_config(&display),
            autosave_every: 0,
            report_format: display.report_format,
            typed: 0,
            start_time: Instant::now(),
            out,
        }
    }

    pub fn from_config(config: &Config, out: W) -> Self {
        Self::new(
            FrequencyStore::new(&config.storage.path),
            RateEstimator::from_config(&config.speed),
            out,
        )
        .with_cadence(StatusCadence::from_config(&config.display))
        .with_autosave(config.storage.autosave_every)
        .with_report_format(config.display.report_format)
    }

    pub fn with_cadence(mut self, cadence: StatusCadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_autosave(mut self, every: u64) -> Self {
        self.autosave_every = every;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }

    pub fn store(&self) -> &FrequencyStore {
        &self.store
    }

    pub fn speed(&self) -> &RateEstimator {
        &self.speed
    }

    /// Keys typed since the session started
    pub fn typed(&self) -> u64 {
        self.typed
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Load the previous record and start timing.
    ///
    /// Load problems are shown to the user and otherwise ignored.
    pub fn open(&mut self) -> io::Result<()> {
        self.open_at(Instant::now())
    }

    pub fn open_at(&mut self, now: Instant) -> io::Result<()> {
        if let Err(e) = self.store.load() {
            log::debug!("record load: {}", e);
            report::write_diagnostic(&mut self.out, &e)?;
        }
        self.speed.init_at(now);
        self.start_time = now;
        self.out.flush()
    }

    /// Count a key press happening now
    pub fn handle_key(&mut self, key: &str) -> io::Result<()> {
        self.handle_key_at(key, Instant::now())
    }

    /// Count a key press at `now` and print progress
    pub fn handle_key_at(&mut self, key: &str, now: Instant) -> io::Result<()> {
        self.store.increment(key);
        self.typed += 1;
        self.speed.record_event_at(now);

        if self.typed % self.cadence.interval() == 0 {
            let line = self.status_line();
            writeln!(self.out, "{}", line)?;
        } else {
            write!(self.out, ".")?;
        }
        self.out.flush()?;

        if self.autosave_every > 0 && self.typed % self.autosave_every == 0 {
            match self.store.persist() {
                Ok(()) => log::debug!("autosaved after {} keys", self.typed),
                Err(e) => log::warn!("autosave failed: {}", e),
            }
        }
        Ok(())
    }

    /// `typed (rate/min) MM-DD HH:MM:SS`
    pub fn status_line(&self) -> String {
        format!(
            "{:6} ({:3.2}/min) {}",
            self.typed,
            self.speed.current_rate(),
            speed::format_now()
        )
    }

    /// Print the report without persisting
    pub fn dump(&mut self) -> io::Result<()> {
        match self.report_format {
            ReportFormat::Text => self.store.report(&mut self.out)?,
            ReportFormat::Json => self.json_report().write_json(&mut self.out)?,
        }
        self.out.flush()
    }

    /// Persist, then print the report
    pub fn finish(&mut self) -> io::Result<()> {
        match self.report_format {
            ReportFormat::Text => self.store.flush(&mut self.out)?,
            ReportFormat::Json => {
                if let Err(e) = self.store.persist() {
                    report::write_diagnostic(&mut self.out, &e)?;
                }
                self.json_report().write_json(&mut self.out)?;
            }
        }
        self.out.flush()
    }

    fn json_report(&self) -> FrequencyReport {
        FrequencyReport::new(
            &self.store,
            self.start_time,
            self.typed,
            self.speed.current_rate(),
        )
    }

    /// Process events until a shutdown request or the end of input.
    ///
    /// Does not flush; call [`Session::finish`] afterwards.
    pub fn run(&mut self, events: &Receiver<SessionEvent>) -> ShutdownReason {
        loop {
            let event = match events.recv() {
                Ok(event) => event,
                Err(_) => return ShutdownReason::InputClosed,
            };
            let result = match event {
                SessionEvent::Key(name) => {
                    if name.is_empty() {
                        continue;
                    }
                    self.handle_key(&name)
                }
                SessionEvent::Dump => self.dump(),
                SessionEvent::Shutdown(reason) => return reason,
            };
            if let Err(e) = result {
                log::warn!("writing progress failed: {}", e);
                return ShutdownReason::OutputClosed;
            }
        }
    }
}

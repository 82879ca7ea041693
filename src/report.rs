//! Frequency report rendering and export

use crate::record::FrequencyStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::{self, Write};
use std::time::Instant;

/// Write the two-column frequency table followed by the grand total.
///
/// A newline comes first so the table never continues a line of
/// progress dots.
pub fn write_text<W: Write>(out: &mut W, entries: &[(&str, u64)], total: u64) -> io::Result<()> {
    writeln!(out)?;
    for (name, count) in entries {
        writeln!(out, "{:>15} {:>6}", name, count)?;
    }
    writeln!(out, "[+] Total: {}", total)
}

/// Write a `[!]` line for a recoverable problem
pub fn write_diagnostic<W: Write>(out: &mut W, problem: &dyn Display) -> io::Result<()> {
    writeln!(out, "[!] {}.", problem)
}

/// Complete frequency report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: ReportSummary,
    /// Keys ordered by count, most pressed first
    pub keys: Vec<KeyEntry>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

/// Summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Sum of all recorded counts, including earlier sessions
    pub total: u64,
    /// Number of distinct keys
    pub distinct_keys: usize,
    /// Keys typed since this session started
    pub session_typed: u64,
    /// Trailing typing rate in keys per minute
    pub rate_per_min: f64,
}

/// Single key entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: String,
    pub count: u64,
}

impl FrequencyReport {
    /// Snapshot the store together with session statistics
    pub fn new(
        store: &FrequencyStore,
        start_time: Instant,
        session_typed: u64,
        rate_per_min: f64,
    ) -> Self {
        let now: DateTime<Utc> = Utc::now();
        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: start_time.elapsed().as_secs_f64(),
            },
            summary: ReportSummary {
                total: store.total(),
                distinct_keys: store.len(),
                session_typed,
                rate_per_min,
            },
            keys: store
                .sorted_view()
                .into_iter()
                .map(|(key, count)| KeyEntry {
                    key: key.to_string(),
                    count,
                })
                .collect(),
        }
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the JSON document, preceded by a newline like the text report
    pub fn write_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(out)?;
        writeln!(out, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_report_of_empty_table() {
        let mut out = Vec::new();
        write_text(&mut out, &[], 0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n[+] Total: 0\n");
    }

    #[test]
    fn long_names_are_not_truncated() {
        let mut out = Vec::new();
        write_text(&mut out, &[("KBDILLUMTOGGLE_EXTRA", 1234567)], 1234567).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("KBDILLUMTOGGLE_EXTRA 1234567\n"));
    }

    #[test]
    fn diagnostic_prefix() {
        let mut out = Vec::new();
        write_diagnostic(&mut out, &"something went wrong").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[!] something went wrong.\n");
    }

    #[test]
    fn json_report_contains_sorted_keys() {
        let mut store = FrequencyStore::new("unused.tsv");
        store.increment("B");
        store.increment("A");
        store.increment("A");

        let report = FrequencyReport::new(&store, Instant::now(), 3, 120.0);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.distinct_keys, 2);
        assert_eq!(
            report.keys,
            vec![
                KeyEntry { key: "A".to_string(), count: 2 },
                KeyEntry { key: "B".to_string(), count: 1 },
            ]
        );

        let json = report.to_json().unwrap();
        let parsed: FrequencyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.keys.len(), 2);
        assert_eq!(parsed.metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn write_json_starts_on_fresh_line() {
        let store = FrequencyStore::new("unused.tsv");
        let report = FrequencyReport::new(&store, Instant::now(), 0, 0.0);
        let mut out = Vec::new();
        report.write_json(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\n{"));
        assert!(text.contains("\"distinct_keys\": 0"));
    }
}

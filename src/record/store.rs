//! In-memory key frequency table backed by a record file

use super::codec::{self, ParsedLine};
use crate::error::StoreError;
use crate::report;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Key name to press count table
///
/// Entries are kept in name order so reports with equal counts come out
/// the same way every time.
#[derive(Debug, Clone)]
pub struct FrequencyStore {
    counts: BTreeMap<String, u64>,
    path: PathBuf,
    /// The last load stopped before the end of the file
    partial_load: bool,
}

impl FrequencyStore {
    /// Create an empty store persisted at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            counts: BTreeMap::new(),
            path: path.into(),
            partial_load: false,
        }
    }

    /// Record file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the record file is copied before a partly loaded file is
    /// overwritten: the record path with `.bak` appended
    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Whether the last load stopped early, leaving lines on disk that
    /// are not in memory
    pub fn is_partial(&self) -> bool {
        self.partial_load
    }

    /// Load records from the record file.
    ///
    /// Returns the number of records read. A missing or unreadable file is
    /// reported as `MissingPersistedStore` and leaves the store untouched.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!("cannot open {}: {}", self.path.display(), e);
                return Err(StoreError::MissingPersistedStore {
                    path: self.path.clone(),
                });
            }
        };
        self.load_from(BufReader::new(file))
    }

    /// Load records from any line source.
    ///
    /// Later duplicates overwrite earlier ones. Loading stops at the first
    /// malformed line; records before it are kept and the store is marked
    /// partial, so the next persist backs the file up first.
    pub fn load_from<R: BufRead>(&mut self, reader: R) -> Result<usize, StoreError> {
        let mut loaded = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(source) => {
                    self.partial_load = true;
                    return Err(StoreError::Io {
                        path: self.path.clone(),
                        source,
                    });
                }
            };
            match codec::parse_line(&line) {
                ParsedLine::Record(name, count) => {
                    self.counts.insert(name.to_string(), count);
                    loaded += 1;
                }
                ParsedLine::Blank => {}
                ParsedLine::Malformed => {
                    self.partial_load = true;
                    return Err(StoreError::MalformedPersistedRecord {
                        path: self.path.clone(),
                        line: idx + 1,
                        content: line,
                    });
                }
            }
        }
        log::info!("loaded {} record(s) from {}", loaded, self.path.display());
        Ok(loaded)
    }

    /// Count one press of `key`, returning its new count
    pub fn increment(&mut self, key: &str) -> u64 {
        match self.counts.get_mut(key) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                self.counts.insert(key.to_string(), 1);
                1
            }
        }
    }

    /// Current count for `key` (0 if never seen)
    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// All entries, most pressed first
    pub fn sorted_view(&self) -> Vec<(&str, u64)> {
        let mut out: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        out.sort_by(|l, r| r.1.cmp(&l.1));
        out
    }

    /// Print the sorted table and the grand total
    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        report::write_text(out, &self.sorted_view(), self.total())
    }

    /// Rewrite the record file with the sorted table.
    ///
    /// If the last load was partial, the file is first copied to
    /// [`backup_path`](Self::backup_path); if that copy fails nothing is
    /// written. If the file cannot be created nothing is written either. A
    /// failure after creation may leave the file truncated.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        self.back_up_partial_record()?;
        let file = File::create(&self.path).map_err(|source| StoreError::PersistWriteFailure {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        log::debug!("persisted {} record(s) to {}", self.len(), self.path.display());
        Ok(())
    }

    fn back_up_partial_record(&mut self) -> Result<(), StoreError> {
        if !self.partial_load {
            return Ok(());
        }
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => log::warn!(
                "{} was only partly loaded; original kept as {}",
                self.path.display(),
                backup.display()
            ),
            // Nothing left on disk to lose
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::BackupFailed {
                    path: self.path.clone(),
                    backup,
                    source,
                })
            }
        }
        self.partial_load = false;
        Ok(())
    }

    /// Write the sorted table in record file format
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (name, count) in self.sorted_view() {
            codec::write_record(out, name, count)?;
        }
        Ok(())
    }

    /// Persist, then report.
    ///
    /// A persist failure is shown to the user and does not stop the report.
    pub fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if let Err(e) = self.persist() {
            if e.may_have_truncated() {
                log::warn!("record file may be incomplete: {}", e);
            }
            report::write_diagnostic(out, &e)?;
        }
        self.report(out)
    }
}

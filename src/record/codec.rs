//! Line format of the record file
//!
//! One record per line: a key name, a whitespace run, a non-negative count.
//! The writer always separates with a single tab.

use std::io::{self, Write};

/// Outcome of parsing one line of the record file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// A `name count` pair
    Record(&'a str, u64),
    /// Nothing but whitespace
    Blank,
    /// Anything else
    Malformed,
}

/// Parse a single line of the record file
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let mut fields = line.split_whitespace();
    let (name, count) = match (fields.next(), fields.next(), fields.next()) {
        (None, _, _) => return ParsedLine::Blank,
        (Some(name), Some(count), None) => (name, count),
        _ => return ParsedLine::Malformed,
    };
    match count.parse::<u64>() {
        Ok(count) => ParsedLine::Record(name, count),
        Err(_) => ParsedLine::Malformed,
    }
}

/// Write one record as `name\tcount\n`
pub fn write_record<W: Write>(out: &mut W, name: &str, count: u64) -> io::Result<()> {
    writeln!(out, "{}\t{}", name, count)
}

//! Shared utility functions

/// Width of the controlling terminal, if there is one
pub fn terminal_columns() -> Option<u16> {
    crossterm::terminal::size().ok().map(|(cols, _rows)| cols)
}

/// Number of events between status lines for a terminal `columns` wide.
///
/// One dot is printed per event, so a status line is due once the dots
/// would fill the row minus the `margin` the status line itself takes.
/// Falls back to `fallback` when the width is unknown or too narrow.
///
/// # Example
///
/// ```
/// use kbdrec::utils::status_interval;
///
/// assert_eq!(status_interval(Some(80), 34, 46), 46);
/// assert_eq!(status_interval(Some(120), 34, 46), 86);
/// assert_eq!(status_interval(None, 34, 46), 46);
/// ```
pub fn status_interval(columns: Option<u16>, margin: u16, fallback: u64) -> u64 {
    match columns {
        Some(cols) if cols > margin => u64::from(cols - margin),
        _ => fallback.max(1),
    }
}

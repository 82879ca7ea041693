//! kbdrec - Keystroke frequency recorder
//!
//! Counts key presses from a Linux input device, keeps a running typing
//! speed, and accumulates the counts across sessions in a small
//! tab-separated record file.

pub mod capture;
pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod session;
pub mod speed;
pub mod utils;

pub use config::Config;
pub use error::{CaptureError, StoreError};
pub use record::FrequencyStore;
pub use session::Session;
pub use speed::RateEstimator;

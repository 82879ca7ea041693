//! Typing speed estimation

mod estimator;
mod ring;

pub use estimator::{format_now, format_timestamp, RateEstimator, DEFAULT_SLOW_CUTOFF, DEFAULT_WINDOW};
pub use ring::SampleRing;

//! Persistent key frequency record

pub mod codec;
mod store;

pub use store::FrequencyStore;

//! Consumer side: per-channel pollers and correlation helpers.

pub mod correlation;
pub mod poller;

pub use correlation::{receive_batch, wait_for_specific, ReceivedEnvelope};
pub use poller::Poller;

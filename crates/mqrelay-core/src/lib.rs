//! mqrelay core: transport-agnostic envelope model, routing table, and error types.
//!
//! This crate defines the message contracts shared by the gateway, the
//! consumer pollers, and external producer SDKs. It intentionally carries no
//! transport or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `RelayError`/`Result` so relay
//! processes do not crash on malformed input or bad traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod envelope;
pub mod error;
pub mod routing;

/// Shared result type.
pub use error::{RelayError, Result};
pub use routing::{route, ChannelKind};

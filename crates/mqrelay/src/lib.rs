//! Top-level facade crate for mqrelay.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use mqrelay_core::*;
}

pub mod gateway {
    pub use mqrelay_gateway::*;
}

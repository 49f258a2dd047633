//! mqrelay gateway library entry.
//!
//! This crate wires the signed HTTP ingress, the routing layer, the in-memory
//! channel engine, and the per-channel consumer pollers into a cohesive relay
//! stack. It is intended to be consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod consume;
pub mod dispatch;
pub mod ingress;
pub mod queue;
pub mod router;
pub mod runtime;
pub mod services;
pub mod sign;

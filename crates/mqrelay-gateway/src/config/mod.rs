//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use mqrelay_core::error::{RelayError, Result};

pub use schema::{AuthSection, GatewaySection, IngressSection, QueueSection, RelayConfig, SigningKey};

pub fn load_from_file(path: &str) -> Result<RelayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RelayError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg: RelayConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

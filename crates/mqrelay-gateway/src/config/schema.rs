use std::collections::HashSet;

use serde::Deserialize;

use mqrelay_core::error::{RelayError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub queue: QueueSection,

    pub auth: AuthSection,

    #[serde(default)]
    pub ingress: IngressSection,
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.queue.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSection {
    /// How long a received-but-undeleted message stays invisible.
    #[serde(default = "default_visibility_timeout_ms")]
    pub visibility_timeout_ms: u64,

    /// Deliveries before a message is quarantined to the dead-letter buffer.
    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,

    /// Upper bound on a single long-poll wait.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,

    /// Per-channel backlog limit; enqueue beyond this fails with 5xx.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            visibility_timeout_ms: default_visibility_timeout_ms(),
            max_receive_count: default_max_receive_count(),
            max_wait_ms: default_max_wait_ms(),
            max_depth: default_max_depth(),
        }
    }
}

impl QueueSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=43_200_000).contains(&self.visibility_timeout_ms) {
            return Err(RelayError::BadRequest(
                "queue.visibility_timeout_ms must be between 100 and 43200000".into(),
            ));
        }
        if !(1..=1000).contains(&self.max_receive_count) {
            return Err(RelayError::BadRequest(
                "queue.max_receive_count must be between 1 and 1000".into(),
            ));
        }
        if !(100..=20_000).contains(&self.max_wait_ms) {
            return Err(RelayError::BadRequest(
                "queue.max_wait_ms must be between 100 and 20000".into(),
            ));
        }
        if !(1..=1_000_000).contains(&self.max_depth) {
            return Err(RelayError::BadRequest(
                "queue.max_depth must be between 1 and 1000000".into(),
            ));
        }
        Ok(())
    }
}

fn default_visibility_timeout_ms() -> u64 {
    30_000
}
fn default_max_receive_count() -> u32 {
    5
}
fn default_max_wait_ms() -> u64 {
    10_000
}
fn default_max_depth() -> usize {
    10_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Credential-scope region the signature must be bound to.
    pub region: String,

    pub keys: Vec<SigningKey>,
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(RelayError::BadRequest("auth.region must not be empty".into()));
        }
        if self.keys.is_empty() {
            return Err(RelayError::BadRequest("auth.keys must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for k in &self.keys {
            if k.id.is_empty() || k.secret.is_empty() {
                return Err(RelayError::BadRequest(
                    "auth.keys entries need non-empty id and secret".into(),
                ));
            }
            if !seen.insert(k.id.as_str()) {
                return Err(RelayError::BadRequest(format!(
                    "auth.keys duplicate id: {}",
                    k.id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningKey {
    pub id: String,
    pub secret: String,
}

/// Producer identity stamped into the `source` attribute, per ingress path.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngressSection {
    #[serde(default = "default_discord_source")]
    pub discord_source: String,
    #[serde(default = "default_web_to_mc_source")]
    pub web_to_mc_source: String,
    #[serde(default = "default_mc_to_web_source")]
    pub mc_to_web_source: String,
}

impl Default for IngressSection {
    fn default() -> Self {
        Self {
            discord_source: default_discord_source(),
            web_to_mc_source: default_web_to_mc_source(),
            mc_to_web_source: default_mc_to_web_source(),
        }
    }
}

fn default_discord_source() -> String {
    "velocity-plugin".into()
}
fn default_web_to_mc_source() -> String {
    "kishax-web".into()
}
fn default_mc_to_web_source() -> String {
    "mc-plugins".into()
}

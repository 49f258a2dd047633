//! HMAC request signing and verification for the HTTP ingress.
//!
//! The scheme binds method + path + body digest + credential scope:
//!
//! ```text
//! Authorization: MQRELAY1-HMAC-SHA256 Credential=<key_id>/<date>/<region>/relay, Signature=<hex>
//! string-to-sign = METHOD \n PATH \n sha256hex(body) \n <key_id>/<date>/<region>/relay
//! signature      = hex(hmac-sha256(secret, string-to-sign))
//! ```
//!
//! Signatures are compared in constant time. Any parse or mismatch surfaces
//! as `RelayError::AuthFailed`; the ingress never reveals which part failed.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use mqrelay_core::error::{RelayError, Result};

use crate::config::AuthSection;

pub const SCHEME: &str = "MQRELAY1-HMAC-SHA256";
const SERVICE: &str = "relay";

type HmacSha256 = Hmac<Sha256>;

fn string_to_sign(method: &str, path: &str, body: &str, scope: &str) -> String {
    let body_digest = hex::encode(Sha256::digest(body.as_bytes()));
    format!("{method}\n{path}\n{body_digest}\n{scope}")
}

fn hmac_hex(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| RelayError::Internal(format!("hmac key setup failed: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Produce a full `Authorization` header value. Used by producer SDKs and
/// by the integration tests.
pub fn sign_request(
    method: &str,
    path: &str,
    body: &str,
    key_id: &str,
    secret: &str,
    date: &str,
    region: &str,
) -> Result<String> {
    let scope = format!("{key_id}/{date}/{region}/{SERVICE}");
    let signature = hmac_hex(secret, &string_to_sign(method, path, body, &scope))?;
    Ok(format!(
        "{SCHEME} Credential={scope}, Signature={signature}"
    ))
}

/// Parsed credential scope from an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Credential {
    key_id: String,
    date: String,
    region: String,
    service: String,
}

fn parse_header(value: &str) -> Result<(Credential, String)> {
    let rest = value.strip_prefix(SCHEME).ok_or(RelayError::AuthFailed)?;
    let mut credential = None;
    let mut signature = None;
    for part in rest.split(',') {
        let part = part.trim();
        if let Some(v) = part.strip_prefix("Credential=") {
            credential = Some(v.to_string());
        } else if let Some(v) = part.strip_prefix("Signature=") {
            signature = Some(v.to_string());
        }
        // other parameters (SignedHeaders etc.) are tolerated and ignored
    }
    let credential = credential.ok_or(RelayError::AuthFailed)?;
    let signature = signature.ok_or(RelayError::AuthFailed)?;

    let parts: Vec<&str> = credential.split('/').collect();
    let [key_id, date, region, service] = parts[..] else {
        return Err(RelayError::AuthFailed);
    };
    Ok((
        Credential {
            key_id: key_id.to_string(),
            date: date.to_string(),
            region: region.to_string(),
            service: service.to_string(),
        },
        signature,
    ))
}

/// Verifier holding the trusted key set and credential scope.
/// Construct once at startup, then share via the app state.
pub struct Verifier {
    keys: HashMap<String, String>,
    region: String,
}

impl Verifier {
    pub fn new(auth: &AuthSection) -> Self {
        let keys = auth
            .keys
            .iter()
            .map(|k| (k.id.clone(), k.secret.clone()))
            .collect();
        Self {
            keys,
            region: auth.region.clone(),
        }
    }

    /// Verify a request signature. Returns `AuthFailed` on any mismatch.
    pub fn verify(&self, method: &str, path: &str, body: &str, header: &str) -> Result<()> {
        let (cred, presented) = parse_header(header)?;
        if cred.service != SERVICE || cred.region != self.region {
            return Err(RelayError::AuthFailed);
        }
        let secret = self.keys.get(&cred.key_id).ok_or(RelayError::AuthFailed)?;
        let scope = format!(
            "{}/{}/{}/{}",
            cred.key_id, cred.date, cred.region, cred.service
        );
        let expected = hmac_hex(secret, &string_to_sign(method, path, body, &scope))?;
        if expected.as_bytes().ct_eq(presented.as_bytes()).into() {
            Ok(())
        } else {
            Err(RelayError::AuthFailed)
        }
    }
}

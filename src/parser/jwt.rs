use anyhow::{anyhow, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);

/// Claims read from the access token payload
#[derive(Debug, Deserialize)]
pub struct NadeoClaims {
    /// expiration, unix seconds
    pub exp: i64,
    /// refresh-after, unix seconds
    pub rat: i64,
}

pub fn decode_claims(token: &str) -> Result<NadeoClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow!("invalid JWT format: expected 3 segments, got {}", parts.len()));
    }

    let payload = parts[1];
    let decoded = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    serde_json::from_slice::<NadeoClaims>(&decoded)
        .map_err(|e| anyhow!("invalid JWT payload: {}", e))
}

/// Returns `(expires_at, refreshable_until)` for an access token.
pub fn decode_token_times(token: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let claims = decode_claims(token)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| anyhow!("exp {} out of range", claims.exp))?;
    let refreshable_until = DateTime::from_timestamp(claims.rat, 0)
        .ok_or_else(|| anyhow!("rat {} out of range", claims.rat))?;

    debug!(%expires_at, %refreshable_until, "access token payload decoded");
    Ok((expires_at, refreshable_until))
}

#[cfg(test)]
pub(crate) fn encode_test_token(exp: i64, rat: i64) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({"exp": exp, "rat": rat, "aud": "NadeoServices"}).to_string());
    format!("{header}.{payload}.signature")
}

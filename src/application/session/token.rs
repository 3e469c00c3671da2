//! Local decoding of the session token payload

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::entities::{Credential, SessionIdentity};

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has no payload segment")]
    Malformed,

    #[error("payload is not base64: {0}")]
    Encoding(String),

    #[error("payload is missing identity claims: {0}")]
    Claims(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: i64,
    username: String,
    role: String,
}

/// Decode `header.payload.signature` into an identity. The signature is
/// not verified; the server does that on every protected call.
pub fn decode(credential: &Credential) -> Result<SessionIdentity, TokenError> {
    let payload = credential
        .token()
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or(TokenError::Malformed)?;

    let bytes = URL_SAFE
        .decode(payload)
        .or_else(|_| STANDARD.decode(payload))
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))?;

    Ok(SessionIdentity::new(claims.user_id, claims.username, &claims.role))
}

/// Build an unsigned token carrying the given claims
#[cfg(test)]
pub fn encode_for_test(user_id: i64, username: &str, role: &str) -> String {
    let payload = serde_json::json!({ "userId": user_id, "username": username, "role": role });
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

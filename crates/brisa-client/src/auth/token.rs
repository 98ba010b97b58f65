use base64::Engine;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{Identity, Role};

/// Claims carried in the token payload. Older tokens omit `id`.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellido: Option<String>,
    /// Subject is the account email.
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Decode the payload segment of a bearer token without verifying the
/// signature. The server is the only party minting tokens; the client
/// only needs the identity claims out of it.
pub fn decode(token: &str) -> AppResult<Identity> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::AuthDecode("token has no payload segment".to_string()))?;

    let bytes = decode_segment(payload)?;
    let claims: TokenClaims = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::AuthDecode(format!("claims are not valid JSON: {e}")))?;

    Ok(identity_from_claims(claims))
}

fn decode_segment(segment: &str) -> AppResult<Vec<u8>> {
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

    // Tokens use the URL-safe alphabet; tolerate the standard one too.
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| STANDARD.decode(segment))
        .map_err(|e| AppError::AuthDecode(format!("payload is not valid base64: {e}")))
}

fn identity_from_claims(claims: TokenClaims) -> Identity {
    let role = claims.roles.first().map(|raw| Role::parse(raw));

    Identity {
        id: claims.id,
        given_name: claims.nombre.unwrap_or_default(),
        family_name: claims.apellido.unwrap_or_default(),
        email: claims.sub.unwrap_or_default(),
        role,
    }
}

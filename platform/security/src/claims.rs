use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub company_id: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Decode and verify a bearer token against the process's configured
/// verification key, read from `AUTH_PUBLIC_KEY_PEM`.
///
/// Verification key material is loaded once at start-up by the binary
/// and is out of scope for this library function's signature; callers
/// in tests use [`decode_with_key`] directly.
pub fn decode_access_token(token: &str) -> Result<AccessClaims, String> {
    let pem = std::env::var("AUTH_PUBLIC_KEY_PEM")
        .map_err(|_| "AUTH_PUBLIC_KEY_PEM not configured".to_string())?;
    decode_with_key(token, pem.as_bytes())
}

pub fn decode_with_key(token: &str, public_key_pem: &[u8]) -> Result<AccessClaims, String> {
    let key = DecodingKey::from_rsa_pem(public_key_pem).map_err(|e| e.to_string())?;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["7d-core"]);
    let data = decode::<AccessClaims>(token, &key, &validation).map_err(|e| e.to_string())?;
    Ok(data.claims)
}

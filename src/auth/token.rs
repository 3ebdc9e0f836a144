//! Access token expiry inspection
//!
//! The client never verifies signatures; it only reads the `exp` claim to
//! decide whether a proactive refresh is due. The backend remains the
//! authority on validity.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

/// Refresh once the remaining lifetime is at or below this many seconds.
pub const REFRESH_THRESHOLD_SECS: i64 = 300;

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    /// NumericDate; some issuers emit fractional seconds
    exp: f64,
}

/// Decode the `exp` claim without checking the signature.
///
/// Returns `None` for anything that is not a JWT carrying a numeric `exp`.
pub fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| {
            tracing::debug!("Access token is not decodable: {:?}", e.kind());
            e
        })
        .ok()?;

    DateTime::from_timestamp(data.claims.exp.trunc() as i64, 0)
}

/// Freshness of a stored access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFreshness {
    /// More than the threshold left
    Fresh,
    /// At or below the threshold, including already expired
    Stale,
    /// No readable expiry; used as-is and left to the backend
    Opaque,
}

pub fn freshness(token: &str, now: DateTime<Utc>) -> TokenFreshness {
    match decode_expiry(token) {
        Some(exp) if exp - now > Duration::seconds(REFRESH_THRESHOLD_SECS) => TokenFreshness::Fresh,
        Some(_) => TokenFreshness::Stale,
        None => TokenFreshness::Opaque,
    }
}

/// Whether resolution has to go through the refresh endpoint
pub fn needs_refresh(token: &str) -> bool {
    freshness(token, Utc::now()) == TokenFreshness::Stale
}

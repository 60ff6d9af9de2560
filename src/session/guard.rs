//! Bearer token expiry checks
//!
//! Tokens issued by the clinic backend are JWTs, but the client treats them
//! as opaque: the only thing ever read is the `exp` claim in the middle
//! segment, and only to decide whether a stored session is worth using.
//! Signature verification is the server's job.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// JWT segments use the URL-safe alphabet; some issuers emit the standard one.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Returns the raw `exp` claim of `token` in seconds since the Unix epoch.
fn exp_claim(token: &str) -> Option<f64> {
    let payload = token.split('.').nth(1)?;
    if payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .ok()?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_f64().filter(|exp| exp.is_finite())
}

/// Decodes the expiry instant embedded in `token`.
///
/// Returns `None` for anything that is not a JWT-shaped string with a numeric
/// `exp` claim.
///
/// # Examples
///
/// ```
/// use clinic::session::guard::token_expiry;
///
/// assert!(token_expiry("not-a-token").is_none());
/// ```
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    exp_claim(token).map(instant_of)
}

/// Converts an `exp` claim to an instant, saturating at chrono's range so
/// that every token [`is_token_valid`] accepts also has an expiry to show.
fn instant_of(exp: f64) -> DateTime<Utc> {
    let secs = exp.floor();
    if secs >= DateTime::<Utc>::MAX_UTC.timestamp() as f64 {
        DateTime::<Utc>::MAX_UTC
    } else if secs <= DateTime::<Utc>::MIN_UTC.timestamp() as f64 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::from_timestamp(secs as i64, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Reports whether `token` carries an expiry claim strictly after `now`.
///
/// A missing token, a token that does not decode, or a token without a
/// numeric `exp` claim is invalid. This never panics.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use clinic::session::guard::is_token_valid;
///
/// assert!(!is_token_valid(None, Utc::now()));
/// assert!(!is_token_valid(Some("garbage"), Utc::now()));
/// ```
pub fn is_token_valid(token: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(token) = token else {
        return false;
    };

    match exp_claim(token) {
        Some(exp) => exp > now.timestamp() as f64,
        None => false,
    }
}

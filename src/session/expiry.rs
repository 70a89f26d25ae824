use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::credential::Credential;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Local expiry check for credentials that happen to be JWTs.
///
/// The signature is not verified and opaque tokens always pass; the backend's
/// 401 stays the authority on validity. This only spares a round trip for a
/// token whose `exp` is already in the past.
#[instrument(skip(credential))]
pub fn is_locally_expired(credential: &Credential) -> bool {
    is_expired_at(credential, Utc::now().timestamp())
}

fn is_expired_at(credential: &Credential, now: i64) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<ExpiryClaims>(credential.as_str(), &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => {
            let expired = data.claims.exp.is_some_and(|exp| exp <= now);
            debug!(exp = ?data.claims.exp, expired, "Checked credential expiry locally");
            expired
        }
        Err(e) => {
            debug!(error = %e, "Credential is not a JWT, skipping local expiry check");
            false
        }
    }
}

// adminx-acl/src/utils/jwt.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Reads the `exp` claim of a bearer token issued by the auth service.
///
/// The signature is NOT verified: tokens are validated upstream and this is
/// only used to know when to discard the permission session.
pub fn token_expiry(token: &str) -> Result<DateTime<Utc>> {
    let header = decode_header(token).context("Failed to decode token header")?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let token_data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .context("Failed to read token claims")?;

    DateTime::<Utc>::from_timestamp(token_data.claims.exp, 0)
        .context("Token expiry out of range")
}

/// An expiry instant counts as passed once it is reached, not only after it.
pub fn is_expired(expires_at: DateTime<Utc>) -> bool {
    expires_at <= Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct IssuedClaims {
        sub: String,
        exp: i64,
        role: String,
    }

    fn issue(exp: i64) -> String {
        let claims = IssuedClaims { sub: "42".into(), exp, role: "staff".into() };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"issuer-owned-secret")).unwrap()
    }

    #[test]
    fn test_reads_expiry_without_issuer_secret() {
        let exp = Utc::now().timestamp() + 3600;
        let expires_at = token_expiry(&issue(exp)).unwrap();
        assert_eq!(expires_at.timestamp(), exp);
        assert!(!is_expired(expires_at));
    }

    #[test]
    fn test_past_expiry_still_decodes() {
        let exp = Utc::now().timestamp() - 60;
        let expires_at = token_expiry(&issue(exp)).unwrap();
        assert!(is_expired(expires_at));
        assert!(is_expired(Utc::now()));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(token_expiry("not-a-token").is_err());
        assert!(token_expiry("a.b.c").is_err());
    }
}

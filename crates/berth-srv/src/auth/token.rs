//! Signed bearer tokens: HMAC-SHA256 over base64url claim segments.
//!
//! Wire format is the standard three-segment compact form
//! (`header.claims.signature`) with an HS256 header, so any standard
//! client can decode the claims. Expiry is enforced at validation time,
//! not issuance.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use ring::hmac;
use serde::{Deserialize, Serialize};

use super::user::User;
use crate::error::{Result, SrvError};

/// Fixed token header: algorithm is pinned to HS256.
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's name.
    pub sub: String,
    /// Administrator flag.
    pub admin: bool,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
}

/// Issues and validates signed claim tokens.
///
/// Holds the process-wide signing key; constructed once at startup and
/// shared by reference.
pub struct TokenService {
    key: hmac::Key,
    ttl: Duration,
}

impl TokenService {
    /// Service signing with `key`, issuing tokens valid for `ttl_hours`.
    #[must_use]
    pub fn new(key: &[u8], ttl_hours: u64) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, key),
            ttl: Duration::hours(i64::try_from(ttl_hours).unwrap_or(24)),
        }
    }

    /// Issue a signed token for `user`.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            sub: user.name.clone(),
            admin: true,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        let header = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&header).map_err(|e| SrvError::Signing(e.to_string()))?,
        );
        let claims = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims).map_err(|e| SrvError::Signing(e.to_string()))?,
        );

        let message = format!("{header}.{claims}");
        let tag = hmac::sign(&self.key, message.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(tag.as_ref());

        Ok(format!("{message}.{signature}"))
    }

    /// Validate a token and return its claims.
    ///
    /// Fails closed on malformed segments, an unexpected signing
    /// algorithm, a bad signature, or an expired `exp`.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut segments = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(SrvError::InvalidToken("malformed token".into()));
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| SrvError::InvalidToken("undecodable header".into()))?;
        let parsed_header: Header = serde_json::from_slice(&header_bytes)
            .map_err(|_| SrvError::InvalidToken("unparseable header".into()))?;
        if parsed_header.alg != "HS256" {
            return Err(SrvError::InvalidToken(format!(
                "unexpected signing method: {}",
                parsed_header.alg
            )));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SrvError::InvalidToken("undecodable signature".into()))?;
        let message = format!("{header}.{claims}");
        hmac::verify(&self.key, message.as_bytes(), &signature)
            .map_err(|_| SrvError::InvalidToken("signature mismatch".into()))?;

        let claim_bytes = URL_SAFE_NO_PAD
            .decode(claims)
            .map_err(|_| SrvError::InvalidToken("undecodable claims".into()))?;
        let claims: Claims = serde_json::from_slice(&claim_bytes)
            .map_err(|_| SrvError::InvalidToken("unparseable claims".into()))?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(SrvError::InvalidToken("token expired".into()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_signing_key, ADMINISTRATOR_ROLE};

    fn admin() -> User {
        User {
            id: 1,
            name: "Admin".to_string(),
            roles: vec![ADMINISTRATOR_ROLE.to_string()],
        }
    }

    fn service() -> TokenService {
        TokenService::new(&generate_signing_key().unwrap(), 24)
    }

    #[test]
    fn test_issue_validate_round_trip() {
        let service = service();
        let token = service.issue(&admin()).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "Admin");
        assert!(claims.admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_garbled_token_rejected() {
        let service = service();
        for garbled in ["", "abc", "a.b", "a.b.c.d", "!!.!!.!!"] {
            assert!(service.validate(garbled).is_err(), "accepted {garbled:?}");
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = service().issue(&admin()).unwrap();
        let other = service();
        let err = other.validate(&token).unwrap_err();
        assert!(matches!(err, SrvError::InvalidToken(_)));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let service = service();
        let token = service.issue(&admin()).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            br#"{"sub":"Intruder","admin":true,"exp":9999999999,"iat":0}"#,
        );
        parts[1] = &forged;
        let tampered = parts.join(".");

        assert!(service.validate(&tampered).is_err());
    }

    #[test]
    fn test_wrong_algorithm_rejected() {
        let service = service();
        let token = service.issue(&admin()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();

        // Re-sign with a "none" header; validation must reject on alg
        // before even reaching the signature.
        let forged_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        parts[0] = &forged_header;
        let forged = parts.join(".");

        let err = service.validate(&forged).unwrap_err();
        assert!(err.to_string().contains("unexpected signing method") || matches!(err, SrvError::InvalidToken(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let key = generate_signing_key().unwrap();
        let service = TokenService::new(&key, 0);
        let token = service.issue(&admin()).unwrap();
        let err = service.validate(&token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }
}

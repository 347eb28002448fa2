// ABOUTME: HS256 access tokens carrying the user id as `sub`
// ABOUTME: Compact JWT encoding signed and verified with HMAC-SHA256

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{SecurityError, SecurityResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Issues and verifies bearer tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: &str) -> SecurityResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it were `now`
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> SecurityResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };

        let header = encode_segment(&header)?;
        let payload = encode_segment(&claims)?;
        let signing_input = format!("{}.{}", header, payload);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);

        Ok(format!("{}.{}", signing_input, signature))
    }

    pub fn verify(&self, token: &str) -> SecurityResult<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, algorithm and expiry relative to `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> SecurityResult<Claims> {
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or(SecurityError::TokenMalformed)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(SecurityError::TokenMalformed)?;
        if payload.contains('.') {
            return Err(SecurityError::TokenMalformed);
        }

        let header: Header = decode_segment(header)?;
        if header.alg != "HS256" {
            return Err(SecurityError::TokenMalformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SecurityError::TokenMalformed)?;

        // Constant-time comparison
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SecurityError::TokenSignature)?;

        let claims: Claims = decode_segment(payload)?;
        if claims.exp <= now.timestamp() {
            return Err(SecurityError::TokenExpired);
        }

        Ok(claims)
    }

    fn mac(&self) -> SecurityResult<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|e| SecurityError::Hashing(format!("invalid hmac key: {}", e)))
    }

    fn sign(&self, bytes: &[u8]) -> SecurityResult<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn encode_segment<T: Serialize>(value: &T) -> SecurityResult<String> {
    let json = serde_json::to_vec(value).map_err(|_| SecurityError::TokenMalformed)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> SecurityResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| SecurityError::TokenMalformed)?;
    serde_json::from_slice(&bytes).map_err(|_| SecurityError::TokenMalformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::minutes(1440))
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens.issue("user-1").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, 1440 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let token = tokens
            .issue_at("user-1", Utc::now() - Duration::days(2))
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(SecurityError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue("user-1").unwrap();
        let other = TokenService::new("another-secret", Duration::minutes(10));
        assert!(matches!(other.verify(&token), Err(SecurityError::TokenSignature)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = service();
        let token = tokens.issue("user-1").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = Claims {
            sub: "admin".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            encode_segment(&forged_claims).unwrap(),
            parts[2]
        );
        assert!(matches!(tokens.verify(&forged), Err(SecurityError::TokenSignature)));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let tokens = service();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(tokens.verify(token), Err(SecurityError::TokenMalformed)),
                "{token:?}"
            );
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        assert!(!format!("{:?}", service()).contains("test-secret"));
    }
}

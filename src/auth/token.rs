//! Signed session tokens.
//!
//! HMAC-signed JWTs carrying `{user_id, role, exp, iat}`. Expiry is checked
//! against the injected [`Clock`](crate::domain::Clock) rather than the
//! library's own wall clock, with no leeway.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::domain::{ClockPtr, Role, TokenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // ---
    pub user_id: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// What a verified token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    // ---
    pub user_id: i64,
    pub role: Role,
}

pub struct TokenService {
    // ---
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: chrono::Duration,
    clock: ClockPtr,
}

impl TokenService {
    // ---
    pub fn new(config: &SecurityConfig, clock: ClockPtr) -> Self {
        // ---
        let secret = config.secret_key.as_bytes();

        let mut validation = Validation::new(config.token_algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            header: Header::new(config.token_algorithm),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiry: config.token_expiry,
            clock,
        }
    }

    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, TokenError> {
        // ---
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.expiry)
            .ok_or_else(|| TokenError::Signing(format!("expiry {} out of range", self.expiry)))?;

        let claims = Claims {
            user_id,
            role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        encode(&self.header, &claims, &self.encoding_key).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and algorithm, then expiry.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        // ---
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            //
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if self.clock.now().timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(TokenPayload {
            user_id: data.claims.user_id,
            role: data.claims.role,
        })
    }
}

/**
 * Session Tokens
 *
 * Issues and verifies the HS256 bearer tokens handed out by `POST /login`.
 * Tokens are stateless: nothing is persisted, and a token stays valid until
 * its `exp` claim passes.
 *
 * Expiry is checked against a caller-supplied `now` rather than the
 * library's own clock, so the boundary (`now >= exp` is expired) is exact
 * and testable.
 */

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::accounts::{Account, Role};
use crate::backend::auth::errors::AuthError;
use crate::shared::AppConfig;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: String,
    /// Role at issuance
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verified, typed view of a token's claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub account_id: Uuid,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with one shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.token_ttl)
    }

    /// Create a token for `account`, valid for the configured TTL from `now`
    ///
    /// # Errors
    ///
    /// `AuthError::Signing` if the JWT library fails to encode the claims.
    pub fn issue(&self, account: &Account, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let iat = now.timestamp();
        let exp = iat + self.ttl.num_seconds();

        let claims = Claims {
            sub: account.id.to_string(),
            role: account.role.as_str().to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to sign token for account {}: {}", account.id, e);
            AuthError::Signing(e.to_string())
        })?;

        let expires_at = timestamp(exp).ok_or_else(|| AuthError::Signing("expiry out of range".into()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and claims, then expiry against `now`
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenExpired` - `now >= exp`
    /// * `AuthError::TokenInvalid` - anything else wrong with the token
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AuthError::TokenInvalid)?
            .claims;

        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::TokenInvalid)?;
        let role: Role = claims.role.parse().map_err(|_| AuthError::TokenInvalid)?;
        let issued_at = timestamp(claims.iat).ok_or(AuthError::TokenInvalid)?;
        let expires_at = timestamp(claims.exp).ok_or(AuthError::TokenInvalid)?;

        if claims.exp <= claims.iat || issued_at > now {
            return Err(AuthError::TokenInvalid);
        }
        if now >= expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(SessionClaims {
            account_id,
            role,
            issued_at,
            expires_at,
        })
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

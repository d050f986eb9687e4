//! HMAC access tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use profiles_sdk::AccountId;
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::domain::ports::{AccessClaims, AccessTokenDecoder, TokenError};

/// Wire claims of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub user_id: AccountId,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and verifies access tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtAuthManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    leeway_seconds: u64,
    ttl: Duration,
}

impl JwtAuthManager {
    /// # Errors
    /// Fails when no secret is configured or the algorithm is not an HMAC one.
    pub fn from_config(cfg: &JwtConfig) -> anyhow::Result<Self> {
        let secret = cfg
            .secret_key_access
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("profiles.jwt.secret_key_access is not configured"))?;
        anyhow::ensure!(
            matches!(
                cfg.algorithm,
                Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
            ),
            "unsupported JWT algorithm, only HS256/HS384/HS512 are allowed"
        );
        anyhow::ensure!(
            !secret.expose().is_empty(),
            "profiles.jwt.secret_key_access must not be empty"
        );

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.expose().as_bytes()),
            decoding: DecodingKey::from_secret(secret.expose().as_bytes()),
            algorithm: cfg.algorithm,
            leeway_seconds: cfg.leeway_seconds,
            ttl: Duration::minutes(cfg.access_token_ttl_minutes),
        })
    }

    /// Issue a token for `user_id` valid for the configured lifetime.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn create_access_token(&self, user_id: AccountId) -> anyhow::Result<String> {
        self.create_access_token_with_ttl(user_id, self.ttl)
    }

    /// Issue a token for `user_id` expiring after `ttl` (may be negative).
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn create_access_token_with_ttl(
        &self,
        user_id: AccountId,
        ttl: Duration,
    ) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding)?)
    }
}

impl AccessTokenDecoder for JwtAuthManager {
    fn decode_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_seconds;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<AccessTokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "access token rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        Ok(AccessClaims {
            user_id: data.claims.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretString;

    fn manager(secret: &str) -> JwtAuthManager {
        JwtAuthManager::from_config(&JwtConfig {
            secret_key_access: Some(SecretString::new(secret)),
            ..JwtConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn issued_token_decodes_to_user() {
        let jwt = manager("secret");
        let token = jwt.create_access_token(42).unwrap();
        let claims = jwt.decode_access_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let jwt = manager("secret");
        let token = jwt
            .create_access_token_with_ttl(42, Duration::minutes(-5))
            .unwrap();
        let err = jwt.decode_access_token(&token).unwrap_err();
        assert_eq!(err, TokenError::Expired);
        assert_eq!(err.to_string(), "Token has expired.");
    }

    #[test]
    fn foreign_signature_and_garbage_are_invalid() {
        let token = manager("other").create_access_token(42).unwrap();
        let jwt = manager("secret");
        assert_eq!(jwt.decode_access_token(&token).unwrap_err(), TokenError::Invalid);
        assert_eq!(
            jwt.decode_access_token("not.a.jwt").unwrap_err().to_string(),
            "Invalid token."
        );
    }

    #[test]
    fn missing_secret_fails_fast() {
        assert!(JwtAuthManager::from_config(&JwtConfig::default()).is_err());
    }

    #[test]
    fn asymmetric_algorithms_are_refused() {
        let cfg = JwtConfig {
            secret_key_access: Some(SecretString::new("secret")),
            algorithm: Algorithm::RS256,
            ..JwtConfig::default()
        };
        assert!(JwtAuthManager::from_config(&cfg).is_err());
    }
}

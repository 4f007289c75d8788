//! Admin token codec
//!
//! Tokens are HS256-signed JWTs carrying the admin username, a random token
//! id and a fixed 24 hour expiry. Verification checks the signature and the
//! embedded expiry only; revocation is the session store's job.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Lifetime of every admin token; sessions are never renewed
pub const SESSION_TTL_HOURS: i64 = 24;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin username the token was issued for
    pub username: String,
    /// Random per-token id, so two logins in the same second never collide
    pub jti: Uuid,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// A freshly signed token with the instants it was minted for
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies admin tokens with a server-held secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    username: String,
}

impl TokenCodec {
    /// Build a codec issuing tokens for `username`, signed with `secret`
    pub fn new(secret: &str, username: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            username: username.into(),
        }
    }

    /// Issue a token valid for [`SESSION_TTL_HOURS`] from now
    pub fn issue(&self) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(Utc::now())
    }

    /// Issue a token as if minted at `issued_at`
    pub fn issue_at(
        &self,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = issued_at + Duration::hours(SESSION_TTL_HOURS);
        let claims = Claims {
            username: self.username.clone(),
            jti: Uuid::new_v4(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Decode a token, checking signature and expiry
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Report whether a token is authentic, unexpired and issued for the admin
    ///
    /// Never fails: anything malformed is simply invalid.
    pub fn verify(&self, token: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.username == self.username,
            Err(e) => {
                debug!("Rejected admin token: {}", e);
                false
            }
        }
    }
}

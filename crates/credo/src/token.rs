// Stateless session tokens, HS256.
//
// `sub` is the user id. There is no server-side session table; logout is the
// client discarding the token, and revocation is out of scope.

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use credo_core::error::{AuthError, Result};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a session token for `user_id`, valid for `ttl` from now.
pub fn sign_session(secret: &str, user_id: &str, ttl: Duration) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_owned(),
        iat: now,
        exp: now + ttl.num_seconds(),
    };

    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("token signing failed: {e}")))
}

/// Verify a session token and return its claims.
///
/// Bad signature, wrong algorithm, and expiry all come back as
/// `Unauthorized`; the distinction is logged, not surfaced.
pub fn verify_session(secret: &str, token: &str) -> Result<SessionClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    match jsonwebtoken::decode::<SessionClaims>(token, &key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected");
            Err(AuthError::Unauthorized)
        }
    }
}

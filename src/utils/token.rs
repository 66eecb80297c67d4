use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::user::Role;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: i32,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, role: Role, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Issues a session token for `user_id` using the configured secret and TTL.
pub fn issue_session_token(user_id: i32, role: Role) -> Result<String> {
    let config = crate::config::get_config();
    encode_token(
        &Claims::new(user_id, role, config.token_ttl_hours),
        &config.jwt_secret,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn token_round_trip_keeps_identity() {
        let claims = Claims::new(42, Role::Employee, 24);
        let token = encode_token(&claims, "secret").unwrap();
        let decoded = decode_token(&token, "secret").unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.exp - decoded.iat, 24 * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token(&Claims::new(1, Role::Admin, 24), "secret").unwrap();
        assert!(matches!(decode_token(&token, "other"), Err(Error::Jwt(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(1, Role::Admin, 24);
        claims.iat -= 3 * 24 * 3600;
        claims.exp = claims.iat + 3600;
        let token = encode_token(&claims, "secret").unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}

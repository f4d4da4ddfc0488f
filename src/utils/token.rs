use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::user::User;

/// Signs an HS256 session token for `user`, valid for `ttl_hours`.
pub fn issue_session_token(user: &User, secret: &str, ttl_hours: i64) -> Result<String> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        exp,
        role: user.role.as_str().to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_session_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let user = User::new("ann".into(), "ann@example.com".into(), "h".into(), UserRole::Ngo);
        let token = issue_session_token(&user, "secret", 1).unwrap();
        let claims = decode_session_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "ngo");
        assert!(decode_session_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_refused() {
        let user = User::new("bob".into(), "bob@example.com".into(), "h".into(), UserRole::Volunteer);
        let token = issue_session_token(&user, "secret", -2).unwrap();
        assert!(decode_session_token(&token, "secret").is_err());
    }
}

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Claims carried by tokens the identity provider issues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token verification is not configured")]
    NotConfigured,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub is_admin: bool,
}

/// Verifies HS256 tokens against the shared secret (and issuer, when configured).
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
    admin_role: String,
}

impl TokenVerifier {
    pub fn new(security: &SecurityConfig) -> Self {
        let key = (!security.jwt_secret.is_empty())
            .then(|| DecodingKey::from_secret(security.jwt_secret.as_bytes()));

        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &security.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key,
            validation,
            admin_role: security.admin_role.clone(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, TokenError> {
        let key = self.key.as_ref().ok_or(TokenError::NotConfigured)?;
        let data = decode::<Claims>(token, key, &self.validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        let claims = data.claims;
        let is_admin = claims.role == self.admin_role;
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            is_admin,
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Result<&str, &'static str> {
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or("Authorization header must use Bearer token format")?
        .trim();
    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::AppConfig;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) const SECRET: &str = "unit-test-secret";

    pub(crate) fn token_for(role: &str, ttl_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: format!("user_{}", role),
            email: Some(format!("{}@district.example", role)),
            name: None,
            role: role.to_string(),
            exp: now + ttl_secs,
            iat: now,
            iss: None,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn verifier() -> TokenVerifier {
        let mut security = AppConfig::development().security;
        security.jwt_secret = SECRET.to_string();
        TokenVerifier::new(&security)
    }

    #[test]
    fn accepts_valid_token_and_flags_admin() {
        let user = verifier().verify(&token_for("admin", 600)).unwrap();
        assert!(user.is_admin);
        assert_eq!(user.user_id, "user_admin");

        let staff = verifier().verify(&token_for("staff", 600)).unwrap();
        assert!(!staff.is_admin);
    }

    #[test]
    fn rejects_expired_token() {
        let err = verifier().verify(&token_for("staff", -3600)).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims { sub: "x".into(), email: None, name: None, role: "admin".into(), exp: now + 60, iat: now, iss: None };
        let forged = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"other")).unwrap();
        assert!(matches!(verifier().verify(&forged), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_rejects_everything() {
        let verifier = TokenVerifier::new(&AppConfig::development().security);
        assert!(matches!(verifier.verify(&token_for("admin", 600)), Err(TokenError::NotConfigured)));
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let mut security = AppConfig::development().security;
        security.jwt_secret = SECRET.to_string();
        security.jwt_issuer = Some("https://idp.example".to_string());
        let strict = TokenVerifier::new(&security);
        assert!(strict.verify(&token_for("admin", 600)).is_err());
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert_eq!(bearer_token("bearer abc").unwrap(), "abc");
        assert!(bearer_token("Basic Zm9v").is_err());
        assert!(bearer_token("Bearer   ").is_err());
    }
}

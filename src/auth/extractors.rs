use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::Claims;
use crate::config::JwtConfig;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub audience: String,
    pub issuer: Option<String>,
    #[cfg(test)]
    pub secret: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            audience,
            issuer,
        } = state.config.jwt.clone();
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            audience,
            issuer,
            #[cfg(test)]
            secret,
        }
    }
}

impl JwtKeys {
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&self.audience));
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(std::slice::from_ref(issuer));
        }
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Signs a token the way the identity provider would.
    #[cfg(test)]
    pub fn sign(&self, user_id: Uuid, ttl_secs: i64) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};
        use serde_json::json;

        let exp = time::OffsetDateTime::now_utc().unix_timestamp() + ttl_secs;
        let mut claims = json!({
            "sub": user_id,
            "exp": exp,
            "aud": self.audience,
            "role": "authenticated",
        });
        if let Some(issuer) = &self.issuer {
            claims["iss"] = json!(issuer);
        }
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .unwrap()
    }
}

/// Caller identity taken from a verified bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized
        })?;

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(audience: &str, issuer: Option<&str>) -> JwtKeys {
        let state = AppState::fake();
        let mut keys = JwtKeys::from_ref(&state);
        keys.audience = audience.into();
        keys.issuer = issuer.map(String::from);
        keys
    }

    #[test]
    fn verifies_own_token() {
        let keys = keys("authenticated", None);
        let user_id = Uuid::new_v4();
        let claims = keys.verify(&keys.sign(user_id, 60)).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role.as_deref(), Some("authenticated"));
    }

    #[test]
    fn rejects_wrong_audience() {
        let token = keys("other", None).sign(Uuid::new_v4(), 60);
        assert!(keys("authenticated", None).verify(&token).is_err());
    }

    #[test]
    fn checks_issuer_only_when_configured() {
        let token = keys("authenticated", Some("https://auth.example")).sign(Uuid::new_v4(), 60);
        assert!(keys("authenticated", None).verify(&token).is_ok());
        assert!(keys("authenticated", Some("https://other.example"))
            .verify(&token)
            .is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let keys = keys("authenticated", None);
        let token = keys.sign(Uuid::new_v4(), -3600);
        assert!(keys.verify(&token).is_err());
    }
}

use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: Option<String>,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Claims {
    // Standard JWT claims (exp/iss/aud validated by jsonwebtoken)
    pub sub: String,
    #[serde(rename = "exp")]
    _exp: u64,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,

    // Organization claim, present when the session acts inside an organization
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub org_role: Option<String>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: Option<String>,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        // Decode header to get kid
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        // Validate algorithm from header
        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        // Get decoding key from JWKS
        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        claims_to_user(&self.issuer, token_data.claims)
    }
}

/// Map validated claims onto the caller identity
pub(crate) fn claims_to_user(issuer: &str, claims: Claims) -> Result<AuthenticatedUser, AppError> {
    if claims.sub.trim().is_empty() {
        return Err(AppError::Auth("Token subject is empty".to_string()));
    }

    Ok(AuthenticatedUser {
        token_identifier: AuthenticatedUser::token_identifier_for(issuer, &claims.sub),
        sub: claims.sub,
        name: claims.name,
        picture: claims.picture,
        org_id: claims.org_id.filter(|id| !id.is_empty()),
        org_role: claims.org_role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_claims_map_to_identity() {
        let user = claims_to_user(
            "https://id.example.com",
            claims(json!({
                "sub": "user_1",
                "exp": 4102444800u64,
                "name": "Ada",
                "org_id": "org_9",
                "org_role": "admin"
            })),
        )
        .unwrap();

        assert_eq!(user.token_identifier, "https://id.example.com|user_1");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.org_id.as_deref(), Some("org_9"));
        assert_eq!(user.org_role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_empty_org_claim_is_ignored() {
        let user = claims_to_user(
            "iss",
            claims(json!({ "sub": "user_1", "exp": 1u64, "org_id": "" })),
        )
        .unwrap();
        assert!(user.org_id.is_none());
        assert_eq!(user.default_org_id(), "user_1");
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let result = claims_to_user("iss", claims(json!({ "sub": " ", "exp": 1u64 })));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller identity established from a validated bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// `{issuer}|{subject}`, stable across sessions
    pub token_identifier: String,
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Organization the session is currently acting in, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Role claim as issued by the identity provider. Informational only:
    /// access is decided from stored memberships.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_role: Option<String>,
}

impl AuthenticatedUser {
    pub fn token_identifier_for(issuer: &str, sub: &str) -> String {
        format!("{}|{}", issuer, sub)
    }

    /// Organization used when a request does not name one: the organization
    /// claim, else the caller's personal workspace.
    pub fn default_org_id(&self) -> &str {
        self.org_id.as_deref().unwrap_or(&self.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(org_id: Option<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            token_identifier: AuthenticatedUser::token_identifier_for(
                "https://id.example.com",
                "user_42",
            ),
            sub: "user_42".to_string(),
            name: None,
            picture: None,
            org_id: org_id.map(str::to_string),
            org_role: None,
        }
    }

    #[test]
    fn test_token_identifier_format() {
        assert_eq!(user(None).token_identifier, "https://id.example.com|user_42");
    }

    #[test]
    fn test_default_org_prefers_claim() {
        assert_eq!(user(Some("org_7")).default_org_id(), "org_7");
        assert_eq!(user(None).default_org_id(), "user_42");
    }
}

//! Access rules for organizations and files.
//!
//! Pure predicates over already-loaded records. They never fail; the
//! lifecycle and query services turn a `false` into the right error or an
//! empty result.

use crate::features::files::models::File;
use crate::features::users::models::{OrgRole, User};

/// A user may act in an organization when they hold a membership in it, or
/// when the organization id appears anywhere in their token identifier (the
/// personal workspace, whose id is the identity subject).
pub fn has_access_to_org(user: &User, org_id: &str) -> bool {
    user.memberships.iter().any(|m| m.org_id == org_id)
        || user.token_identifier.contains(org_id)
}

pub fn has_access_to_file(user: &User, file: &File) -> bool {
    has_access_to_org(user, &file.org_id)
}

/// Uploaders may delete or restore their own files; organization admins may
/// delete or restore any file in the organization.
pub fn can_delete_or_restore(user: &User, file: &File) -> bool {
    file.user_id == user.id || user.role_in(&file.org_id) == Some(OrgRole::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::models::FileType;
    use crate::features::users::models::Membership;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(token: &str, memberships: &[(&str, OrgRole)]) -> User {
        User {
            id: Uuid::now_v7(),
            token_identifier: token.to_string(),
            name: None,
            image_url: None,
            created_at: Utc::now(),
            memberships: memberships
                .iter()
                .map(|(org_id, role)| Membership {
                    org_id: org_id.to_string(),
                    role: *role,
                })
                .collect(),
        }
    }

    fn file(org_id: &str, owner: &User) -> File {
        File {
            id: Uuid::now_v7(),
            org_id: org_id.to_string(),
            user_id: owner.id,
            name: "report.pdf".to_string(),
            file_type: FileType::Pdf,
            blob_handle: format!("uploads/{}", Uuid::now_v7()),
            should_delete: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_membership_grants_org_access() {
        let u = user("https://id.example.com|user_1", &[("org_a", OrgRole::Member)]);
        assert!(has_access_to_org(&u, "org_a"));
        assert!(!has_access_to_org(&u, "org_b"));
    }

    #[test]
    fn test_personal_workspace_access_through_token() {
        let u = user("https://id.example.com|user_1", &[]);
        assert!(has_access_to_org(&u, "user_1"));
        assert!(!has_access_to_org(&u, "user_2"));
    }

    #[test]
    fn test_substring_fallback_is_literal() {
        // Any substring of the token identifier passes, including fragments
        let u = user("https://id.example.com|user_1", &[]);
        assert!(has_access_to_org(&u, "user_"));
        assert!(has_access_to_org(&u, "example"));
        assert!(has_access_to_org(&u, ""));
    }

    #[test]
    fn test_file_access_follows_org() {
        let owner = user("iss|owner", &[("org_a", OrgRole::Member)]);
        let outsider = user("iss|outsider", &[("org_b", OrgRole::Admin)]);
        let f = file("org_a", &owner);

        assert!(has_access_to_file(&owner, &f));
        assert!(!has_access_to_file(&outsider, &f));
    }

    #[test]
    fn test_owner_can_delete_or_restore() {
        let owner = user("iss|owner", &[("org_a", OrgRole::Member)]);
        let f = file("org_a", &owner);
        assert!(can_delete_or_restore(&owner, &f));
    }

    #[test]
    fn test_admin_can_delete_or_restore_others_files() {
        let owner = user("iss|owner", &[("org_a", OrgRole::Member)]);
        let admin = user("iss|admin", &[("org_a", OrgRole::Admin)]);
        let member = user("iss|member", &[("org_a", OrgRole::Member)]);
        let foreign_admin = user("iss|foreign", &[("org_b", OrgRole::Admin)]);
        let f = file("org_a", &owner);

        assert!(can_delete_or_restore(&admin, &f));
        assert!(!can_delete_or_restore(&member, &f));
        assert!(!can_delete_or_restore(&foreign_admin, &f));
    }
}

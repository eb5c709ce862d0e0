// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! User identity, persisted profile, and the public user projection.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Access role stored on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Unknown role strings read as `user`.
    #[default]
    #[serde(other)]
    User,
}

/// Identity produced by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Profile document stored in `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    /// Profile written on first sign-in. Always the non-privileged role.
    pub fn new_default(principal: &Principal) -> Self {
        Self {
            uid: principal.uid.clone(),
            email: principal.email.clone(),
            display_name: principal.display_name.clone(),
            role: Role::User,
        }
    }
}

/// Public user shape exposed to pages and API clients. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
}

impl AppUser {
    /// Merge a principal with its profile.
    ///
    /// Email prefers the principal, display name and role prefer the profile.
    pub fn project(principal: &Principal, profile: Option<&UserProfile>) -> Self {
        Self {
            uid: principal.uid.clone(),
            email: principal
                .email
                .clone()
                .or_else(|| profile.and_then(|p| p.email.clone())),
            display_name: profile
                .and_then(|p| p.display_name.clone())
                .or_else(|| principal.display_name.clone()),
            role: profile.map(|p| p.role).unwrap_or_default(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            uid: "u1".to_string(),
            email: Some("ada@example.org".to_string()),
            display_name: Some("Ada".to_string()),
        }
    }

    #[test]
    fn project_without_profile_defaults_to_user() {
        let user = AppUser::project(&principal(), None);
        assert_eq!(user.uid, "u1");
        assert_eq!(user.email.as_deref(), Some("ada@example.org"));
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn profile_display_name_and_role_take_precedence() {
        let profile = UserProfile {
            uid: "u1".to_string(),
            email: Some("other@example.org".to_string()),
            display_name: Some("Ada L.".to_string()),
            role: Role::Admin,
        };

        let user = AppUser::project(&principal(), Some(&profile));
        assert_eq!(user.display_name.as_deref(), Some("Ada L."));
        assert_eq!(user.email.as_deref(), Some("ada@example.org"));
        assert!(user.is_admin());
    }

    #[test]
    fn falls_back_to_profile_email_and_principal_name() {
        let bare = Principal {
            uid: "u2".to_string(),
            email: None,
            display_name: Some("Grace".to_string()),
        };
        let profile = UserProfile {
            uid: "u2".to_string(),
            email: Some("grace@example.org".to_string()),
            display_name: None,
            role: Role::User,
        };

        let user = AppUser::project(&bare, Some(&profile));
        assert_eq!(user.email.as_deref(), Some("grace@example.org"));
        assert_eq!(user.display_name.as_deref(), Some("Grace"));
    }

    #[test]
    fn role_parsing_is_lenient() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"uid": "u3", "role": "superuser"}"#).unwrap();
        assert_eq!(profile.role, Role::User);

        let profile: UserProfile = serde_json::from_str(r#"{"uid": "u3"}"#).unwrap();
        assert_eq!(profile.role, Role::User);

        let profile: UserProfile =
            serde_json::from_str(r#"{"uid": "u3", "role": "admin"}"#).unwrap();
        assert_eq!(profile.role, Role::Admin);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(serde_json::to_string(&Role::default()).unwrap(), r#""user""#);
    }

    #[test]
    fn default_profile_never_admin() {
        let profile = UserProfile::new_default(&principal());
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.uid, "u1");
    }
}

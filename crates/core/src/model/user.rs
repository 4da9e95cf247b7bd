use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{ParseKindError, UserId};

//
// ─── ROLE & MODE ───────────────────────────────────────────────────────────────
//

/// Account role chosen at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Citizen,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Citizen => "citizen",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "citizen" => Ok(Self::Citizen),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Learning track picked after sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Student,
    Citizen,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Student => "student",
            Mode::Citizen => "citizen",
        })
    }
}

impl FromStr for Mode {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "citizen" => Ok(Self::Citizen),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// The signed-in user as persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

impl User {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            role,
            avatar: None,
            mode: None,
        }
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        UserId::new(self.phone.clone())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Shallow-merge a patch: only fields present in the patch are replaced.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(mode) = patch.mode {
            self.mode = Some(mode);
        }
    }
}

/// Partial update for profile edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub avatar: Option<String>,
    pub mode: Option<Mode>,
}

impl ProfilePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Asha", "asha@example.com", "9876543210", Role::Student)
    }

    #[test]
    fn patch_only_overwrites_present_fields() {
        let mut u = user();
        u.apply(ProfilePatch {
            email: Some("new@example.com".into()),
            ..ProfilePatch::default()
        });
        assert_eq!(u.name, "Asha");
        assert_eq!(u.email, "new@example.com");
        assert_eq!(u.role, Role::Student);
        assert_eq!(u.mode, None);
    }

    #[test]
    fn mode_patch_sets_mode() {
        let mut u = user();
        u.apply(ProfilePatch::mode(Mode::Citizen));
        assert_eq!(u.mode, Some(Mode::Citizen));
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("avatar").is_none());
        assert_eq!(json["role"], "student");
    }

    #[test]
    fn role_parses_admin() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("moderator".parse::<Role>().is_err());
    }
}

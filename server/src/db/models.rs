//! Database Models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::permissions::Role;

/// User model.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub role: Role,
    pub traditional_title: String,
    pub village: String,
    pub ward: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full name, or empty when neither part is set.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Name with traditional title prefix when one is set, falling back to email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        let title = self.traditional_title.trim();
        match (title.is_empty(), full.is_empty()) {
            (false, false) => format!("{title} {full}"),
            (true, false) => full,
            _ => self.email.clone(),
        }
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub phone_number: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub role: Role,
    pub role_label: &'static str,
    pub traditional_title: String,
    pub village: String,
    pub ward: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name(),
            role_label: user.role.label(),
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            bio: user.bio,
            profile_image: user.profile_image,
            role: user.role,
            traditional_title: user.traditional_title,
            village: user.village,
            ward: user.ward,
            is_verified: user.is_verified,
            is_active: user.is_active,
            date_joined: user.date_joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str, title: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "adaeze@example.com".into(),
            password_hash: String::new(),
            first_name: first.into(),
            last_name: last.into(),
            phone_number: String::new(),
            bio: String::new(),
            profile_image: None,
            role: Role::Member,
            traditional_title: title.into(),
            village: String::new(),
            ward: String::new(),
            is_verified: false,
            is_active: true,
            date_joined: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_with_title() {
        assert_eq!(user("Adaeze", "Okpe", "Chief").display_name(), "Chief Adaeze Okpe");
    }

    #[test]
    fn test_display_name_without_title() {
        assert_eq!(user("Adaeze", "Okpe", "").display_name(), "Adaeze Okpe");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(user("", "", "Chief").display_name(), "adaeze@example.com");
    }

    #[test]
    fn test_profile_hides_hash() {
        let profile = UserProfile::from(user("A", "B", ""));
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "member");
    }
}

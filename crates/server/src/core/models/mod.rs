use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role tag attached to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Participant,
    Volunteer,
    Both,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Participant, Role::Volunteer, Role::Both];

    /// Lenient parse of a stored tag. Unknown tags are `None`, not an error.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "participant" => Some(Role::Participant),
            "volunteer" => Some(Role::Volunteer),
            "both" => Some(Role::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Participant => "participant",
            Role::Volunteer => "volunteer",
            Role::Both => "both",
        }
    }

    pub fn is_participant(&self) -> bool {
        matches!(self, Role::Participant | Role::Both)
    }

    pub fn is_volunteer(&self) -> bool {
        matches!(self, Role::Volunteer | Role::Both)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed-in state persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Option<Role>,
    #[serde(default)]
    pub is_admin: bool,
    /// Raw bearer token; only present on the client side of the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Participant / volunteer profile row.
///
/// Every descriptive field is optional: a profile row may exist with only an
/// id and a role, and the dashboards render placeholders for what is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub tshirt: Option<String>,
    pub dietary: Option<String>,
    pub role: Option<Role>,
}

impl Profile {
    pub fn dietary_label(&self) -> &str {
        match self.dietary.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub created_by: Option<String>,
    pub max_members: i64,
    pub members: Vec<TeamMember>,
}

/// Shape of `GET /api/admin/teams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub email: String,
    pub team: Option<String>,
    pub experience: Option<String>,
    /// `None` when the stored timestamp could not be read
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub availability: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_lenient() {
        assert_eq!(Role::parse("participant"), Some(Role::Participant));
        assert_eq!(Role::parse(" Volunteer "), Some(Role::Volunteer));
        assert_eq!(Role::parse("BOTH"), Some(Role::Both));
        assert_eq!(Role::parse("judge"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Both).unwrap(), "\"both\"");
        let role: Role = serde_json::from_str("\"volunteer\"").unwrap();
        assert_eq!(role, Role::Volunteer);
    }

    #[test]
    fn test_dietary_label_placeholder() {
        let mut profile = Profile::default();
        assert_eq!(profile.dietary_label(), "None");

        profile.dietary = Some("   ".to_string());
        assert_eq!(profile.dietary_label(), "None");

        profile.dietary = Some("Vegan".to_string());
        assert_eq!(profile.dietary_label(), "Vegan");
    }

    #[test]
    fn test_session_token_not_serialized_when_absent() {
        let session = Session {
            user_id: "u1".into(),
            email: "a@b.c".into(),
            role: Some(Role::Participant),
            is_admin: false,
            token: None,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["role"], "participant");
    }
}

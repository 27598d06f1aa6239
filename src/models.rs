use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

// --- Identity Schemas (Written by the web client) ---

/// Role
///
/// The RBAC value carried in the `user_data` cookie. The three known roles each own a
/// dashboard; any other string is kept verbatim so it can still be logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Vendor,
    User,
    Other(String),
}

impl Role {
    /// The wire value, exactly as the client writes it.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::User => "user",
            Role::Other(name) => name,
        }
    }

    /// dashboard_path
    ///
    /// Landing page for a signed-in user with this role. Unrecognised roles share the
    /// standard user dashboard.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/dashboard/admin",
            Role::Vendor => "/dashboard/vendor",
            Role::User | Role::Other(_) => "/dashboard/user",
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Role::Admin,
            "vendor" => Role::Vendor,
            "user" => Role::User,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// UserProfile
///
/// The JSON object stored (URL-encoded) in the `user_data` cookie. Only the role is
/// read here; other fields the client keeps in the cookie are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient_role")]
    #[ts(type = "string | null")]
    pub role: Option<Role>,
}

/// Non-string roles become `Other` instead of rejecting the whole profile.
fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(name) => Some(Role::from(name)),
        other => Some(Role::Other(other.to_string())),
    })
}

/// SessionSummary
///
/// Output schema for `GET /session`: what the gate can see about the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionSummary {
    pub authenticated: bool,
    pub role: Option<String>,
}

/// NotFound
///
/// Body of the fallback response for paths that pass the gate but match no route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NotFound {
    pub error: String,
    pub path: String,
}

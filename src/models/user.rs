// src/models/user.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::jwt::Claims;

/// The current session's identity as issued by the identity provider.
/// This service never sees credentials, only verified token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Identity {
    /// Name shown next to authored quizzes: the display name, else the
    /// local part of the email address.
    pub fn attribution_name(&self) -> Option<String> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
    }
}

impl TryFrom<&Claims> for Identity {
    type Error = uuid::Error;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&claims.sub)?,
            email: claims.email.clone(),
            display_name: claims.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: Option<&str>, name: Option<&str>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: email.map(str::to_string),
            display_name: name.map(str::to_string),
        }
    }

    #[test]
    fn attribution_prefers_display_name() {
        let who = identity(Some("grace@example.com"), Some("Grace H"));
        assert_eq!(who.attribution_name().as_deref(), Some("Grace H"));
    }

    #[test]
    fn attribution_falls_back_to_email_local_part() {
        let who = identity(Some("grace@example.com"), Some("   "));
        assert_eq!(who.attribution_name().as_deref(), Some("grace"));
        assert_eq!(identity(None, None).attribution_name(), None);
    }
}

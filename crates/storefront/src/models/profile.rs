//! User profile (display name and avatar).

use chrono::{DateTime, Utc};

use sinocoffee_core::{Email, ProfileId, UserId};

/// Row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the account page shows about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub initials: String,
}

impl ProfileView {
    /// Combine the auth identity with the (possibly missing) profile row.
    #[must_use]
    pub fn new(email: &Email, profile: Option<&Profile>) -> Self {
        Self {
            email: email.to_string(),
            display_name: profile.and_then(|p| p.display_name.clone()),
            avatar_url: profile.and_then(|p| p.avatar_url.clone()),
            initials: email.initials(),
        }
    }

    /// Name shown in the navbar and greeting.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

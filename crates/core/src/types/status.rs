//! Status and role enums.
//!
//! Both are stored as plain `text` columns guarded by `check` constraints, so
//! the string forms here must match the migrations.

use serde::{Deserialize, Serialize};

#[cfg(feature = "postgres")]
macro_rules! text_column {
    ($name:ident) => {
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<Self>()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode(self.to_string(), buf)
            }
        }
    };
}


/// Status of a past order in a user's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Paid and handed over.
    Completed,
    /// Paid, being prepared.
    #[default]
    Processing,
    /// Delivered to the customer.
    Delivered,
}

impl OrderStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Completed, Self::Processing, Self::Delivered];

    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Processing => "processing",
            Self::Delivered => "delivered",
        }
    }

    /// Human label for badges.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Processing => "Processing",
            Self::Delivered => "Delivered",
        }
    }

    /// CSS modifier class for the status badge.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Completed => "badge--success",
            Self::Processing => "badge--warning",
            Self::Delivered => "badge--info",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "processing" => Ok(Self::Processing),
            "delivered" => Ok(Self::Delivered),
            other => Err(format!("invalid order status: {other}")),
        }
    }
}

/// Application role granted to an auth user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// May manage the menu.
    Admin,
    /// Regular customer.
    #[default]
    User,
}

impl AppRole {
    /// Whether this role can reach the admin panel.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for AppRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(feature = "postgres")]
text_column!(OrderStatus);
#[cfg(feature = "postgres")]
text_column!(AppRole);

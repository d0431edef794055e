//! Toast notifications rendered into HTMX responses.

use serde::{Deserialize, Serialize};

/// Session key for a toast carried across a redirect.
pub const FLASH_KEY: &str = "flash";

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Default,
    Destructive,
}

impl ToastVariant {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Destructive => "destructive",
        }
    }
}

/// A short notification shown in the corner of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }

    /// Shown to guests who try a signed-in action.
    #[must_use]
    pub fn auth_required(action: &str) -> Self {
        Self::error(
            "Authentication Required",
            format!("Please sign in to {action}."),
        )
    }

    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self.variant, ToastVariant::Destructive)
    }
}

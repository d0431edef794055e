//! Account route handlers.
//!
//! These routes require authentication. The profile card is re-rendered as
//! an HTMX fragment after each edit.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::ProfileRepository;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, ProfileView, Toast};
use crate::state::AppState;
use crate::supabase::storage::avatar_path;

use super::PageContext;

/// Largest accepted avatar.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub display_name: String,
}

/// Profile card fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/profile_card.html")]
pub struct ProfileCardTemplate {
    pub profile: ProfileView,
    pub toast: Option<Toast>,
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/account.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub card: ProfileCardTemplate,
}

async fn profile_view(state: &AppState, user: &CurrentUser) -> ProfileView {
    let profile = ProfileRepository::new(state.pool())
        .get(user.id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load profile");
            None
        });
    ProfileView::new(&user.email, profile.as_ref())
}

/// Display the account page.
#[instrument(skip(state, ctx, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> impl IntoResponse {
    let profile = profile_view(&state, &user).await;
    AccountTemplate {
        ctx,
        card: ProfileCardTemplate {
            profile,
            toast: None,
        },
    }
}

/// Update the display name (HTMX). A blank name clears it.
#[instrument(skip(state, user, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> ProfileCardTemplate {
    let display_name = Some(form.display_name.trim()).filter(|name| !name.is_empty());

    match ProfileRepository::new(state.pool())
        .upsert_display_name(user.id, display_name)
        .await
    {
        Ok(profile) => {
            tracing::info!(user_id = %user.id, "Profile updated");
            ProfileCardTemplate {
                profile: ProfileView::new(&user.email, Some(&profile)),
                toast: Some(Toast::success("Success", "Profile updated successfully.")),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update profile");
            ProfileCardTemplate {
                profile: profile_view(&state, &user).await,
                toast: Some(Toast::error(
                    "Profile Update Failed",
                    "Your profile could not be saved. Please try again.",
                )),
            }
        }
    }
}

/// An uploaded image that passed validation.
#[derive(Debug, PartialEq, Eq)]
struct AvatarUpload {
    bytes: Vec<u8>,
    content_type: String,
    extension: &'static str,
}

/// File extension for an accepted image content type.
fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Check an uploaded file, returning a user-facing reason on rejection.
fn validate_avatar(content_type: &str, bytes: Vec<u8>) -> Result<AvatarUpload, &'static str> {
    if bytes.is_empty() {
        return Err("Please choose an image to upload.");
    }
    let Some(extension) = image_extension(content_type) else {
        return Err("Please upload an image file.");
    };
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err("Please upload an image smaller than 5MB.");
    }
    Ok(AvatarUpload {
        bytes,
        content_type: content_type.to_string(),
        extension,
    })
}

/// Pull the `avatar` field out of the multipart body.
async fn read_avatar_field(multipart: &mut Multipart) -> Result<AvatarUpload, &'static str> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err("Please choose an image to upload."),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed avatar upload");
                return Err("Please upload an image smaller than 5MB.");
            }
        };
        if field.name() != Some("avatar") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read avatar upload");
            "Please upload an image smaller than 5MB."
        })?;
        return validate_avatar(&content_type, bytes.to_vec());
    }
}

/// Upload a new avatar (HTMX, multipart).
#[instrument(skip(state, user, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> ProfileCardTemplate {
    let failed = |profile: ProfileView, reason: &str| ProfileCardTemplate {
        profile,
        toast: Some(Toast::error("Upload Failed", reason)),
    };

    let upload = match read_avatar_field(&mut multipart).await {
        Ok(upload) => upload,
        Err(reason) => return failed(profile_view(&state, &user).await, reason),
    };

    let bucket = state.config().supabase.avatar_bucket.as_str();
    let path = avatar_path(&user.id, upload.extension);
    let size = upload.bytes.len();

    if let Err(e) = state
        .storage()
        .upload(
            bucket,
            &path,
            upload.bytes,
            &upload.content_type,
            &user.access_token,
        )
        .await
    {
        tracing::error!(error = %e, "Avatar upload rejected");
        return failed(
            profile_view(&state, &user).await,
            "Your avatar could not be uploaded. Please try again.",
        );
    }

    let public_url = state.storage().public_url(bucket, &path);
    match ProfileRepository::new(state.pool())
        .upsert_avatar(user.id, &public_url)
        .await
    {
        Ok(profile) => {
            tracing::info!(user_id = %user.id, bytes = size, "Avatar updated");
            ProfileCardTemplate {
                profile: ProfileView::new(&user.email, Some(&profile)),
                toast: Some(Toast::success("Success", "Avatar updated successfully.")),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save avatar URL");
            failed(
                profile_view(&state, &user).await,
                "Your avatar could not be saved. Please try again.",
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sinocoffee_core::Email;

    #[test]
    fn test_validate_avatar() {
        let ok = validate_avatar("image/png", vec![1, 2, 3]).unwrap();
        assert_eq!(ok.extension, "png");
        assert_eq!(
            validate_avatar("application/pdf", vec![1]),
            Err("Please upload an image file.")
        );
        assert_eq!(
            validate_avatar("image/jpeg", vec![0; MAX_AVATAR_BYTES + 1]),
            Err("Please upload an image smaller than 5MB.")
        );
        assert!(validate_avatar("image/jpeg", Vec::new()).is_err());
    }

    #[test]
    fn test_profile_card_shows_initials_without_avatar() {
        let email = Email::parse("maria.chen@example.com").unwrap();
        let html = ProfileCardTemplate {
            profile: ProfileView::new(&email, None),
            toast: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("maria.chen@example.com"));
        assert!(html.contains("MA"));
        assert!(html.contains("hx-encoding=\"multipart/form-data\""));
    }
}

use crate::{
    error::{FeedError, Result},
    models::{
        account::{ChangePasswordRequest, SignInRequest, SignUpRequest},
        media::ImageUpload,
        session::Session,
        user::Profile,
    },
    state::AppState,
    validation::{
        auth::{PASSWORD_RULE, validate_request},
        content::validate_profile_photo,
    },
};

pub const PROFILE_FAILED: &str = "Failed to load your profile.";
pub const UPLOAD_PHOTO_FAILED: &str = "Failed to upload photo. Please try again.";

/// Turns a sign-in/sign-up server error into the message shown to the user.
pub fn describe_sign_in_error(server_message: Option<&str>) -> String {
    let Some(error) = server_message else {
        return "Something went wrong".to_string();
    };

    if error.contains("password") && error.contains("regex") {
        PASSWORD_RULE.to_string()
    } else if error.contains("incorrect") || error.contains("not exist") {
        "Email or password is incorrect".to_string()
    } else if error.contains("email") {
        "Invalid email address".to_string()
    } else {
        "Invalid login credentials".to_string()
    }
}

/// Turns a password-change server error into the message shown to the user.
pub fn describe_password_error(server_message: Option<&str>) -> String {
    let Some(error) = server_message else {
        return "Something went wrong".to_string();
    };

    if error.contains("password") && error.contains("regex") {
        PASSWORD_RULE.to_string()
    } else if error.contains("incorrect") || error.contains("wrong") {
        "Current password is incorrect".to_string()
    } else if error.contains("same") {
        "New password must be different from current password".to_string()
    } else {
        "Failed to change password. Please try again.".to_string()
    }
}

/// Signs in and persists the issued token.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The user's credentials.
///
/// # Returns
///
/// A `Result` containing the new `Session`.
pub async fn sign_in(state: &AppState, request: SignInRequest) -> Result<Session> {
    validate_request(&request)?;
    tracing::debug!("🔐 Sign-in attempt for {}", request.email);

    let token = state.api.sign_in(&request).await.map_err(|e| {
        tracing::warn!("❌ Sign-in failed: {}", e);
        FeedError::RemoteUnavailable(describe_sign_in_error(e.server_message()))
    })?;

    let session = Session::from_token(token.as_str()).ok_or_else(|| {
        tracing::error!("❌ Server issued an undecodable token");
        FeedError::RemoteUnavailable("Invalid login credentials".to_string())
    })?;

    state.sessions.save(session.token()).await?;
    tracing::info!("✅ Signed in as {}", session.subject());
    Ok(session)
}

/// Creates an account. The caller signs in afterwards.
pub async fn sign_up(state: &AppState, request: SignUpRequest) -> Result<()> {
    validate_request(&request)?;
    tracing::debug!("📝 Sign-up attempt for {}", request.email);

    state.api.sign_up(&request).await.map_err(|e| {
        tracing::warn!("❌ Sign-up failed: {}", e);
        FeedError::RemoteUnavailable(describe_sign_in_error(e.server_message()))
    })?;

    tracing::info!("✅ Account created for {}", request.email);
    Ok(())
}

/// Forgets the stored session.
pub async fn sign_out(state: &AppState) -> Result<()> {
    state.sessions.clear().await?;
    tracing::info!("👋 Signed out");
    Ok(())
}

/// Loads the signed-in user's profile.
pub async fn profile(state: &AppState, session: &Session) -> Result<Profile> {
    state.api.profile(session).await.map_err(|e| {
        tracing::error!("❌ Fetch user data error: {}", e);
        e.with_fallback(PROFILE_FAILED)
    })
}

/// Uploads a new profile photo and returns the refreshed profile.
pub async fn upload_photo(
    state: &AppState,
    session: &Session,
    photo: ImageUpload,
) -> Result<Profile> {
    validate_profile_photo(&photo)?;

    state.api.upload_photo(session, &photo).await.map_err(|e| {
        tracing::error!("❌ Photo upload error: {}", e);
        e.with_fallback(UPLOAD_PHOTO_FAILED)
    })?;
    tracing::info!("✅ Photo uploaded ({} bytes)", photo.len());

    profile(state, session).await
}

/// Changes the password.
///
/// The stored session is cleared whatever the outcome, so the caller always
/// has to sign in again.
pub async fn change_password(
    state: &AppState,
    session: &Session,
    request: ChangePasswordRequest,
) -> Result<()> {
    validate_request(&request)?;

    let result = state.api.change_password(session, &request).await;

    if let Err(e) = state.sessions.clear().await {
        tracing::error!("❌ Failed to clear session after password change: {}", e);
    }

    match result {
        Ok(()) => {
            tracing::info!("✅ Password changed for {}", session.subject());
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Change password error: {}", e);
            Err(FeedError::RemoteUnavailable(describe_password_error(
                e.server_message(),
            )))
        }
    }
}

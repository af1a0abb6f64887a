use crate::{
    error::Result,
    models::{media::ImageUpload, session::Session},
    state::AppState,
    validation::content::{validate_post_body, validate_post_image},
};

pub const CREATE_POST_FAILED: &str = "Failed to create post. Please try again.";

/// Publishes a new post with an optional image.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `session` - The author's session.
/// * `body` - The post text.
/// * `image` - The image to attach, if any.
///
/// # Returns
///
/// A `Result<()>`.
pub async fn create_post(
    state: &AppState,
    session: &Session,
    body: &str,
    image: Option<ImageUpload>,
) -> Result<()> {
    let body = validate_post_body(body)?;
    if let Some(image) = &image {
        validate_post_image(image)?;
    }

    state
        .api
        .create_post(session, body, image.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("❌ Create post error: {}", e);
            e.with_fallback(CREATE_POST_FAILED)
        })?;

    tracing::info!(
        "✅ Post created by {}{}",
        session.subject(),
        if image.is_some() { " with image" } else { "" }
    );
    Ok(())
}

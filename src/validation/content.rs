use crate::error::{FeedError, Result};
use crate::models::media::ImageUpload;

/// The largest image accepted for a post.
pub const MAX_POST_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// The largest accepted profile photo.
pub const MAX_PROFILE_PHOTO_BYTES: usize = 4 * 1024 * 1024;

/// Returns the trimmed comment text, rejecting blank input.
pub fn validate_comment_body(body: &str) -> Result<&str> {
    let content = body.trim();
    if content.is_empty() {
        return Err(FeedError::ValidationRejected(
            "Comment cannot be empty".to_string(),
        ));
    }
    Ok(content)
}

/// Returns the trimmed post text, rejecting blank input.
pub fn validate_post_body(body: &str) -> Result<&str> {
    let content = body.trim();
    if content.is_empty() {
        return Err(FeedError::ValidationRejected(
            "Post content is required".to_string(),
        ));
    }
    Ok(content)
}

/// Validates an image attached to a post.
pub fn validate_post_image(image: &ImageUpload) -> Result<()> {
    if image.len() > MAX_POST_IMAGE_BYTES {
        return Err(FeedError::ValidationRejected(
            "Image size must be less than 5MB".to_string(),
        ));
    }
    require_image(image)
}

/// Validates a new profile photo.
pub fn validate_profile_photo(photo: &ImageUpload) -> Result<()> {
    if photo.is_empty() {
        return Err(FeedError::ValidationRejected(
            "Please select a photo first".to_string(),
        ));
    }
    if photo.len() > MAX_PROFILE_PHOTO_BYTES {
        return Err(FeedError::ValidationRejected(
            "File size must be less than 4MB".to_string(),
        ));
    }
    require_image(photo)
}

fn require_image(upload: &ImageUpload) -> Result<()> {
    if !upload.is_image() {
        return Err(FeedError::ValidationRejected(
            "Please select an image file".to_string(),
        ));
    }
    Ok(())
}

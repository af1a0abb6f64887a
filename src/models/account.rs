use garde::Validate;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::validation::auth::{known_gender, past_date, strong_password};

/// The request payload for signing in.
#[derive(Serialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct SignInRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// The request payload for creating an account.
#[derive(Serialize, Validate, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[garde(length(min = 3, max = 50))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(custom(strong_password))]
    pub password: String,
    #[garde(matches(password))]
    pub re_password: String,
    /// `YYYY-MM-DD`.
    #[garde(custom(past_date))]
    pub date_of_birth: String,
    #[garde(custom(known_gender))]
    pub gender: String,
}

/// The request payload for changing the password.
#[derive(Serialize, Validate, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// The current password.
    #[garde(length(min = 1))]
    pub password: String,
    #[garde(custom(strong_password))]
    pub new_password: String,
}

use serde::{Deserialize, Serialize};

/// Request body for user registration.
///
/// Fields are optional so that an absent key is reported the same way as an
/// empty one.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(alias = "fullname")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of every response on the auth routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub full_name: String,
}

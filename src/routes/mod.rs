mod auth;
mod health_check;
mod me;

use serde::Serialize;

pub use auth::{login, refresh, register, REFRESH_TOKEN_HEADER};
pub use health_check::health_check;
pub use me::{change_password, delete_account, get_current_user};

/// Envelope for every successful JSON response
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

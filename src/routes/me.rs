/// Routes for the authenticated user's own account
///
/// All of these sit behind `RequestGuard`; the subject comes from the
/// `AuthenticatedUser` the guard bound, never from the request body.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthService;
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::routes::ApiResponse;

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// GET /api/v1/me
pub async fn get_current_user(
    user: AuthenticatedUser,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let profile = auth.current_user(&user.email).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new("Current user", profile)))
}

/// PUT /api/v1/me/change-password
///
/// # Errors
/// - 400: new password breaks the policy
/// - 401: old password does not match
pub async fn change_password(
    user: AuthenticatedUser,
    form: web::Json<ChangePasswordRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("change_password").with_subject(user.email.clone());

    auth.change_password(&user.email, &form.old_password, &form.new_password)
        .await?;

    context.log_completed("Password change completed");
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::empty("Password changed successfully")))
}

/// DELETE /api/v1/me
pub async fn delete_account(
    user: AuthenticatedUser,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("delete_account").with_subject(user.email.clone());

    auth.delete_account(&user.email).await?;

    context.log_completed("Account deletion completed");
    Ok(HttpResponse::NoContent().finish())
}

/// Authentication Routes
///
/// Public endpoints: registration, login and access-token refresh.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthService;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::routes::ApiResponse;

/// Header carrying the refresh token on `/auth/refresh`
pub const REFRESH_TOKEN_HEADER: &str = "Refresh-Token";

/// User registration request
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// User login request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with access and refresh tokens
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Refresh response, access token only
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /api/v1/auth/signup
///
/// # Errors
/// - 400: empty or malformed field, weak password
/// - 409: email already registered
/// - 500: internal server error
pub async fn register(
    form: web::Json<RegisterRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration").with_subject(form.email.clone());

    let user = auth
        .register(&form.email, &form.password, &form.first_name, &form.last_name)
        .await?;

    context.log_completed("Registration completed");

    Ok(HttpResponse::Created().json(ApiResponse::new("Successfully registered", user)))
}

/// POST /api/v1/auth/login
///
/// # Errors
/// - 400: empty email or password
/// - 401: invalid credentials (unknown email, wrong password, blocked account)
/// - 500: internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login").with_subject(form.email.clone());

    let pair = auth.login(&form.email, &form.password).await?;

    context.log_completed("Login completed");

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Successfully logged in",
        AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: auth.token_codec().access_ttl().num_seconds(),
        },
    )))
}

/// GET|POST /api/v1/auth/refresh
///
/// Reads the refresh token from the `Refresh-Token` header and returns a
/// new access token. The refresh token stays valid until it expires.
///
/// # Errors
/// - 401: missing, invalid, expired or wrong-kind token
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = req
        .headers()
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let access_token = auth.refresh(refresh_token)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Token refreshed",
        RefreshResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: auth.token_codec().access_ttl().num_seconds(),
        },
    )))
}

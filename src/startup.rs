use actix_web::dev::Server;
use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthService;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::RequestGuard;
use crate::routes::{
    change_password, delete_account, get_current_user, health_check, login, refresh, register,
};

/// Malformed or missing JSON bodies surface as validation errors (400)
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
}

pub fn run(listener: TcpListener, auth: AuthService) -> Result<Server, std::io::Error> {
    let codec = auth.token_codec();
    let auth = web::Data::new(auth);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(auth.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1/auth")
                    .route("/signup", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::get().to(refresh))
                    .route("/refresh", web::post().to(refresh)),
            )

            // Protected routes (access token required)
            .service(
                web::scope("/api/v1/me")
                    .wrap(RequestGuard::new(codec.clone()))
                    .route("", web::get().to(get_current_user))
                    .route("", web::delete().to(delete_account))
                    .route("/change-password", web::put().to(change_password)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

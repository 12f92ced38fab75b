//! Integration tests for the booking_auth server

use std::net::TcpListener;
use std::sync::Arc;

use booking_auth::auth::{AuthService, PasswordHasher, TokenCodec};
use booking_auth::configuration::JwtSettings;
use booking_auth::startup::run;
use booking_auth::store::InMemoryCredentialStore;

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let settings = JwtSettings {
        secret: "health-check-secret".to_string(),
        issuer: "book_talk".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 86400,
    };
    let auth = AuthService::new(
        Arc::new(InMemoryCredentialStore::new()),
        TokenCodec::new(&settings).expect("Invalid token settings"),
        PasswordHasher::new(4),
    )
    .expect("Failed to build auth service");

    let server = run(listener, auth).expect("Failed to create server");
    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/api/v1/bookings", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
}

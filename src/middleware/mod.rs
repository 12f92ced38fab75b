/// Middleware module
///
/// Request guard for routes that require an authenticated user.

mod request_guard;

pub use request_guard::{bearer_token, AuthenticatedUser, RequestGuard};

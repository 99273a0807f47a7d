//! Mock MessFinder REST API for integration tests and local development.
//!
//! Every route lives under `/api/v1` and answers with the
//! `{success, message, data}` envelope; failures carry `statusCode` too.
//! Accounts are seeded with [`store::DEMO_PASSWORD`] and every OTP is
//! [`store::DEMO_OTP`].

pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

use crate::store::{Store, User};

pub type Db = Arc<RwLock<Store>>;

pub const API_PREFIX: &str = "/api/v1";

/// An error envelope with its HTTP status.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "message": self.message,
            "statusCode": self.status.as_u16(),
        });
        (self.status, Json(body)).into_response()
    }
}

pub type Reply = Result<(StatusCode, Json<Value>), AppError>;

pub fn ok(message: &str, data: Value) -> Reply {
    Ok((
        StatusCode::OK,
        Json(json!({"success": true, "message": message, "data": data})),
    ))
}

pub fn created(message: &str, data: Value) -> Reply {
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "message": message, "data": data})),
    ))
}

/// Resolve the bearer token to an active user.
pub fn authenticate(store: &Store, headers: &HeaderMap) -> Result<User, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Not authorized, no token"))?;
    let user = store
        .sessions
        .get(token)
        .and_then(|user_id| store.user(user_id))
        .ok_or_else(|| AppError::unauthorized("Not authorized, token failed"))?;
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }
    Ok(user.clone())
}

pub fn require_role(user: &User, roles: &[&str]) -> Result<(), AppError> {
    if roles.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(AppError::forbidden("You do not have permission to perform this action"))
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    use handlers::{admin, auth, bookings, favorites, messes, payments, reviews};

    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/auth/resend-otp", post(auth::resend_otp))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/change-password", put(auth::change_password))
        .route("/messes", get(messes::list))
        .route("/messes/search", get(messes::search))
        .route("/messes/owner/my-messes", get(messes::owner_listings))
        .route("/messes/{id}", get(messes::get_one))
        .route("/home-sliders", get(messes::sliders))
        .route("/bookings", post(bookings::create))
        .route("/bookings/my-bookings", get(bookings::list_mine))
        .route("/bookings/owner", get(bookings::list_for_owner))
        .route("/bookings/{id}", get(bookings::get_one))
        .route("/bookings/{id}/cancel", patch(bookings::cancel))
        .route("/bookings/{id}/status", patch(bookings::update_status))
        .route("/payments/initiate", post(payments::initiate))
        .route("/payments/verify/{tx}", get(payments::verify))
        .route("/reviews", post(reviews::create))
        .route("/reviews/mess/{id}", get(reviews::list_for_mess))
        .route("/reviews/{id}", put(reviews::update).delete(reviews::remove))
        .route("/favorites", get(favorites::list).post(favorites::save))
        .route("/favorites/check/{mess_id}", get(favorites::check))
        .route("/favorites/{mess_id}", delete(favorites::remove))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::users))
        .route("/admin/users/{id}/status", patch(admin::set_user_active))
        .route("/admin/messes/{id}/status", patch(admin::set_mess_status))
        .route("/admin/home-sliders", post(admin::create_slider))
        .route("/admin/home-sliders/{id}", delete(admin::delete_slider))
        .with_state(db);

    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

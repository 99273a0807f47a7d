use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::store::{new_id, User, DEMO_OTP};
use crate::{authenticate, created, ok, AppError, Db, Reply};

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "student".to_string()
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailInput {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> Reply {
    let email = input.email.trim().to_lowercase();
    if input.name.trim().is_empty() || email.is_empty() {
        return Err(AppError::bad_request("Name and email are required"));
    }
    if input.password.len() < 6 {
        return Err(AppError::bad_request("Password must be at least 6 characters"));
    }
    if !matches!(input.role.as_str(), "student" | "owner") {
        return Err(AppError::bad_request("Invalid role"));
    }

    let mut store = db.write().await;
    if store.user_by_email(&email).is_some() {
        return Err(AppError::conflict("User already exists with this email"));
    }
    store.users.push(User {
        id: new_id(),
        name: input.name.trim().to_string(),
        email: email.clone(),
        phone: input.phone,
        role: input.role,
        password: input.password,
        is_active: true,
    });
    store.otps.insert(email.clone(), DEMO_OTP.to_string());
    info!(%email, "registered; otp issued");
    created(
        "Registration successful. Please verify the OTP sent to your email.",
        json!({"otpRequired": true, "email": email}),
    )
}

/// Admins sign in directly; everyone else gets an OTP challenge.
pub async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Reply {
    let mut store = db.write().await;
    let user = store
        .user_by_email(input.email.trim())
        .filter(|user| user.password == input.password)
        .cloned()
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    if user.role == "admin" {
        let token = store.issue_token(&user.id);
        info!(user_id = %user.id, "admin signed in");
        return ok(
            "Login successful",
            json!({"otpRequired": false, "token": token, "user": user.to_json()}),
        );
    }
    store.otps.insert(user.email.clone(), DEMO_OTP.to_string());
    info!(email = %user.email, "otp issued");
    ok(
        "OTP sent to your email",
        json!({"otpRequired": true, "email": user.email}),
    )
}

pub async fn verify_otp(State(db): State<Db>, Json(input): Json<VerifyOtpInput>) -> Reply {
    let email = input.email.trim().to_lowercase();
    let mut store = db.write().await;
    if store.otps.get(&email).map(String::as_str) != Some(input.otp.as_str()) {
        return Err(AppError::bad_request("Invalid or expired OTP"));
    }
    let user = store
        .user_by_email(&email)
        .cloned()
        .ok_or_else(|| AppError::not_found("User not found"))?;
    store.otps.remove(&email);
    let token = store.issue_token(&user.id);
    info!(user_id = %user.id, "otp verified");
    ok(
        "Login successful",
        json!({"token": token, "user": user.to_json()}),
    )
}

pub async fn resend_otp(State(db): State<Db>, Json(input): Json<EmailInput>) -> Reply {
    let email = input.email.trim().to_lowercase();
    let mut store = db.write().await;
    if store.user_by_email(&email).is_none() {
        return Err(AppError::not_found("User not found"));
    }
    store.otps.insert(email, DEMO_OTP.to_string());
    ok("OTP resent", Value::Null)
}

pub async fn me(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    ok("User fetched", user.to_json())
}

/// Always succeeds; drops the presented token when there is one.
pub async fn logout(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    if let Some(token) = token {
        db.write().await.sessions.remove(&token);
    }
    ok("Logged out successfully", Value::Null)
}

pub async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ProfileInput>,
) -> Reply {
    let mut store = db.write().await;
    let current = authenticate(&store, &headers)?;
    let user = store
        .users
        .iter_mut()
        .find(|user| user.id == current.id)
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if let Some(name) = input.name.filter(|name| !name.trim().is_empty()) {
        user.name = name.trim().to_string();
    }
    if let Some(phone) = input.phone {
        user.phone = phone;
    }
    ok("Profile updated", user.to_json())
}

pub async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<PasswordInput>,
) -> Reply {
    let mut store = db.write().await;
    let current = authenticate(&store, &headers)?;
    if current.password != input.current_password {
        return Err(AppError::bad_request("Current password is incorrect"));
    }
    if input.new_password.len() < 6 {
        return Err(AppError::bad_request("Password must be at least 6 characters"));
    }
    if let Some(user) = store.users.iter_mut().find(|user| user.id == current.id) {
        user.password = input.new_password;
    }
    ok("Password changed", Value::Null)
}

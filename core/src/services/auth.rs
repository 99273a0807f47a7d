//! `/auth` endpoints.

use super::{Ack, Call};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{
    AuthPayload, ChangePassword, EmailRequest, LoginChallenge, LoginRequest, RegisterRequest,
    UpdateProfile, User, VerifyOtpRequest,
};

/// Registration answers with an OTP challenge for the new address.
pub fn register(client: &ApiClient, input: &RegisterRequest) -> Result<Call<LoginChallenge>, ApiError> {
    client.with_json(HttpMethod::Post, "/auth/register", input)
}

pub fn login(client: &ApiClient, input: &LoginRequest) -> Result<Call<LoginChallenge>, ApiError> {
    client.with_json(HttpMethod::Post, "/auth/login", input)
}

pub fn verify_otp(client: &ApiClient, email: &str, otp: &str) -> Result<Call<AuthPayload>, ApiError> {
    let input = VerifyOtpRequest {
        email: email.to_string(),
        otp: otp.to_string(),
    };
    client.with_json(HttpMethod::Post, "/auth/verify-otp", &input)
}

pub fn resend_otp(client: &ApiClient, email: &str) -> Result<Call<Ack>, ApiError> {
    let input = EmailRequest {
        email: email.to_string(),
    };
    client.with_json(HttpMethod::Post, "/auth/resend-otp", &input)
}

/// Validate the persisted token and fetch the current user.
pub fn check_auth(client: &ApiClient) -> Call<User> {
    client.get("/auth/me", &[])
}

pub fn logout(client: &ApiClient) -> Call<Ack> {
    client.bodyless(HttpMethod::Post, "/auth/logout")
}

pub fn update_profile(client: &ApiClient, input: &UpdateProfile) -> Result<Call<User>, ApiError> {
    client.with_json(HttpMethod::Put, "/auth/profile", input)
}

pub fn change_password(client: &ApiClient, input: &ChangePassword) -> Result<Call<Ack>, ApiError> {
    client.with_json(HttpMethod::Put, "/auth/change-password", input)
}

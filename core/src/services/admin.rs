//! Admin-only endpoints. The server enforces the role; the route guard keeps
//! non-admins away from the screens that call these.

use super::{Ack, Call};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{
    AdminStats, CreateSlider, HomeSlider, Mess, MessStatus, MessStatusUpdate, SetUserActive, User,
};

pub fn stats(client: &ApiClient) -> Call<AdminStats> {
    client.get("/admin/stats", &[])
}

pub fn list_users(client: &ApiClient, page: u32, limit: u32) -> Call<Vec<User>> {
    client.get(
        "/admin/users",
        &[("page", page.max(1).to_string()), ("limit", limit.max(1).to_string())],
    )
}

pub fn set_user_active(client: &ApiClient, user_id: &str, is_active: bool) -> Result<Call<User>, ApiError> {
    client.with_json(
        HttpMethod::Patch,
        &format!("/admin/users/{user_id}/status"),
        &SetUserActive { is_active },
    )
}

pub fn update_mess_status(client: &ApiClient, mess_id: &str, status: MessStatus) -> Result<Call<Mess>, ApiError> {
    client.with_json(
        HttpMethod::Patch,
        &format!("/admin/messes/{mess_id}/status"),
        &MessStatusUpdate { status },
    )
}

pub fn create_slider(client: &ApiClient, background_image: &str) -> Result<Call<HomeSlider>, ApiError> {
    let input = CreateSlider {
        background_image: background_image.to_string(),
    };
    client.with_json(HttpMethod::Post, "/admin/home-sliders", &input)
}

pub fn delete_slider(client: &ApiClient, slider_id: &str) -> Call<Ack> {
    client.bodyless(HttpMethod::Delete, &format!("/admin/home-sliders/{slider_id}"))
}

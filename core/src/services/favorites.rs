//! Saved-mess endpoints.

use super::{Ack, Call};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{FavoriteStatus, SaveFavorite, SavedMess};

pub fn list(client: &ApiClient) -> Call<Vec<SavedMess>> {
    client.get("/favorites", &[])
}

pub fn save(client: &ApiClient, mess_id: &str) -> Result<Call<SavedMess>, ApiError> {
    let input = SaveFavorite {
        mess_id: mess_id.to_string(),
    };
    client.with_json(HttpMethod::Post, "/favorites", &input)
}

/// Removal is keyed by mess id, not by the join record's id.
pub fn remove(client: &ApiClient, mess_id: &str) -> Call<Ack> {
    client.bodyless(HttpMethod::Delete, &format!("/favorites/{mess_id}"))
}

pub fn check(client: &ApiClient, mess_id: &str) -> Call<FavoriteStatus> {
    client.get(&format!("/favorites/check/{mess_id}"), &[])
}

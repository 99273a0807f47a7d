//! `/reviews` endpoints.

use super::{Ack, Call};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{CreateReview, Review, ReviewPage, UpdateReview};

pub fn list_for_mess(client: &ApiClient, mess_id: &str, page: u32, limit: u32) -> Call<ReviewPage> {
    client.get(
        &format!("/reviews/mess/{mess_id}"),
        &[("page", page.max(1).to_string()), ("limit", limit.max(1).to_string())],
    )
}

pub fn create(client: &ApiClient, input: &CreateReview) -> Result<Call<Review>, ApiError> {
    client.with_json(HttpMethod::Post, "/reviews", input)
}

pub fn update(client: &ApiClient, id: &str, input: &UpdateReview) -> Result<Call<Review>, ApiError> {
    client.with_json(HttpMethod::Put, &format!("/reviews/{id}"), input)
}

pub fn delete(client: &ApiClient, id: &str) -> Call<Ack> {
    client.bodyless(HttpMethod::Delete, &format!("/reviews/{id}"))
}

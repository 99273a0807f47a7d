use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::{new_id, paginate, Review};
use crate::{authenticate, created, ok, AppError, Db, Reply};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInput {
    pub mess_id: String,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInput {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

fn check_rating(rating: u8) -> Result<(), AppError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::bad_request("Rating must be between 1 and 5"))
    }
}

pub async fn list_for_mess(
    State(db): State<Db>,
    Path(mess_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Reply {
    let store = db.read().await;
    if store.mess(&mess_id).is_none() {
        return Err(AppError::not_found("Mess not found"));
    }
    let mut found: Vec<Review> = store
        .reviews
        .iter()
        .filter(|r| r.mess_id == mess_id)
        .cloned()
        .collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let (items, pagination) = paginate(&found, query.page, query.limit);
    let reviews: Vec<Value> = items
        .iter()
        .map(|r| r.to_json(store.user(&r.user_id)))
        .collect();
    ok("Reviews fetched", json!({"reviews": reviews, "pagination": pagination}))
}

/// One review per user and listing.
pub async fn create(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateInput>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    check_rating(input.rating)?;
    if input.comment.trim().is_empty() {
        return Err(AppError::bad_request("Comment is required"));
    }
    if store.mess(&input.mess_id).is_none() {
        return Err(AppError::not_found("Mess not found"));
    }
    if store
        .reviews
        .iter()
        .any(|r| r.mess_id == input.mess_id && r.user_id == user.id)
    {
        return Err(AppError::conflict("You have already reviewed this mess"));
    }
    let review = Review {
        id: new_id(),
        user_id: user.id.clone(),
        mess_id: input.mess_id,
        rating: input.rating,
        comment: input.comment.trim().to_string(),
        created_at: Utc::now(),
    };
    let body = review.to_json(Some(&user));
    let mess_id = review.mess_id.clone();
    store.reviews.push(review);
    store.refresh_rating(&mess_id);
    created("Review added", body)
}

pub async fn update(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateInput>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    if let Some(rating) = input.rating {
        check_rating(rating)?;
    }
    let review = store
        .reviews
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::not_found("Review not found"))?;
    if review.user_id != user.id {
        return Err(AppError::forbidden("Not your review"));
    }
    if let Some(rating) = input.rating {
        review.rating = rating;
    }
    if let Some(comment) = input.comment {
        review.comment = comment;
    }
    let review = review.clone();
    store.refresh_rating(&review.mess_id);
    ok("Review updated", review.to_json(Some(&user)))
}

pub async fn remove(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let index = store
        .reviews
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| AppError::not_found("Review not found"))?;
    if store.reviews[index].user_id != user.id && user.role != "admin" {
        return Err(AppError::forbidden("Not your review"));
    }
    let review = store.reviews.remove(index);
    store.refresh_rating(&review.mess_id);
    ok("Review deleted", Value::Null)
}

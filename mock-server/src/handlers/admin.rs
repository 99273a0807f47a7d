use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::store::{new_id, paginate, Slider, Store, User};
use crate::{authenticate, created, ok, require_role, AppError, Db, Reply};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveInput {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct MessStatusInput {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderInput {
    pub background_image: String,
}

fn admin(store: &Store, headers: &HeaderMap) -> Result<User, AppError> {
    let user = authenticate(store, headers)?;
    require_role(&user, &["admin"])?;
    Ok(user)
}

pub async fn stats(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    admin(&store, &headers)?;
    let revenue: f64 = store
        .bookings
        .iter()
        .filter(|b| b.payment_status == "paid")
        .map(|b| b.total_amount)
        .sum();
    ok(
        "Stats fetched",
        json!({
            "totalUsers": store.users.len(),
            "totalMesses": store.messes.len(),
            "totalBookings": store.bookings.len(),
            "pendingMesses": store.messes.iter().filter(|m| m.status == "pending").count(),
            "revenue": revenue,
        }),
    )
}

pub async fn users(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Reply {
    let store = db.read().await;
    admin(&store, &headers)?;
    let (items, _) = paginate(&store.users, query.page, query.limit);
    let users: Vec<Value> = items.iter().map(User::to_json).collect();
    ok("Users fetched", json!(users))
}

pub async fn set_user_active(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ActiveInput>,
) -> Reply {
    let mut store = db.write().await;
    let me = admin(&store, &headers)?;
    if me.id == id {
        return Err(AppError::bad_request("You cannot change your own status"));
    }
    let user = store
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| AppError::not_found("User not found"))?;
    user.is_active = input.is_active;
    let body = user.to_json();
    if !input.is_active {
        store.sessions.retain(|_, user_id| *user_id != id);
    }
    info!(user_id = %id, is_active = input.is_active, "user status changed");
    ok("User updated", body)
}

pub async fn set_mess_status(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<MessStatusInput>,
) -> Reply {
    let mut store = db.write().await;
    admin(&store, &headers)?;
    if !matches!(input.status.as_str(), "free" | "pending" | "booked" | "in progress") {
        return Err(AppError::bad_request("Invalid status"));
    }
    let mess = store
        .messes
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| AppError::not_found("Mess not found"))?;
    mess.status = input.status;
    let mess = mess.clone();
    ok("Mess updated", store.mess_with_owner(&mess))
}

pub async fn create_slider(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<SliderInput>,
) -> Reply {
    let mut store = db.write().await;
    admin(&store, &headers)?;
    if input.background_image.trim().is_empty() {
        return Err(AppError::bad_request("Background image is required"));
    }
    let slider = Slider {
        id: new_id(),
        background_image: input.background_image,
    };
    let body = slider.to_json();
    store.sliders.push(slider);
    created("Slider created", body)
}

pub async fn delete_slider(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut store = db.write().await;
    admin(&store, &headers)?;
    let before = store.sliders.len();
    store.sliders.retain(|s| s.id != id);
    if store.sliders.len() == before {
        return Err(AppError::not_found("Slider not found"));
    }
    ok("Slider deleted", Value::Null)
}

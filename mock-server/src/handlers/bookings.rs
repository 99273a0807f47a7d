use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::store::{new_id, start_of_day, Booking, Contact, Store, User};
use crate::{authenticate, created, ok, require_role, AppError, Db, Reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInput {
    pub mess_id: String,
    pub check_in_date: NaiveDate,
    pub tenant_contact: Contact,
    pub emergency_contact: Option<Contact>,
    #[serde(default = "default_method")]
    pub payment_method: String,
    pub notes: Option<String>,
}

fn default_method() -> String {
    "online".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelInput {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInput {
    pub booking_status: String,
}

pub async fn create(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateInput>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let mess = store
        .mess(&input.mess_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Mess not found"))?;
    if mess.status == "booked" {
        return Err(AppError::conflict("Mess is already booked"));
    }
    if input.check_in_date < Utc::now().date_naive() {
        return Err(AppError::bad_request("Check-in date cannot be in the past"));
    }
    if input.tenant_contact.name.trim().is_empty() || input.tenant_contact.phone.trim().is_empty() {
        return Err(AppError::bad_request("Tenant contact is required"));
    }
    if !matches!(input.payment_method.as_str(), "online" | "cash") {
        return Err(AppError::bad_request("Invalid payment method"));
    }

    let booking = Booking {
        id: new_id(),
        user_id: user.id.clone(),
        mess_id: mess.id.clone(),
        owner_id: mess.owner_id.clone(),
        booking_status: "pending".to_string(),
        payment_status: "pending".to_string(),
        payment_method: input.payment_method,
        total_amount: mess.pay_per_month,
        check_in_date: start_of_day(input.check_in_date),
        tenant_contact: input.tenant_contact,
        emergency_contact: input.emergency_contact,
        notes: input.notes,
        transaction_id: None,
        created_at: Utc::now(),
    };
    info!(booking_id = %booking.id, mess_id = %mess.id, user_id = %user.id, "booking created");
    let body = booking.to_json(Some(&mess));
    store.bookings.push(booking);
    created("Booking created successfully", body)
}

fn booking_list(store: &Store, keep: impl Fn(&Booking) -> bool, status: Option<&str>) -> Value {
    let now = Utc::now();
    let mut mine: Vec<&Booking> = store.bookings.iter().filter(|b| keep(b)).collect();
    mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let upcoming = mine.iter().filter(|b| b.is_upcoming(now)).count();
    let total = mine.len();
    let bookings: Vec<Value> = mine
        .into_iter()
        .filter(|b| match status {
            Some("upcoming") => b.is_upcoming(now),
            Some("past") => !b.is_upcoming(now),
            _ => true,
        })
        .map(|b| store.booking_json(b))
        .collect();
    json!({
        "bookings": bookings,
        "counts": {"upcoming": upcoming, "past": total - upcoming, "total": total},
    })
}

pub async fn list_mine(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let data = booking_list(&store, |b| b.user_id == user.id, query.status.as_deref());
    ok("Bookings fetched", data)
}

pub async fn list_for_owner(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    require_role(&user, &["owner", "admin"])?;
    let data = booking_list(&store, |b| b.owner_id == user.id, query.status.as_deref());
    ok("Bookings fetched", data)
}

fn visible_to(booking: &Booking, user: &User) -> bool {
    booking.user_id == user.id || booking.owner_id == user.id || user.role == "admin"
}

pub async fn get_one(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let booking = store
        .bookings
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(|| AppError::not_found("Booking not found"))?;
    if !visible_to(booking, &user) {
        return Err(AppError::forbidden("Not your booking"));
    }
    ok("Booking fetched", store.booking_json(booking))
}

pub async fn cancel(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<CancelInput>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let booking = store
        .bookings
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| AppError::not_found("Booking not found"))?;
    if booking.user_id != user.id {
        return Err(AppError::forbidden("Not your booking"));
    }
    if !booking.is_cancellable() {
        return Err(AppError::bad_request("Booking cannot be cancelled"));
    }
    booking.booking_status = "cancelled".to_string();
    if let Some(reason) = input.reason {
        booking.notes = Some(reason);
    }
    let booking = booking.clone();
    info!(booking_id = %booking.id, "booking cancelled");
    ok("Booking cancelled", store.booking_json(&booking))
}

/// Owner decision on a pending booking.
pub async fn update_status(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<StatusInput>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    require_role(&user, &["owner", "admin"])?;
    if !matches!(input.booking_status.as_str(), "confirmed" | "rejected" | "completed") {
        return Err(AppError::bad_request("Invalid booking status"));
    }
    let booking = store
        .bookings
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| AppError::not_found("Booking not found"))?;
    if booking.owner_id != user.id && user.role != "admin" {
        return Err(AppError::forbidden("Not your listing"));
    }
    if booking.booking_status == "cancelled" {
        return Err(AppError::bad_request("Booking was cancelled"));
    }
    booking.booking_status = input.booking_status;
    let booking = booking.clone();
    ok("Booking updated", store.booking_json(&booking))
}

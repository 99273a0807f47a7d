use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::store::new_id;
use crate::{authenticate, ok, AppError, Db, Reply};

pub const GATEWAY_URL: &str = "https://sandbox.gateway.test/pay";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateInput {
    pub booking_id: String,
}

/// Opens a fake hosted checkout for an unpaid booking of the caller.
pub async fn initiate(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<InitiateInput>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let booking = store
        .bookings
        .iter_mut()
        .find(|b| b.id == input.booking_id)
        .ok_or_else(|| AppError::not_found("Booking not found"))?;
    if booking.user_id != user.id {
        return Err(AppError::forbidden("Not your booking"));
    }
    if booking.payment_status == "paid" {
        return Err(AppError::bad_request("Booking is already paid"));
    }
    if booking.booking_status == "cancelled" {
        return Err(AppError::bad_request("Booking was cancelled"));
    }
    let tx = format!("TXN-{}", new_id());
    booking.transaction_id = Some(tx.clone());
    info!(booking_id = %booking.id, transaction_id = %tx, "payment session opened");
    ok(
        "Payment initiated",
        json!({"paymentUrl": format!("{GATEWAY_URL}/{tx}"), "transactionId": tx}),
    )
}

/// Settles the transaction as paid and confirms the booking.
pub async fn verify(State(db): State<Db>, headers: HeaderMap, Path(tx): Path<String>) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let booking = store
        .bookings
        .iter_mut()
        .find(|b| b.transaction_id.as_deref() == Some(tx.as_str()))
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;
    if booking.user_id != user.id {
        return Err(AppError::forbidden("Not your booking"));
    }
    booking.payment_status = "paid".to_string();
    booking.booking_status = "confirmed".to_string();
    let booking = booking.clone();
    ok("Payment verified", store.booking_json(&booking))
}

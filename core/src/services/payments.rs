//! Gateway handoff endpoints.

use super::Call;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Booking, InitiatePayment, PaymentSession};

/// Ask the server for a hosted checkout URL for `booking_id`.
pub fn initiate(client: &ApiClient, booking_id: &str) -> Result<Call<PaymentSession>, ApiError> {
    let input = InitiatePayment {
        booking_id: booking_id.to_string(),
    };
    client.with_json(HttpMethod::Post, "/payments/initiate", &input)
}

/// Re-read the booking a transaction settled, after the gateway redirect.
pub fn verify(client: &ApiClient, transaction_id: &str) -> Call<Booking> {
    client.get(&format!("/payments/verify/{transaction_id}"), &[])
}

//! Booking creation chained with payment initiation.
//!
//! The two calls are sequential and not transactional. Once the booking
//! exists server-side it is never rolled back: if payment initiation fails
//! the booking stays `pending` and the user retries payment from the
//! booking detail screen.

use tracing::{info, warn};

use super::{bookings, payments};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{Booking, CreateBooking, PaymentMethod, PaymentSession};

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Cash booking; nothing further to do client-side.
    Created { booking: Booking },
    /// Online booking; open `payment.payment_url` in the gateway view.
    AwaitingPayment {
        booking: Booking,
        payment: PaymentSession,
    },
    /// Booking exists but the gateway could not be reached.
    PaymentPending { booking: Booking, error: ApiError },
}

impl CheckoutOutcome {
    pub fn booking(&self) -> &Booking {
        match self {
            CheckoutOutcome::Created { booking }
            | CheckoutOutcome::AwaitingPayment { booking, .. }
            | CheckoutOutcome::PaymentPending { booking, .. } => booking,
        }
    }

    pub fn into_booking(self) -> Booking {
        match self {
            CheckoutOutcome::Created { booking }
            | CheckoutOutcome::AwaitingPayment { booking, .. }
            | CheckoutOutcome::PaymentPending { booking, .. } => booking,
        }
    }
}

/// Fails only if the booking itself could not be created.
pub fn checkout<X: Transport + ?Sized>(
    client: &ApiClient,
    transport: &X,
    input: &CreateBooking,
) -> Result<CheckoutOutcome, ApiError> {
    let booking = client
        .send(transport, bookings::create(client, input)?)?
        .into_data()?;
    info!(booking_id = %booking.id, mess_id = %input.mess_id, "booking created");

    if input.payment_method != PaymentMethod::Online {
        return Ok(CheckoutOutcome::Created { booking });
    }

    let payment = payments::initiate(client, &booking.id)
        .and_then(|call| client.send(transport, call))
        .and_then(|envelope| envelope.into_data());
    match payment {
        Ok(payment) => Ok(CheckoutOutcome::AwaitingPayment { booking, payment }),
        Err(error) => {
            warn!(booking_id = %booking.id, error = %error, "payment initiation failed; booking left pending");
            Ok(CheckoutOutcome::PaymentPending { booking, error })
        }
    }
}

/// Start payment again for an existing pending booking.
pub fn retry_payment<X: Transport + ?Sized>(
    client: &ApiClient,
    transport: &X,
    booking_id: &str,
) -> Result<PaymentSession, ApiError> {
    client
        .send(transport, payments::initiate(client, booking_id)?)?
        .into_data()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::{booking_json, client_with, ScriptedTransport};
    use crate::types::{BookingStatus, Contact};

    fn input(payment_method: PaymentMethod) -> CreateBooking {
        CreateBooking {
            mess_id: "m1".to_string(),
            check_in_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            tenant_contact: Contact {
                name: "Rafi".to_string(),
                phone: "01712345678".to_string(),
            },
            emergency_contact: None,
            payment_method,
            notes: None,
        }
    }

    #[test]
    fn online_booking_opens_payment_session() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(booking_json("b1", "pending", "pending"))
            .ok(json!({"paymentUrl": "https://gateway.test/pay/T1", "transactionId": "T1"}));

        let outcome = checkout(&client, &transport, &input(PaymentMethod::Online)).unwrap();

        match outcome {
            CheckoutOutcome::AwaitingPayment { booking, payment } => {
                assert_eq!(booking.id, "b1");
                assert_eq!(payment.transaction_id, "T1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(
            transport.paths(),
            vec!["POST /bookings".to_string(), "POST /payments/initiate".to_string()]
        );
        let body: serde_json::Value =
            serde_json::from_str(transport.requests()[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"bookingId": "b1"}));
    }

    #[test]
    fn failed_payment_start_keeps_booking() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(booking_json("b1", "pending", "pending"))
            .offline();

        let outcome = checkout(&client, &transport, &input(PaymentMethod::Online)).unwrap();

        assert!(matches!(
            outcome,
            CheckoutOutcome::PaymentPending { ref error, .. } if matches!(error, ApiError::Network { .. })
        ));
        assert_eq!(outcome.booking().booking_status, BookingStatus::Pending);
        // No rollback request follows the failure.
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn rejected_booking_is_an_error() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().fail(409, "Mess is already booked");

        let err = checkout(&client, &transport, &input(PaymentMethod::Online)).unwrap_err();

        assert_eq!(err.message(), "Mess is already booked");
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn retry_payment_targets_existing_booking() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(json!({"paymentUrl": "https://gateway.test/pay/T2", "transactionId": "T2"}));

        let payment = retry_payment(&client, &transport, "b1").unwrap();

        assert_eq!(payment.payment_url, "https://gateway.test/pay/T2");
    }
}

//! Stateless endpoint wrappers.
//!
//! Each function builds one [`Call`] and does nothing else beyond shaping
//! the payload or query string. Responses are decoded by
//! [`ApiClient::parse`](crate::ApiClient::parse) into the call's type.
//! [`checkout`] is the one exception: it chains booking creation and payment
//! initiation.

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod checkout;
pub mod favorites;
pub mod messes;
pub mod payments;
pub mod reviews;

/// Response type for endpoints whose `data` carries nothing the client uses.
pub type Ack = serde::de::IgnoredAny;

pub use crate::client::Call;

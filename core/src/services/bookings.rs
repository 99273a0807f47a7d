//! `/bookings` endpoints.

use super::Call;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Booking, BookingList, BookingStatus, BookingStatusUpdate, CancelBooking, CreateBooking};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookingFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

impl BookingFilter {
    fn param(self) -> Option<(&'static str, String)> {
        match self {
            BookingFilter::All => None,
            BookingFilter::Upcoming => Some(("status", "upcoming".to_string())),
            BookingFilter::Past => Some(("status", "past".to_string())),
        }
    }
}

pub fn create(client: &ApiClient, input: &CreateBooking) -> Result<Call<Booking>, ApiError> {
    client.with_json(HttpMethod::Post, "/bookings", input)
}

/// The tenant's own bookings plus upcoming/past/total counts.
pub fn list_mine(client: &ApiClient, filter: BookingFilter) -> Call<BookingList> {
    let params: Vec<_> = filter.param().into_iter().collect();
    client.get("/bookings/my-bookings", &params)
}

pub fn get_by_id(client: &ApiClient, id: &str) -> Call<Booking> {
    client.get(&format!("/bookings/{id}"), &[])
}

pub fn cancel(client: &ApiClient, id: &str, reason: Option<&str>) -> Result<Call<Booking>, ApiError> {
    let input = CancelBooking {
        reason: reason.map(str::to_string),
    };
    client.with_json(HttpMethod::Patch, &format!("/bookings/{id}/cancel"), &input)
}

/// Bookings against the signed-in owner's listings.
pub fn list_for_owner(client: &ApiClient, filter: BookingFilter) -> Call<BookingList> {
    let params: Vec<_> = filter.param().into_iter().collect();
    client.get("/bookings/owner", &params)
}

/// Owner confirms or rejects a pending booking.
pub fn update_status(client: &ApiClient, id: &str, status: BookingStatus) -> Result<Call<Booking>, ApiError> {
    let input = BookingStatusUpdate {
        booking_status: status,
    };
    client.with_json(HttpMethod::Patch, &format!("/bookings/{id}/status"), &input)
}

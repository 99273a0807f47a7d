//! Blocking actions that tie services to state.
//!
//! # Design
//! `AppState` owns the session and every slice. The host creates one and
//! hands it to each [`Dispatcher`] call; nothing in the crate reaches for a
//! global. Each method is [`actions::begin`], one round-trip on the
//! transport, then [`actions::complete`]. Hosts that run their own event
//! loop call those two directly and may keep many requests in flight.
//!
//! Errors are returned to the caller as well as stored on the slice, so a
//! screen can either react inline or render the slice's `error`.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::actions::{self, Action};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::services::auth;
use crate::services::bookings::BookingFilter;
use crate::services::checkout::{self, CheckoutOutcome};
use crate::services::messes::MessQuery;
use crate::session::Session;
use crate::slices::{BookingState, FavoritesState, MessState, ReviewState};
use crate::storage;
use crate::types::UpdateProfile;
use crate::validation::{BookingForm, LoginForm, RegisterForm, ReviewForm};

/// Everything the screens read.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: Session,
    pub messes: MessState,
    pub bookings: BookingState,
    pub favorites: FavoritesState,
    pub reviews: ReviewState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every slice's data and in-flight tickets.
    pub fn clear_slices(&mut self) {
        self.messes.clear();
        self.bookings.clear();
        self.favorites.clear();
        self.reviews.clear();
    }

    /// Forget the signed-in user locally: persisted credentials, session
    /// and every slice.
    pub fn sign_out(&mut self, client: &ApiClient) {
        if let Err(e) = storage::purge_session(client.storage()) {
            warn!(error = %e, "could not clear persisted session");
        }
        self.session.logout();
        self.clear_slices();
    }
}

pub struct Dispatcher<'a, X: Transport + ?Sized> {
    client: &'a ApiClient,
    transport: &'a X,
}

impl<'a, X: Transport + ?Sized> Dispatcher<'a, X> {
    pub fn new(client: &'a ApiClient, transport: &'a X) -> Self {
        Self { client, transport }
    }

    fn drive(&self, state: &mut AppState, action: Action) -> Result<(), ApiError> {
        let Some((in_flight, request)) = actions::begin(self.client, state, action)? else {
            return Ok(());
        };
        let outcome = self.transport.execute(&request);
        actions::complete(self.client, state, in_flight, outcome)
    }

    // --- session -----------------------------------------------------------

    /// Restore the session at launch. Never fails: any problem resolves to
    /// signed out. Only a 401 removes the stored token.
    pub fn bootstrap(&self, state: &mut AppState) {
        if let Err(e) = self.drive(state, Action::Bootstrap) {
            debug!(error = %e, "session restore failed");
        }
    }

    /// Submit credentials. On success the session waits for the emailed
    /// code, unless the server signs the account in directly.
    pub fn login(&self, state: &mut AppState, form: &LoginForm) -> Result<(), ApiError> {
        self.drive(state, Action::Login(form.clone()))
    }

    pub fn register(&self, state: &mut AppState, form: &RegisterForm) -> Result<(), ApiError> {
        self.drive(state, Action::Register(form.clone()))
    }

    /// Exchange the emailed code for a token. A malformed code is rejected
    /// locally and the session is left as it was.
    pub fn verify_otp(&self, state: &mut AppState, code: &str) -> Result<(), ApiError> {
        self.drive(state, Action::VerifyOtp { code: code.to_string() })
    }

    pub fn resend_otp(&self, state: &mut AppState) -> Result<(), ApiError> {
        self.drive(state, Action::ResendOtp)
    }

    /// Tell the server, then forget everything locally regardless of the
    /// server's answer.
    pub fn logout(&self, state: &mut AppState) {
        if let Err(e) = self.client.send(self.transport, auth::logout(self.client)) {
            debug!(error = %e, "server logout failed; clearing locally anyway");
        }
        state.sign_out(self.client);
    }

    pub fn update_profile(&self, state: &mut AppState, input: &UpdateProfile) -> Result<(), ApiError> {
        self.drive(state, Action::UpdateProfile(input.clone()))
    }

    // --- listings ----------------------------------------------------------

    /// Browse listings. `query.page == 1` starts over; later pages append.
    pub fn fetch_messes(&self, state: &mut AppState, query: &MessQuery) -> Result<(), ApiError> {
        self.drive(state, Action::FetchMesses(query.clone()))
    }

    pub fn search_messes(&self, state: &mut AppState, query: &MessQuery) -> Result<(), ApiError> {
        self.drive(state, Action::SearchMesses(query.clone()))
    }

    pub fn fetch_mess(&self, state: &mut AppState, id: &str) -> Result<(), ApiError> {
        self.drive(state, Action::FetchMess { id: id.to_string() })
    }

    pub fn fetch_sliders(&self, state: &mut AppState) -> Result<(), ApiError> {
        self.drive(state, Action::FetchSliders)
    }

    // --- bookings ----------------------------------------------------------

    pub fn fetch_bookings(&self, state: &mut AppState, filter: BookingFilter) -> Result<(), ApiError> {
        self.drive(state, Action::FetchBookings(filter))
    }

    pub fn fetch_booking(&self, state: &mut AppState, id: &str) -> Result<(), ApiError> {
        self.drive(state, Action::FetchBooking { id: id.to_string() })
    }

    /// Create the booking and, for online payment, start the gateway
    /// session. A failed payment start still counts as a created booking.
    pub fn create_booking(
        &self,
        state: &mut AppState,
        form: &BookingForm,
        today: NaiveDate,
    ) -> Result<CheckoutOutcome, ApiError> {
        let input = form.validate(today)?;
        let ticket = state.bookings.begin_create();
        let outcome = checkout::checkout(self.client, self.transport, &input);
        if let Err(ApiError::Unauthorized { .. }) = &outcome {
            state.session.invalidate();
        }
        match outcome {
            Ok(outcome) => {
                state.bookings.fulfill_create(ticket, outcome.booking().clone());
                Ok(outcome)
            }
            Err(e) => {
                state.bookings.reject(ticket, &e.message());
                Err(e)
            }
        }
    }

    /// A booking already known to be past the cancellable stage is refused
    /// without a request.
    pub fn cancel_booking(
        &self,
        state: &mut AppState,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        self.drive(
            state,
            Action::CancelBooking {
                id: id.to_string(),
                reason: reason.map(str::to_string),
            },
        )
    }

    // --- favorites ---------------------------------------------------------

    pub fn fetch_favorites(&self, state: &mut AppState) -> Result<(), ApiError> {
        self.drive(state, Action::FetchFavorites)
    }

    pub fn save_favorite(&self, state: &mut AppState, mess_id: &str) -> Result<(), ApiError> {
        self.drive(state, Action::SaveFavorite { mess_id: mess_id.to_string() })
    }

    pub fn remove_favorite(&self, state: &mut AppState, mess_id: &str) -> Result<(), ApiError> {
        self.drive(state, Action::RemoveFavorite { mess_id: mess_id.to_string() })
    }

    // --- reviews -----------------------------------------------------------

    pub fn fetch_reviews(&self, state: &mut AppState, mess_id: &str, page: u32) -> Result<(), ApiError> {
        self.drive(
            state,
            Action::FetchReviews {
                mess_id: mess_id.to_string(),
                page,
            },
        )
    }

    pub fn create_review(&self, state: &mut AppState, form: &ReviewForm) -> Result<(), ApiError> {
        self.drive(state, Action::CreateReview(form.clone()))
    }

    pub fn delete_review(&self, state: &mut AppState, review_id: &str) -> Result<(), ApiError> {
        self.drive(state, Action::DeleteReview { review_id: review_id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::session::SessionPhase;
    use crate::storage::{load_token, load_user, persist_session, MemoryStorage, SessionStorage};
    use crate::testing::{booking_json, client_with, mess_json, user_json, ScriptedTransport};
    use crate::types::{BookingStatus, PaymentMethod, Role};

    fn signed_out() -> AppState {
        let mut state = AppState::new();
        state.session.bootstrap_without_token();
        state
    }

    fn otp_pending() -> AppState {
        let mut state = signed_out();
        state.session.login_succeeded("rafi@mail.com");
        state
    }

    fn login_form() -> LoginForm {
        LoginForm {
            email: "Rafi@Mail.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[test]
    fn bootstrap_without_token_makes_no_request() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new();
        let mut state = AppState::new();

        Dispatcher::new(&client, &transport).bootstrap(&mut state);

        assert_eq!(state.session.phase(), &SessionPhase::Unauthenticated);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn bootstrap_restores_user_with_stored_token() {
        let storage = MemoryStorage::new();
        storage.set(storage::TOKEN_KEY, "tok").unwrap();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().ok(user_json("u1", "owner"));
        let mut state = AppState::new();

        Dispatcher::new(&client, &transport).bootstrap(&mut state);

        assert!(state.session.is_authenticated());
        assert_eq!(state.session.role(), Some(Role::Owner));
        assert_eq!(state.session.token(), Some("tok"));
        assert_eq!(transport.requests()[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(load_user(&storage).unwrap().map(|u| u.id), Some("u1".to_string()));
    }

    #[test]
    fn bootstrap_offline_signs_out_but_keeps_token() {
        let storage = MemoryStorage::new();
        storage.set(storage::TOKEN_KEY, "tok").unwrap();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().offline();
        let mut state = AppState::new();

        Dispatcher::new(&client, &transport).bootstrap(&mut state);

        assert!(!state.session.is_authenticated());
        assert!(!state.session.is_loading());
        assert_eq!(load_token(&storage).unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn bootstrap_with_expired_token_purges_it() {
        let storage = MemoryStorage::new();
        storage.set(storage::TOKEN_KEY, "stale").unwrap();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().fail(401, "Token expired");
        let mut state = AppState::new();

        Dispatcher::new(&client, &transport).bootstrap(&mut state);

        assert_eq!(state.session.phase(), &SessionPhase::Unauthenticated);
        assert_eq!(load_token(&storage).unwrap(), None);
    }

    #[test]
    fn login_enters_otp_step_without_token() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().ok(json!({"otpRequired": true, "email": "rafi@mail.com"}));
        let mut state = signed_out();

        Dispatcher::new(&client, &transport).login(&mut state, &login_form()).unwrap();

        assert!(state.session.otp_required());
        assert_eq!(state.session.otp_email(), Some("rafi@mail.com"));
        assert!(!state.session.is_authenticated());
        assert_eq!(load_token(&storage).unwrap(), None);
        assert_eq!(transport.paths(), vec!["POST /auth/login".to_string()]);
    }

    #[test]
    fn login_without_otp_signs_in_directly() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().ok(json!({
            "otpRequired": false,
            "token": "tok",
            "user": user_json("u1", "admin")
        }));
        let mut state = signed_out();

        Dispatcher::new(&client, &transport).login(&mut state, &login_form()).unwrap();

        assert_eq!(state.session.role(), Some(Role::Admin));
        assert_eq!(load_token(&storage).unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn invalid_login_form_sends_nothing() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new();
        let mut state = signed_out();
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        };

        let err = Dispatcher::new(&client, &transport).login(&mut state, &form).unwrap_err();

        assert!(matches!(err, ApiError::Validation(ref errors) if errors.len() == 2));
        assert!(transport.requests().is_empty());
        assert!(!state.session.is_loading());
    }

    #[test]
    fn login_failure_is_stored_on_session() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().fail(400, "Invalid credentials");
        let mut state = signed_out();

        let err = Dispatcher::new(&client, &transport).login(&mut state, &login_form()).unwrap_err();

        assert_eq!(err.message(), "Invalid credentials");
        assert_eq!(state.session.error(), Some("Invalid credentials"));
        assert!(!state.session.otp_required());
    }

    #[test]
    fn short_otp_is_rejected_without_request() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new();
        let mut state = otp_pending();

        for code in ["12345", "1234567", "12a456", ""] {
            let err = Dispatcher::new(&client, &transport).verify_otp(&mut state, code).unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
        assert!(transport.requests().is_empty());
        assert_eq!(state.session.otp_email(), Some("rafi@mail.com"));
    }

    #[test]
    fn verify_otp_persists_session() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().ok(json!({"token": "tok", "user": user_json("u1", "student")}));
        let mut state = otp_pending();

        Dispatcher::new(&client, &transport).verify_otp(&mut state, "123456").unwrap();

        assert!(state.session.is_authenticated());
        assert!(!state.session.otp_required());
        assert_eq!(load_token(&storage).unwrap().as_deref(), Some("tok"));
        assert_eq!(load_user(&storage).unwrap().map(|u| u.role), Some(Role::Student));
        let body: serde_json::Value =
            serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"email": "rafi@mail.com", "otp": "123456"}));
    }

    #[test]
    fn wrong_otp_keeps_pending_email() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().fail(400, "Invalid or expired OTP");
        let mut state = otp_pending();

        Dispatcher::new(&client, &transport).verify_otp(&mut state, "000000").unwrap_err();

        assert_eq!(state.session.otp_email(), Some("rafi@mail.com"));
        assert_eq!(state.session.error(), Some("Invalid or expired OTP"));
    }

    #[test]
    fn verify_otp_outside_otp_step_is_refused() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new();
        let mut state = signed_out();

        let err = Dispatcher::new(&client, &transport).verify_otp(&mut state, "123456").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn register_leads_to_otp() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().ok(json!({"otpRequired": true}));
        let mut state = signed_out();
        let form = RegisterForm {
            name: "Rafi".to_string(),
            email: "new@mail.com".to_string(),
            phone: "01712345678".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            role: Role::Student,
        };

        Dispatcher::new(&client, &transport).register(&mut state, &form).unwrap();

        assert_eq!(state.session.otp_email(), Some("new@mail.com"));
    }

    #[test]
    fn resend_otp_keeps_step() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().ok(json!(null)).fail(429, "Too many requests");
        let mut state = otp_pending();
        let dispatcher = Dispatcher::new(&client, &transport);

        dispatcher.resend_otp(&mut state).unwrap();
        assert!(state.session.otp_required());
        assert!(!state.session.is_loading());

        dispatcher.resend_otp(&mut state).unwrap_err();
        assert_eq!(state.session.otp_email(), Some("rafi@mail.com"));
        assert_eq!(state.session.error(), Some("Too many requests"));
    }

    #[test]
    fn logout_clears_storage_session_and_slices() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(json!([{"_id": "f1", "mess_id": mess_json("m1")}]))
            .offline();
        let mut state = signed_out();
        let user = serde_json::from_value(user_json("u1", "student")).unwrap();
        persist_session(&storage, "tok", &user).unwrap();
        state.session.otp_succeeded(user, "tok".to_string());

        let dispatcher = Dispatcher::new(&client, &transport);
        dispatcher.fetch_favorites(&mut state).unwrap();
        assert!(state.favorites.is_saved("m1"));

        dispatcher.logout(&mut state);

        assert_eq!(state.session.phase(), &SessionPhase::Unauthenticated);
        assert!(state.favorites.saved().is_empty());
        assert_eq!(load_token(&storage).unwrap(), None);
        assert_eq!(load_user(&storage).unwrap(), None);
    }

    #[test]
    fn fetch_messes_pages_and_dedups() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let pagination = |page: u32| json!({"page": page, "limit": 10, "total": 2, "totalPages": 2});
        let transport = ScriptedTransport::new()
            .ok(json!({"messes": [mess_json("a")], "pagination": pagination(1)}))
            .ok(json!({"messes": [mess_json("a"), mess_json("b")], "pagination": pagination(2)}));
        let mut state = signed_out();
        let dispatcher = Dispatcher::new(&client, &transport);

        dispatcher.fetch_messes(&mut state, &MessQuery::page(1)).unwrap();
        dispatcher.fetch_messes(&mut state, &MessQuery::page(2)).unwrap();

        let ids: Vec<&str> = state.messes.messes().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!state.messes.has_more());
    }

    #[test]
    fn network_failure_is_stored_on_slice() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().offline();
        let mut state = signed_out();

        let err = Dispatcher::new(&client, &transport)
            .fetch_messes(&mut state, &MessQuery::default())
            .unwrap_err();

        assert!(matches!(err, ApiError::Network { .. }));
        assert!(!state.messes.is_loading());
        assert_eq!(state.messes.error(), Some(crate::error::NETWORK_ERROR_MESSAGE));
    }

    #[test]
    fn unauthorized_anywhere_invalidates_session() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new().fail(401, "Unauthorized");
        let mut state = signed_out();
        let user = serde_json::from_value(user_json("u1", "student")).unwrap();
        persist_session(&storage, "tok", &user).unwrap();
        state.session.otp_succeeded(user, "tok".to_string());

        Dispatcher::new(&client, &transport)
            .fetch_bookings(&mut state, BookingFilter::All)
            .unwrap_err();

        assert!(!state.session.is_authenticated());
        assert_eq!(load_token(&storage).unwrap(), None);
        assert_eq!(state.bookings.error(), Some("Unauthorized"));
    }

    #[test]
    fn cash_booking_is_created_without_payment() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let mut booking = booking_json("b1", "pending", "pending");
        booking["paymentMethod"] = json!("cash");
        let transport = ScriptedTransport::new().ok(booking);
        let mut state = signed_out();
        let mut form = BookingForm::new("m1");
        form.check_in_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        form.tenant_name = "Rafi".to_string();
        form.tenant_phone = "01712345678".to_string();
        form.payment_method = PaymentMethod::Cash;
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let outcome = Dispatcher::new(&client, &transport)
            .create_booking(&mut state, &form, today)
            .unwrap();

        assert!(matches!(outcome, CheckoutOutcome::Created { .. }));
        assert_eq!(transport.paths(), vec!["POST /bookings".to_string()]);
        assert_eq!(state.bookings.bookings()[0].id, "b1");
        assert!(state.bookings.needs_reconcile());
    }

    #[test]
    fn cancel_of_paid_booking_is_refused_locally() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(json!({"bookings": [booking_json("b1", "confirmed", "paid")], "counts": {"total": 1}}));
        let mut state = signed_out();
        let dispatcher = Dispatcher::new(&client, &transport);
        dispatcher.fetch_bookings(&mut state, BookingFilter::All).unwrap();

        let err = dispatcher.cancel_booking(&mut state, "b1", None).unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn cancel_updates_booking_in_place() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(json!({"bookings": [booking_json("b1", "pending", "pending")]}))
            .ok(booking_json("b1", "cancelled", "pending"));
        let mut state = signed_out();
        let dispatcher = Dispatcher::new(&client, &transport);
        dispatcher.fetch_bookings(&mut state, BookingFilter::All).unwrap();

        dispatcher.cancel_booking(&mut state, "b1", Some("plans changed")).unwrap();

        assert_eq!(state.bookings.bookings()[0].booking_status, BookingStatus::Cancelled);
        let cancel = &transport.requests()[1];
        assert_eq!(cancel.method, HttpMethod::Patch);
        assert!(cancel.url.ends_with("/bookings/b1/cancel"));
    }

    #[test]
    fn favorites_round_trip_by_mess_id() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(json!({"_id": "f1", "user_id": "u1", "mess_id": "m1"}))
            .fail(404, "Favorite not found")
            .reply(HttpResponse::new(200, r#"{"success":true,"message":"Removed"}"#));
        let mut state = signed_out();
        let dispatcher = Dispatcher::new(&client, &transport);

        dispatcher.save_favorite(&mut state, "m1").unwrap();
        assert!(state.favorites.is_saved("m1"));

        assert!(dispatcher.remove_favorite(&mut state, "m1").is_err());
        assert!(state.favorites.is_saved("m1"));
        assert_eq!(state.favorites.error(), Some("Favorite not found"));

        dispatcher.remove_favorite(&mut state, "m1").unwrap();
        assert!(!state.favorites.is_saved("m1"));
        assert_eq!(transport.paths()[2], "DELETE /favorites/m1");
    }

    #[test]
    fn review_create_and_delete() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new()
            .ok(json!({"_id": "r1", "messId": "m1", "rating": 5, "comment": "Clean rooms"}))
            .ok(json!({}));
        let mut state = signed_out();
        let dispatcher = Dispatcher::new(&client, &transport);
        let form = ReviewForm {
            mess_id: "m1".to_string(),
            rating: 5,
            comment: "Clean rooms".to_string(),
        };

        dispatcher.create_review(&mut state, &form).unwrap();
        assert_eq!(state.reviews.reviews().len(), 1);
        dispatcher.delete_review(&mut state, "r1").unwrap();
        assert!(state.reviews.reviews().is_empty());
    }

    #[test]
    fn invalid_review_sends_nothing() {
        let storage = MemoryStorage::new();
        let client = client_with(&storage);
        let transport = ScriptedTransport::new();
        let mut state = signed_out();
        let form = ReviewForm {
            mess_id: "m1".to_string(),
            rating: 0,
            comment: String::new(),
        };

        assert!(Dispatcher::new(&client, &transport).create_review(&mut state, &form).is_err());
        assert!(transport.requests().is_empty());
        assert!(!state.reviews.is_loading());
    }
}

//! Split-phase actions for hosts that own the event loop.
//!
//! # Design
//! [`begin`] validates the input, opens the slice ticket (or marks the
//! session busy) and hands back the request together with an [`InFlight`]
//! receipt. The host executes the request whenever it likes and returns the
//! outcome through [`complete`]. Any number of actions may be in flight at
//! once and their responses may come back in any order: the slice tickets
//! decide which of them still land.
//!
//! [`Dispatcher`](crate::Dispatcher) is the blocking composition of the two
//! halves over a [`Transport`](crate::Transport).

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::dispatcher::AppState;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, TransportError};
use crate::services::bookings::BookingFilter;
use crate::services::messes::{MessQuery, DEFAULT_PAGE_SIZE};
use crate::services::{auth, bookings, favorites, messes, reviews, Ack};
use crate::session::Session;
use crate::slices::{BookingState, FavoritesState, MessState, ReviewState, Ticket};
use crate::storage;
use crate::types::{UpdateProfile, User};
use crate::validation::{is_valid_otp, BookingForm, LoginForm, RegisterForm, ReviewForm, ValidationErrors};

/// A screen action, before its request exists.
#[derive(Debug, Clone)]
pub enum Action {
    /// Launch-time session restore. Settles immediately without a stored
    /// token.
    Bootstrap,
    Login(LoginForm),
    Register(RegisterForm),
    VerifyOtp { code: String },
    ResendOtp,
    UpdateProfile(UpdateProfile),
    FetchMesses(MessQuery),
    SearchMesses(MessQuery),
    FetchMess { id: String },
    FetchSliders,
    FetchBookings(BookingFilter),
    FetchBooking { id: String },
    /// Creates the booking only. Online payment is a separate request.
    CreateBooking { form: BookingForm, today: NaiveDate },
    CancelBooking { id: String, reason: Option<String> },
    FetchFavorites,
    SaveFavorite { mess_id: String },
    RemoveFavorite { mess_id: String },
    FetchReviews { mess_id: String, page: u32 },
    CreateReview(ReviewForm),
    DeleteReview { review_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Receipt {
    Bootstrap { token: String },
    Login { email: String },
    Register { email: String },
    VerifyOtp,
    ResendOtp,
    UpdateProfile,
    Messes(Ticket),
    Mess(Ticket),
    Sliders(Ticket),
    Bookings(Ticket),
    Booking(Ticket),
    CreateBooking(Ticket),
    CancelBooking(Ticket),
    Favorites(Ticket),
    SaveFavorite(Ticket),
    RemoveFavorite { ticket: Ticket, mess_id: String },
    Reviews(Ticket),
    CreateReview(Ticket),
    DeleteReview { ticket: Ticket, review_id: String },
}

/// Receipt for a request that is out with the host. Settle it exactly once
/// with [`complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    receipt: Receipt,
}

impl InFlight {
    fn new(receipt: Receipt) -> Self {
        Self { receipt }
    }

    /// The slice ticket, for actions that have one.
    pub fn ticket(&self) -> Option<Ticket> {
        match &self.receipt {
            Receipt::Messes(t)
            | Receipt::Mess(t)
            | Receipt::Sliders(t)
            | Receipt::Bookings(t)
            | Receipt::Booking(t)
            | Receipt::CreateBooking(t)
            | Receipt::CancelBooking(t)
            | Receipt::Favorites(t)
            | Receipt::SaveFavorite(t)
            | Receipt::Reviews(t)
            | Receipt::CreateReview(t) => Some(*t),
            Receipt::RemoveFavorite { ticket, .. } | Receipt::DeleteReview { ticket, .. } => {
                Some(*ticket)
            }
            _ => None,
        }
    }
}

/// Validate `action` and open it. `Ok(None)` means it settled locally and
/// there is nothing to send. Validation failures leave the state untouched.
pub fn begin(
    client: &ApiClient,
    state: &mut AppState,
    action: Action,
) -> Result<Option<(InFlight, HttpRequest)>, ApiError> {
    let (receipt, request) = match action {
        Action::Bootstrap => {
            let token = match storage::load_token(client.storage()) {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "could not read persisted token");
                    None
                }
            };
            let Some(token) = token else {
                state.session.bootstrap_without_token();
                return Ok(None);
            };
            (Receipt::Bootstrap { token }, auth::check_auth(client).into_request())
        }
        Action::Login(form) => {
            let input = form.validate()?;
            let call = auth::login(client, &input)?;
            state.session.begin_request();
            (Receipt::Login { email: input.email }, call.into_request())
        }
        Action::Register(form) => {
            let input = form.validate()?;
            let call = auth::register(client, &input)?;
            state.session.begin_request();
            (Receipt::Register { email: input.email }, call.into_request())
        }
        Action::VerifyOtp { code } => {
            let email = pending_email(&state.session)?;
            let code = code.trim();
            if !is_valid_otp(code) {
                return Err(ValidationErrors::single("otp", "Please enter the 6-digit code").into());
            }
            let call = auth::verify_otp(client, &email, code)?;
            state.session.begin_request();
            (Receipt::VerifyOtp, call.into_request())
        }
        Action::ResendOtp => {
            let email = pending_email(&state.session)?;
            let call = auth::resend_otp(client, &email)?;
            state.session.begin_request();
            (Receipt::ResendOtp, call.into_request())
        }
        Action::UpdateProfile(input) => {
            let call = auth::update_profile(client, &input)?;
            state.session.begin_request();
            (Receipt::UpdateProfile, call.into_request())
        }
        Action::FetchMesses(query) => (
            Receipt::Messes(state.messes.begin_fetch(query.page)),
            messes::list(client, &query).into_request(),
        ),
        Action::SearchMesses(query) => (
            Receipt::Messes(state.messes.begin_fetch(query.page)),
            messes::search(client, &query).into_request(),
        ),
        Action::FetchMess { id } => (
            Receipt::Mess(state.messes.begin_fetch_one()),
            messes::get_by_id(client, &id).into_request(),
        ),
        Action::FetchSliders => (
            Receipt::Sliders(state.messes.begin_fetch_sliders()),
            messes::home_sliders(client).into_request(),
        ),
        Action::FetchBookings(filter) => (
            Receipt::Bookings(state.bookings.begin_fetch()),
            bookings::list_mine(client, filter).into_request(),
        ),
        Action::FetchBooking { id } => (
            Receipt::Booking(state.bookings.begin_fetch_one()),
            bookings::get_by_id(client, &id).into_request(),
        ),
        Action::CreateBooking { form, today } => {
            let input = form.validate(today)?;
            let call = bookings::create(client, &input)?;
            (Receipt::CreateBooking(state.bookings.begin_create()), call.into_request())
        }
        Action::CancelBooking { id, reason } => {
            ensure_cancellable(&state.bookings, &id)?;
            let call = bookings::cancel(client, &id, reason.as_deref())?;
            (Receipt::CancelBooking(state.bookings.begin_cancel()), call.into_request())
        }
        Action::FetchFavorites => (
            Receipt::Favorites(state.favorites.begin_fetch()),
            favorites::list(client).into_request(),
        ),
        Action::SaveFavorite { mess_id } => {
            let call = favorites::save(client, &mess_id)?;
            (Receipt::SaveFavorite(state.favorites.begin_save()), call.into_request())
        }
        Action::RemoveFavorite { mess_id } => {
            let request = favorites::remove(client, &mess_id).into_request();
            let ticket = state.favorites.begin_remove();
            (Receipt::RemoveFavorite { ticket, mess_id }, request)
        }
        Action::FetchReviews { mess_id, page } => (
            Receipt::Reviews(state.reviews.begin_fetch()),
            reviews::list_for_mess(client, &mess_id, page, DEFAULT_PAGE_SIZE).into_request(),
        ),
        Action::CreateReview(form) => {
            let input = form.validate()?;
            let call = reviews::create(client, &input)?;
            (Receipt::CreateReview(state.reviews.begin_create()), call.into_request())
        }
        Action::DeleteReview { review_id } => {
            let request = reviews::delete(client, &review_id).into_request();
            let ticket = state.reviews.begin_delete();
            (Receipt::DeleteReview { ticket, review_id }, request)
        }
    };
    Ok(Some((InFlight::new(receipt), request)))
}

/// Settle `in_flight` with what the host got back. A transport failure
/// becomes `ApiError::Network`. The error is also stored on the slice or
/// session the action belongs to; a response that lost its race returns
/// `Ok` and changes nothing.
pub fn complete(
    client: &ApiClient,
    state: &mut AppState,
    in_flight: InFlight,
    outcome: Result<HttpResponse, TransportError>,
) -> Result<(), ApiError> {
    let outcome = outcome.map_err(|e| {
        warn!(error = %e, "network error");
        ApiError::network()
    });
    let session = &mut state.session;

    match in_flight.receipt {
        Receipt::Bootstrap { token } => match decode::<User>(client, session, outcome) {
            Ok(user) => {
                if let Err(e) = storage::save_user(client.storage(), &user) {
                    warn!(error = %e, "could not refresh persisted user");
                }
                session.finish_bootstrap(Ok((user, token)));
                Ok(())
            }
            Err(e) => {
                session.finish_bootstrap(Err(e.message()));
                Err(e)
            }
        },
        Receipt::Login { email } => {
            match decode::<crate::types::LoginChallenge>(client, session, outcome) {
                Ok(challenge) => {
                    if let (false, Some(token), Some(user)) =
                        (challenge.otp_required, challenge.token, challenge.user)
                    {
                        signed_in(client, session, user, token);
                    } else {
                        session.login_succeeded(&challenge.email.unwrap_or(email));
                    }
                    Ok(())
                }
                Err(e) => {
                    session.login_failed(&e.message());
                    Err(e)
                }
            }
        }
        Receipt::Register { email } => {
            match decode::<crate::types::LoginChallenge>(client, session, outcome) {
                Ok(challenge) => {
                    session.register_succeeded(&challenge.email.unwrap_or(email));
                    Ok(())
                }
                Err(e) => {
                    session.login_failed(&e.message());
                    Err(e)
                }
            }
        }
        Receipt::VerifyOtp => match decode::<crate::types::AuthPayload>(client, session, outcome) {
            Ok(payload) => {
                signed_in(client, session, payload.user, payload.token);
                Ok(())
            }
            Err(e) => {
                session.otp_failed(&e.message());
                Err(e)
            }
        },
        Receipt::ResendOtp => match acknowledge(client, session, outcome) {
            Ok(()) => {
                session.request_finished();
                Ok(())
            }
            Err(e) => {
                session.otp_failed(&e.message());
                Err(e)
            }
        },
        Receipt::UpdateProfile => match decode::<User>(client, session, outcome) {
            Ok(user) => {
                if let Err(e) = storage::save_user(client.storage(), &user) {
                    warn!(error = %e, "could not persist updated user");
                }
                session.profile_updated(user);
                Ok(())
            }
            Err(e) => {
                session.login_failed(&e.message());
                Err(e)
            }
        },
        Receipt::Messes(ticket) => land(
            &mut state.messes,
            ticket,
            decode(client, session, outcome),
            MessState::fulfill_fetch,
        ),
        Receipt::Mess(ticket) => land(
            &mut state.messes,
            ticket,
            decode(client, session, outcome),
            MessState::fulfill_fetch_one,
        ),
        Receipt::Sliders(ticket) => land(
            &mut state.messes,
            ticket,
            decode(client, session, outcome),
            MessState::fulfill_fetch_sliders,
        ),
        Receipt::Bookings(ticket) => land(
            &mut state.bookings,
            ticket,
            decode(client, session, outcome),
            BookingState::fulfill_fetch,
        ),
        Receipt::Booking(ticket) => land(
            &mut state.bookings,
            ticket,
            decode(client, session, outcome),
            BookingState::fulfill_fetch_one,
        ),
        Receipt::CreateBooking(ticket) => land(
            &mut state.bookings,
            ticket,
            decode(client, session, outcome),
            BookingState::fulfill_create,
        ),
        Receipt::CancelBooking(ticket) => land(
            &mut state.bookings,
            ticket,
            decode(client, session, outcome),
            |slice, ticket, booking: crate::types::Booking| {
                info!(booking_id = %booking.id, "booking cancelled");
                slice.fulfill_cancel(ticket, booking)
            },
        ),
        Receipt::Favorites(ticket) => land(
            &mut state.favorites,
            ticket,
            decode(client, session, outcome),
            FavoritesState::fulfill_fetch,
        ),
        Receipt::SaveFavorite(ticket) => land(
            &mut state.favorites,
            ticket,
            decode(client, session, outcome),
            FavoritesState::fulfill_save,
        ),
        Receipt::RemoveFavorite { ticket, mess_id } => land(
            &mut state.favorites,
            ticket,
            acknowledge(client, session, outcome),
            |slice, ticket, ()| slice.fulfill_remove(ticket, &mess_id),
        ),
        Receipt::Reviews(ticket) => land(
            &mut state.reviews,
            ticket,
            decode(client, session, outcome),
            ReviewState::fulfill_fetch,
        ),
        Receipt::CreateReview(ticket) => land(
            &mut state.reviews,
            ticket,
            decode(client, session, outcome),
            ReviewState::fulfill_create,
        ),
        Receipt::DeleteReview { ticket, review_id } => land(
            &mut state.reviews,
            ticket,
            acknowledge(client, session, outcome),
            |slice, ticket, ()| slice.fulfill_delete(ticket, &review_id),
        ),
    }
}

/// Slices settle failures the same way.
trait Rejects {
    fn reject(&mut self, ticket: Ticket, message: &str) -> bool;
}

impl Rejects for MessState {
    fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        MessState::reject(self, ticket, message)
    }
}

impl Rejects for BookingState {
    fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        BookingState::reject(self, ticket, message)
    }
}

impl Rejects for FavoritesState {
    fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        FavoritesState::reject(self, ticket, message)
    }
}

impl Rejects for ReviewState {
    fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        ReviewState::reject(self, ticket, message)
    }
}

fn land<S: Rejects, T>(
    slice: &mut S,
    ticket: Ticket,
    result: Result<T, ApiError>,
    fulfill: impl FnOnce(&mut S, Ticket, T) -> bool,
) -> Result<(), ApiError> {
    match result {
        Ok(value) => {
            fulfill(slice, ticket, value);
            Ok(())
        }
        Err(e) => {
            slice.reject(ticket, &e.message());
            Err(e)
        }
    }
}

/// A 401 from any action also ends the in-memory session.
fn decode<T: DeserializeOwned>(
    client: &ApiClient,
    session: &mut Session,
    outcome: Result<HttpResponse, ApiError>,
) -> Result<T, ApiError> {
    let result = outcome
        .and_then(|response| client.parse::<T>(response))
        .and_then(Envelope::into_data);
    if let Err(ApiError::Unauthorized { .. }) = &result {
        session.invalidate();
    }
    result
}

/// For endpoints whose success carries no payload worth reading.
fn acknowledge(
    client: &ApiClient,
    session: &mut Session,
    outcome: Result<HttpResponse, ApiError>,
) -> Result<(), ApiError> {
    let result = outcome
        .and_then(|response| client.parse::<Ack>(response))
        .map(drop);
    if let Err(ApiError::Unauthorized { .. }) = &result {
        session.invalidate();
    }
    result
}

fn signed_in(client: &ApiClient, session: &mut Session, user: User, token: String) {
    if let Err(e) = storage::persist_session(client.storage(), &token, &user) {
        warn!(error = %e, "could not persist session");
    }
    session.otp_succeeded(user, token);
}

fn pending_email(session: &Session) -> Result<String, ApiError> {
    session
        .otp_email()
        .map(str::to_string)
        .ok_or_else(|| ValidationErrors::single("email", "Please sign in again to get a new code").into())
}

/// A booking already known to be past the cancellable stage is refused
/// without a request.
fn ensure_cancellable(bookings: &BookingState, id: &str) -> Result<(), ApiError> {
    let known = bookings
        .bookings()
        .iter()
        .chain(bookings.current_booking())
        .find(|booking| booking.id == id);
    if known.is_some_and(|booking| !booking.is_cancellable()) {
        return Err(
            ValidationErrors::single("booking", "This booking can no longer be cancelled").into(),
        );
    }
    Ok(())
}

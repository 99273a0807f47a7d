//! C-ABI wrapper around `messfinder-core`.
//!
//! # Overview
//! Exposes request building, response parsing, the route guard and payment
//! redirect detection through `extern "C"` functions, so a native mobile
//! shell can drive the client core without linking to serde or any HTTP
//! stack of ours.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `mf_build_*` per endpoint the screens use. Each returns null when a
//!   required argument is null or not UTF-8.
//! - A single `mf_parse_response`, told which DTO to expect, handles the
//!   envelope, purges credentials on 401 and hands back normalized JSON.
//! - The client owns an in-memory session store. OTP verification (and an
//!   admin's direct login) persist into it through `mf_parse_response`;
//!   hosts restore a saved token with `mf_client_set_token`.
//! - The client also owns the app state (session and slices). Hosts that
//!   want it open actions with `mf_action_begin`, execute the returned
//!   request on their own schedule and settle the ticket with
//!   `mf_action_complete`; `mf_state_json` reads the result back.
//! - The C caller owns all returned pointers and must call the matching
//!   `mf_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use messfinder_core::actions::{self, Action};
use messfinder_core::guard::RouteGuard;
use messfinder_core::services::bookings::BookingFilter;
use messfinder_core::services::messes::{MessQuery, DEFAULT_PAGE_SIZE};
use messfinder_core::services::{auth, bookings, favorites, messes, payments, reviews};
use messfinder_core::storage::{self, TOKEN_KEY};
use messfinder_core::types::{
    self as dto, BookingStatus, CreateBooking, LoginRequest, PaymentStatus, Role, User,
};
use messfinder_core::{
    redirect, ApiClient, ApiError, AppState, ClientConfig, HttpRequest, HttpResponse,
    MemoryStorage, Session, SessionPhase, TransportError,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::warn;

use types::*;

/// Borrow a C string argument. `None` for null or invalid UTF-8.
fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url` (the versioned API root).
///
/// `timeout_ms` of 0 selects the default timeout. Returns null if
/// `base_url` is null or not an http(s) URL, or if an internal panic occurs.
/// The caller must free the returned pointer with `mf_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_client_new(base_url: *const c_char, timeout_ms: u64) -> *mut FfiClient {
    catch_unwind(|| {
        let Some(url) = c_str(base_url) else {
            return ptr::null_mut();
        };
        let mut config = ClientConfig::new(url);
        if timeout_ms > 0 {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejected client configuration");
            return ptr::null_mut();
        }
        let client = ApiClient::new(config, Arc::new(MemoryStorage::new()));
        Box::into_raw(Box::new(FfiClient::new(client)))
    })
    .unwrap_or(ptr::null_mut())
}

/// Free a client created by `mf_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// Restore a token the host persisted itself. Returns false on null
/// arguments or a storage failure.
#[unsafe(no_mangle)]
pub extern "C" fn mf_client_set_token(client: *const FfiClient, token: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        match c_str(token) {
            Some(token) => client.inner.storage().set(TOKEN_KEY, token).is_ok(),
            None => false,
        }
    }))
    .unwrap_or(false)
}

/// The stored token, or null when signed out. Free with `mf_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_client_token(client: *const FfiClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return ptr::null_mut();
        }
        let client = unsafe { &*client };
        match storage::load_token(client.inner.storage()) {
            Ok(Some(token)) => c_string(token),
            Ok(None) => ptr::null_mut(),
            Err(e) => {
                warn!(error = %e, "could not read token");
                ptr::null_mut()
            }
        }
    }))
    .unwrap_or(ptr::null_mut())
}

/// Forget the stored token and user, as on logout.
#[unsafe(no_mangle)]
pub extern "C" fn mf_client_clear_session(client: *const FfiClient) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return;
        }
        let client = unsafe { &*client };
        if let Err(e) = storage::purge_session(client.inner.storage()) {
            warn!(error = %e, "could not clear session");
        }
    }));
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Shared shell of every builder: null check, panic guard, conversion.
fn build_with(
    client: *const FfiClient,
    f: impl FnOnce(&ApiClient) -> Option<HttpRequest>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return ptr::null_mut();
        }
        let client = unsafe { &*client };
        f(&client.inner).map_or(ptr::null_mut(), FfiHttpRequest::from_core)
    }))
    .unwrap_or(ptr::null_mut())
}

/// `POST /auth/login`. Parse the answer as `LoginChallenge`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_login(
    client: *const FfiClient,
    email: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input = LoginRequest {
            email: c_str(email)?.trim().to_lowercase(),
            password: c_str(password)?.to_string(),
        };
        auth::login(c, &input).ok().map(|call| call.into_request())
    })
}

/// `POST /auth/verify-otp`. Parse the answer as `Auth`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_verify_otp(
    client: *const FfiClient,
    email: *const c_char,
    otp: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        auth::verify_otp(c, c_str(email)?, c_str(otp)?.trim())
            .ok()
            .map(|call| call.into_request())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_resend_otp(
    client: *const FfiClient,
    email: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        auth::resend_otp(c, c_str(email)?).ok().map(|call| call.into_request())
    })
}

/// `GET /auth/me`, the launch-time session check.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_check_auth(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(auth::check_auth(c).into_request()))
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_logout(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(auth::logout(c).into_request()))
}

/// `GET /messes`. `search` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_list_messes(
    client: *const FfiClient,
    page: u32,
    search: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let query = MessQuery {
            search: c_str(search).map(str::to_string),
            ..MessQuery::page(page)
        };
        Some(messes::list(c, &query).into_request())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_get_mess(client: *const FfiClient, id: *const c_char) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(messes::get_by_id(c, c_str(id)?).into_request()))
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_home_sliders(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(messes::home_sliders(c).into_request()))
}

/// `GET /bookings/my-bookings`. `filter`: 0 = all, 1 = upcoming, 2 = past.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_list_bookings(client: *const FfiClient, filter: i32) -> *mut FfiHttpRequest {
    let filter = booking_filter(filter);
    build_with(client, |c| Some(bookings::list_mine(c, filter).into_request()))
}

fn booking_filter(filter: i32) -> BookingFilter {
    match filter {
        1 => BookingFilter::Upcoming,
        2 => BookingFilter::Past,
        _ => BookingFilter::All,
    }
}

/// `POST /bookings` from a JSON `CreateBooking`
/// (`{"messId", "checkInDate": "YYYY-MM-DD", "tenantContact", ...}`).
/// Returns null if the JSON does not decode.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_create_booking(
    client: *const FfiClient,
    input_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input: CreateBooking = serde_json::from_str(c_str(input_json)?).ok()?;
        bookings::create(c, &input).ok().map(|call| call.into_request())
    })
}

/// `PATCH /bookings/{id}/cancel`. `reason` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_cancel_booking(
    client: *const FfiClient,
    id: *const c_char,
    reason: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        bookings::cancel(c, c_str(id)?, c_str(reason))
            .ok()
            .map(|call| call.into_request())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_initiate_payment(
    client: *const FfiClient,
    booking_id: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        payments::initiate(c, c_str(booking_id)?)
            .ok()
            .map(|call| call.into_request())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_list_favorites(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(favorites::list(c).into_request()))
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_save_favorite(
    client: *const FfiClient,
    mess_id: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        favorites::save(c, c_str(mess_id)?).ok().map(|call| call.into_request())
    })
}

/// Keyed by mess id, not by the saved record's id.
#[unsafe(no_mangle)]
pub extern "C" fn mf_build_remove_favorite(
    client: *const FfiClient,
    mess_id: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(favorites::remove(c, c_str(mess_id)?).into_request()))
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_build_list_reviews(
    client: *const FfiClient,
    mess_id: *const c_char,
    page: u32,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        Some(reviews::list_for_mess(c, c_str(mess_id)?, page, DEFAULT_PAGE_SIZE).into_request())
    })
}

// ---------------------------------------------------------------------------
// Parse response function
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is an
/// empty one.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse::new(resp.status, c_str(resp.body).unwrap_or(""))
}

fn to_json<T: Serialize>(data: &T) -> Result<String, ApiError> {
    serde_json::to_string(data).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_as<T: DeserializeOwned + Serialize>(
    client: &ApiClient,
    response: HttpResponse,
) -> Result<Option<String>, ApiError> {
    client.parse::<T>(response)?.data.as_ref().map(to_json).transpose()
}

fn remember(client: &ApiClient, token: &str, user: &User) {
    if let Err(e) = storage::persist_session(client.storage(), token, user) {
        warn!(error = %e, "could not persist session");
    }
}

fn parse_kind(
    client: &ApiClient,
    kind: FfiResponseKind,
    response: HttpResponse,
) -> Result<Option<String>, ApiError> {
    match kind {
        FfiResponseKind::Ack => client.parse::<IgnoredAny>(response).map(|_| None),
        FfiResponseKind::Auth => {
            let payload = client.parse::<dto::AuthPayload>(response)?.into_data()?;
            remember(client, &payload.token, &payload.user);
            to_json(&payload).map(Some)
        }
        FfiResponseKind::LoginChallenge => {
            let challenge = client.parse::<dto::LoginChallenge>(response)?.into_data()?;
            if let (false, Some(token), Some(user)) =
                (challenge.otp_required, &challenge.token, &challenge.user)
            {
                remember(client, token, user);
            }
            to_json(&challenge).map(Some)
        }
        FfiResponseKind::User => parse_as::<User>(client, response),
        FfiResponseKind::MessPage => parse_as::<dto::MessPage>(client, response),
        FfiResponseKind::Mess => parse_as::<dto::Mess>(client, response),
        FfiResponseKind::HomeSliders => parse_as::<Vec<dto::HomeSlider>>(client, response),
        FfiResponseKind::BookingList => parse_as::<dto::BookingList>(client, response),
        FfiResponseKind::Booking => parse_as::<dto::Booking>(client, response),
        FfiResponseKind::PaymentSession => parse_as::<dto::PaymentSession>(client, response),
        FfiResponseKind::SavedMessList => parse_as::<Vec<dto::SavedMess>>(client, response),
        FfiResponseKind::SavedMess => parse_as::<dto::SavedMess>(client, response),
        FfiResponseKind::ReviewPage => parse_as::<dto::ReviewPage>(client, response),
        FfiResponseKind::Review => parse_as::<dto::Review>(client, response),
    }
}

/// Parse the response to a request built by `mf_build_*`, decoding the
/// payload as `kind`.
///
/// A 401 purges the stored token and user before the `Unauthorized` result
/// is returned. The caller must free the result with `mf_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_parse_response(
    client: *const FfiClient,
    kind: FfiResponseKind,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match parse_kind(&client.inner, kind, ffi_response_to_core(resp)) {
            Ok(data) => FfiResult::ok(data),
            Err(e) => FfiResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in mf_parse_response"))
}

// ---------------------------------------------------------------------------
// Split-phase actions
// ---------------------------------------------------------------------------

fn owned(arg: *const c_char) -> Option<String> {
    c_str(arg).map(str::to_string)
}

fn from_json<T: DeserializeOwned>(arg: *const c_char) -> Option<T> {
    serde_json::from_str(c_str(arg)?).ok()
}

/// `None` when a required `arg` is null, not UTF-8 or not the expected JSON.
fn core_action(kind: FfiActionKind, arg: *const c_char, page: u32) -> Option<Action> {
    let page_query = |search: Option<String>| MessQuery {
        search,
        ..MessQuery::page(page.max(1))
    };
    Some(match kind {
        FfiActionKind::Bootstrap => Action::Bootstrap,
        FfiActionKind::Login => Action::Login(from_json(arg)?),
        FfiActionKind::Register => Action::Register(from_json(arg)?),
        FfiActionKind::VerifyOtp => Action::VerifyOtp { code: owned(arg)? },
        FfiActionKind::ResendOtp => Action::ResendOtp,
        FfiActionKind::FetchMesses => Action::FetchMesses(page_query(owned(arg))),
        FfiActionKind::SearchMesses => Action::SearchMesses(page_query(Some(owned(arg)?))),
        FfiActionKind::FetchMess => Action::FetchMess { id: owned(arg)? },
        FfiActionKind::FetchSliders => Action::FetchSliders,
        FfiActionKind::FetchBookings => {
            Action::FetchBookings(booking_filter(i32::try_from(page).unwrap_or_default()))
        }
        FfiActionKind::FetchBooking => Action::FetchBooking { id: owned(arg)? },
        FfiActionKind::CancelBooking => Action::CancelBooking {
            id: owned(arg)?,
            reason: None,
        },
        FfiActionKind::FetchFavorites => Action::FetchFavorites,
        FfiActionKind::SaveFavorite => Action::SaveFavorite { mess_id: owned(arg)? },
        FfiActionKind::RemoveFavorite => Action::RemoveFavorite { mess_id: owned(arg)? },
        FfiActionKind::FetchReviews => Action::FetchReviews {
            mess_id: owned(arg)?,
            page: page.max(1),
        },
        FfiActionKind::CreateReview => Action::CreateReview(from_json(arg)?),
        FfiActionKind::DeleteReview => Action::DeleteReview { review_id: owned(arg)? },
    })
}

/// Open an action against the client's app state.
///
/// Any number of actions may be open at once; settle each `ticket` exactly
/// once, in any order, with `mf_action_complete` or `mf_action_fail`. A
/// response that lost its race is accepted and changes nothing. Free the
/// result with `mf_free_pending` once the request has been executed.
#[unsafe(no_mangle)]
pub extern "C" fn mf_action_begin(
    client: *const FfiClient,
    kind: FfiActionKind,
    arg: *const c_char,
    page: u32,
) -> *mut FfiPending {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiPending::refused(FfiResult::null_arg("client"));
        }
        let client = unsafe { &*client };
        let Some(action) = core_action(kind, arg, page) else {
            return FfiPending::refused(FfiResult::null_arg("arg"));
        };
        let mut app = client.app.lock().unwrap_or_else(PoisonError::into_inner);
        match actions::begin(&client.inner, &mut app.state, action) {
            Ok(Some((in_flight, request))) => {
                let ticket = app.track(in_flight);
                FfiPending::sent(ticket, request)
            }
            Ok(None) => FfiPending::settled(),
            Err(e) => FfiPending::refused(FfiResult::from_error(e)),
        }
    }))
    .unwrap_or_else(|_| FfiPending::refused(FfiResult::panic("panic in mf_action_begin")))
}

fn settle(
    client: *const FfiClient,
    ticket: u64,
    outcome: Result<HttpResponse, TransportError>,
) -> *mut FfiResult {
    if client.is_null() {
        return FfiResult::null_arg("client");
    }
    let client = unsafe { &*client };
    let mut app = client.app.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(in_flight) = app.pending.remove(&ticket) else {
        return FfiResult::unknown_ticket(ticket);
    };
    match actions::complete(&client.inner, &mut app.state, in_flight, outcome) {
        Ok(()) => FfiResult::ok(None),
        Err(e) => FfiResult::from_error(e),
    }
}

/// Settle `ticket` with the response the host received. The outcome lands
/// in the app state; read it back with `mf_state_json`. Free the result
/// with `mf_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_action_complete(
    client: *const FfiClient,
    ticket: u64,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let resp = unsafe { &*response };
        settle(client, ticket, Ok(ffi_response_to_core(resp)))
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in mf_action_complete"))
}

/// Settle `ticket` after the request could not be executed (offline,
/// timed out, abandoned). `message` is nullable and only logged.
#[unsafe(no_mangle)]
pub extern "C" fn mf_action_fail(
    client: *const FfiClient,
    ticket: u64,
    message: *const c_char,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        let reason = c_str(message).unwrap_or("request not executed").to_string();
        settle(client, ticket, Err(TransportError::Connection(reason)))
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in mf_action_fail"))
}

/// Sign out locally: persisted credentials, session, slices and every open
/// ticket are dropped. Send `mf_build_logout` first to tell the server.
#[unsafe(no_mangle)]
pub extern "C" fn mf_app_sign_out(client: *const FfiClient) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return;
        }
        let client = unsafe { &*client };
        let mut app = client.app.lock().unwrap_or_else(PoisonError::into_inner);
        app.state.sign_out(&client.inner);
        app.pending.clear();
    }));
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    phase: &'static str,
    user: Option<&'a User>,
    otp_email: Option<&'a str>,
    is_loading: bool,
    error: Option<&'a str>,
    redirect_path: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessesView<'a> {
    messes: &'a [dto::Mess],
    current_mess: Option<&'a dto::Mess>,
    pagination: Option<&'a dto::Pagination>,
    has_more: bool,
    next_page: u32,
    sliders: &'a [dto::HomeSlider],
    is_loading: bool,
    error: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingsView<'a> {
    bookings: &'a [dto::Booking],
    current_booking: Option<&'a dto::Booking>,
    counts: &'a dto::BookingCounts,
    is_loading: bool,
    error: Option<&'a str>,
    needs_reconcile: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FavoritesView<'a> {
    saved: &'a [dto::SavedMess],
    is_loading: bool,
    error: Option<&'a str>,
    needs_reconcile: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewsView<'a> {
    reviews: &'a [dto::Review],
    pagination: Option<&'a dto::Pagination>,
    is_loading: bool,
    error: Option<&'a str>,
    needs_reconcile: bool,
}

fn section_json(state: &AppState, section: FfiStateSection) -> Result<String, ApiError> {
    match section {
        FfiStateSection::Session => {
            let session = &state.session;
            let phase = match session.phase() {
                SessionPhase::Booting => "booting",
                SessionPhase::Unauthenticated => "unauthenticated",
                SessionPhase::OtpPending { .. } => "otpPending",
                SessionPhase::Authenticated { .. } => "authenticated",
            };
            to_json(&SessionView {
                phase,
                user: session.user(),
                otp_email: session.otp_email(),
                is_loading: session.is_loading(),
                error: session.error(),
                redirect_path: session.redirect_path(),
            })
        }
        FfiStateSection::Messes => {
            let messes = &state.messes;
            to_json(&MessesView {
                messes: messes.messes(),
                current_mess: messes.current_mess(),
                pagination: messes.pagination(),
                has_more: messes.has_more(),
                next_page: messes.next_page(),
                sliders: messes.sliders(),
                is_loading: messes.is_loading(),
                error: messes.error(),
            })
        }
        FfiStateSection::Bookings => {
            let bookings = &state.bookings;
            to_json(&BookingsView {
                bookings: bookings.bookings(),
                current_booking: bookings.current_booking(),
                counts: bookings.counts(),
                is_loading: bookings.is_loading(),
                error: bookings.error(),
                needs_reconcile: bookings.needs_reconcile(),
            })
        }
        FfiStateSection::Favorites => {
            let favorites = &state.favorites;
            to_json(&FavoritesView {
                saved: favorites.saved(),
                is_loading: favorites.is_loading(),
                error: favorites.error(),
                needs_reconcile: favorites.needs_reconcile(),
            })
        }
        FfiStateSection::Reviews => {
            let reviews = &state.reviews;
            to_json(&ReviewsView {
                reviews: reviews.reviews(),
                pagination: reviews.pagination(),
                is_loading: reviews.is_loading(),
                error: reviews.error(),
                needs_reconcile: reviews.needs_reconcile(),
            })
        }
    }
}

/// Snapshot one section of the app state as camelCase JSON. Null on a null
/// client. Free with `mf_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_state_json(client: *const FfiClient, section: FfiStateSection) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return ptr::null_mut();
        }
        let client = unsafe { &*client };
        let app = client.app.lock().unwrap_or_else(PoisonError::into_inner);
        match section_json(&app.state, section) {
            Ok(json) => c_string(json),
            Err(e) => {
                warn!(error = %e, "could not serialize app state");
                ptr::null_mut()
            }
        }
    }))
    .unwrap_or(ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Navigation, payment, booking rules
// ---------------------------------------------------------------------------

/// Rebuild just enough of a session for the guard to judge.
fn guard_session(role: i32, loading: bool, redirect_path: Option<&str>) -> Session {
    let mut session = Session::new();
    if loading {
        return session;
    }
    let role = match role {
        0 => Some(Role::Student),
        1 => Some(Role::Owner),
        2 => Some(Role::Admin),
        _ => None,
    };
    match role {
        Some(role) => {
            let user = User {
                id: String::new(),
                name: String::new(),
                email: String::new(),
                phone: String::new(),
                role,
                is_active: true,
            };
            session.finish_bootstrap(Ok((user, String::new())));
        }
        None => session.bootstrap_without_token(),
    }
    if let Some(path) = redirect_path {
        session.set_redirect_path(path);
    }
    session
}

/// Evaluate the route guard for the current navigation `segments`.
///
/// `role`: -1 = signed out (or still at the OTP step), 0 = student,
/// 1 = owner, 2 = admin. `loading` short-circuits to "stay".
/// `redirect_path` (nullable) is the remembered post-login route. Returns
/// null when `segments` is null with nonzero length or any segment is null
/// or not UTF-8. Free with `mf_free_guard_decision`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_guard_evaluate(
    role: i32,
    loading: bool,
    redirect_path: *const c_char,
    segments: *const *const c_char,
    segments_len: u32,
) -> *mut FfiGuardDecision {
    catch_unwind(|| {
        if segments.is_null() && segments_len > 0 {
            return ptr::null_mut();
        }
        let segments: Option<Vec<&str>> = if segments_len == 0 {
            Some(Vec::new())
        } else {
            unsafe { std::slice::from_raw_parts(segments, segments_len as usize) }
                .iter()
                .map(|&segment| c_str(segment))
                .collect()
        };
        let Some(segments) = segments else {
            return ptr::null_mut();
        };
        let redirect_path = c_str(redirect_path);
        let session = guard_session(role, loading, redirect_path);
        FfiGuardDecision::from_core(RouteGuard::evaluate(&session, &segments), redirect_path)
    })
    .unwrap_or(ptr::null_mut())
}

/// Classify a payment webview navigation URL. Close the webview on any
/// value other than `Pending`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_classify_payment_url(url: *const c_char) -> FfiPaymentOutcome {
    catch_unwind(|| c_str(url).and_then(redirect::classify).into())
        .unwrap_or(FfiPaymentOutcome::Pending)
}

/// Whether the tenant may still cancel, from the wire status strings.
/// Unknown statuses are not cancellable.
#[unsafe(no_mangle)]
pub extern "C" fn mf_booking_is_cancellable(
    booking_status: *const c_char,
    payment_status: *const c_char,
) -> bool {
    catch_unwind(|| {
        let booking = c_str(booking_status).and_then(BookingStatus::parse);
        let payment = c_str(payment_status).and_then(PaymentStatus::parse);
        match (booking, payment) {
            (Some(booking), Some(payment)) => dto::is_cancellable(booking, payment),
            _ => false,
        }
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `mf_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiResult` returned by `mf_parse_response`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.data_json);
    });
}

/// Free an `FfiPending` along with its request and error. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_free_pending(pending: *mut FfiPending) {
    if pending.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let pending = unsafe { Box::from_raw(pending) };
        mf_free_request(pending.request);
        mf_free_result(pending.error);
    });
}

/// Free an `FfiGuardDecision`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_free_guard_decision(decision: *mut FfiGuardDecision) {
    if decision.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let decision = unsafe { Box::from_raw(decision) };
        free_c_string(decision.to);
        free_c_string(decision.remember);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests mirror the core `HttpRequest` with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Parsed payloads cross as JSON text in
//! the normalized shape the core produces (every relation under one key), so
//! the C surface does not grow a struct per DTO. Conversion functions live
//! here to keep `lib.rs` focused on the `extern "C"` surface.

use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::Mutex;

use messfinder_core::error::ApiError;
use messfinder_core::http::HttpMethod;
use messfinder_core::{AppState, GuardDecision, HttpRequest, InFlight, PaymentOutcome};

/// Opaque handle to an `ApiClient`, the session storage behind it and the
/// app state driven by `mf_action_*`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: messfinder_core::ApiClient,
    pub(crate) app: Mutex<AppHandle>,
}

impl FfiClient {
    pub(crate) fn new(inner: messfinder_core::ApiClient) -> Self {
        Self {
            inner,
            app: Mutex::new(AppHandle::default()),
        }
    }
}

/// App state plus the actions the host is currently executing, keyed by
/// the ticket handed across the boundary.
#[derive(Default)]
pub(crate) struct AppHandle {
    pub(crate) state: AppState,
    pub(crate) pending: HashMap<u64, InFlight>,
    next_ticket: u64,
}

impl AppHandle {
    pub(crate) fn track(&mut self, in_flight: InFlight) -> u64 {
        self.next_ticket += 1;
        self.pending.insert(self.next_ticket, in_flight);
        self.next_ticket
    }
}

/// Heap C string from Rust text. Interior NULs are dropped rather than
/// failing the whole call.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Patch => FfiHttpMethod::Patch,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `mf_build_*` functions. The C caller executes the request,
/// failing it once `timeout_ms` elapses, and passes the response back
/// through `mf_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = c_string(req.url);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            timeout_ms: u64::try_from(req.timeout.as_millis()).unwrap_or(u64::MAX),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to `mf_parse_response`. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// The DTO a response body is decoded into.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResponseKind {
    /// Success is all that matters; `data_json` stays null.
    Ack = 0,
    User = 1,
    /// OTP verification. The token and user are persisted on success.
    Auth = 2,
    /// Login or register. Persisted when the server signed in directly.
    LoginChallenge = 3,
    MessPage = 4,
    Mess = 5,
    HomeSliders = 6,
    BookingList = 7,
    Booking = 8,
    PaymentSession = 9,
    SavedMessList = 10,
    SavedMess = 11,
    ReviewPage = 12,
    Review = 13,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Network = 1,
    /// Persisted credentials were purged; route the user to login.
    Unauthorized = 2,
    Http = 3,
    Validation = 4,
    Serialization = 5,
    Deserialization = 6,
    Panic = 7,
    NullArg = 8,
    /// The ticket was never issued or has already been completed.
    UnknownTicket = 9,
}

/// Result envelope for `mf_parse_response`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and
/// `data_json` holds the payload as JSON (null for `Ack` or an empty
/// payload). On failure `error_code` describes the category and
/// `error_message` is the text to show the user. For `Validation`,
/// `data_json` maps field names to messages.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_json: *mut c_char,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_json: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message,
            http_status,
            data_json,
        }))
    }

    pub(crate) fn ok(data_json: Option<String>) -> *mut Self {
        let data = data_json.map_or(std::ptr::null_mut(), c_string);
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, data)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let http_status = err.status_code().unwrap_or(0);
        let message = c_string(err.message());
        let (code, data) = match &err {
            ApiError::Network { .. } => (FfiErrorCode::Network, None),
            ApiError::Unauthorized { .. } => (FfiErrorCode::Unauthorized, None),
            ApiError::Http { .. } => (FfiErrorCode::Http, None),
            ApiError::Validation(errors) => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .iter()
                    .map(|(field, msg)| (field.to_string(), serde_json::Value::from(msg)))
                    .collect();
                (FfiErrorCode::Validation, Some(serde_json::Value::Object(fields).to_string()))
            }
            ApiError::Serialization(_) => (FfiErrorCode::Serialization, None),
            ApiError::Deserialization(_) => (FfiErrorCode::Deserialization, None),
        };
        Self::boxed(code, message, http_status, data.map_or(std::ptr::null_mut(), c_string))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn unknown_ticket(ticket: u64) -> *mut Self {
        Self::boxed(
            FfiErrorCode::UnknownTicket,
            c_string(format!("unknown ticket: {ticket}")),
            0,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, c_string(msg), 0, std::ptr::null_mut())
    }
}

// ---------------------------------------------------------------------------
// Navigation and payment
// ---------------------------------------------------------------------------

/// Outcome of one route guard evaluation.
///
/// `redirect` false means stay; `to` and `remember` are then null. When
/// `remember` is set the host stores it as the post-login destination.
/// `consumed_redirect` means the redirect goes to the remembered route, so
/// the host clears it.
#[repr(C)]
pub struct FfiGuardDecision {
    pub redirect: bool,
    pub to: *mut c_char,
    pub remember: *mut c_char,
    pub consumed_redirect: bool,
}

impl FfiGuardDecision {
    pub(crate) fn from_core(decision: GuardDecision, redirect_path: Option<&str>) -> *mut Self {
        let decision = match decision {
            GuardDecision::Allow => FfiGuardDecision {
                redirect: false,
                to: std::ptr::null_mut(),
                remember: std::ptr::null_mut(),
                consumed_redirect: false,
            },
            GuardDecision::Redirect { to, remember } => FfiGuardDecision {
                redirect: true,
                consumed_redirect: remember.is_none() && redirect_path == Some(to.as_str()),
                to: c_string(to),
                remember: remember.map_or(std::ptr::null_mut(), c_string),
            },
        };
        Box::into_raw(Box::new(decision))
    }
}

/// Classification of a payment webview navigation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPaymentOutcome {
    /// Still on a gateway page; keep the webview open.
    Pending = 0,
    Success = 1,
    Failed = 2,
    Cancelled = 3,
}

impl From<Option<PaymentOutcome>> for FfiPaymentOutcome {
    fn from(outcome: Option<PaymentOutcome>) -> Self {
        match outcome {
            None => FfiPaymentOutcome::Pending,
            Some(PaymentOutcome::Success) => FfiPaymentOutcome::Success,
            Some(PaymentOutcome::Failed) => FfiPaymentOutcome::Failed,
            Some(PaymentOutcome::Cancelled) => FfiPaymentOutcome::Cancelled,
        }
    }
}

// ---------------------------------------------------------------------------
// Split-phase actions
// ---------------------------------------------------------------------------

/// Which action `mf_action_begin` opens, and what its `arg` carries.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiActionKind {
    /// No `arg`. May settle without a request.
    Bootstrap = 0,
    /// `arg`: `{"email", "password"}`.
    Login = 1,
    /// `arg`: `{"name", "email", "phone", "password", "confirmPassword", "role"}`.
    Register = 2,
    /// `arg`: the emailed code.
    VerifyOtp = 3,
    ResendOtp = 4,
    /// `arg`: search text or null. Uses `page`.
    FetchMesses = 5,
    /// `arg`: search text. Uses `page`.
    SearchMesses = 6,
    /// `arg`: mess id.
    FetchMess = 7,
    FetchSliders = 8,
    /// `page` selects the filter: 0 = all, 1 = upcoming, 2 = past.
    FetchBookings = 9,
    /// `arg`: booking id.
    FetchBooking = 10,
    /// `arg`: booking id.
    CancelBooking = 11,
    FetchFavorites = 12,
    /// `arg`: mess id.
    SaveFavorite = 13,
    /// `arg`: mess id.
    RemoveFavorite = 14,
    /// `arg`: mess id. Uses `page`.
    FetchReviews = 15,
    /// `arg`: `{"messId", "rating", "comment"}`.
    CreateReview = 16,
    /// `arg`: review id.
    DeleteReview = 17,
}

/// Result of `mf_action_begin`.
///
/// - `request` set: execute it, then settle `ticket` with
///   `mf_action_complete` or `mf_action_fail`.
/// - `error` set: the action was refused before any request existed.
/// - both null: the action settled locally; read the state.
#[repr(C)]
pub struct FfiPending {
    pub ticket: u64,
    pub request: *mut FfiHttpRequest,
    pub error: *mut FfiResult,
}

impl FfiPending {
    pub(crate) fn sent(ticket: u64, request: HttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiPending {
            ticket,
            request: FfiHttpRequest::from_core(request),
            error: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn settled() -> *mut Self {
        Box::into_raw(Box::new(FfiPending {
            ticket: 0,
            request: std::ptr::null_mut(),
            error: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn refused(error: *mut FfiResult) -> *mut Self {
        Box::into_raw(Box::new(FfiPending {
            ticket: 0,
            request: std::ptr::null_mut(),
            error,
        }))
    }
}

/// Part of the app state `mf_state_json` snapshots.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStateSection {
    Session = 0,
    Messes = 1,
    Bookings = 2,
    Favorites = 3,
    Reviews = 4,
}

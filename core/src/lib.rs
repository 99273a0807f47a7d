//! Synchronous client core for the MessFinder accommodation marketplace.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The mobile shell, an FFI
//! caller or a test harness executes the actual HTTP round-trip through a
//! [`Transport`], which keeps the core deterministic and testable.
//!
//! # Design
//! - [`ApiClient`] is the single point of outbound traffic. It attaches the
//!   bearer token read from [`SessionStorage`], applies the fixed timeout,
//!   unwraps the response envelope and purges credentials on a 401.
//! - [`services`] hold one function per endpoint, each returning a typed
//!   [`Call`].
//! - [`Session`] is an explicit state machine and [`RouteGuard`] derives
//!   navigation decisions from it.
//! - [`slices`] hold per-domain state; every async action settles through a
//!   ticket so out-of-order responses cannot clobber newer data.
//! - [`actions`] split every screen action into a request and a later
//!   completion; [`Dispatcher`] runs both halves over a transport against
//!   an injected [`AppState`].
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod actions;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod http;
pub mod redirect;
pub mod services;
pub mod session;
pub mod slices;
pub mod storage;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

pub use actions::{Action, InFlight};
pub use client::{ApiClient, Call};
pub use config::{ClientConfig, ConfigError};
pub use dispatcher::{AppState, Dispatcher};
pub use envelope::Envelope;
pub use error::{ApiError, ErrorEnvelope};
pub use guard::{GuardDecision, RouteGuard};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use redirect::PaymentOutcome;
pub use session::{Session, SessionPhase};
pub use storage::{MemoryStorage, SessionStorage, StorageError};
pub use types::{Booking, Mess, Ref, Role, SavedMess, User};
pub use validation::ValidationErrors;

//! Route handlers, one module per resource.
//!
//! /auth/*         registration, login with OTP, profile
//! /messes/*       listings, search, detail, home carousel
//! /bookings/*     tenant and owner booking flows
//! /payments/*     hosted gateway handoff
//! /reviews/*      per-listing reviews
//! /favorites/*    saved listings
//! /admin/*        moderation and dashboard

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod favorites;
pub mod messes;
pub mod payments;
pub mod reviews;

//! SDK for the services marketplace backend.
//!
//! Holds the wire types shared by every screen (the response envelope,
//! payment methods, wallet and profile schemas), the pure building blocks of
//! the request layer ([`endpoint`], [`idempotency`], [`validation`]) and,
//! behind the `client` feature, the resilient HTTP requester and the typed
//! endpoint clients built on it.

pub mod cancel;
pub mod config;
pub mod endpoint;
pub mod idempotency;
pub mod objects;
pub mod request;
pub mod response;
pub mod session;
pub mod validation;

#[cfg(feature = "client")]
pub mod client;

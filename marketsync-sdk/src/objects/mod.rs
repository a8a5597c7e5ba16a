//! Wire types for the marketplace backend.
//!
//! Every endpoint answers with the same JSON [`Envelope`]. Each endpoint's
//! `data` payload has one explicit schema type here, decoded by one
//! normalisation path rather than probed shape by shape.

pub mod envelope;
pub mod payment_method;
pub mod profile;
pub mod wallet;

pub use envelope::{ApiFailure, Envelope};

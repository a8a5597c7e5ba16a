//! HTTP clients for the marketplace backend.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod profile;
mod requester;
mod transport;
mod wallet;

pub use profile::ProfileClient;
pub use requester::{ResilientRequester, SendError};
pub use transport::{Attempt, ReqwestTransport, Transport, TransportError};
pub use wallet::WalletClient;

use crate::objects::envelope::ApiFailure;

/// Errors produced by the typed endpoint clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No candidate answered, or the caller cancelled.
    #[error(transparent)]
    Send(#[from] SendError),

    /// A candidate answered, but not with success.
    #[error(transparent)]
    Api(#[from] ApiFailure),

    /// Request body could not be serialized.
    #[error("could not encode request: {0}")]
    Json(#[from] serde_json::Error),

    /// The underlying `reqwest::Client` could not be built.
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

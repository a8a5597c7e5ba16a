//! Screen controllers.
//!
//! Each controller owns the state slices one screen renders, loads them
//! through the aggregator, and routes every user edit through the
//! optimistic mutator.

mod profile;
mod wallet;

pub use profile::ProfileScreen;
pub use wallet::{WalletOverview, WalletScreen};

use std::fmt::Display;
use std::future::Future;

use marketsync_sdk::cancel::Cancellation;
use marketsync_sdk::client::ClientError;

use crate::optimistic::{MutationError, OptimisticMutator};
use crate::slice::StateSlice;
use crate::submission::SubmitRejected;

#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("top-up amount must be greater than zero")]
    InvalidAmount,

    #[error("no saved payment method with id {0}")]
    UnknownMethod(String),

    #[error(transparent)]
    Submit(#[from] SubmitRejected),

    #[error(transparent)]
    Request(#[from] ClientError),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

async fn run_mutation<T, F, Fut, E>(
    slice: &StateSlice<T>,
    proposed: T,
    commit: F,
    cancel: Option<&Cancellation>,
) -> Result<T, MutationError>
where
    T: Clone + PartialEq,
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    match cancel {
        Some(cancel) => OptimisticMutator::mutate_cancellable(slice, proposed, commit, cancel).await,
        None => OptimisticMutator::mutate(slice, proposed, commit).await,
    }
}

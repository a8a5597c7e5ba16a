//! Optimistic updates with guaranteed rollback.
//!
//! The mutator shows a proposed value immediately, then runs the commit
//! future. On success the server's canonical value replaces the proposal
//! if they differ; on any failure the exact previous value comes back.
//!
//! The rollback lives in [`OptimisticTransaction`]'s `Drop`, so a commit
//! future that is dropped halfway (cancelled, or its task aborted) still
//! restores the slice. Settling consumes the transaction, which makes a
//! second rollback impossible.

use std::fmt::Display;
use std::future::Future;

use marketsync_sdk::cancel::Cancellation;
use tracing::{info, warn};

use crate::slice::StateSlice;

/// Why an optimistic mutation did not stick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// Another transaction on the same slice has not settled yet.
    #[error("{slice} is already being updated, wait for it to finish")]
    SliceBusy { slice: String },

    /// The commit failed; the previous value is back on screen.
    #[error("could not update {slice}: {message}")]
    Failed { slice: String, message: String },

    /// The caller cancelled; the previous value is back on screen.
    #[error("update of {slice} was cancelled")]
    Cancelled { slice: String },
}

/// One in-flight optimistic change to a slice.
///
/// Holds the slice's in-flight slot until it is dropped.
pub struct OptimisticTransaction<T: Clone> {
    slice: StateSlice<T>,
    previous: T,
    proposed: T,
    committed: bool,
    settled: bool,
}

impl<T: Clone> OptimisticTransaction<T> {
    /// Snapshot the slice and show `proposed`.
    pub fn begin(slice: &StateSlice<T>, proposed: T) -> Result<Self, MutationError> {
        if !slice.try_claim() {
            return Err(MutationError::SliceBusy {
                slice: slice.name().to_string(),
            });
        }
        let previous = slice.get();
        slice.replace(proposed.clone());
        Ok(Self {
            slice: slice.clone(),
            previous,
            proposed,
            committed: false,
            settled: false,
        })
    }

    /// Claim the slice without changing what it shows.
    ///
    /// For edits whose new value is only known once the server answers
    /// (adding a record the server assigns an id to): the holder commits
    /// the server's value, and nobody else writes the slice meanwhile.
    pub fn hold(slice: &StateSlice<T>) -> Result<Self, MutationError> {
        if !slice.try_claim() {
            return Err(MutationError::SliceBusy {
                slice: slice.name().to_string(),
            });
        }
        let current = slice.get();
        Ok(Self {
            slice: slice.clone(),
            previous: current.clone(),
            proposed: current,
            committed: false,
            settled: false,
        })
    }

    pub fn previous(&self) -> &T {
        &self.previous
    }

    pub fn proposed(&self) -> &T {
        &self.proposed
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Server confirmed. Its value wins over the proposal.
    pub fn commit(mut self, canonical: T) -> T
    where
        T: PartialEq,
    {
        if canonical != self.proposed {
            self.slice.replace(canonical.clone());
        }
        self.committed = true;
        self.settled = true;
        canonical
    }

    /// Put the previous value back.
    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if !self.settled {
            self.slice.replace(self.previous.clone());
            self.settled = true;
            warn!(slice = %self.slice.name(), "Optimistic update rolled back");
        }
    }
}

impl<T: Clone> Drop for OptimisticTransaction<T> {
    fn drop(&mut self) {
        self.restore();
        self.slice.release();
    }
}

/// Runs optimistic mutations against [`StateSlice`]s.
pub struct OptimisticMutator;

impl OptimisticMutator {
    /// Show `proposed` on `slice`, then run `commit` with it.
    ///
    /// `commit` resolves to the server's canonical value. A slice with a
    /// transaction already in flight rejects the call with
    /// [`MutationError::SliceBusy`] without touching the visible value.
    pub async fn mutate<T, F, Fut, E>(
        slice: &StateSlice<T>,
        proposed: T,
        commit: F,
    ) -> Result<T, MutationError>
    where
        T: Clone + PartialEq,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let tx = OptimisticTransaction::begin(slice, proposed)?;
        let result = commit(tx.proposed().clone()).await;
        settle(tx, result)
    }

    /// Like [`mutate`](Self::mutate), but roll back and stop waiting when
    /// `cancel` fires. Rollback happens exactly once whichever way the
    /// commit ends.
    pub async fn mutate_cancellable<T, F, Fut, E>(
        slice: &StateSlice<T>,
        proposed: T,
        commit: F,
        cancel: &Cancellation,
    ) -> Result<T, MutationError>
    where
        T: Clone + PartialEq,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if cancel.is_cancelled() {
            return Err(MutationError::Cancelled {
                slice: slice.name().to_string(),
            });
        }
        let tx = OptimisticTransaction::begin(slice, proposed)?;
        let commit = commit(tx.proposed().clone());

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = commit => Some(result),
        };

        match result {
            Some(result) => settle(tx, result),
            None => {
                let slice = slice.name().to_string();
                tx.rollback();
                Err(MutationError::Cancelled { slice })
            }
        }
    }
}

fn settle<T, E>(tx: OptimisticTransaction<T>, result: Result<T, E>) -> Result<T, MutationError>
where
    T: Clone + PartialEq,
    E: Display,
{
    let slice = tx.slice.name().to_string();
    match result {
        Ok(canonical) => {
            let value = tx.commit(canonical);
            info!(slice = %slice, "Optimistic update confirmed");
            Ok(value)
        }
        Err(e) => {
            let message = e.to_string();
            tx.rollback();
            Err(MutationError::Failed { slice, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketsync_sdk::cancel::cancellation;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_commit_restores_exact_state() {
        let slice = StateSlice::new("profile", vec!["a".to_string(), "b".to_string()]);
        let before = slice.get();

        let err = OptimisticMutator::mutate(&slice, vec!["c".to_string()], |_| async {
            Err::<Vec<String>, _>("backend not reachable")
        })
        .await
        .unwrap_err();

        assert_eq!(slice.get(), before);
        assert_eq!(err.to_string(), "could not update profile: backend not reachable");
        assert!(!slice.is_in_flight());
    }

    #[tokio::test]
    async fn test_proposal_visible_before_commit_resolves() {
        let slice = StateSlice::new("default", 1);
        let observed = slice.clone();

        let value = OptimisticMutator::mutate(&slice, 2, |proposed| async move {
            assert_eq!(observed.get(), 2);
            Ok::<_, String>(proposed)
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
        assert_eq!(slice.get(), 2);
    }

    #[tokio::test]
    async fn test_server_value_wins() {
        let slice = StateSlice::new("default", 1);
        let value = OptimisticMutator::mutate(&slice, 2, |_| async { Ok::<_, String>(3) })
            .await
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(slice.get(), 3);
    }

    #[tokio::test]
    async fn test_second_mutation_on_busy_slice_rejected() {
        let slice = StateSlice::new("default", 0);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let first = OptimisticMutator::mutate(&slice, 1, |p| async move {
            let _ = release_rx.await;
            Ok::<_, String>(p)
        });
        let second = async {
            tokio::task::yield_now().await;
            let result =
                OptimisticMutator::mutate(&slice, 2, |p| async move { Ok::<_, String>(p) }).await;
            assert_eq!(slice.get(), 1);
            let _ = release_tx.send(());
            result
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first, Ok(1));
        assert_eq!(
            second,
            Err(MutationError::SliceBusy {
                slice: "default".into()
            })
        );
        assert_eq!(slice.get(), 1);
    }

    #[tokio::test]
    async fn test_cancel_rolls_back_once() {
        let slice = StateSlice::new("profile", 10);
        let mut watcher = slice.subscribe();
        let (handle, signal) = cancellation();

        let pending = OptimisticMutator::mutate_cancellable(
            &slice,
            20,
            |_| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, String>(20)
            },
            &signal,
        );
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
            handle.cancel();
        };
        let (result, ()) = tokio::join!(pending, cancel);

        assert!(matches!(result, Err(MutationError::Cancelled { .. })));
        assert_eq!(slice.get(), 10);
        assert!(!slice.is_in_flight());

        // proposal, then exactly one rollback
        assert_eq!(watcher.changed().await, Some(10));
        assert!(
            tokio::time::timeout(Duration::from_millis(20), watcher.changed())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_dropped_commit_future_still_rolls_back() {
        let slice = StateSlice::new("profile", 'a');
        let pending = OptimisticMutator::mutate(&slice, 'b', |_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, String>('b')
        });
        let timed_out = tokio::time::timeout(Duration::from_millis(20), pending).await;

        assert!(timed_out.is_err());
        assert_eq!(slice.get(), 'a');
        assert!(!slice.is_in_flight());
    }

    #[tokio::test]
    async fn test_hold_blocks_others_until_committed() {
        let slice = StateSlice::new("payment methods", vec![1, 2]);
        let held = OptimisticTransaction::hold(&slice).unwrap();
        assert_eq!(slice.get(), vec![1, 2]);

        let rejected =
            OptimisticMutator::mutate(&slice, vec![2], |p| async move { Ok::<_, String>(p) }).await;
        assert!(matches!(rejected, Err(MutationError::SliceBusy { .. })));
        assert!(!slice.confirm(vec![9]));

        assert_eq!(held.commit(vec![1, 2, 3]), vec![1, 2, 3]);
        assert_eq!(slice.get(), vec![1, 2, 3]);
        assert!(!slice.is_in_flight());
    }
}

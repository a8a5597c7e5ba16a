//! Payment method submission state machine.
//!
//! ```text
//! Draft --begin_submit--> (validate) --invalid--> Draft + reason
//!                                    --valid----> Submitting
//! Submitting --complete(Err)--> Draft (values kept) + error
//! Submitting --complete(Ok)---> Saved (terminal)
//! ```
//!
//! Validation runs again inside [`PaymentMethodForm::begin_submit`] even if
//! the caller already gated its submit button on [`PaymentMethodForm::check`].

use marketsync_sdk::objects::payment_method::{PaymentMethodDraft, SavedPaymentMethod};
use marketsync_sdk::validation::{DraftRejection, ValidationOutcome, validate_payment_draft};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// The user is editing.
    Draft(PaymentMethodDraft),
    /// Sent; waiting for the backend. The draft is kept for a failure.
    Submitting(PaymentMethodDraft),
    /// Accepted by the backend. The draft is gone.
    Saved(SavedPaymentMethod),
}

/// Why [`PaymentMethodForm::begin_submit`] refused to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error(transparent)]
    Invalid(#[from] DraftRejection),

    #[error("this payment method is already being saved")]
    InFlight,

    #[error("this payment method has already been saved")]
    AlreadySaved,
}

/// One "add payment method" form.
#[derive(Debug, Clone)]
pub struct PaymentMethodForm {
    state: SubmissionState,
    last_error: Option<String>,
}

impl PaymentMethodForm {
    pub fn new(draft: PaymentMethodDraft) -> Self {
        Self {
            state: SubmissionState::Draft(draft),
            last_error: None,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// The values entered so far; `None` once saved.
    pub fn draft(&self) -> Option<&PaymentMethodDraft> {
        match &self.state {
            SubmissionState::Draft(draft) | SubmissionState::Submitting(draft) => Some(draft),
            SubmissionState::Saved(_) => None,
        }
    }

    /// Editable only while in `Draft`.
    pub fn draft_mut(&mut self) -> Option<&mut PaymentMethodDraft> {
        match &mut self.state {
            SubmissionState::Draft(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn saved(&self) -> Option<&SavedPaymentMethod> {
        match &self.state {
            SubmissionState::Saved(saved) => Some(saved),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting(_))
    }

    /// Reason shown under the form: the last validation or backend error.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Gate for the submit button. Same rules as the dispatch-time check.
    pub fn check(&self) -> ValidationOutcome {
        match &self.state {
            SubmissionState::Draft(draft) => validate_payment_draft(draft),
            // nothing left to submit
            SubmissionState::Submitting(_) | SubmissionState::Saved(_) => ValidationOutcome::Valid,
        }
    }

    /// Validate and move to `Submitting`.
    ///
    /// Returns the normalised draft to send. A form that is already
    /// submitting rejects the attempt rather than queueing it.
    pub fn begin_submit(&mut self) -> Result<PaymentMethodDraft, SubmitRejected> {
        let draft = match &self.state {
            SubmissionState::Draft(draft) => draft.clone(),
            SubmissionState::Submitting(_) => {
                debug!("Rejecting submit, one is already in flight");
                return Err(SubmitRejected::InFlight);
            }
            SubmissionState::Saved(_) => return Err(SubmitRejected::AlreadySaved),
        };

        if let Err(rejection) = validate_payment_draft(&draft).into_result() {
            self.last_error = Some(rejection.to_string());
            return Err(rejection.into());
        }

        let outgoing = draft.normalized();
        self.state = SubmissionState::Submitting(draft);
        self.last_error = None;
        Ok(outgoing)
    }

    /// Settle a submission started by [`begin_submit`](Self::begin_submit).
    ///
    /// Ignored unless the form is `Submitting`. Returns the saved record on
    /// success.
    pub fn complete(
        &mut self,
        outcome: Result<SavedPaymentMethod, String>,
    ) -> Option<&SavedPaymentMethod> {
        let SubmissionState::Submitting(draft) = &self.state else {
            warn!("Submission outcome arrived for a form that is not submitting");
            return None;
        };
        let draft = draft.clone();
        match outcome {
            Ok(saved) => {
                self.state = SubmissionState::Saved(saved);
                self.last_error = None;
                self.saved()
            }
            Err(message) => {
                self.state = SubmissionState::Draft(draft);
                self.last_error = Some(message);
                None
            }
        }
    }
}

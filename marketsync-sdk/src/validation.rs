//! Payment method validation.
//!
//! [`validate_payment_draft`] is a pure function: no network, no storage, no
//! hidden state. The same function gates the submit button and re-checks the
//! draft right before dispatch, since the rendered state can be stale by the
//! time the user clicks.

use crate::objects::payment_method::{PaymentMethodDetails, PaymentMethodDraft};

/// Why a draft cannot be submitted. `Display` is the message shown to the
/// user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DraftRejection {
    #[error("UPI ID is required")]
    UpiIdMissing,
    #[error("UPI ID must contain '@' (for example name@bank)")]
    UpiIdWithoutHandle,

    #[error("card number may only contain digits, spaces and dashes")]
    CardNumberCharacters,
    #[error("card number must be 12 to 19 digits")]
    CardNumberLength,
    #[error("card holder name is required")]
    CardHolderMissing,
    #[error("expiry month must be a number from 1 to 12")]
    ExpiryMonth,
    #[error("expiry year must be 2 to 4 digits")]
    ExpiryYear,
    #[error("CVV must be 3 or 4 digits")]
    Cvv,

    #[error("bank name is required")]
    BankNameMissing,
    #[error("account holder name is required")]
    AccountHolderMissing,
    #[error("account number may only contain digits, spaces and dashes")]
    AccountNumberCharacters,
    #[error("account number must be 6 to 18 digits")]
    AccountNumberLength,
    #[error("account number and confirmation do not match")]
    AccountNumberMismatch,
}

/// Result of validating a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(DraftRejection),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Human-readable reason, if invalid.
    pub fn reason(&self) -> Option<String> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(rejection) => Some(rejection.to_string()),
        }
    }

    pub fn into_result(self) -> Result<(), DraftRejection> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Invalid(rejection) => Err(rejection),
        }
    }
}

impl From<Result<(), DraftRejection>> for ValidationOutcome {
    fn from(value: Result<(), DraftRejection>) -> Self {
        match value {
            Ok(()) => ValidationOutcome::Valid,
            Err(rejection) => ValidationOutcome::Invalid(rejection),
        }
    }
}

/// Check a draft. Rules run in a fixed order; the first violation wins.
/// Only the fields of the draft's own type are looked at.
pub fn validate_payment_draft(draft: &PaymentMethodDraft) -> ValidationOutcome {
    match &draft.details {
        PaymentMethodDetails::Upi { upi_id } => check_upi(upi_id),
        PaymentMethodDetails::Card {
            number,
            holder_name,
            expiry_month,
            expiry_year,
            cvv,
        } => check_card(number, holder_name, expiry_month, expiry_year, cvv),
        PaymentMethodDetails::NetBanking {
            bank_name,
            holder_name,
            account_number,
            confirm_account_number,
            ifsc: _,
        } => check_net_banking(bank_name, holder_name, account_number, confirm_account_number),
    }
    .into()
}

fn check_upi(upi_id: &str) -> Result<(), DraftRejection> {
    let upi_id = upi_id.trim();
    if upi_id.is_empty() {
        return Err(DraftRejection::UpiIdMissing);
    }
    if !upi_id.contains('@') {
        return Err(DraftRejection::UpiIdWithoutHandle);
    }
    Ok(())
}

fn check_card(
    number: &str,
    holder_name: &str,
    expiry_month: &str,
    expiry_year: &str,
    cvv: &str,
) -> Result<(), DraftRejection> {
    let number = grouped_digits(number).ok_or(DraftRejection::CardNumberCharacters)?;
    if !(12..=19).contains(&number.len()) {
        return Err(DraftRejection::CardNumberLength);
    }
    if holder_name.trim().is_empty() {
        return Err(DraftRejection::CardHolderMissing);
    }
    match expiry_month.trim().parse::<u8>() {
        Ok(month) if (1..=12).contains(&month) => {}
        _ => return Err(DraftRejection::ExpiryMonth),
    }
    if !all_digits_in(expiry_year.trim(), 2..=4) {
        return Err(DraftRejection::ExpiryYear);
    }
    if !all_digits_in(cvv.trim(), 3..=4) {
        return Err(DraftRejection::Cvv);
    }
    Ok(())
}

fn check_net_banking(
    bank_name: &str,
    holder_name: &str,
    account_number: &str,
    confirm_account_number: &str,
) -> Result<(), DraftRejection> {
    if bank_name.trim().is_empty() {
        return Err(DraftRejection::BankNameMissing);
    }
    if holder_name.trim().is_empty() {
        return Err(DraftRejection::AccountHolderMissing);
    }
    let account =
        grouped_digits(account_number).ok_or(DraftRejection::AccountNumberCharacters)?;
    if !(6..=18).contains(&account.len()) {
        return Err(DraftRejection::AccountNumberLength);
    }
    if grouped_digits(confirm_account_number).as_deref() != Some(account.as_str()) {
        return Err(DraftRejection::AccountNumberMismatch);
    }
    Ok(())
}

/// Digits of a number typed in groups (`4242 4242`, `4242-4242`). `None` if
/// anything other than digits, spaces and dashes was typed.
fn grouped_digits(value: &str) -> Option<String> {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.is_ascii_digit().then_some(c))
        .collect()
}

fn all_digits_in(value: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

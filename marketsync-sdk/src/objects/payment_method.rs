//! Payment method drafts and their saved, server-redacted projection.

use serde::{Deserialize, Serialize};

/// The three payment method families the wallet accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodKind {
    Upi,
    Card,
    NetBanking,
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethodKind::Upi => write!(f, "UPI"),
            PaymentMethodKind::Card => write!(f, "card"),
            PaymentMethodKind::NetBanking => write!(f, "net banking"),
        }
    }
}

/// Type-specific fields of a payment method being entered by the user.
///
/// All values are kept as typed by the user; see
/// [`PaymentMethodDraft::normalized`] for the form sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum PaymentMethodDetails {
    Upi {
        upi_id: String,
    },
    Card {
        number: String,
        holder_name: String,
        expiry_month: String,
        expiry_year: String,
        cvv: String,
    },
    NetBanking {
        bank_name: String,
        holder_name: String,
        account_number: String,
        /// Re-entry check, never sent to the backend.
        #[serde(default, skip_serializing)]
        confirm_account_number: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ifsc: Option<String>,
    },
}

impl PaymentMethodDetails {
    pub fn kind(&self) -> PaymentMethodKind {
        match self {
            PaymentMethodDetails::Upi { .. } => PaymentMethodKind::Upi,
            PaymentMethodDetails::Card { .. } => PaymentMethodKind::Card,
            PaymentMethodDetails::NetBanking { .. } => PaymentMethodKind::NetBanking,
        }
    }
}

/// A payment method the user is entering, before the backend has seen it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodDraft {
    #[serde(flatten)]
    pub details: PaymentMethodDetails,
    #[serde(default)]
    pub is_default: bool,
}

impl PaymentMethodDraft {
    pub fn new(details: PaymentMethodDetails) -> Self {
        Self {
            details,
            is_default: false,
        }
    }

    pub fn upi(upi_id: impl Into<String>) -> Self {
        Self::new(PaymentMethodDetails::Upi {
            upi_id: upi_id.into(),
        })
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn kind(&self) -> PaymentMethodKind {
        self.details.kind()
    }

    /// The form sent to the backend: text fields trimmed, card and account
    /// numbers reduced to their digits.
    pub fn normalized(&self) -> Self {
        let details = match &self.details {
            PaymentMethodDetails::Upi { upi_id } => PaymentMethodDetails::Upi {
                upi_id: upi_id.trim().to_string(),
            },
            PaymentMethodDetails::Card {
                number,
                holder_name,
                expiry_month,
                expiry_year,
                cvv,
            } => PaymentMethodDetails::Card {
                number: digits(number),
                holder_name: holder_name.trim().to_string(),
                expiry_month: expiry_month.trim().to_string(),
                expiry_year: expiry_year.trim().to_string(),
                cvv: cvv.trim().to_string(),
            },
            PaymentMethodDetails::NetBanking {
                bank_name,
                holder_name,
                account_number,
                confirm_account_number,
                ifsc,
            } => PaymentMethodDetails::NetBanking {
                bank_name: bank_name.trim().to_string(),
                holder_name: holder_name.trim().to_string(),
                account_number: digits(account_number),
                confirm_account_number: digits(confirm_account_number),
                ifsc: ifsc
                    .as_deref()
                    .map(|code| code.trim().to_ascii_uppercase())
                    .filter(|code| !code.is_empty()),
            },
        };
        Self {
            details,
            is_default: self.is_default,
        }
    }
}

/// Keep only ASCII digits.
pub fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// A payment method as acknowledged by the backend.
///
/// Sensitive fields are redacted server-side (cards keep only their last
/// four digits). Values of this type only come from deserializing a server
/// response; the client never fabricates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPaymentMethod {
    #[serde(alias = "_id")]
    id: String,
    #[serde(rename = "type")]
    kind: PaymentMethodKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    holder_name: Option<String>,
    #[serde(default)]
    is_default: bool,
}

impl SavedPaymentMethod {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> PaymentMethodKind {
        self.kind
    }

    pub fn upi_id(&self) -> Option<&str> {
        self.upi_id.as_deref()
    }

    pub fn last4(&self) -> Option<&str> {
        self.last4.as_deref()
    }

    pub fn bank_name(&self) -> Option<&str> {
        self.bank_name.as_deref()
    }

    pub fn holder_name(&self) -> Option<&str> {
        self.holder_name.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Copy with the default flag changed, used to build optimistic
    /// proposals. The backend's answer replaces it on reconciliation.
    pub fn with_default_flag(&self, is_default: bool) -> Self {
        Self {
            is_default,
            ..self.clone()
        }
    }

    /// Short human label, e.g. `card •••• 4242`.
    pub fn label(&self) -> String {
        match self.kind {
            PaymentMethodKind::Upi => {
                format!("UPI {}", self.upi_id.as_deref().unwrap_or("(unknown)"))
            }
            PaymentMethodKind::Card => {
                format!("card •••• {}", self.last4.as_deref().unwrap_or("????"))
            }
            PaymentMethodKind::NetBanking => format!(
                "{} •••• {}",
                self.bank_name.as_deref().unwrap_or("bank account"),
                self.last4.as_deref().unwrap_or("????")
            ),
        }
    }
}

/// `data` schema of the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodList {
    #[serde(default)]
    pub payment_methods: Vec<SavedPaymentMethod>,
}

/// Flip default flags so that exactly `id` is the default.
///
/// Returns `None` when `id` is not in the list.
pub fn with_single_default(
    methods: &[SavedPaymentMethod],
    id: &str,
) -> Option<Vec<SavedPaymentMethod>> {
    if !methods.iter().any(|m| m.id == id) {
        return None;
    }
    Some(
        methods
            .iter()
            .map(|m| m.with_default_flag(m.id == id))
            .collect(),
    )
}

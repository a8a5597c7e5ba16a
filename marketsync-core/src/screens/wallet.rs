//! Wallet screen: balance, saved payment methods, top-up.

use std::fmt;

use marketsync_sdk::cancel::Cancellation;
use marketsync_sdk::client::WalletClient;
use marketsync_sdk::objects::payment_method::{
    PaymentMethodList, SavedPaymentMethod, with_single_default,
};
use marketsync_sdk::objects::wallet::{TopUpReceipt, TopUpRequest, WalletBalance};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{ScreenError, run_mutation};
use crate::aggregate::{ConcurrentFetchAggregator, FetchSlot};
use crate::optimistic::OptimisticTransaction;
use crate::slice::StateSlice;
use crate::submission::PaymentMethodForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WalletWidget {
    Balance,
    PaymentMethods,
}

impl fmt::Display for WalletWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletWidget::Balance => write!(f, "wallet balance"),
            WalletWidget::PaymentMethods => write!(f, "payment methods"),
        }
    }
}

/// Result of [`WalletScreen::load`]; each widget succeeds or fails on its
/// own.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletOverview {
    pub balance: Result<WalletBalance, String>,
    pub methods: Result<Vec<SavedPaymentMethod>, String>,
}

pub struct WalletScreen {
    wallet: WalletClient,
    aggregator: ConcurrentFetchAggregator,
    balance: StateSlice<Option<WalletBalance>>,
    methods: StateSlice<Vec<SavedPaymentMethod>>,
    cancel: Option<Cancellation>,
}

impl WalletScreen {
    pub fn new(wallet: WalletClient) -> Self {
        let aggregator = ConcurrentFetchAggregator::new(wallet.requester().clone());
        Self {
            wallet,
            aggregator,
            balance: StateSlice::new("wallet balance", None),
            methods: StateSlice::new("payment methods", Vec::new()),
            cancel: None,
        }
    }

    /// Roll back pending edits and stop waiting once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn balance(&self) -> Option<WalletBalance> {
        self.balance.get()
    }

    pub fn methods(&self) -> Vec<SavedPaymentMethod> {
        self.methods.get()
    }

    pub fn balance_slice(&self) -> &StateSlice<Option<WalletBalance>> {
        &self.balance
    }

    pub fn methods_slice(&self) -> &StateSlice<Vec<SavedPaymentMethod>> {
        &self.methods
    }

    /// Load balance and saved methods concurrently.
    pub async fn load(&self) -> WalletOverview {
        let mut slots = self
            .aggregator
            .load_all(vec![
                (WalletWidget::Balance, self.wallet.balance_request()),
                (WalletWidget::PaymentMethods, self.wallet.payment_methods_request()),
            ])
            .await;
        let mut slot = |widget: WalletWidget| slots.remove(&widget).unwrap_or_default();

        let balance = slot(WalletWidget::Balance)
            .decode::<WalletBalance>(&WalletWidget::Balance.to_string());
        if let Ok(balance) = &balance {
            self.balance.confirm(Some(balance.clone()));
        }

        let methods = decode_methods(&slot(WalletWidget::PaymentMethods));
        if let Ok(methods) = &methods {
            self.methods.confirm(methods.clone());
        }

        WalletOverview { balance, methods }
    }

    /// Submit `form` and add the saved method to the visible list.
    ///
    /// The draft is validated again before dispatch; the form's own state
    /// machine rejects a second submit while one is in flight. The list is
    /// held for the whole round trip, so while another edit of it is
    /// pending the submit is refused before anything is sent.
    pub async fn add_payment_method(
        &self,
        form: &mut PaymentMethodForm,
    ) -> Result<SavedPaymentMethod, ScreenError> {
        let outgoing = form.begin_submit()?;
        let held = match OptimisticTransaction::hold(&self.methods) {
            Ok(held) => held,
            Err(e) => {
                form.complete(Err(e.to_string()));
                return Err(e.into());
            }
        };

        match self.wallet.add_payment_method(&outgoing).await {
            Ok(saved) => {
                let list = with_saved(held.previous(), &saved);
                held.commit(list);
                form.complete(Ok(saved.clone()));
                info!(id = %saved.id(), kind = %saved.kind(), "Payment method saved");
                Ok(saved)
            }
            Err(e) => {
                held.rollback();
                form.complete(Err(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Make `id` the only default, showing the change before the backend
    /// answers. The backend's list replaces the proposal on success.
    pub async fn set_default(&self, id: &str) -> Result<Vec<SavedPaymentMethod>, ScreenError> {
        let proposed = with_single_default(&self.methods.get(), id)
            .ok_or_else(|| ScreenError::UnknownMethod(id.to_string()))?;
        let wallet = self.wallet.clone();
        let id = id.to_string();
        let list = run_mutation(
            &self.methods,
            proposed,
            move |_| async move { wallet.set_default_method(&id).await },
            self.cancel.as_ref(),
        )
        .await?;
        Ok(list)
    }

    /// Remove `id` from the visible list right away; it comes back if the
    /// backend refuses.
    pub async fn remove_method(&self, id: &str) -> Result<Vec<SavedPaymentMethod>, ScreenError> {
        let current = self.methods.get();
        if !current.iter().any(|m| m.id() == id) {
            return Err(ScreenError::UnknownMethod(id.to_string()));
        }
        let proposed: Vec<_> = current.into_iter().filter(|m| m.id() != id).collect();
        let wallet = self.wallet.clone();
        let id = id.to_string();
        let list = run_mutation(
            &self.methods,
            proposed,
            move |_| async move { wallet.remove_method(&id).await },
            self.cancel.as_ref(),
        )
        .await?;
        Ok(list)
    }

    /// Add money to the wallet, then refresh the balance.
    pub async fn top_up(
        &self,
        amount: Decimal,
        payment_method_id: Option<String>,
    ) -> Result<TopUpReceipt, ScreenError> {
        if amount <= Decimal::ZERO {
            return Err(ScreenError::InvalidAmount);
        }
        let receipt = self
            .wallet
            .top_up(&TopUpRequest {
                amount,
                payment_method_id,
            })
            .await?;
        info!(transaction = %receipt.transaction_id, %amount, "Wallet topped up");

        match self.wallet.balance().await {
            Ok(balance) => {
                self.balance.confirm(Some(balance));
            }
            Err(e) => {
                warn!(error = %e, "Balance refresh failed, showing balance from receipt");
                let currency = self
                    .balance
                    .get()
                    .map(|b| b.currency)
                    .unwrap_or_else(|| "INR".to_string());
                self.balance.confirm(Some(WalletBalance {
                    balance: receipt.balance,
                    currency,
                }));
            }
        }
        Ok(receipt)
    }
}

/// `methods` with `saved` appended; a saved default clears the others.
fn with_saved(methods: &[SavedPaymentMethod], saved: &SavedPaymentMethod) -> Vec<SavedPaymentMethod> {
    methods
        .iter()
        .filter(|m| m.id() != saved.id())
        .map(|m| {
            if saved.is_default() {
                m.with_default_flag(false)
            } else {
                m.clone()
            }
        })
        .chain(std::iter::once(saved.clone()))
        .collect()
}

fn decode_methods(slot: &FetchSlot) -> Result<Vec<SavedPaymentMethod>, String> {
    slot.decode::<PaymentMethodList>(&WalletWidget::PaymentMethods.to_string())
        .map(|list| list.payment_methods)
}

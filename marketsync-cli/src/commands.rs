//! Subcommands.

use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use marketsync_core::screens::{ProfileScreen, WalletScreen};
use marketsync_core::submission::PaymentMethodForm;
use marketsync_sdk::cancel::Cancellation;
use marketsync_sdk::client::{ProfileClient, ResilientRequester, WalletClient};
use marketsync_sdk::endpoint::EndpointResolver;
use marketsync_sdk::objects::payment_method::{
    PaymentMethodDetails, PaymentMethodDraft, SavedPaymentMethod,
};
use marketsync_sdk::session::{MemoryTokenStore, TOKEN_KEY, TokenStore, USER_ID_KEY};
use rust_decimal::Decimal;

use crate::config::LoadedConfig;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the candidate URLs tried for a path, in order
    Endpoints { path: String },

    /// Show balance and saved payment methods
    Wallet,

    /// Save a UPI ID
    AddUpi {
        upi_id: String,
        /// Make it the default method
        #[arg(long)]
        default: bool,
    },

    /// Save a card
    AddCard {
        number: String,
        #[arg(long)]
        holder: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        cvv: String,
        #[arg(long)]
        default: bool,
    },

    /// Save a bank account for net banking
    AddBank {
        #[arg(long)]
        bank: String,
        #[arg(long)]
        holder: String,
        #[arg(long)]
        account: String,
        /// Account number typed a second time
        #[arg(long)]
        confirm: String,
        #[arg(long)]
        ifsc: Option<String>,
        #[arg(long)]
        default: bool,
    },

    /// Make a saved method the default
    SetDefault { id: String },

    /// Delete a saved method
    Remove { id: String },

    /// Add money to the wallet
    TopUp {
        amount: Decimal,
        /// Saved method to charge
        #[arg(long)]
        method: Option<String>,
    },

    /// Show the profile, or update it when any field is given
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
}

pub async fn run(command: Command, config: LoadedConfig, cancel: Cancellation) -> anyhow::Result<()> {
    if let Command::Endpoints { path } = &command {
        let resolver = EndpointResolver::new(config.client.endpoints.clone());
        for url in &resolver.resolve(path) {
            println!("{url}");
        }
        return Ok(());
    }

    let session: Arc<dyn TokenStore> = Arc::new(session_store(&config));
    if session.bearer_token().is_none() {
        tracing::warn!("No session token configured, requests will be anonymous");
    }
    let requester =
        ResilientRequester::new(&config.client).context("could not set up the HTTP client")?;

    match command {
        Command::Endpoints { .. } => Ok(()),
        Command::Profile { name, phone, city } => {
            let screen = ProfileScreen::new(ProfileClient::new(requester, session))
                .with_cancellation(cancel);
            run_profile(&screen, name, phone, city).await
        }
        wallet_command => {
            let screen = WalletScreen::new(WalletClient::new(requester, session))
                .with_cancellation(cancel);
            run_wallet(&screen, wallet_command).await
        }
    }
}

fn session_store(config: &LoadedConfig) -> MemoryTokenStore {
    let store = MemoryTokenStore::new();
    if let Some(token) = &config.session.token {
        store.set(TOKEN_KEY, token);
    }
    if let Some(user_id) = &config.session.user_id {
        store.set(USER_ID_KEY, user_id);
    }
    store
}

async fn run_wallet(screen: &WalletScreen, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Wallet => {
            let overview = screen.load().await;
            match overview.balance {
                Ok(balance) => println!("Balance: {} {}", balance.balance, balance.currency),
                Err(e) => println!("Balance: unavailable ({e})"),
            }
            match overview.methods {
                Ok(methods) => print_methods(&methods),
                Err(e) => println!("Payment methods: unavailable ({e})"),
            }
        }
        Command::AddUpi { upi_id, default } => {
            let draft = PaymentMethodDraft::new(PaymentMethodDetails::Upi { upi_id });
            add(screen, draft, default).await?;
        }
        Command::AddCard {
            number,
            holder,
            month,
            year,
            cvv,
            default,
        } => {
            let draft = PaymentMethodDraft::new(PaymentMethodDetails::Card {
                number,
                holder_name: holder,
                expiry_month: month,
                expiry_year: year,
                cvv,
            });
            add(screen, draft, default).await?;
        }
        Command::AddBank {
            bank,
            holder,
            account,
            confirm,
            ifsc,
            default,
        } => {
            let draft = PaymentMethodDraft::new(PaymentMethodDetails::NetBanking {
                bank_name: bank,
                holder_name: holder,
                account_number: account,
                confirm_account_number: confirm,
                ifsc,
            });
            add(screen, draft, default).await?;
        }
        Command::SetDefault { id } => {
            load_methods(screen).await?;
            let methods = screen.set_default(&id).await?;
            print_methods(&methods);
        }
        Command::Remove { id } => {
            load_methods(screen).await?;
            let methods = screen.remove_method(&id).await?;
            print_methods(&methods);
        }
        Command::TopUp { amount, method } => {
            let receipt = screen.top_up(amount, method).await?;
            println!("Top-up {} accepted", receipt.transaction_id);
            if let Some(balance) = screen.balance() {
                println!("Balance: {} {}", balance.balance, balance.currency);
            }
        }
        Command::Endpoints { .. } | Command::Profile { .. } => {}
    }
    Ok(())
}

async fn add(screen: &WalletScreen, draft: PaymentMethodDraft, default: bool) -> anyhow::Result<()> {
    let draft = if default { draft.as_default() } else { draft };
    let mut form = PaymentMethodForm::new(draft);
    if let Some(reason) = form.check().reason() {
        anyhow::bail!("cannot save payment method: {reason}");
    }
    let saved = screen.add_payment_method(&mut form).await?;
    println!("Saved {} ({})", saved.label(), saved.id());
    Ok(())
}

async fn load_methods(screen: &WalletScreen) -> anyhow::Result<()> {
    screen
        .load()
        .await
        .methods
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("could not load payment methods: {e}"))
}

fn print_methods(methods: &[SavedPaymentMethod]) {
    if methods.is_empty() {
        println!("No saved payment methods");
        return;
    }
    for method in methods {
        let marker = if method.is_default() { "*" } else { " " };
        println!("{marker} {:<28} {}", method.label(), method.id());
    }
}

async fn run_profile(
    screen: &ProfileScreen,
    name: Option<String>,
    phone: Option<String>,
    city: Option<String>,
) -> anyhow::Result<()> {
    let mut profile = screen.load().await?;
    if name.is_some() || phone.is_some() || city.is_some() {
        if let Some(name) = name {
            profile.name = name;
        }
        profile.phone = phone.or(profile.phone);
        profile.city = city.or(profile.city);
        profile = screen.update(profile).await?;
        println!("Profile updated");
    }
    println!("Name:  {}", profile.name);
    println!("Email: {}", profile.email);
    println!("Phone: {}", profile.phone.as_deref().unwrap_or("-"));
    println!("City:  {}", profile.city.as_deref().unwrap_or("-"));
    Ok(())
}

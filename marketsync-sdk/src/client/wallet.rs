//! Wallet API client (wallet screen → backend).
//!
//! Every call carries the bearer token from the injected [`TokenStore`].
//! The `*_request` builders are public so screens can hand the read
//! descriptors to a concurrent loader instead of calling them one by one.

use std::sync::Arc;

use super::{ClientError, ResilientRequester};
use crate::objects::payment_method::{PaymentMethodDraft, PaymentMethodList, SavedPaymentMethod};
use crate::objects::wallet::{TopUpReceipt, TopUpRequest, WalletBalance};
use crate::request::RequestDescriptor;
use crate::session::TokenStore;

pub const BALANCE_PATH: &str = "/api/wallet/balance";
pub const PAYMENT_METHODS_PATH: &str = "/api/wallet/payment-methods";
pub const TOP_UP_PATH: &str = "/api/wallet/topup";

/// Typed client for the wallet endpoints.
#[derive(Clone)]
pub struct WalletClient {
    requester: ResilientRequester,
    session: Arc<dyn TokenStore>,
}

impl WalletClient {
    pub fn new(requester: ResilientRequester, session: Arc<dyn TokenStore>) -> Self {
        Self { requester, session }
    }

    pub fn requester(&self) -> &ResilientRequester {
        &self.requester
    }

    fn authorize(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        match self.session.bearer_token() {
            Some(token) => descriptor.with_bearer(&token),
            None => descriptor,
        }
    }

    pub fn balance_request(&self) -> RequestDescriptor {
        self.authorize(RequestDescriptor::get(BALANCE_PATH))
    }

    pub fn payment_methods_request(&self) -> RequestDescriptor {
        self.authorize(RequestDescriptor::get(PAYMENT_METHODS_PATH))
    }

    /// `POST /api/wallet/payment-methods` with the normalised draft.
    pub fn add_payment_method_request(
        &self,
        draft: &PaymentMethodDraft,
    ) -> Result<RequestDescriptor, ClientError> {
        let descriptor = RequestDescriptor::post(PAYMENT_METHODS_PATH).with_json(&draft.normalized())?;
        Ok(self.authorize(descriptor))
    }

    pub fn set_default_request(&self, id: &str) -> RequestDescriptor {
        self.authorize(RequestDescriptor::put(format!(
            "{PAYMENT_METHODS_PATH}/{}/default",
            urlencoding::encode(id)
        )))
    }

    pub fn remove_request(&self, id: &str) -> RequestDescriptor {
        self.authorize(RequestDescriptor::delete(format!(
            "{PAYMENT_METHODS_PATH}/{}",
            urlencoding::encode(id)
        )))
    }

    pub fn top_up_request(&self, body: &TopUpRequest) -> Result<RequestDescriptor, ClientError> {
        let descriptor = RequestDescriptor::post(TOP_UP_PATH).with_json(body)?;
        Ok(self.authorize(descriptor))
    }

    /// `GET /api/wallet/balance`.
    pub async fn balance(&self) -> Result<WalletBalance, ClientError> {
        let resp = self.requester.send(&self.balance_request()).await?;
        Ok(resp.decode()?)
    }

    /// `GET /api/wallet/payment-methods`.
    pub async fn payment_methods(&self) -> Result<Vec<SavedPaymentMethod>, ClientError> {
        let resp = self.requester.send(&self.payment_methods_request()).await?;
        Ok(resp.decode::<PaymentMethodList>()?.payment_methods)
    }

    /// `POST /api/wallet/payment-methods`; returns the server's redacted record.
    pub async fn add_payment_method(
        &self,
        draft: &PaymentMethodDraft,
    ) -> Result<SavedPaymentMethod, ClientError> {
        let resp = self
            .requester
            .send(&self.add_payment_method_request(draft)?)
            .await?;
        Ok(resp.decode()?)
    }

    /// `PUT /api/wallet/payment-methods/{id}/default`; returns the full list
    /// as the server now sees it.
    pub async fn set_default_method(
        &self,
        id: &str,
    ) -> Result<Vec<SavedPaymentMethod>, ClientError> {
        let resp = self.requester.send(&self.set_default_request(id)).await?;
        Ok(resp.decode::<PaymentMethodList>()?.payment_methods)
    }

    /// `DELETE /api/wallet/payment-methods/{id}`; returns the remaining list.
    pub async fn remove_method(&self, id: &str) -> Result<Vec<SavedPaymentMethod>, ClientError> {
        let resp = self.requester.send(&self.remove_request(id)).await?;
        Ok(resp.decode::<PaymentMethodList>()?.payment_methods)
    }

    /// `POST /api/wallet/topup`.
    pub async fn top_up(&self, body: &TopUpRequest) -> Result<TopUpReceipt, ClientError> {
        let resp = self.requester.send(&self.top_up_request(body)?).await?;
        Ok(resp.decode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointConfig;
    use crate::endpoint::EndpointResolver;
    use crate::request::{AUTHORIZATION_HEADER, Method};
    use crate::session::MemoryTokenStore;
    use crate::client::transport::NeverTransport;

    fn client(token: Option<&str>) -> WalletClient {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        let requester = ResilientRequester::with_transport(
            EndpointResolver::new(EndpointConfig::default()),
            Arc::new(NeverTransport),
        );
        WalletClient::new(requester, Arc::new(store))
    }

    #[test]
    fn test_requests_carry_bearer() {
        let c = client(Some("tok"));
        assert_eq!(
            c.balance_request().headers().get(AUTHORIZATION_HEADER),
            Some("Bearer tok")
        );
        assert!(
            client(None)
                .balance_request()
                .headers()
                .get(AUTHORIZATION_HEADER)
                .is_none()
        );
    }

    #[test]
    fn test_paths_and_methods() {
        let c = client(None);
        let set_default = c.set_default_request("pm 1");
        assert_eq!(set_default.method(), Method::Put);
        assert_eq!(set_default.path(), "/api/wallet/payment-methods/pm%201/default");
        assert!(set_default.idempotency_token().is_some());

        let remove = c.remove_request("pm1");
        assert_eq!(remove.method(), Method::Delete);
        assert_eq!(remove.path(), "/api/wallet/payment-methods/pm1");
    }

    #[test]
    fn test_add_sends_normalised_draft_without_confirmation() {
        use crate::objects::payment_method::PaymentMethodDetails;
        let draft = PaymentMethodDraft::new(PaymentMethodDetails::NetBanking {
            bank_name: "SBI".into(),
            holder_name: "Meera".into(),
            account_number: "12 34 56".into(),
            confirm_account_number: "123456".into(),
            ifsc: None,
        });
        let desc = client(None).add_payment_method_request(&draft).unwrap();
        let body: serde_json::Value = serde_json::from_slice(desc.body().unwrap()).unwrap();
        assert_eq!(body["accountNumber"], "123456");
        assert!(body.get("confirmAccountNumber").is_none());
    }
}

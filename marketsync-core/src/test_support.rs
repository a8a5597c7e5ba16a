//! In-memory backend for exercising the request layer without sockets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use marketsync_sdk::client::{
    Attempt, ProfileClient, ResilientRequester, Transport, TransportError, WalletClient,
};
use marketsync_sdk::config::EndpointConfig;
use marketsync_sdk::endpoint::EndpointResolver;
use marketsync_sdk::idempotency::IDEMPOTENCY_KEY_HEADER;
use marketsync_sdk::request::AUTHORIZATION_HEADER;
use marketsync_sdk::response::Response;
use marketsync_sdk::session::MemoryTokenStore;
use serde_json::{Value, json};

pub const BASE: &str = "http://backend.test";

#[derive(Debug, Clone)]
pub enum Reply {
    Body {
        status: u16,
        body: String,
        delay: Duration,
    },
    Refuse,
    Hang,
}

impl Reply {
    pub fn json(status: u16, value: Value) -> Self {
        Self::Body {
            status,
            body: value.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// `200 {"success": true, "data": data}`.
    pub fn ok(data: Value) -> Self {
        Self::json(200, json!({"success": true, "data": data}))
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self::Body {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Same reply, sent after `delay`.
    pub fn after(self, delay: Duration) -> Self {
        match self {
            Self::Body { status, body, .. } => Self::Body {
                status,
                body,
                delay,
            },
            other => other,
        }
    }

    pub fn delayed(delay: Duration, data: Value) -> Self {
        Self::Body {
            status: 200,
            body: json!({"success": true, "data": data}).to_string(),
            delay,
        }
    }
}

/// One recorded attempt.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub idempotency_key: Option<String>,
    pub authorization: Option<String>,
}

/// Routes by `(method, path)`; unknown routes answer 404.
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<HashMap<(String, String), Reply>>,
    seen: Mutex<Vec<Seen>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `method path` with `reply` from now on.
    pub fn on(&self, method: &str, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), reply);
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Requester with a single candidate host pointing here.
    pub fn requester(self: &Arc<Self>) -> ResilientRequester {
        let resolver = EndpointResolver::new(
            EndpointConfig::new(Some(BASE.into()))
                .with_fallbacks(Vec::<String>::new())
                .without_relative_fallback(),
        );
        ResilientRequester::with_transport(resolver, self.clone())
    }

    pub fn wallet_client(self: &Arc<Self>) -> WalletClient {
        WalletClient::new(self.requester(), Arc::new(MemoryTokenStore::with_token("tok")))
    }

    pub fn profile_client(self: &Arc<Self>) -> ProfileClient {
        ProfileClient::new(self.requester(), Arc::new(MemoryTokenStore::with_token("tok")))
    }

    fn reply_for(&self, method: &str, path: &str) -> Option<Reply> {
        self.routes
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn execute(&self, attempt: Attempt<'_>) -> Result<Response, TransportError> {
        let path = attempt.url.strip_prefix(BASE).unwrap_or(attempt.url).to_string();
        let method = attempt.method.as_str().to_string();
        self.seen.lock().unwrap().push(Seen {
            method: method.clone(),
            path: path.clone(),
            body: attempt.body.and_then(|b| serde_json::from_slice(b).ok()),
            idempotency_key: attempt.headers.get(IDEMPOTENCY_KEY_HEADER).map(str::to_string),
            authorization: attempt.headers.get(AUTHORIZATION_HEADER).map(str::to_string),
        });

        match self.reply_for(&method, &path) {
            Some(Reply::Body {
                status,
                body,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(Response::new(status, attempt.url, body))
            }
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(TransportError::Unreachable {
                    url: attempt.url.to_string(),
                    reason: "hung".into(),
                })
            }
            Some(Reply::Refuse) => Err(TransportError::Unreachable {
                url: attempt.url.to_string(),
                reason: "connection refused".into(),
            }),
            None => Ok(Response::new(404, attempt.url, "")),
        }
    }
}

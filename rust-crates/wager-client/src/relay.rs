//! Nonce broker client and relay action invoker.
//!
//! Every state-changing intent travels as a signed envelope: the client
//! fetches a one-time nonce, renders the canonical message, has the injected
//! signer sign it, and POSTs the envelope to the relay, which pays gas and
//! submits the real contract transaction.

use serde::Deserialize;
use serde_json::{
    Value,
    json,
};

use crate::error::{
    Error,
    Result,
};
use crate::message::sign_message_text;
use crate::signer::Signer;

pub const NONCE_PATH: &str = "/relay/nonce";

/// One relay HTTP exchange, already classified by HTTP status and with the
/// body parsed as far as it will go. Non-JSON bodies come back as `Null`
/// so error extraction falls through to the generic fallback text.
#[derive(Debug, Clone)]
pub struct RelayReply {
    pub success: bool,
    pub body: Value,
}

pub trait RelayTransport {
    fn post(&self, path: &str, body: &Value) -> impl Future<Output = Result<RelayReply>>;
}

/// Production transport over reqwest.
#[derive(Clone)]
pub struct RelayHttp {
    base_url: String,
    http: reqwest::Client,
}

impl RelayHttp {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("failed to build relay HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }
}

impl RelayTransport for RelayHttp {
    async fn post(&self, path: &str, body: &Value) -> Result<RelayReply> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("relay request failed: {e}")))?;
        let success = res.status().is_success();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read relay response: {e}")))?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(RelayReply { success, body })
    }
}

/// Nonce/timestamp pair issued by the relay for exactly one action attempt.
/// A rejected grant is never reused; the invoker fetches a fresh one.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NonceGrant {
    pub nonce: String,
    pub timestamp: u64,
}

/// A state-changing intent plus its action-specific payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    Create {
        prediction: String,
        deadline: String,
        category: String,
        verification_criteria: String,
        stake_amount: u64,
    },
    Accept {
        wager_id: String,
        stake_amount: u64,
    },
    Verify {
        wager_id: String,
        evidence_url: String,
    },
    Appeal {
        wager_id: String,
        appeal_reason: String,
        evidence_url: String,
    },
    Resolve {
        wager_id: String,
    },
}

impl RelayAction {
    pub fn name(&self) -> &'static str {
        match self {
            RelayAction::Create { .. } => "create",
            RelayAction::Accept { .. } => "accept",
            RelayAction::Verify { .. } => "verify",
            RelayAction::Appeal { .. } => "appeal",
            RelayAction::Resolve { .. } => "resolve",
        }
    }

    fn payload(&self) -> Value {
        match self {
            RelayAction::Create {
                prediction,
                deadline,
                category,
                verification_criteria,
                stake_amount,
            } => json!({
                "prediction": prediction,
                "deadline": deadline,
                "category": category,
                "verification_criteria": verification_criteria,
                "stake_amount": stake_amount,
            }),
            RelayAction::Accept {
                wager_id,
                stake_amount,
            } => json!({
                "wager_id": wager_id,
                "stake_amount": stake_amount,
            }),
            RelayAction::Verify {
                wager_id,
                evidence_url,
            } => json!({
                "wager_id": wager_id,
                "evidence_url": evidence_url,
            }),
            RelayAction::Appeal {
                wager_id,
                appeal_reason,
                evidence_url,
            } => json!({
                "wager_id": wager_id,
                "appeal_reason": appeal_reason,
                "evidence_url": evidence_url,
            }),
            RelayAction::Resolve { wager_id } => json!({
                "wager_id": wager_id,
            }),
        }
    }
}

pub struct RelayClient<T> {
    transport: T,
}

impl<T: RelayTransport> RelayClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Request a one-time nonce for `address`. No retry at this layer;
    /// retries are an `invoke` policy.
    pub async fn request_nonce(&self, address: &str) -> Result<NonceGrant> {
        let reply = self
            .transport
            .post(NONCE_PATH, &json!({ "address": address }))
            .await?;
        if !reply.success {
            return Err(Error::NonceRequest(relay_error_text(
                &reply.body,
                "Nonce error",
            )));
        }
        serde_json::from_value(reply.body)
            .map_err(|e| Error::NonceRequest(format!("invalid nonce reply: {e}")))
    }

    /// Run one signed action end to end: nonce fetch, message render,
    /// signature, submit. If the first attempt fails and the relay's error
    /// text mentions the nonce, retry exactly once with a fresh grant; any
    /// other failure, or a second failure, propagates verbatim.
    pub async fn invoke<S: Signer>(&self, action: &RelayAction, signer: &S) -> Result<Value> {
        let mut retried = false;
        loop {
            let grant = self.request_nonce(signer.address()).await?;
            let message = sign_message_text(
                action.name(),
                signer.address(),
                &grant.nonce,
                grant.timestamp,
            );
            let signature = signer.sign_message(&message).await?;

            let mut envelope = json!({
                "address": signer.address(),
                "signature": signature,
                "nonce": grant.nonce,
                "timestamp": grant.timestamp,
            });
            merge_payload(&mut envelope, action.payload());

            let path = format!("/relay/{}", action.name());
            let reply = self.transport.post(&path, &envelope).await?;
            if reply.success {
                return Ok(reply.body);
            }

            let text = relay_error_text(&reply.body, "Relayer error");
            if !retried && text.to_lowercase().contains("nonce") {
                tracing::info!(
                    action = action.name(),
                    "relay rejected the nonce, retrying once with a fresh grant"
                );
                retried = true;
                continue;
            }
            return Err(Error::RelayAction(text));
        }
    }
}

/// Both envelope and payload are built as JSON objects in this module.
fn merge_payload(envelope: &mut Value, payload: Value) {
    if let (Some(target), Value::Object(fields)) = (envelope.as_object_mut(), payload) {
        target.extend(fields);
    }
}

fn relay_error_text(body: &Value, fallback: &str) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

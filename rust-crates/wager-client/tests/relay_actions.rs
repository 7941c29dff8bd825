#![allow(non_snake_case)]

use std::sync::Mutex;

use serde_json::{
    Value,
    json,
};
use wager_client::relay::NONCE_PATH;
use wager_client::{
    Error,
    LocalSigner,
    RelayAction,
    RelayClient,
    RelayReply,
    RelayTransport,
    Result,
    Signer,
};

/// Relay fake: hands out numbered nonces and replays a script of submit
/// replies, recording every POST it sees.
struct ScriptedRelay {
    nonce_fetches: Mutex<u64>,
    submit_replies: Mutex<Vec<RelayReply>>,
    submits: Mutex<Vec<(String, Value)>>,
}

impl ScriptedRelay {
    fn new(submit_replies: Vec<RelayReply>) -> Self {
        Self {
            nonce_fetches: Mutex::new(0),
            submit_replies: Mutex::new(submit_replies),
            submits: Mutex::new(Vec::new()),
        }
    }

    fn nonce_fetches(&self) -> u64 {
        *self.nonce_fetches.lock().unwrap()
    }

    fn submits(&self) -> Vec<(String, Value)> {
        self.submits.lock().unwrap().clone()
    }
}

fn success(body: Value) -> RelayReply {
    RelayReply {
        success: true,
        body,
    }
}

fn failure(error: &str) -> RelayReply {
    RelayReply {
        success: false,
        body: json!({ "error": error }),
    }
}

impl RelayTransport for ScriptedRelay {
    async fn post(&self, path: &str, body: &Value) -> Result<RelayReply> {
        if path == NONCE_PATH {
            let mut count = self.nonce_fetches.lock().unwrap();
            *count += 1;
            return Ok(success(json!({
                "nonce": format!("nonce-{count}"),
                "timestamp": 1_700_000_000u64 + *count,
            })));
        }
        self.submits
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
        let mut replies = self.submit_replies.lock().unwrap();
        if replies.is_empty() {
            panic!("unexpected submit to {path}");
        }
        Ok(replies.remove(0))
    }
}

fn create_action() -> RelayAction {
    RelayAction::Create {
        prediction: "BTC will be above $100,000 on Dec 31 2026".to_string(),
        deadline: "2026-12-31T23:59:59".to_string(),
        category: "crypto".to_string(),
        verification_criteria: "https://coinmarketcap.com/currencies/bitcoin/".to_string(),
        stake_amount: 100,
    }
}

#[tokio::test]
async fn invoke__retries_once_when_relay_reports_a_stale_nonce() {
    // given a relay that fails the first submit with a nonce complaint
    let relay = ScriptedRelay::new(vec![
        failure("Invalid nonce"),
        success(json!({ "status": "submitted", "wager_id": "7" })),
    ]);
    let client = RelayClient::new(relay);
    let signer = LocalSigner::from_seed(&[1u8; 32]);

    // when
    let body = client.invoke(&create_action(), &signer).await.unwrap();

    // then the second call's success body comes back
    assert_eq!(body["wager_id"], "7");

    // and exactly two nonces were fetched, producing two distinct envelopes
    let relay = client.into_transport();
    assert_eq!(relay.nonce_fetches(), 2);
    let submits = relay.submits();
    assert_eq!(submits.len(), 2);
    assert_ne!(submits[0].1["nonce"], submits[1].1["nonce"]);
    assert_ne!(submits[0].1["signature"], submits[1].1["signature"]);
}

#[tokio::test]
async fn invoke__does_not_retry_non_nonce_failures() {
    let relay = ScriptedRelay::new(vec![failure("Insufficient stake")]);
    let client = RelayClient::new(relay);
    let signer = LocalSigner::from_seed(&[2u8; 32]);

    let err = client.invoke(&create_action(), &signer).await.unwrap_err();
    match err {
        Error::RelayAction(text) => assert_eq!(text, "Insufficient stake"),
        other => panic!("expected RelayAction, got {other:?}"),
    }

    let relay = client.into_transport();
    assert_eq!(relay.nonce_fetches(), 1);
    assert_eq!(relay.submits().len(), 1);
}

#[tokio::test]
async fn invoke__a_second_nonce_failure_propagates() {
    let relay = ScriptedRelay::new(vec![failure("Invalid nonce"), failure("Invalid nonce")]);
    let client = RelayClient::new(relay);
    let signer = LocalSigner::from_seed(&[3u8; 32]);

    let err = client.invoke(&create_action(), &signer).await.unwrap_err();
    assert!(matches!(err, Error::RelayAction(_)));

    let relay = client.into_transport();
    assert_eq!(relay.nonce_fetches(), 2);
    assert_eq!(relay.submits().len(), 2);
}

#[tokio::test]
async fn invoke__nonce_detection_is_case_insensitive() {
    let relay = ScriptedRelay::new(vec![
        failure("Stale NONCE for address"),
        success(json!({ "status": "submitted" })),
    ]);
    let client = RelayClient::new(relay);
    let signer = LocalSigner::from_seed(&[4u8; 32]);

    client.invoke(&create_action(), &signer).await.unwrap();
    assert_eq!(client.into_transport().nonce_fetches(), 2);
}

#[tokio::test]
async fn invoke__envelope_carries_auth_fields_and_action_payload() {
    let relay = ScriptedRelay::new(vec![success(json!({ "status": "submitted" }))]);
    let client = RelayClient::new(relay);
    let signer = LocalSigner::from_seed(&[5u8; 32]);
    let address = signer.address().to_string();

    let action = RelayAction::Appeal {
        wager_id: "w1".to_string(),
        appeal_reason: "wrong source consulted".to_string(),
        evidence_url: "https://apnews.com/".to_string(),
    };
    client.invoke(&action, &signer).await.unwrap();

    let submits = client.into_transport().submits();
    let (path, envelope) = &submits[0];
    assert_eq!(path, "/relay/appeal");
    assert_eq!(envelope["address"], address.as_str());
    assert_eq!(envelope["nonce"], "nonce-1");
    assert_eq!(envelope["wager_id"], "w1");
    assert_eq!(envelope["appeal_reason"], "wrong source consulted");
    assert_eq!(envelope["evidence_url"], "https://apnews.com/");
    assert!(envelope["signature"].as_str().unwrap().starts_with("0x"));
    assert!(envelope["timestamp"].is_u64());
}

struct FailingNonceRelay {
    body: Value,
}

impl RelayTransport for FailingNonceRelay {
    async fn post(&self, path: &str, _body: &Value) -> Result<RelayReply> {
        assert_eq!(path, NONCE_PATH);
        Ok(RelayReply {
            success: false,
            body: self.body.clone(),
        })
    }
}

#[tokio::test]
async fn request_nonce__surfaces_the_relay_error_body() {
    let client = RelayClient::new(FailingNonceRelay {
        body: json!({ "error": "address is rate limited" }),
    });
    let err = client.request_nonce("0xabc").await.unwrap_err();
    match err {
        Error::NonceRequest(text) => assert_eq!(text, "address is rate limited"),
        other => panic!("expected NonceRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn request_nonce__falls_back_to_a_generic_message() {
    let client = RelayClient::new(FailingNonceRelay { body: Value::Null });
    let err = client.request_nonce("0xabc").await.unwrap_err();
    match err {
        Error::NonceRequest(text) => assert_eq!(text, "Nonce error"),
        other => panic!("expected NonceRequest, got {other:?}"),
    }
}

//! Typed gateway over the contract's raw JSON-string read functions.
//!
//! The contract is the system of record; this module only validates inputs,
//! issues the read, and parses the returned string into typed DTOs. Reads
//! are idempotent, so there is no retry here — callers re-trigger via
//! refresh.

use std::fmt;

use serde::Deserialize;
use serde_json::{
    Value,
    json,
};

use crate::address::is_hex_address;
use crate::config::AppConfig;
use crate::error::{
    Error,
    Result,
};

pub trait ContractRpc {
    /// Issue one read call and return the contract's raw JSON string.
    fn read(
        &self,
        contract: &str,
        function: &str,
        args: Value,
    ) -> impl Future<Output = Result<String>>;
}

/// Production reader speaking JSON-RPC 2.0 (`gen_call`) to the chain node.
#[derive(Clone)]
pub struct JsonRpcReader {
    http: reqwest::Client,
    rpc_url: String,
}

impl JsonRpcReader {
    pub fn new(config: &AppConfig) -> Result<Self> {
        if config.rpc_url.is_empty() {
            return Err(Error::Configuration("RPC endpoint is not set".to_string()));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("failed to build RPC HTTP client: {e}")))?;
        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
        })
    }
}

impl ContractRpc for JsonRpcReader {
    async fn read(&self, contract: &str, function: &str, args: Value) -> Result<String> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "gen_call",
            "params": {
                "to": contract,
                "function": function,
                "args": args,
            },
        });
        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("RPC request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "RPC node returned HTTP {}",
                response.status()
            )));
        }
        let reply: Value = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("invalid RPC response: {e}")))?;
        if let Some(err) = reply.get("error") {
            let text = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(Error::Transport(format!("RPC error: {text}")));
        }
        match reply.get("result") {
            // JSON-string view functions give a string result; anything
            // else is passed through as its JSON text.
            Some(Value::String(raw)) => Ok(raw.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(Error::MalformedResponse {
                function: function.to_string(),
                reason: "RPC reply carries neither result nor error".to_string(),
            }),
        }
    }
}

/// Closed lifecycle vocabulary. The contract owns status transitions; the
/// client never derives a status itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WagerStatusKind {
    Waiting,
    Active,
    Verified,
    Resolved,
}

impl fmt::Display for WagerStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WagerStatusKind::Waiting => "waiting",
            WagerStatusKind::Active => "active",
            WagerStatusKind::Verified => "verified",
            WagerStatusKind::Resolved => "resolved",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationOutcome {
    pub outcome: String,
    pub confidence: f64,
    pub evidence: String,
    pub validators_used: u64,
    pub is_final: bool,
}

/// Full wager projection from `get_wager_json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Wager {
    pub id: String,
    pub prediction: String,
    pub player_a: String,
    pub player_b: String,
    pub player_a_stance: Option<String>,
    pub player_b_stance: Option<String>,
    pub stake_amount: u64,
    pub deadline: String,
    pub category: String,
    pub verification_criteria: String,
    pub status: WagerStatusKind,
    pub pot: u64,
    pub verification_result: Option<VerificationOutcome>,
    pub created_at: String,
    pub resolved_at: String,
}

impl Wager {
    /// Whether `address` is one of the counterparties. Case-insensitive;
    /// the zero-address placeholder never matches.
    pub fn involves(&self, address: &str) -> bool {
        use crate::address::{
            ZERO_ADDRESS,
            addresses_match,
        };
        if addresses_match(address, ZERO_ADDRESS) {
            return false;
        }
        addresses_match(&self.player_a, address) || addresses_match(&self.player_b, address)
    }

    pub fn has_opponent(&self) -> bool {
        !crate::address::addresses_match(&self.player_b, crate::address::ZERO_ADDRESS)
    }
}

/// Compact projection from `get_status_json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WagerStatus {
    pub status: WagerStatusKind,
    pub player_a: String,
    pub player_b: String,
    pub player_a_stance: Option<String>,
    pub player_b_stance: Option<String>,
    pub pot: u64,
    pub has_verification: bool,
    pub is_final: bool,
    pub outcome: String,
}

impl WagerStatus {
    /// The outcome as shown to players; an undecided wager reads "pending".
    pub fn outcome_label(&self) -> &str {
        if self.outcome.is_empty() {
            "pending"
        } else {
            &self.outcome
        }
    }
}

/// Per-address counters from `get_player_stats_json`. Display-only; never
/// used for authorization. Counters default to zero so one missing field
/// cannot sink a leaderboard row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerStats {
    #[serde(default)]
    pub wagers_created: u64,
    #[serde(default)]
    pub wagers_joined: u64,
    #[serde(default)]
    pub wins: u64,
    #[serde(default)]
    pub losses: u64,
    #[serde(default)]
    pub volume_contributed: u64,
    #[serde(default)]
    pub volume_won: u64,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalStats {
    pub total_wagers_created: u64,
    pub total_wagers_resolved: u64,
    pub total_volume: u64,
}

/// One row of the contract-side ranked leaderboard (`get_leaderboard_json`).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardEntry {
    pub address: String,
    #[serde(default)]
    pub username: String,
    pub wins: u64,
    pub losses: u64,
    pub volume_won: u64,
    pub volume_contributed: u64,
}

pub struct ContractReader<C> {
    rpc: C,
    contract_address: String,
}

impl<C: ContractRpc> ContractReader<C> {
    pub fn new(rpc: C, config: &AppConfig) -> Self {
        Self {
            rpc,
            contract_address: config.contract_address.clone(),
        }
    }

    pub async fn list_wagers(&self, offset: u64, limit: u64) -> Result<Vec<String>> {
        self.read_json("list_wagers_json", json!([offset, limit]))
            .await
    }

    pub async fn get_wager(&self, wager_id: &str) -> Result<Wager> {
        require_id(wager_id)?;
        self.read_json("get_wager_json", json!([wager_id])).await
    }

    pub async fn get_status(&self, wager_id: &str) -> Result<WagerStatus> {
        require_id(wager_id)?;
        self.read_json("get_status_json", json!([wager_id])).await
    }

    pub async fn list_players(&self, offset: u64, limit: u64) -> Result<Vec<String>> {
        self.read_json("list_players_json", json!([offset, limit]))
            .await
    }

    pub async fn get_player_stats(&self, player: &str) -> Result<PlayerStats> {
        if !is_hex_address(player) {
            return Err(Error::Validation(format!(
                "invalid address {player:?}, expected 0x followed by 40 hex chars"
            )));
        }
        self.read_json("get_player_stats_json", json!([player]))
            .await
    }

    pub async fn get_global_stats(&self) -> Result<GlobalStats> {
        self.read_json("get_global_stats_json", json!([])).await
    }

    pub async fn get_leaderboard(&self, offset: u64, limit: u64) -> Result<Vec<LeaderboardEntry>> {
        self.read_json("get_leaderboard_json", json!([offset, limit]))
            .await
    }

    /// The id of the most recently created wager, or an empty string when
    /// no wager exists yet. The contract returns the id itself, not a JSON
    /// document, so it is handed back without parsing.
    pub async fn get_last_wager_id(&self) -> Result<String> {
        self.require_contract()?;
        self.rpc
            .read(&self.contract_address, "get_last_wager_id", json!([]))
            .await
    }

    /// Validate configuration, issue the read, parse the JSON string.
    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        function: &str,
        args: Value,
    ) -> Result<T> {
        self.require_contract()?;
        let raw = self.rpc.read(&self.contract_address, function, args).await?;
        serde_json::from_str(&raw).map_err(|e| Error::MalformedResponse {
            function: function.to_string(),
            reason: e.to_string(),
        })
    }

    fn require_contract(&self) -> Result<()> {
        if self.contract_address.is_empty() {
            return Err(Error::Configuration(
                "contract address is not set".to_string(),
            ));
        }
        Ok(())
    }
}

fn require_id(wager_id: &str) -> Result<()> {
    if wager_id.trim().is_empty() {
        return Err(Error::Validation("wager id is required".to_string()));
    }
    Ok(())
}

//! Client core for peer-to-peer prediction wagers whose authoritative state
//! lives in an external contract. Writes go through a gas-paying relay that
//! verifies a signed, nonce-bound message; reads go straight to the contract's
//! JSON view functions. Nothing here is durable: every view is a possibly
//! stale projection of contract state.

pub mod address;
pub mod config;
pub mod contract;
pub mod error;
pub mod message;
pub mod relay;
pub mod signer;
pub mod view;

pub use address::{
    ZERO_ADDRESS,
    is_hex_address,
};
pub use config::AppConfig;
pub use contract::{
    ContractReader,
    ContractRpc,
    GlobalStats,
    JsonRpcReader,
    LeaderboardEntry,
    PlayerStats,
    Wager,
    WagerStatus,
    WagerStatusKind,
};
pub use error::{
    Error,
    Result,
};
pub use relay::{
    NonceGrant,
    RelayAction,
    RelayClient,
    RelayHttp,
    RelayReply,
    RelayTransport,
};
pub use signer::{
    LocalSigner,
    Signer,
};

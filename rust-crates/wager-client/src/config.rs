pub const DEFAULT_RELAY_URL: &str = "http://localhost:5000";
pub const DEFAULT_RPC_URL: &str = "http://localhost:4000";

/// Endpoints and contract address, resolved once at startup and passed
/// into every component constructor. Core logic never reads the process
/// environment itself.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub relay_url: String,
    pub rpc_url: String,
    pub contract_address: String,
}

impl AppConfig {
    pub fn new(
        relay_url: impl Into<String>,
        rpc_url: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> Self {
        Self {
            relay_url: trim_base_url(relay_url.into()),
            rpc_url: trim_base_url(rpc_url.into()),
            contract_address: contract_address.into(),
        }
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

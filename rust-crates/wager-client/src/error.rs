use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing contract address or RPC endpoint. Fatal to the attempted
    /// operation, never to the process.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed input caught before any network call is made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The relay refused or failed a nonce request. Carries the relay's
    /// structured error text when it sent one.
    #[error("nonce request failed: {0}")]
    NonceRequest(String),

    /// The relay rejected a signed action. The message is the relay's
    /// error text verbatim.
    #[error("relay action failed: {0}")]
    RelayAction(String),

    /// A contract read returned a string that does not parse into the
    /// expected shape.
    #[error("malformed response from {function}: {reason}")]
    MalformedResponse { function: String, reason: String },

    #[error("signing error: {0}")]
    Signing(String),

    /// Socket-level failure before any structured reply was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A second write was attempted while another is still in flight.
    #[error("another action is in flight: {0}")]
    Busy(String),
}

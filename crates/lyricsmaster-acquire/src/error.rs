use thiserror::Error;

/// A page did not have the shape an adapter expects.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("malformed page: {0}")]
    MalformedPage(String),

    #[error("could not download {0}")]
    Unreachable(String),
}

/// The anonymizing transport was requested but cannot be used.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("a Tor control port was given without a password")]
    MissingPassword,

    #[error("invalid proxy address {0}")]
    InvalidProxy(String),

    #[error("Tor control channel {0} refused the connection: {1}")]
    ControlUnreachable(String, std::io::Error),

    #[error("Tor control channel rejected the request: {0}")]
    ControlRejected(String),

    #[error("failed to build the proxied HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors raised while setting up a provider.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("failed to build the HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unknown lyrics provider: {0}")]
    UnknownProvider(String),
}

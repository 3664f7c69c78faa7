use thiserror::Error;

/// Everything that can abort a generation run. None of these are recovered
/// from locally; the caller reports and exits.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad format selector, zero capacity, limbs too narrow for the key, ...
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The padded header does not fit the circuit's fixed input width.
    #[error("padded header needs {required} bytes but capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    /// Key generation, signing or verification failed in the rsa backend.
    #[error("crypto provider error: {0}")]
    CryptoProvider(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rsa::Error> for Error {
    fn from(err: rsa::Error) -> Self {
        Error::CryptoProvider(err.to_string())
    }
}

impl From<rsa::signature::Error> for Error {
    fn from(err: rsa::signature::Error) -> Self {
        Error::CryptoProvider(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

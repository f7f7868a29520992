/// Errors from keyed hashing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("secret key is empty")]
    EmptyKey,

    #[error("secret key rejected by MAC: {0}")]
    InvalidKey(String),
}

use std::fmt;

use crate::error::HasherError;

/// HMAC key material.
///
/// Passed into each commit or verify call and dropped afterwards; never
/// cached by the notary. `Debug` output is redacted so the key cannot leak
/// through logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw key bytes. Empty keys are rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, HasherError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(HasherError::EmptyKey);
        }
        Ok(Self(bytes))
    }

    /// Key from a UTF-8 secret such as an environment variable value.
    pub fn from_text(text: &str) -> Result<Self, HasherError> {
        Self::new(text.as_bytes().to_vec())
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<redacted>)")
    }
}

//! # Signer Adapter
//!
//! Holds one opaque key handle fetched from the key manager and signs with
//! it through the crypto capability. The signing mode is passed per call by
//! the suite; the adapter carries no mode of its own.

use tracing::debug;

use vcs_crypto::{Crypto, CryptoError, KeyHandle, KeyManager, KeyType};

use crate::error::VcError;
use crate::suite::SigningMode;

/// Signs bytes or message lines with a single key.
pub struct SignerAdapter<'a> {
    handle: KeyHandle,
    crypto: &'a dyn Crypto,
}

impl<'a> SignerAdapter<'a> {
    /// Fetch the handle for `kid`. An unknown key is [`VcError::KeyNotFound`].
    pub fn new(keys: &dyn KeyManager, crypto: &'a dyn Crypto, kid: &str) -> Result<Self, VcError> {
        let handle = keys.get_handle(kid).map_err(|e| match e {
            CryptoError::KeyNotFound(kid) => VcError::KeyNotFound(kid),
            other => VcError::Signing {
                step: "fetch key handle",
                source: other,
            },
        })?;
        Ok(Self { handle, crypto })
    }

    /// Family of the bound key.
    pub fn key_type(&self) -> KeyType {
        self.handle.key_type()
    }

    /// Sign `data`. In [`SigningMode::Multi`] the data is N-Quads text and
    /// each non-blank line is signed as one message, in order.
    pub fn sign(&self, data: &[u8], mode: SigningMode) -> Result<Vec<u8>, VcError> {
        match mode {
            SigningMode::Single => self
                .crypto
                .sign_single(data, &self.handle)
                .map_err(VcError::signing("sign")),
            SigningMode::Multi => {
                let messages = text_to_lines(data);
                debug!(kid = self.handle.kid(), messages = messages.len(), "multi-message sign");
                self.crypto
                    .sign_multi(&messages, &self.handle)
                    .map_err(VcError::signing("sign multiple messages"))
            }
        }
    }
}

impl std::fmt::Debug for SignerAdapter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerAdapter")
            .field("handle", &self.handle)
            .finish()
    }
}

/// Split text into lines, dropping blank (whitespace-only) lines. Line
/// order is preserved.
pub fn text_to_lines(data: &[u8]) -> Vec<Vec<u8>> {
    data.split(|b| *b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(<[u8]>::to_vec)
        .collect()
}

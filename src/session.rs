use crate::{
    challenge::Challenge,
    error::{Error, Result},
};
use rand::{thread_rng, Rng};
use std::fmt;

/// Bytes of entropy in a generated client nonce.
const CNONCE_BYTES: usize = 16;

/// Request-count state for one server nonce.
///
/// Values are never mutated in place: [`NonceSession::advance`] returns the
/// successor and the caller replaces the old value with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceSession {
    nonce: String,
    nonce_count: u32,
    cnonce: String,
}

impl NonceSession {
    /// Start a session for `challenge` with `nc=1` and a fresh client nonce.
    pub fn establish(challenge: &Challenge) -> Self {
        Self::with_cnonce(challenge, generate_cnonce())
    }

    /// Start a session with a caller-chosen client nonce.
    pub fn with_cnonce<S: Into<String>>(challenge: &Challenge, cnonce: S) -> Self {
        NonceSession {
            nonce: challenge.nonce.clone(),
            nonce_count: 1,
            cnonce: cnonce.into(),
        }
    }

    /// The session for the next request against the same server nonce.
    pub fn advance(&self) -> Result<Self> {
        let nonce_count = self
            .nonce_count
            .checked_add(1)
            .ok_or(Error::NonceCountExhausted)?;
        Ok(NonceSession {
            nonce: self.nonce.clone(),
            nonce_count,
            cnonce: self.cnonce.clone(),
        })
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn nonce_count(&self) -> u32 {
        self.nonce_count
    }

    pub fn cnonce(&self) -> &str {
        &self.cnonce
    }

    /// `nc` as sent on the wire.
    pub fn nc(&self) -> NonceCount {
        NonceCount(self.nonce_count)
    }
}

/// Eight lowercase hex digits, zero padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceCount(pub u32);

impl fmt::Display for NonceCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

pub fn generate_cnonce() -> String {
    let bytes: [u8; CNONCE_BYTES] = thread_rng().gen();
    hex::encode(bytes)
}

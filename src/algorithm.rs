use crate::error::{Error, Result};
use digest::Digest;
use md5::Md5;
use sha2::{Sha256, Sha512_256};
use std::{fmt, str::FromStr};

/// One-way hash family named by the `algorithm` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Md5,
    Sha256,
    Sha512_256,
}

impl HashFunction {
    fn to_str(self) -> &'static str {
        match self {
            HashFunction::Md5 => "MD5",
            HashFunction::Sha256 => "SHA-256",
            HashFunction::Sha512_256 => "SHA-512-256",
        }
    }
}

/// Negotiated algorithm: a hash family plus the `-sess` flag.
///
/// Selected once when the challenge is parsed; every hash computed for that
/// challenge goes through [`Algorithm::hash_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Algorithm {
    pub hash: HashFunction,
    pub session: bool,
}

impl Algorithm {
    pub const MD5: Algorithm = Algorithm::new(HashFunction::Md5, false);
    pub const MD5_SESS: Algorithm = Algorithm::new(HashFunction::Md5, true);
    pub const SHA256: Algorithm = Algorithm::new(HashFunction::Sha256, false);
    pub const SHA256_SESS: Algorithm = Algorithm::new(HashFunction::Sha256, true);

    pub const fn new(hash: HashFunction, session: bool) -> Self {
        Algorithm { hash, session }
    }

    /// Hash the colon-joined `fields`, rendered as lowercase hex.
    pub fn hash_fields(&self, fields: &[&[u8]]) -> String {
        match self.hash {
            HashFunction::Md5 => hash_joined::<Md5>(fields),
            HashFunction::Sha256 => hash_joined::<Sha256>(fields),
            HashFunction::Sha512_256 => hash_joined::<Sha512_256>(fields),
        }
    }

    pub fn hash(&self, bytes: &[u8]) -> String {
        self.hash_fields(&[bytes])
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::MD5
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        let (name, session) = match lower.strip_suffix("-sess") {
            Some(name) => (name, true),
            None => (lower.as_str(), false),
        };
        let hash = match name {
            "md5" => HashFunction::Md5,
            "sha-256" => HashFunction::Sha256,
            "sha-512-256" => HashFunction::Sha512_256,
            _ => return Err(Error::UnsupportedAlgorithm(s.to_owned())),
        };
        Ok(Algorithm::new(hash, session))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hash.to_str())?;
        if self.session {
            f.write_str("-sess")?;
        }
        Ok(())
    }
}

fn hash_joined<T: Digest>(fields: &[&[u8]]) -> String {
    let mut hasher = T::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            hasher.update(b":");
        }
        hasher.update(field);
    }
    hex::encode(hasher.finalize())
}

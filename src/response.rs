use crate::{
    challenge::{Challenge, Qop},
    error::{Error, Result},
    session::NonceSession,
};
use http::Method;
use std::fmt;

/// Username and password for one protection space.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The parts of a request that enter the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    /// Request-target as sent in the `uri` field, e.g. `/dir/index.html`.
    pub uri: String,
    /// Only hashed when `auth-int` is negotiated.
    pub body: Vec<u8>,
}

impl RequestContext {
    pub fn new<U: Into<String>>(method: Method, uri: U) -> Self {
        RequestContext {
            method,
            uri: uri.into(),
            body: Vec::new(),
        }
    }

    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }
}

/// Result of [`compute`]: the response digest and the qop it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestResponse {
    pub response: String,
    pub qop: Option<Qop>,
}

/// Choose the qop to answer `challenge` with.
///
/// `auth-int` wins only when offered and the request carries a body, unless it
/// is the only token offered. `None` means the legacy RFC 2069 formula.
pub fn select_qop(challenge: &Challenge, request: &RequestContext) -> Result<Option<Qop>> {
    let offered = match &challenge.qop {
        None => return Ok(None),
        Some(offered) => offered,
    };
    let has_auth = offered.contains(&Qop::Auth);
    let has_auth_int = offered.contains(&Qop::AuthInt);
    match (has_auth, has_auth_int) {
        (_, true) if !request.body.is_empty() => Ok(Some(Qop::AuthInt)),
        (true, _) => Ok(Some(Qop::Auth)),
        (false, true) => Ok(Some(Qop::AuthInt)),
        (false, false) => Err(Error::UnsupportedQop(format!(
            "challenge for realm \"{}\" offers neither auth nor auth-int",
            challenge.realm
        ))),
    }
}

/// Compute the `response` digest for one request.
pub fn compute(
    credentials: &Credentials,
    challenge: &Challenge,
    session: &NonceSession,
    request: &RequestContext,
) -> Result<DigestResponse> {
    let qop = select_qop(challenge, request)?;
    let algorithm = challenge.algorithm();
    let nonce = session.nonce().as_bytes();
    let cnonce = session.cnonce().as_bytes();

    let mut ha1 = algorithm.hash_fields(&[
        credentials.username.as_bytes(),
        challenge.realm.as_bytes(),
        credentials.password.as_bytes(),
    ]);
    if algorithm.session {
        ha1 = algorithm.hash_fields(&[ha1.as_bytes(), nonce, cnonce]);
    }

    let method = request.method.as_str().as_bytes();
    let uri = request.uri.as_bytes();
    let ha2 = match qop {
        Some(Qop::AuthInt) => {
            let body_hash = algorithm.hash(&request.body);
            algorithm.hash_fields(&[method, uri, body_hash.as_bytes()])
        }
        _ => algorithm.hash_fields(&[method, uri]),
    };

    let response = match qop {
        Some(q) => {
            let nc = session.nc().to_string();
            algorithm.hash_fields(&[
                ha1.as_bytes(),
                nonce,
                nc.as_bytes(),
                cnonce,
                q.to_str().as_bytes(),
                ha2.as_bytes(),
            ])
        }
        None => algorithm.hash_fields(&[ha1.as_bytes(), nonce, ha2.as_bytes()]),
    };

    Ok(DigestResponse { response, qop })
}

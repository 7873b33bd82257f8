use crate::{
    algorithm::Algorithm,
    challenge::{Challenge, Qop},
    error::Result,
    response::{Credentials, DigestResponse, RequestContext},
    session::{NonceCount, NonceSession},
};
use http::HeaderValue;
use std::fmt;

/// Fields of one `Authorization: Digest ...` header.
///
/// Built fresh for each request and serialized with `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationFields {
    pub username: String,
    pub realm: String,
    pub nonce: String,
    pub uri: String,
    pub response: String,
    /// Only set when the challenge named an algorithm.
    pub algorithm: Option<Algorithm>,
    /// `(qop, nc, cnonce)`, present when a qop was negotiated.
    pub qop: Option<(Qop, NonceCount, String)>,
    pub opaque: Option<String>,
    pub userhash: bool,
}

impl AuthorizationFields {
    pub fn new(
        credentials: &Credentials,
        challenge: &Challenge,
        session: &NonceSession,
        request: &RequestContext,
        digest: DigestResponse,
    ) -> Self {
        let username = if challenge.userhash {
            challenge.algorithm().hash_fields(&[
                credentials.username.as_bytes(),
                challenge.realm.as_bytes(),
            ])
        } else {
            credentials.username.clone()
        };
        AuthorizationFields {
            username,
            realm: challenge.realm.clone(),
            nonce: session.nonce().to_owned(),
            uri: request.uri.clone(),
            response: digest.response,
            algorithm: challenge.algorithm,
            qop: digest
                .qop
                .map(|q| (q, session.nc(), session.cnonce().to_owned())),
            opaque: challenge.opaque.clone(),
            userhash: challenge.userhash,
        }
    }

    pub fn to_header_value(&self) -> Result<HeaderValue> {
        Ok(HeaderValue::from_str(&self.to_string())?)
    }
}

impl fmt::Display for AuthorizationFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\"",
            Quoted(&self.username),
            Quoted(&self.realm),
            Quoted(&self.nonce),
            Quoted(&self.uri)
        )?;
        if let Some((qop, _, _)) = &self.qop {
            write!(f, ", qop={}", qop)?;
        }
        if let Some(algorithm) = &self.algorithm {
            write!(f, ", algorithm={}", algorithm)?;
        }
        if let Some((_, nc, cnonce)) = &self.qop {
            write!(f, ", nc={}, cnonce=\"{}\"", nc, Quoted(cnonce))?;
        }
        write!(f, ", response=\"{}\"", self.response)?;
        if let Some(opaque) = &self.opaque {
            write!(f, ", opaque=\"{}\"", Quoted(opaque))?;
        }
        if self.userhash {
            f.write_str(", userhash=true")?;
        }
        Ok(())
    }
}

/// Build the `Authorization` header value for a computed digest.
pub fn build(
    credentials: &Credentials,
    challenge: &Challenge,
    session: &NonceSession,
    request: &RequestContext,
    digest: DigestResponse,
) -> String {
    AuthorizationFields::new(credentials, challenge, session, request, digest).to_string()
}

/// Quoted-string body with `\` and `"` escaped.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            if ch == '"' || ch == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

use crate::{
    algorithm::Algorithm,
    error::{Error, Result},
};
use http::{header::WWW_AUTHENTICATE, HeaderMap};
use std::{fmt, str::FromStr};

const SCHEME: &str = "Digest";

/// Quality of protection token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qop {
    Auth,
    AuthInt,
}

impl Qop {
    pub fn to_str(self) -> &'static str {
        match self {
            Qop::Auth => "auth",
            Qop::AuthInt => "auth-int",
        }
    }

    fn from_token(token: &str) -> Option<Qop> {
        if token.eq_ignore_ascii_case("auth") {
            Some(Qop::Auth)
        } else if token.eq_ignore_ascii_case("auth-int") {
            Some(Qop::AuthInt)
        } else {
            None
        }
    }
}

impl fmt::Display for Qop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    /// URIs sharing this protection space. `None` when the server sent no `domain`.
    pub domain: Option<Vec<String>>,
    /// Supported qop tokens in server order.
    /// `None` means legacy RFC 2069 mode; `Some(vec![])` means the server only
    /// offered tokens this client cannot use.
    pub qop: Option<Vec<Qop>>,
    /// Algorithm named by the server, if it named one.
    pub algorithm: Option<Algorithm>,
    pub stale: bool,
    pub userhash: bool,
}

impl Challenge {
    /// Parse a header value. The leading `Digest` scheme token is required.
    pub fn parse(header: &str) -> Result<Self> {
        let directives = match strip_scheme(header) {
            Some(rest) => parse_directives(rest)?,
            None => return Err(Error::malformed("scheme is not Digest")),
        };

        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut domain = None;
        let mut qop = None;
        let mut algorithm = None;
        let mut stale = false;
        let mut userhash = false;

        for (key, value) in directives {
            if key.eq_ignore_ascii_case("realm") {
                realm = Some(value);
            } else if key.eq_ignore_ascii_case("nonce") {
                nonce = Some(value);
            } else if key.eq_ignore_ascii_case("opaque") {
                opaque = Some(value);
            } else if key.eq_ignore_ascii_case("domain") {
                domain = Some(value.split_ascii_whitespace().map(str::to_owned).collect());
            } else if key.eq_ignore_ascii_case("qop") {
                qop = Some(parse_qop_list(&value));
            } else if key.eq_ignore_ascii_case("algorithm") {
                algorithm = Some(value.parse::<Algorithm>()?);
            } else if key.eq_ignore_ascii_case("stale") {
                stale = value.eq_ignore_ascii_case("true");
            } else if key.eq_ignore_ascii_case("userhash") {
                userhash = value.eq_ignore_ascii_case("true");
            }
        }

        let realm = realm.ok_or_else(|| Error::malformed("missing realm"))?;
        let nonce = match nonce {
            Some(n) if !n.is_empty() => n,
            _ => return Err(Error::malformed("missing nonce")),
        };

        Ok(Challenge {
            realm,
            nonce,
            opaque,
            domain,
            qop,
            algorithm,
            stale,
            userhash,
        })
    }

    /// Find and parse the Digest challenge in a response's headers.
    ///
    /// A single header value may list several challenges separated by commas,
    /// e.g. `Basic realm="x", Digest realm="r", nonce="n"`. Fails with
    /// [`Error::MissingChallenge`] when no `WWW-Authenticate` header is present
    /// at all.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let mut values = headers.get_all(WWW_AUTHENTICATE).iter().peekable();
        if values.peek().is_none() {
            return Err(Error::MissingChallenge);
        }
        for value in values {
            if let Ok(v) = value.to_str() {
                for challenge in split_challenges(v) {
                    if strip_scheme(challenge).is_some() {
                        return Challenge::parse(challenge);
                    }
                }
            }
        }
        Err(Error::malformed("no Digest challenge among WWW-Authenticate headers"))
    }

    /// The effective algorithm; MD5 when the server named none.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm.unwrap_or_default()
    }
}

impl FromStr for Challenge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Challenge::parse(s)
    }
}

fn strip_scheme(input: &str) -> Option<&str> {
    let input = input.trim_start();
    if !input.is_char_boundary(SCHEME.len()) {
        return None;
    }
    let (scheme, rest) = input.split_at(SCHEME.len());
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return None;
    }
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_ascii_whitespace() => Some(rest),
        _ => None,
    }
}

/// Split one header value into the challenges it lists.
///
/// A comma outside a quoted string ends a challenge when the item after it
/// opens with an auth-scheme token, i.e. a token not followed by `=`.
fn split_challenges(value: &str) -> Vec<&str> {
    let mut bounds = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, ch) in value.char_indices() {
        if quoted {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                quoted = false;
            }
        } else if ch == '"' {
            quoted = true;
        } else if ch == ',' && opens_challenge(&value[i + 1..]) {
            bounds.push((start, i));
            start = i + 1;
        }
    }
    bounds.push((start, value.len()));

    bounds
        .into_iter()
        .map(|(s, e)| value[s..e].trim())
        .filter(|c| !c.is_empty())
        .collect()
}

fn opens_challenge(rest: &str) -> bool {
    let rest = rest.trim_start();
    let token_end = rest
        .find(|c: char| c == '=' || c == ',' || c.is_ascii_whitespace())
        .unwrap_or(rest.len());
    token_end > 0 && !rest[token_end..].trim_start().starts_with('=')
}

fn parse_qop_list(value: &str) -> Vec<Qop> {
    let mut list = Vec::new();
    for token in value.split(|c: char| c == ',' || c.is_ascii_whitespace()) {
        if let Some(qop) = Qop::from_token(token) {
            if !list.contains(&qop) {
                list.push(qop);
            }
        }
    }
    list
}

/// Split a comma-separated `key=value` list into pairs, in order.
///
/// Values may be tokens or quoted strings with backslash escapes; quotes are
/// removed and escapes resolved. Works for both challenge and Authorization
/// directive lists (without the scheme token).
pub fn parse_directives(input: &str) -> Result<Vec<(String, String)>> {
    #[derive(Debug, PartialEq)]
    enum KeyVal {
        PreKey,
        Key,
        PreVal,
        QuoteVal,
        Escaped,
        Val,
        PostVal,
    }

    let mut parsed = Vec::new();
    let mut state = KeyVal::PreKey;
    let mut key = String::new();
    let mut value = String::new();

    for ch in input.chars() {
        match state {
            KeyVal::PreKey | KeyVal::PostVal => {
                if ch == ',' {
                    state = KeyVal::PreKey;
                } else if !ch.is_ascii_whitespace() {
                    if ch == '=' || ch == '"' {
                        return Err(Error::malformed(format!("unexpected '{}'", ch)));
                    }
                    key.push(ch);
                    state = KeyVal::Key;
                }
            }
            KeyVal::Key => {
                if ch == '=' {
                    state = KeyVal::PreVal;
                } else if ch == ',' {
                    return Err(Error::malformed(format!("directive '{}' has no value", key)));
                } else if !ch.is_ascii_whitespace() {
                    key.push(ch);
                }
            }
            KeyVal::PreVal => {
                if ch == '"' {
                    state = KeyVal::QuoteVal;
                } else if ch == ',' {
                    parsed.push((std::mem::take(&mut key), String::new()));
                    state = KeyVal::PreKey;
                } else if !ch.is_ascii_whitespace() {
                    value.push(ch);
                    state = KeyVal::Val;
                }
            }
            KeyVal::QuoteVal => match ch {
                '"' => {
                    parsed.push((std::mem::take(&mut key), std::mem::take(&mut value)));
                    state = KeyVal::PostVal;
                }
                '\\' => state = KeyVal::Escaped,
                _ => value.push(ch),
            },
            KeyVal::Escaped => {
                value.push(ch);
                state = KeyVal::QuoteVal;
            }
            KeyVal::Val => {
                if ch == ',' || ch.is_ascii_whitespace() {
                    parsed.push((std::mem::take(&mut key), std::mem::take(&mut value)));
                    state = if ch == ',' {
                        KeyVal::PreKey
                    } else {
                        KeyVal::PostVal
                    };
                } else {
                    value.push(ch);
                }
            }
        }
    }

    match state {
        KeyVal::PreKey | KeyVal::PostVal => {}
        KeyVal::Val | KeyVal::PreVal => parsed.push((key, value)),
        KeyVal::QuoteVal | KeyVal::Escaped => {
            return Err(Error::malformed("unterminated quoted string"))
        }
        KeyVal::Key => {
            return Err(Error::malformed(format!("directive '{}' has no value", key)))
        }
    }

    Ok(parsed)
}

use crate::{
    authorization::AuthorizationFields,
    challenge::Challenge,
    error::{Error, Result},
    events::{emit, Observer, Stage},
    response::{compute, Credentials, RequestContext},
    session::NonceSession,
    transport::Transport,
};
use http::{
    header::AUTHORIZATION, HeaderMap, HeaderValue, Request, Response, StatusCode, Uri, Version,
};
use std::sync::Arc;

/// What the engine holds between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// No challenge yet; the next request is sent bare to obtain one.
    Unauthenticated,
    /// A challenge was answered; later requests reuse its nonce.
    Authenticated {
        challenge: Challenge,
        session: NonceSession,
    },
}

/// Drives the Digest handshake for one credential pair over a [`Transport`].
///
/// One request is in flight at a time (`execute` takes `&mut self`). Share an
/// engine between tasks only behind a lock, as
/// [`DigestTransport`](crate::DigestTransport) does.
pub struct Engine<T> {
    transport: T,
    credentials: Credentials,
    state: State,
    observer: Option<Arc<dyn Observer>>,
}

/// The caller's request, kept so it can be re-sent with an Authorization header.
struct Outgoing {
    context: RequestContext,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
}

impl Outgoing {
    fn new(request: Request<Vec<u8>>) -> Self {
        let (parts, body) = request.into_parts();
        let target = match parts.uri.path_and_query().map(|p| p.as_str()) {
            Some(p) if !p.is_empty() => p.to_owned(),
            _ => "/".to_owned(),
        };
        Outgoing {
            context: RequestContext::new(parts.method, target).with_body(body),
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
        }
    }

    /// Rebuild the request. Caller headers are kept; only `Authorization` is
    /// inserted or replaced.
    fn to_request(&self, authorization: Option<HeaderValue>) -> Request<Vec<u8>> {
        let mut request = Request::new(self.context.body.clone());
        *request.method_mut() = self.context.method.clone();
        *request.uri_mut() = self.uri.clone();
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers.clone();
        if let Some(value) = authorization {
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        request
    }
}

impl<T: Transport> Engine<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Engine {
            transport,
            credentials,
            state: State::Unauthenticated,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Forget the held challenge; the next request probes again.
    pub fn reset(&mut self) {
        self.state = State::Unauthenticated;
    }

    /// Send `request`, answering a Digest challenge if the server issues one.
    ///
    /// Non-401 responses are returned unchanged. A 401 to an authorized
    /// request is returned as the final response unless it flags the nonce
    /// stale for the same realm, in which case the request is retried exactly
    /// once with a new session.
    pub async fn execute(&mut self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let outgoing = Outgoing::new(request);
        let result = match self.state.clone() {
            State::Authenticated { challenge, session } => {
                self.execute_existing(&outgoing, challenge, session).await
            }
            State::Unauthenticated => self.execute_new(&outgoing).await,
        };
        if let Err(e) = &result {
            self.emit(Stage::Failed, e.to_string());
        }
        result
    }

    async fn execute_new(&mut self, outgoing: &Outgoing) -> Result<Response<Vec<u8>>> {
        self.emit(
            Stage::Probe,
            format!("{} {}", outgoing.context.method, outgoing.context.uri),
        );
        let response = self.send(outgoing.to_request(None)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(self.complete(response));
        }

        let challenge = Challenge::from_headers(response.headers())?;
        self.emit(
            Stage::Challenge,
            format!(
                "realm \"{}\", algorithm {}",
                challenge.realm,
                challenge.algorithm()
            ),
        );
        let session = NonceSession::establish(&challenge);
        self.emit(Stage::Establish, format!("nc={}", session.nc()));

        let response = self.send_authorized(outgoing, &challenge, &session).await?;
        self.state = State::Authenticated {
            challenge: challenge.clone(),
            session,
        };
        self.finish(outgoing, challenge, response).await
    }

    async fn execute_existing(
        &mut self,
        outgoing: &Outgoing,
        challenge: Challenge,
        session: NonceSession,
    ) -> Result<Response<Vec<u8>>> {
        let session = match session.advance() {
            Ok(next) => next,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };
        self.emit(Stage::Advance, format!("nc={}", session.nc()));
        // The count is spent once sent, even if the exchange then fails.
        self.state = State::Authenticated {
            challenge: challenge.clone(),
            session: session.clone(),
        };
        let response = self.send_authorized(outgoing, &challenge, &session).await?;
        self.finish(outgoing, challenge, response).await
    }

    /// Handle the response to an authorized request.
    async fn finish(
        &mut self,
        outgoing: &Outgoing,
        challenge: Challenge,
        response: Response<Vec<u8>>,
    ) -> Result<Response<Vec<u8>>> {
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(self.complete(response));
        }

        let refreshed = match Challenge::from_headers(response.headers()) {
            Ok(next) if next.stale && next.realm == challenge.realm => next,
            _ => {
                self.reset();
                return Ok(self.complete(response));
            }
        };
        self.emit(
            Stage::Stale,
            format!("nonce expired for realm \"{}\"", refreshed.realm),
        );
        // The expired session is dropped whether or not the refresh succeeds.
        self.reset();
        let session = NonceSession::establish(&refreshed);
        self.emit(Stage::Establish, format!("nc={}", session.nc()));

        let response = self.send_authorized(outgoing, &refreshed, &session).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            self.state = State::Authenticated {
                challenge: refreshed,
                session,
            };
        }
        Ok(self.complete(response))
    }

    async fn send_authorized(
        &self,
        outgoing: &Outgoing,
        challenge: &Challenge,
        session: &NonceSession,
    ) -> Result<Response<Vec<u8>>> {
        let digest = compute(&self.credentials, challenge, session, &outgoing.context)?;
        let qop = digest.qop;
        let fields = AuthorizationFields::new(
            &self.credentials,
            challenge,
            session,
            &outgoing.context,
            digest,
        );
        let value = fields.to_header_value()?;
        self.emit(
            Stage::Authorize,
            format!(
                "{} {} qop={} nc={}",
                outgoing.context.method,
                outgoing.context.uri,
                qop.map_or("none", |q| q.to_str()),
                session.nc()
            ),
        );
        self.send(outgoing.to_request(Some(value))).await
    }

    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        self.transport.issue(request).await.map_err(Error::Transport)
    }

    fn complete(&self, response: Response<Vec<u8>>) -> Response<Vec<u8>> {
        self.emit(Stage::Complete, response.status().to_string());
        response
    }

    fn emit(&self, stage: Stage, detail: String) {
        emit(self.observer.as_ref(), stage, detail);
    }
}

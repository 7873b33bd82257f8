use crate::{
    engine::Engine,
    error::{BoxError, Error},
    events::Observer,
    response::Credentials,
};
use async_trait::async_trait;
use http::{Request, Response};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Timeout applied by [`TransportConfig::default`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues one HTTP exchange. Implementations own connection handling,
/// timeouts and cancellation; the engine only sees the result.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn issue(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn issue(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError> {
        (**self).issue(request).await
    }
}

/// Settings for transports built by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// [`Transport`] over a `reqwest::Client`.
#[cfg(feature = "reqwest-transport")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest-transport")]
impl ReqwestTransport {
    /// Client with the [`DEFAULT_TIMEOUT`].
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::from_config(&TransportConfig::default())
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(ReqwestTransport { client })
    }

    /// Use a caller-built client as is, including its timeout policy.
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[cfg(feature = "reqwest-transport")]
#[async_trait]
impl Transport for ReqwestTransport {
    async fn issue(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError> {
        use std::convert::TryFrom;

        let request = reqwest::Request::try_from(request)?;
        let response = self.client.execute(request).await?;

        let mut builder = Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(response.headers().clone());
        }
        let body = response.bytes().await?.to_vec();
        Ok(builder.body(body)?)
    }
}

/// Wraps a [`Transport`] so that Digest challenges are answered transparently.
///
/// The wrapped [`Engine`] sits behind an async mutex: concurrent callers are
/// serialized, so no two requests ever carry the same nonce count.
pub struct DigestTransport<T> {
    engine: Mutex<Engine<T>>,
}

impl<T: Transport> DigestTransport<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        DigestTransport {
            engine: Mutex::new(Engine::new(transport, credentials)),
        }
    }

    pub fn with_observer(
        transport: T,
        credentials: Credentials,
        observer: Arc<dyn Observer>,
    ) -> Self {
        DigestTransport {
            engine: Mutex::new(Engine::new(transport, credentials).with_observer(observer)),
        }
    }

    pub fn into_engine(self) -> Engine<T> {
        self.engine.into_inner()
    }
}

#[async_trait]
impl<T: Transport> Transport for DigestTransport<T> {
    async fn issue(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError> {
        let mut engine = self.engine.lock().await;
        engine.execute(request).await.map_err(|e| match e {
            Error::Transport(inner) => inner,
            other => Box::new(other) as BoxError,
        })
    }
}

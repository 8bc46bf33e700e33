//! Client layer: builds requests, dispatches them through an [`HttpTransport`], and
//! classifies the replies. The operation façades live in [`Sending`] and [`Messages`].

mod http;
mod messages;
mod sending;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Map;
use url::Url;

pub use http::{
    ApiResponse, BoxError, BoxFuture, HttpRequest, HttpResponse, HttpTransport, ResponseMeta,
};
pub use messages::Messages;
pub use sending::Sending;

use crate::domain::{ApiKey, ApiStatus, ValidationError};
use crate::transport::{self, Classified, ClassifyError, SuccessEnvelope};
use http::ReqwestTransport;

/// `User-Agent` sent unless the builder overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("postal-client/", env!("CARGO_PKG_VERSION"));

/// Environment variable read by [`PostalClientBuilder::from_env`] for the base URL.
pub const BASE_URL_ENV: &str = "POSTAL_BASE_URL";
/// Environment variable read by [`PostalClientBuilder::from_env`] for the API key.
pub const API_KEY_ENV: &str = "POSTAL_API_KEY";

const JSON_MEDIA_TYPE: &str = "application/json";
const API_KEY_HEADER_NAME: &str = "x-server-api-key";

/// Called after every exchange that reached the server, before the reply is classified.
///
/// The hook observes only; it cannot change or abort the exchange.
pub type RequestCompletionHook = Arc<dyn Fn(&HttpRequest, &ResponseMeta) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Coarse classification of [`PostalError`].
pub enum ErrorKind {
    /// The request could not be built (bad base URL, header, key or body). A caller bug.
    RequestConstruction,
    /// The transport failed before a reply was read. Possibly transient.
    Transport,
    /// The reply was not a well-formed envelope.
    MalformedResponse,
    /// The envelope reported a non-success status.
    Api,
    /// The envelope succeeded but `data` did not match the expected shape.
    Decode,
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`PostalClient`] and its façades.
pub enum PostalError {
    /// The base URL does not parse or cannot have paths joined onto it.
    #[error("invalid base URL {input:?}: {reason}")]
    InvalidBaseUrl { input: String, reason: String },

    /// An extra header name or value is not valid HTTP.
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },

    /// [`PostalClientBuilder::from_env`] found no value for a required variable.
    #[error("environment variable {name} is not set")]
    MissingEnv { name: &'static str },

    /// The request body could not be encoded as JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The reply was not a well-formed envelope, or an error envelope had no usable
    /// `data.message`.
    #[error("malformed response (HTTP {status}): {reason}")]
    MalformedResponse {
        status: StatusCode,
        reason: String,
        meta: Box<ResponseMeta>,
    },

    /// Postal answered with an envelope whose status is not `success`.
    #[error("{method} {url}: {status} {api_status}: {message}")]
    Api {
        method: Method,
        url: Url,
        status: StatusCode,
        api_status: ApiStatus,
        code: Option<String>,
        message: String,
        meta: Box<ResponseMeta>,
    },

    /// The envelope succeeded but `data` did not fit the target type.
    #[error("failed to decode response data: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        meta: Box<ResponseMeta>,
    },
}

impl PostalError {
    /// Which stage of the exchange failed.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBaseUrl { .. }
            | Self::InvalidHeader { .. }
            | Self::MissingEnv { .. }
            | Self::Serialize(_)
            | Self::Validation(_) => ErrorKind::RequestConstruction,
            Self::Transport(_) => ErrorKind::Transport,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Api { .. } => ErrorKind::Api,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Metadata of the reply when the error happened after the server answered.
    ///
    /// Headers such as `Retry-After` are available here.
    pub fn response_meta(&self) -> Option<&ResponseMeta> {
        match self {
            Self::MalformedResponse { meta, .. }
            | Self::Api { meta, .. }
            | Self::Decode { meta, .. } => Some(meta),
            _ => None,
        }
    }

    /// Only transport failures are worth retrying without inspecting the error.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

#[derive(Clone)]
/// Builder for [`PostalClient`].
///
/// Use this when you need extra headers, a custom user-agent, a timeout, or your own
/// transport.
pub struct PostalClientBuilder {
    base_url: String,
    api_key: String,
    headers: Vec<(String, String)>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn HttpTransport>>,
    on_request_completed: Option<RequestCompletionHook>,
}

impl PostalClientBuilder {
    /// Start from a base URL and server API key with default settings.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            headers: Vec::new(),
            user_agent: None,
            timeout: None,
            http_client: None,
            transport: None,
            on_request_completed: None,
        }
    }

    /// Start from `POSTAL_BASE_URL` and `POSTAL_API_KEY`.
    pub fn from_env() -> Result<Self, PostalError> {
        let base_url =
            std::env::var(BASE_URL_ENV).map_err(|_| PostalError::MissingEnv { name: BASE_URL_ENV })?;
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| PostalError::MissingEnv { name: API_KEY_ENV })?;
        Ok(Self::new(base_url, api_key))
    }

    /// Add a header sent on every request. The API key and user-agent headers always win
    /// over headers added here.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set a timeout on the default `reqwest` client. Ignored when a client or
    /// transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use an already configured `reqwest` client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use a custom transport. Takes precedence over [`Self::http_client`].
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Observe every exchange that reached the server. See [`RequestCompletionHook`].
    pub fn on_request_completed(
        mut self,
        hook: impl Fn(&HttpRequest, &ResponseMeta) + Send + Sync + 'static,
    ) -> Self {
        self.on_request_completed = Some(Arc::new(hook));
        self
    }

    /// Build a [`PostalClient`].
    pub fn build(self) -> Result<PostalClient, PostalError> {
        let base_url = parse_base_url(&self.base_url)?;
        let api_key = ApiKey::new(self.api_key)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| PostalError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| PostalError::InvalidHeader { name: name.clone() })?;
            headers.append(header_name, header_value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        let user_agent =
            HeaderValue::from_str(&user_agent).map_err(|_| PostalError::InvalidHeader {
                name: USER_AGENT.to_string(),
            })?;

        let http: Arc<dyn HttpTransport> = match (self.transport, self.http_client) {
            (Some(transport), _) => transport,
            (None, Some(client)) => Arc::new(ReqwestTransport { client }),
            (None, None) => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                let client = builder
                    .build()
                    .map_err(|err| PostalError::Transport(Box::new(err)))?;
                Arc::new(ReqwestTransport { client })
            }
        };

        Ok(PostalClient {
            api_key_header: api_key_header(&api_key)?,
            base_url,
            api_key,
            user_agent,
            headers,
            on_request_completed: self.on_request_completed,
            http,
        })
    }
}

#[derive(Clone)]
/// High-level Postal API client.
///
/// Holds the base URL, API key and transport. Operations are grouped into
/// [`PostalClient::sending`] and [`PostalClient::messages`]; the lower-level
/// [`PostalClient::build_request`] and [`PostalClient::execute`] reach any endpoint.
pub struct PostalClient {
    base_url: Url,
    api_key: ApiKey,
    api_key_header: HeaderValue,
    user_agent: HeaderValue,
    headers: HeaderMap,
    on_request_completed: Option<RequestCompletionHook>,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for PostalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostalClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl PostalClient {
    /// Create a client with the default transport.
    ///
    /// For more customization, use [`PostalClient::builder`].
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, PostalError> {
        PostalClientBuilder::new(base_url, api_key).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(base_url: impl Into<String>, api_key: impl Into<String>) -> PostalClientBuilder {
        PostalClientBuilder::new(base_url, api_key)
    }

    /// Send structured and raw messages.
    pub fn sending(&self) -> Sending<'_> {
        Sending::new(self)
    }

    /// Look up messages and their delivery attempts.
    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self)
    }

    /// Base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Server API key sent as `X-Server-API-Key`.
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Replace the base URL. The client is left unchanged when it does not parse.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), PostalError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(())
    }

    /// Replace the API key. The client is left unchanged when the key is invalid.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), PostalError> {
        let api_key = ApiKey::new(api_key)?;
        self.api_key_header = api_key_header(&api_key)?;
        self.api_key = api_key;
        Ok(())
    }

    /// Replace the completion hook.
    pub fn set_on_request_completed(
        &mut self,
        hook: impl Fn(&HttpRequest, &ResponseMeta) + Send + Sync + 'static,
    ) {
        self.on_request_completed = Some(Arc::new(hook));
    }

    /// Build a request for `path`, resolved relative to the base URL.
    ///
    /// For methods other than GET, HEAD and OPTIONS, `body` is JSON encoded and
    /// `Content-Type: application/json` is set. The API key and user-agent headers are
    /// applied last.
    pub fn build_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, PostalError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;

        let mut headers = HeaderMap::new();
        let body = match body {
            Some(body) if !is_bodyless(&method) => {
                let encoded = serde_json::to_vec(body).map_err(PostalError::Serialize)?;
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
                Some(encoded)
            }
            _ => None,
        };

        for (name, value) in &self.headers {
            headers.append(name.clone(), value.clone());
        }
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER_NAME),
            self.api_key_header.clone(),
        );
        headers.insert(USER_AGENT, self.user_agent.clone());

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Dispatch `request` and decode the envelope's `data` into `T`.
    ///
    /// Errors:
    /// - [`PostalError::Transport`] when the transport fails,
    /// - [`PostalError::MalformedResponse`] when the body is not a valid envelope,
    /// - [`PostalError::Api`] when the envelope status is not `success`, whatever the
    ///   HTTP status,
    /// - [`PostalError::Decode`] when `data` does not match `T`, or when the reply is
    ///   `204 No Content` or has an empty body, since there is nothing to decode. Use
    ///   [`PostalClient::execute_empty`] for endpoints that answer without a payload.
    ///
    /// Every error raised after the server answered carries the reply's
    /// [`ResponseMeta`], see [`PostalError::response_meta`].
    pub async fn execute<T>(&self, request: HttpRequest) -> Result<ApiResponse<T>, PostalError>
    where
        T: DeserializeOwned,
    {
        let (meta, envelope) = self.dispatch(&request).await?;

        let envelope = match envelope {
            Some(envelope) if meta.status != StatusCode::NO_CONTENT => envelope,
            _ => {
                return Err(PostalError::Decode {
                    source: serde_json::Error::custom("response has no payload"),
                    meta: Box::new(meta),
                });
            }
        };

        match envelope.decode_data() {
            Ok(data) => Ok(ApiResponse { data, meta }),
            Err(err) => {
                tracing::debug!(url = %request.url, error = %err, "response data did not match target");
                Err(PostalError::Decode {
                    source: err,
                    meta: Box::new(meta),
                })
            }
        }
    }

    /// Dispatch `request` when no payload is expected. Empty bodies are success.
    pub async fn execute_empty(&self, request: HttpRequest) -> Result<ResponseMeta, PostalError> {
        let (meta, _) = self.dispatch(&request).await?;
        Ok(meta)
    }

    fn resolve(&self, path: &str) -> Result<Url, PostalError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| PostalError::InvalidBaseUrl {
                input: self.base_url.to_string(),
                reason: err.to_string(),
            })
    }

    async fn dispatch(
        &self,
        request: &HttpRequest,
    ) -> Result<(ResponseMeta, Option<SuccessEnvelope>), PostalError> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

        let started = Instant::now();
        let response = self.http.execute(request).await.map_err(|err| {
            tracing::debug!(method = %request.method, url = %request.url, error = %err, "transport failed");
            PostalError::Transport(err)
        })?;
        let HttpResponse {
            status,
            headers,
            body,
        } = response;

        let mut meta = ResponseMeta {
            status,
            headers,
            elapsed: started.elapsed(),
            api_time: None,
            flags: Map::new(),
        };
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            elapsed_ms = meta.elapsed.as_millis() as u64,
            "request completed"
        );

        if let Some(hook) = &self.on_request_completed {
            hook(request, &meta);
        }

        match transport::classify(&body) {
            Ok(Classified::Empty) => Ok((meta, None)),
            Ok(Classified::Success(envelope)) => {
                meta.api_time = envelope.time();
                meta.flags = envelope.flags().clone();
                Ok((meta, Some(envelope)))
            }
            Err(ClassifyError::Malformed(reason)) => {
                tracing::warn!(url = %request.url, status = status.as_u16(), %reason, "malformed response");
                Err(PostalError::MalformedResponse {
                    status,
                    reason,
                    meta: Box::new(meta),
                })
            }
            Err(ClassifyError::Rejected {
                status: api_status,
                code,
                message,
            }) => {
                tracing::warn!(
                    url = %request.url,
                    status = status.as_u16(),
                    api_status = %api_status,
                    %message,
                    "API returned an error"
                );
                Err(PostalError::Api {
                    method: request.method.clone(),
                    url: request.url.clone(),
                    status,
                    api_status,
                    code,
                    message,
                    meta: Box::new(meta),
                })
            }
        }
    }
}

fn is_bodyless(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

fn api_key_header(api_key: &ApiKey) -> Result<HeaderValue, PostalError> {
    let mut value =
        HeaderValue::from_str(api_key.as_str()).map_err(|_| PostalError::InvalidHeader {
            name: ApiKey::HEADER.to_owned(),
        })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Parse a base URL and make sure its path ends in `/`, so relative paths append to it.
fn parse_base_url(input: &str) -> Result<Url, PostalError> {
    let invalid = |reason: String| PostalError::InvalidBaseUrl {
        input: input.to_owned(),
        reason,
    };

    let mut url = Url::parse(input.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

//! Single-shot HTTP probe used by every monitoring target.
use std::{collections::BTreeMap, time::Duration};

use reqwest::{Client, Method, Url, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;

/// Default request timeout applied by [`HttpProbe::new`].
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters attached to a request. Ordered so that URLs are deterministic.
pub type QueryParams = BTreeMap<String, String>;

/// Everything needed to issue one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Absolute URL, without query string.
    pub endpoint: String,
    /// Query parameters appended to the endpoint.
    pub query_params: QueryParams,
    /// Raw request body. Empty means no body is sent.
    pub body: Vec<u8>,
    /// HTTP method name, e.g. `GET`.
    pub method: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            query_params: QueryParams::new(),
            body: Vec::new(),
            method: Method::GET.to_string(),
        }
    }
}

impl HttpOptions {
    /// `GET` request to `endpoint`.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), ..Default::default() }
    }

    /// `POST` request to `endpoint` with a JSON body.
    pub fn post_json(endpoint: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            endpoint: endpoint.into(),
            body: body.into(),
            method: Method::POST.to_string(),
            ..Default::default()
        }
    }

    /// Returns a copy with `suffix` appended to the endpoint.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut opts = self.clone();
        opts.endpoint.push_str(suffix);
        opts
    }

    /// Returns a copy with an extra query parameter.
    pub fn with_query(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut opts = self.clone();
        opts.query_params.insert(key.into(), value.into());
        opts
    }
}

/// Raw outcome of a successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResp {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded response body.
    pub body: Vec<u8>,
}

/// Failure modes of a probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// DNS, connection or timeout failure.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        /// Target endpoint.
        endpoint: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status. The body is kept so callers can still
    /// inspect it.
    #[error("http status {status} from {endpoint}")]
    Http {
        /// Target endpoint.
        endpoint: String,
        /// Status code.
        status: u16,
        /// Response body.
        body: Vec<u8>,
    },
    /// The options could not be turned into a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProbeError {
    /// Whether the error came from the transport layer.
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Status code for [`ProbeError::Http`].
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Issues HTTP requests described by [`HttpOptions`] with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http: Client,
}

impl HttpProbe {
    /// Create a probe with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::InvalidRequest(format!("building http client: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an existing reqwest client.
    pub const fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Perform the request. No retries happen here.
    pub async fn probe(&self, opts: &HttpOptions) -> Result<PingResp, ProbeError> {
        let method = Method::from_bytes(opts.method.to_uppercase().as_bytes())
            .map_err(|_| ProbeError::InvalidRequest(format!("unknown method {}", opts.method)))?;
        let url = Url::parse(&opts.endpoint)
            .map_err(|e| ProbeError::InvalidRequest(format!("endpoint {}: {e}", opts.endpoint)))?;

        let mut req = self.http.request(method, url);
        if !opts.query_params.is_empty() {
            req = req.query(&opts.query_params);
        }
        if !opts.body.is_empty() {
            req = req.header(CONTENT_TYPE, "application/json").body(opts.body.clone());
        }

        let network =
            |source: reqwest::Error| ProbeError::Network { endpoint: opts.endpoint.clone(), source };

        let resp = req.send().await.map_err(network)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(network)?.to_vec();

        debug!(endpoint = %opts.endpoint, status = status.as_u16(), bytes = body.len(), "probe finished");

        if !status.is_success() {
            return Err(ProbeError::Http {
                endpoint: opts.endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(PingResp { status: status.as_u16(), body })
    }
}

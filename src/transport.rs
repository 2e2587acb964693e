//! Transport seam between the pager and the API
//!
//! The pager and the facade only talk to [`Transport`]. [`HttpTransport`] is
//! the production implementation over [`HttpClient`]; tests substitute
//! scripted transports.

use crate::decode::{JsonDecoder, PageInfo, RecordDecoder};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::http::{response_metadata, HttpClient, HttpClientConfig};
use crate::types::{FeedKind, JsonValue, QueryOptions, Shot, TransportMetadata};
use async_trait::async_trait;
use tracing::debug;

/// Outcome of one request: a result plus whatever the exchange revealed
#[derive(Debug)]
pub struct Fetched<T> {
    /// Decoded value or error
    pub result: Result<T>,
    /// Status/headers of the response, when one was received
    pub metadata: Option<TransportMetadata>,
}

impl<T> Fetched<T> {
    /// Successful outcome
    pub fn ok(value: T, metadata: Option<TransportMetadata>) -> Self {
        Self {
            result: Ok(value),
            metadata,
        }
    }

    /// Failed outcome
    pub fn err(error: Error, metadata: Option<TransportMetadata>) -> Self {
        Self {
            result: Err(error),
            metadata,
        }
    }
}

/// Parameters for fetching one page of a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Feed to read
    pub kind: FeedKind,
    /// Player the feed is scoped to
    pub player: Option<String>,
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Additional query options passed through untouched
    pub extra: QueryOptions,
}

impl PageRequest {
    /// Create a request for one page
    pub fn new(kind: FeedKind, player: Option<String>, page: u32, per_page: u32) -> Self {
        Self {
            kind,
            player,
            page,
            per_page,
            extra: QueryOptions::new(),
        }
    }

    /// Query string for this page: extra options, then `page`/`per_page`
    pub fn query(&self) -> QueryOptions {
        let mut query = self.extra.clone();
        query.insert("page".to_string(), self.page.to_string());
        query.insert("per_page".to_string(), self.per_page.to_string());
        query
    }
}

/// Fetch capability consumed by the pager and the facade
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch one page of shots, in the order the server returned them
    async fn fetch_page(&self, request: &PageRequest) -> Fetched<Vec<Shot>>;

    /// Fetch any endpoint and return its decoded body
    async fn fetch_json(&self, endpoint: &Endpoint, options: &QueryOptions) -> Fetched<JsonValue>;
}

/// [`Transport`] backed by the HTTP client
#[derive(Debug)]
pub struct HttpTransport {
    client: HttpClient,
    decoder: JsonDecoder,
}

impl HttpTransport {
    /// Create a transport with the default client configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a transport with a custom client configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Ok(Self::with_client(HttpClient::with_config(config)?))
    }

    /// Wrap an existing client
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            decoder: JsonDecoder::shots(),
        }
    }

    /// Get the underlying client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn base_url(&self) -> &str {
        self.client
            .config()
            .base_url
            .as_deref()
            .unwrap_or(crate::http::DEFAULT_BASE_URL)
    }

    /// Issue a GET and decode the body as JSON, keeping response metadata
    async fn get(&self, endpoint: &Endpoint, query: &QueryOptions) -> Fetched<JsonValue> {
        let url = match endpoint.url(self.base_url()) {
            Ok(url) => url,
            Err(e) => return Fetched::err(e, None),
        };

        let response = match self.client.get(url.as_str(), query).await {
            Ok(response) => response,
            Err(e) => {
                let metadata = e
                    .status()
                    .map(|status| TransportMetadata::new(url.as_str(), status));
                return Fetched::err(e, metadata);
            }
        };

        let metadata = response_metadata(&response);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Fetched::err(Error::Http(e), Some(metadata)),
        };

        match self.decoder.decode_raw(&body) {
            Ok(value) => Fetched::ok(value, Some(metadata)),
            Err(e) => Fetched::err(e, Some(metadata)),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_page(&self, request: &PageRequest) -> Fetched<Vec<Shot>> {
        let endpoint = match Endpoint::for_feed(request.kind, request.player.as_deref()) {
            Ok(endpoint) => endpoint,
            Err(e) => return Fetched::err(e, None),
        };

        let Fetched { result, metadata } = self.get(&endpoint, &request.query()).await;
        let result = result.and_then(|body| {
            let info = PageInfo::from_body(&body);
            let shots = self.decoder.extract_records(&body)?;
            debug!(
                feed = %request.kind,
                page = request.page,
                shots = shots.len(),
                last_page = info.is_last_page(),
                "Decoded page"
            );
            Ok(shots)
        });

        Fetched { result, metadata }
    }

    async fn fetch_json(&self, endpoint: &Endpoint, options: &QueryOptions) -> Fetched<JsonValue> {
        self.get(endpoint, options).await
    }
}

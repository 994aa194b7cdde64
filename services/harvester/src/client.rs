//! Imagery API client.
//!
//! The harvester talks to the vendor through [`ImageryClient`], which splits a
//! fetch into a metadata lookup and an image download. [`StreetViewClient`]
//! implements it against the Street View Static API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, Response, StatusCode, Url};
use serde::Deserialize;
use streetview_common::{GridPoint, Heading};
use tracing::{debug, instrument};

use crate::config::ImageryConfig;
use crate::error::{FetchError, FetchResult};

/// Longest API error body echoed into an error message.
const MAX_ERROR_BODY: usize = 200;

/// One (point, heading) combination to fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRequest {
    pub point: GridPoint,
    pub heading: Heading,
}

/// Metadata endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanoMetadata {
    pub status: String,
    #[serde(default)]
    pub pano_id: Option<String>,
    /// Capture month, e.g. `2019-06`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<PanoLocation>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Snapped panorama position reported by the API.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PanoLocation {
    pub lat: f64,
    pub lng: f64,
}

impl PanoMetadata {
    /// Whether imagery exists, or the error the status stands for.
    pub fn availability(&self) -> FetchResult<bool> {
        match self.status.as_str() {
            "OK" => Ok(true),
            "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
            "OVER_QUERY_LIMIT" => Err(FetchError::RateLimited { retry_after: None }),
            other => Err(FetchError::Api {
                status: other.to_string(),
                message: self.error_message.clone().unwrap_or_default(),
            }),
        }
    }
}

/// Result of a metadata lookup. `link` is `None` when no imagery exists.
#[derive(Debug, Clone)]
pub struct ImageLookup {
    pub metadata: PanoMetadata,
    pub link: Option<String>,
}

/// Trait for imagery sources that can look up and fetch images.
#[async_trait]
pub trait ImageryClient: Send + Sync {
    /// Look up panorama metadata and the image link for a request.
    async fn lookup(&self, request: &ImageRequest) -> FetchResult<ImageLookup>;

    /// Download the image behind a link returned by `lookup`.
    async fn download(&self, link: &str) -> FetchResult<Bytes>;
}

/// Street View Static API client.
pub struct StreetViewClient {
    client: Client,
    image_url: Url,
    metadata_url: Url,
    size: String,
    pitch: i32,
    source: String,
    api_key: String,
}

impl StreetViewClient {
    pub fn new(config: &ImageryConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        let base = config.endpoint.trim_end_matches('/');
        let image_url = Url::parse(base)
            .with_context(|| format!("Invalid imagery endpoint: {}", config.endpoint))?;
        let metadata_url = Url::parse(&format!("{}/metadata", base))
            .with_context(|| format!("Invalid imagery endpoint: {}", config.endpoint))?;

        Ok(Self {
            client,
            image_url,
            metadata_url,
            size: config.size.clone(),
            pitch: config.pitch,
            source: config.source.clone(),
            api_key,
        })
    }

    fn query(&self, request: &ImageRequest) -> Vec<(&'static str, String)> {
        vec![
            ("size", self.size.clone()),
            ("location", request.point.to_query_value()),
            ("heading", request.heading.degrees().to_string()),
            ("pitch", self.pitch.to_string()),
            ("source", self.source.clone()),
            ("key", self.api_key.clone()),
        ]
    }

    /// Image URL for a request, carrying the same parameters as the lookup.
    pub fn image_link(&self, request: &ImageRequest) -> String {
        let mut url = self.image_url.clone();
        url.query_pairs_mut().extend_pairs(self.query(request));
        url.to_string()
    }
}

#[async_trait]
impl ImageryClient for StreetViewClient {
    #[instrument(skip(self, request), fields(lat = request.point.lat, lon = request.point.lon, heading = %request.heading))]
    async fn lookup(&self, request: &ImageRequest) -> FetchResult<ImageLookup> {
        let response = self
            .client
            .get(self.metadata_url.clone())
            .query(&self.query(request))
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        let metadata: PanoMetadata = serde_json::from_str(&body)?;
        debug!(status = %metadata.status, pano_id = ?metadata.pano_id, "Metadata received");

        let link = if metadata.availability()? {
            Some(self.image_link(request))
        } else {
            None
        };

        Ok(ImageLookup { metadata, link })
    }

    async fn download(&self, link: &str) -> FetchResult<Bytes> {
        let response = self.client.get(link).send().await?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(FetchError::Decode("empty image body".to_string()));
        }
        Ok(bytes)
    }
}

/// Map throttling and non-success statuses to errors.
async fn check_status(response: Response) -> FetchResult<Response> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited {
            retry_after: retry_after(response.headers()),
        });
    }
    if !status.is_success() {
        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|&i| message.is_char_boundary(i))
                .unwrap_or(0);
            message.truncate(cut);
        }
        return Err(FetchError::Api {
            status: status.as_u16().to_string(),
            message,
        });
    }
    Ok(response)
}

/// Parse a `Retry-After` header given in seconds.
fn retry_after(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use streetview_common::Coordinate;
    use test_utils::metadata;

    fn parse(body: &str) -> PanoMetadata {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_availability_ok() {
        let m = parse(metadata::OK);
        assert!(m.availability().unwrap());
        assert_eq!(m.pano_id.as_deref(), Some("CAoSLEFGMVFpcE1_abc-DEF"));
        assert_eq!(m.date.as_deref(), Some("2019-06"));
        assert!(m.location.is_some());
    }

    #[test]
    fn test_availability_no_imagery() {
        assert!(!parse(metadata::ZERO_RESULTS).availability().unwrap());
        assert!(!parse(metadata::NOT_FOUND).availability().unwrap());
    }

    #[test]
    fn test_availability_errors() {
        let throttled = parse(metadata::OVER_QUERY_LIMIT).availability().unwrap_err();
        assert_eq!(throttled.kind(), "rate_limited");

        match parse(metadata::REQUEST_DENIED).availability().unwrap_err() {
            FetchError::Api { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_metadata() {
        let err: FetchError = serde_json::from_str::<PanoMetadata>(metadata::MALFORMED)
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_image_link_parameters() {
        let client = StreetViewClient::new(&ImageryConfig::default(), "secret".to_string()).unwrap();
        let link = client.image_link(&ImageRequest {
            point: Coordinate::new(37.75, -122.4),
            heading: Heading::West,
        });
        let url = Url::parse(&link).unwrap();

        assert_eq!(url.path(), "/maps/api/streetview");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("size"), Some("640x640"));
        assert_eq!(get("location"), Some("37.75,-122.4"));
        assert_eq!(get("heading"), Some("270"));
        assert_eq!(get("pitch"), Some("0"));
        assert_eq!(get("source"), Some("outdoor"));
        assert_eq!(get("key"), Some("secret"));
    }

    #[test]
    fn test_metadata_url_trailing_slash() {
        let config = ImageryConfig {
            endpoint: "http://localhost:8080/streetview/".to_string(),
            ..ImageryConfig::default()
        };
        let client = StreetViewClient::new(&config, "k".to_string()).unwrap();
        assert_eq!(client.metadata_url.path(), "/streetview/metadata");
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ImageryConfig {
            endpoint: "not a url".to_string(),
            ..ImageryConfig::default()
        };
        assert!(StreetViewClient::new(&config, "k".to_string()).is_err());
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(
            header::RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::event::{AccessKey, PageResult};
use crate::pagination::{PageBody, PageRequest};
use crate::photo::{normalize_all, RawPhoto, SearchResponse};
use crate::FetchError;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_RESPONSE_BODY_SIZE: usize = 16 * 1024 * 1024;

const LISTING_PATH: &str = "photos";
const SEARCH_PATH: &str = "search/photos";

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        Self::validate(&url)?;

        let parsed = Url::parse(&url).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate_url(&url),
            reason: e.to_string(),
        })?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl {
                url: Self::truncate_url(&url),
                reason: "missing host".to_string(),
            })?
            .to_lowercase();

        Ok(Self {
            url: parsed.to_string(),
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn validate(url: &str) -> Result<(), HttpError> {
        if url.trim().is_empty() {
            return Err(HttpError::InvalidUrl {
                url: url.to_string(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        if parsed.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "URL must have a host".to_string(),
            });
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        Ok(())
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

/// Which upstream endpoint serves a committed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    /// Default editorial listing, used for the empty query.
    Listing,
    Search,
}

impl Endpoint {
    pub fn for_query(query: &str) -> Self {
        if query.is_empty() {
            Self::Listing
        } else {
            Self::Search
        }
    }

    fn path(self) -> &'static str {
        match self {
            Self::Listing => LISTING_PATH,
            Self::Search => SEARCH_PATH,
        }
    }
}

/// Builds page URLs against the photo API and decodes its responses.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoApi {
    base: ValidatedUrl,
    access_key: AccessKey,
}

impl PhotoApi {
    pub fn new(base: ValidatedUrl, access_key: AccessKey) -> Self {
        Self { base, access_key }
    }

    pub fn base(&self) -> &ValidatedUrl {
        &self.base
    }

    pub fn page_url(&self, request: &PageRequest) -> Result<Url, HttpError> {
        let endpoint = Endpoint::for_query(&request.query);

        let mut base = self.base.as_str().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let mut url = Url::parse(&base)
            .and_then(|base| base.join(endpoint.path()))
            .map_err(|e| HttpError::InvalidUrl {
                url: ValidatedUrl::truncate_url(&base),
                reason: e.to_string(),
            })?;

        {
            let mut pairs = url.query_pairs_mut();
            if endpoint == Endpoint::Search {
                pairs.append_pair("query", &request.query);
            }
            pairs
                .append_pair("page", &request.page.to_string())
                .append_pair("per_page", &request.per_page.to_string())
                .append_pair("client_id", self.access_key.expose());
        }

        if url.as_str().len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: ValidatedUrl::truncate_url(url.as_str()),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        Ok(url)
    }
}

/// Turns the shell's answer to a page request into records, folding every
/// failure mode into a [`FetchError`].
///
/// Non-success statuses arrive as `HttpError::Http`, carrying status and body.
pub fn decode_page(endpoint: Endpoint, result: PageResult) -> Result<PageBody, FetchError> {
    let mut response = result.map_err(|e| match e {
        crux_http::HttpError::Http { code, body, .. } => {
            FetchError::from_http_status(u16::from(code), body.as_deref())
        }
        other => FetchError::Transport {
            message: other.to_string(),
        },
    })?;

    let body = response.take_body().unwrap_or_default();
    decode_body(endpoint, &body)
}

pub fn decode_body(endpoint: Endpoint, body: &[u8]) -> Result<PageBody, FetchError> {
    if body.len() > MAX_RESPONSE_BODY_SIZE {
        return Err(FetchError::Malformed {
            reason: format!(
                "response body of {} bytes exceeds maximum of {MAX_RESPONSE_BODY_SIZE} bytes",
                body.len()
            ),
        });
    }

    let malformed = |e: serde_json::Error| FetchError::Malformed {
        reason: e.to_string(),
    };

    match endpoint {
        Endpoint::Listing => {
            let photos: Vec<RawPhoto> = serde_json::from_slice(body).map_err(malformed)?;
            Ok(PageBody {
                records: normalize_all(photos),
                total_pages: None,
            })
        }
        Endpoint::Search => {
            let response: SearchResponse = serde_json::from_slice(body).map_err(malformed)?;
            Ok(PageBody {
                records: normalize_all(response.results),
                total_pages: response.total_pages,
            })
        }
    }
}

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod debounce;
pub mod event;
pub mod model;
pub mod pagination;
pub mod photo;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, GalleryConfig};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::{AccessKey, Event, PhotoId};
pub use model::{Model, ViewModel};
pub use pagination::{DuplicatePolicy, HasMorePolicy, PageRequest};
pub use photo::ImageRecord;

pub const DEFAULT_API_BASE_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_PAGE_SIZE: u32 = 15;
pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;
const MAX_ERROR_MESSAGE_LENGTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Transport,
    Status,
    Malformed,
}

/// Why a page could not be fetched. Every variant renders as
/// "fetch failed: ..." so the shell can show it verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    #[error("fetch failed: {message}")]
    Transport { message: String },

    #[error("fetch failed: HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("fetch failed: malformed response: {reason}")]
    Malformed { reason: String },

    #[error("fetch failed: invalid request: {reason}")]
    InvalidRequest { reason: String },
}

/// Error body the photo API sends with non-success statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

impl FetchError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::InvalidRequest { .. } => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Status,
            Self::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .filter(|e| !e.errors.is_empty())
            .map(|e| e.errors.join("; "))
            .unwrap_or_else(|| default_status_message(status).to_string());

        Self::Status {
            status,
            message: truncate(message),
        }
    }
}

fn default_status_message(status: u16) -> &'static str {
    match status {
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        429 => "too many requests",
        500..=599 => "server error",
        _ => "unexpected status",
    }
}

fn truncate(mut message: String) -> String {
    if message.len() > MAX_ERROR_MESSAGE_LENGTH {
        let cut = (0..=MAX_ERROR_MESSAGE_LENGTH)
            .rev()
            .find(|i| message.is_char_boundary(*i))
            .unwrap_or(0);
        message.truncate(cut);
        message.push_str("...");
    }
    message
}

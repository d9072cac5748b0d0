use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::capabilities::{TimerId, TimerOutput};
use crate::config::GalleryConfig;
use crate::pagination::PageRequest;

// --- Access key: redacts Debug and Serialize, zeroized on drop by `secrecy` ---

#[derive(Clone, Default)]
pub struct AccessKey(Option<Arc<SecretString>>);

impl AccessKey {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        if key.is_empty() {
            return Self(None);
        }
        Self(Some(Arc::new(SecretString::new(key))))
    }

    pub fn expose(&self) -> &str {
        match &self.0 {
            Some(secret) => secret.expose_secret().as_str(),
            None => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for AccessKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Serialize for AccessKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for AccessKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(PhotoId);

pub type PageResult = crux_http::Result<crux_http::Response<Vec<u8>>>;

// --- Event enum: shell-facing variants first, capability responses boxed and skipped ---

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    /// Installs configuration and loads the first page of the committed query.
    Configure(Box<GalleryConfig>),
    /// One keystroke worth of raw search text.
    QueryChanged {
        text: String,
    },
    LoadMore,

    #[serde(skip)]
    DebounceTimer {
        ticket: TimerId,
        outcome: TimerOutput,
    },
    #[serde(skip)]
    PageFetched {
        request: PageRequest,
        result: Box<PageResult>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::QueryChanged { .. } => "query_changed",
            Self::LoadMore => "load_more",
            Self::DebounceTimer { .. } => "debounce_timer",
            Self::PageFetched { .. } => "page_fetched",
        }
    }
}

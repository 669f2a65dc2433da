//! Error and outcome types shared by the loader layers

use thiserror::Error;

/// Failure to retrieve raw text from a content source
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{path}: HTTP status {status}")]
    Status { path: String, status: u16 },

    #[error("{path}: request failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: not found")]
    NotFound { path: String },
}

/// Why a load came back absent or degraded
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid frontmatter format")]
    InvalidFormat,

    #[error("malformed YAML: {0}")]
    Deserialize(String),

    #[error("{failed} of {total} documents failed to load")]
    PartialCollection { failed: usize, total: usize },
}

/// Why a usable value was degraded. Cached alongside the value, so a cache
/// hit reports the same outcome as the load that filled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    MalformedYaml(String),
    PartialCollection { failed: usize, total: usize },
}

impl From<Degradation> for LoadError {
    fn from(degradation: Degradation) -> Self {
        match degradation {
            Degradation::MalformedYaml(message) => LoadError::Deserialize(message),
            Degradation::PartialCollection { failed, total } => {
                LoadError::PartialCollection { failed, total }
            }
        }
    }
}

/// Result of a load, tagged with how it went
#[derive(Debug)]
pub enum Outcome<T> {
    /// Loaded cleanly
    Ready(T),
    /// Usable, but part of the input was dropped on the way
    Degraded { value: T, reason: LoadError },
    /// Nothing to show for this slot
    Absent(LoadError),
}

impl<T> Outcome<T> {
    /// Ready, or degraded when there is a degradation
    pub fn tagged(value: T, degradation: Option<Degradation>) -> Self {
        match degradation {
            Some(degradation) => Outcome::Degraded {
                value,
                reason: degradation.into(),
            },
            None => Outcome::Ready(value),
        }
    }

    /// The value, unless absent
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) | Outcome::Degraded { value, .. } => Some(value),
            Outcome::Absent(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Ready(value) | Outcome::Degraded { value, .. } => Some(value),
            Outcome::Absent(_) => None,
        }
    }

    /// The reason for an absent or degraded result
    pub fn reason(&self) -> Option<&LoadError> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Degraded { reason, .. } | Outcome::Absent(reason) => Some(reason),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Outcome::Absent(_))
    }
}

use thiserror::Error;

/// Failure to retrieve a page. Never retried by the discovery code.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} was not HTML (content-type: {content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("no page available for {0}")]
    NotFound(String),

    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Nothing on the page passed the structural gate.
    #[error("{0}")]
    NoCandidate(String),

    /// More than one answer is equally plausible; we refuse to guess.
    #[error("{0}")]
    Ambiguous(String),

    /// The winner lacks data needed to finish the result (e.g. an input without `name`).
    #[error("{0}")]
    MalformedInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(
        "all card selector tiers failed for {url}: differential: {differential}; frequency: {frequency}"
    )]
    AllTiersFailed {
        url: String,
        differential: Box<DiscoveryError>,
        frequency: Box<DiscoveryError>,
    },
}

impl DiscoveryError {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, DiscoveryError::Ambiguous(_))
    }

    pub fn is_no_candidate(&self) -> bool {
        matches!(self, DiscoveryError::NoCandidate(_))
    }
}

pub type Result<T, E = DiscoveryError> = std::result::Result<T, E>;

use thiserror::Error;

/// Errors produced while building a list payload.
///
/// `Config` fails a whole request before any I/O. The fetch and parse
/// variants are scoped to one (status, media) branch.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("{0}")]
    Config(String),

    #[error("failed to fetch list page {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to fetch list page {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not find list data on the page; make sure the username is correct, the list is public, and the page layout has not changed")]
    MissingListData,

    #[error("list data on the page is not valid JSON ({0}); the page layout may have changed")]
    InvalidListData(#[from] serde_json::Error),
}

impl ListError {
    pub fn is_config(&self) -> bool { matches!(self, Self::Config(_)) }

    pub fn is_fetch(&self) -> bool { matches!(self, Self::HttpStatus { .. } | Self::Transport { .. }) }

    pub fn is_parse(&self) -> bool { matches!(self, Self::MissingListData | Self::InvalidListData(_)) }

    /// Upstream HTTP status, when the external site answered with one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Status code to answer the overlay with.
    pub fn http_status(&self) -> u16 {
        if self.is_config() { 400 } else { 500 }
    }
}

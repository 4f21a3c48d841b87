use modpack_core::PageId;
use std::fmt;
use thiserror::Error;

/// Failure of the transport underneath a [`crate::client::PageClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Structural region of a catalog page that one record field comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Title,
    Category,
    Ranking,
    Popularity,
    Views,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Title => "title",
            Zone::Category => "category",
            Zone::Ranking => "ranking",
            Zone::Popularity => "popularity",
            Zone::Views => "views",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("{0} zone not found")]
    MissingZone(Zone),
    #[error("title zone is empty")]
    EmptyTitle,
    #[error("{zone} zone holds non-numeric text {value:?}")]
    InvalidNumber { zone: Zone, value: String },
}

/// Per-page failure. Always carries the page id; never aborts a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page {id}: request failed: {source}")]
    Transport {
        id: PageId,
        #[source]
        source: ClientError,
    },
    #[error("page {id}: unexpected status {status}")]
    Status { id: PageId, status: String },
    #[error("page {id}: {source}")]
    Extract {
        id: PageId,
        #[source]
        source: ExtractError,
    },
    #[error("page {id}: invalid url: {source}")]
    Url {
        id: PageId,
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    pub fn id(&self) -> PageId {
        match self {
            FetchError::Transport { id, .. }
            | FetchError::Status { id, .. }
            | FetchError::Extract { id, .. }
            | FetchError::Url { id, .. } => *id,
        }
    }
}

/// The identifier range could not be determined; the run cannot start.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("listing page unreachable: {0}")]
    Unreachable(#[from] ClientError),
    #[error("listing page returned {0}")]
    Status(String),
    #[error("listing page has no catalog entry link")]
    MissingEntry,
    #[error("catalog entry link {0:?} does not end in a numeric id")]
    InvalidId(String),
    #[error("invalid listing url: {0}")]
    Url(#[from] url::ParseError),
}

pub mod nominatim;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::Coordinate;

/// One forward-search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub display_name: String,
    /// `None` when the service returned coordinates that do not parse.
    pub position: Option<Coordinate>,
}

/// A forward-search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    pub text: String,
    pub limit: usize,
    /// Ask the service for a structured address breakdown.
    pub address_details: bool,
    /// Preferred response language, sent as `Accept-Language`.
    pub language: Option<String>,
}

impl Search {
    #[must_use]
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            limit,
            address_details: false,
            language: None,
        }
    }

    #[must_use]
    pub const fn with_address_details(mut self) -> Self {
        self.address_details = true;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = exn::Result<Vec<Place>, Error>> + Send + 'a>>;
pub type ReverseFuture<'a> =
    Pin<Box<dyn Future<Output = exn::Result<Option<String>, Error>> + Send + 'a>>;

/// A geocoding provider: text to places, and coordinates back to text.
pub trait Geocoder: Send + Sync + 'static {
    /// Forward search. Hits are returned in the service's ranking order.
    fn search(&self, search: Search) -> SearchFuture<'_>;

    /// Reverse lookup. `Ok(None)` when the service has no displayable name
    /// for the coordinate.
    fn reverse(&self, at: Coordinate, language: Option<String>) -> ReverseFuture<'_>;
}

/// Errors from geocoding backends.
#[derive(Debug)]
pub enum Error {
    Network(String),
    Status(u16),
    Parse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Status(status) => write!(f, "geocoder returned status {status}"),
            Self::Parse(msg) => write!(f, "failed to parse geocoder response: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

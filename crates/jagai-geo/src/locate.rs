//! One-shot device position requests.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::Coordinate;

/// How the position should be acquired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Request {
    pub high_accuracy: bool,
}

/// A source of the device's current position.
pub trait Locator: Send + Sync + 'static {
    /// Request the position once. There is no continuous tracking.
    fn locate(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = exn::Result<Coordinate, Error>> + Send + '_>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The platform has no way of reporting a position.
    Unsupported,
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("geolocation not supported"),
            Self::Timeout => f.write_str("geolocation timed out"),
        }
    }
}

impl std::error::Error for Error {}

/// Reports a position known ahead of time, e.g. from configuration.
pub struct Fixed(pub Coordinate);

impl Locator for Fixed {
    fn locate(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = exn::Result<Coordinate, Error>> + Send + '_>> {
        let position = self.0;
        Box::pin(async move {
            tracing::debug!(%position, high_accuracy = request.high_accuracy, "fixed position");
            Ok(position)
        })
    }
}

/// A platform without location support. Every request fails.
pub struct Unsupported;

impl Locator for Unsupported {
    fn locate(
        &self,
        _request: Request,
    ) -> Pin<Box<dyn Future<Output = exn::Result<Coordinate, Error>> + Send + '_>> {
        Box::pin(async { Err(Error::Unsupported.into()) })
    }
}

/// Pick a locator for an optional configured position.
#[must_use]
pub fn resolve(position: Option<Coordinate>) -> Box<dyn Locator> {
    match position {
        Some(position) => Box::new(Fixed(position)),
        None => Box::new(Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    #[test]
    fn fixed_reports_its_position() {
        let locator = resolve(Some(Coordinate::new(40.0, -75.0)));
        let position = block_on(locator.locate(Request { high_accuracy: true })).unwrap();
        assert_eq!(position, Coordinate::new(40.0, -75.0));
    }

    #[test]
    fn unsupported_fails() {
        let locator = resolve(None);
        assert!(block_on(locator.locate(Request::default())).is_err());
    }
}

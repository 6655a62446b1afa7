//! Device position and its reverse-geocoded address.

use jagai_geo::{geocoding, locate, Coordinate};

/// Resolves the user's position once per session.
///
/// Failures are diagnostics only: there is no retry and no default position.
#[derive(Debug, Default)]
pub struct LocationResolver {
    requested: bool,
    position: Option<Coordinate>,
}

impl LocationResolver {
    #[must_use]
    pub const fn position(&self) -> Option<Coordinate> {
        self.position
    }

    /// Returns `true` the first time it is called, when a position request
    /// should be issued.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.requested, true)
    }

    /// Handle the outcome of the position request.
    ///
    /// Returns the coordinate when it becomes the session's position. Later
    /// reports are ignored.
    pub fn located(
        &mut self,
        result: exn::Result<Coordinate, locate::Error>,
    ) -> Option<Coordinate> {
        match result {
            Ok(position) if self.position.is_none() => {
                tracing::info!(%position, "position resolved");
                self.position = Some(position);
                Some(position)
            }
            Ok(position) => {
                tracing::debug!(%position, "ignoring repeated position");
                None
            }
            Err(e) => {
                tracing::warn!(%e, "geolocation error");
                None
            }
        }
    }

    /// Handle a reverse-geocode response. Returns the address to forward.
    #[allow(clippy::unused_self)]
    pub fn reversed(
        &self,
        at: Coordinate,
        result: exn::Result<Option<String>, geocoding::Error>,
    ) -> Option<String> {
        match result {
            Ok(Some(address)) => {
                tracing::info!(%at, address, "address detected");
                Some(address)
            }
            Ok(None) => {
                tracing::warn!(%at, "reverse geocoding returned no address");
                None
            }
            Err(e) => {
                tracing::warn!(%at, %e, "reverse geocoding failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_once() {
        let mut resolver = LocationResolver::default();
        assert!(resolver.start());
        assert!(!resolver.start());
    }

    #[test]
    fn failure_leaves_no_position() {
        let mut resolver = LocationResolver::default();
        assert_eq!(resolver.located(Err(locate::Error::Unsupported.into())), None);
        assert_eq!(resolver.position(), None);
    }

    #[test]
    fn position_is_set_once() {
        let mut resolver = LocationResolver::default();
        let first = Coordinate::new(40.0, -75.0);
        assert_eq!(resolver.located(Ok(first)), Some(first));
        assert_eq!(resolver.located(Ok(Coordinate::new(1.0, 1.0))), None);
        assert_eq!(resolver.position(), Some(first));
    }

    #[test]
    fn reversed_forwards_display_name() {
        let resolver = LocationResolver::default();
        let at = Coordinate::new(40.0, -75.0);
        assert_eq!(
            resolver.reversed(at, Ok(Some("123 Main St".to_owned()))),
            Some("123 Main St".to_owned())
        );
        assert_eq!(resolver.reversed(at, Ok(None)), None);
        assert_eq!(
            resolver.reversed(at, Err(geocoding::Error::Network("down".into()).into())),
            None
        );
    }
}

//! Lookup of the hospital or clinic shown next to the user.
//!
//! "Nearest" is whatever the geocoding service ranks first for a query that
//! names the user's coordinate. No distance is computed locally.

use jagai_geo::geocoding::{self, Place, Search};
use jagai_geo::Coordinate;

use crate::generation::{Generation, Latest};

/// Name used when the first hit has none.
pub const UNNAMED: &str = "Nearest hospital";

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub name: String,
    pub position: Coordinate,
}

/// A facility search to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub generation: Generation,
    pub search: Search,
}

pub struct FacilityFinder {
    terms: String,
    limit: usize,
    language: Option<String>,
    latest: Latest,
    found: Option<Facility>,
}

impl FacilityFinder {
    #[must_use]
    pub fn new(terms: impl Into<String>, limit: usize, language: Option<String>) -> Self {
        Self {
            terms: terms.into(),
            limit,
            language,
            latest: Latest::default(),
            found: None,
        }
    }

    #[must_use]
    pub const fn facility(&self) -> Option<&Facility> {
        self.found.as_ref()
    }

    /// Build the search for a position. Every call issues a new lookup,
    /// even for a position seen before.
    pub fn lookup(&mut self, near: Coordinate) -> Lookup {
        let mut search = Search::new(query(&self.terms, near), self.limit);
        if let Some(language) = &self.language {
            search = search.with_language(language.clone());
        }
        Lookup {
            generation: self.latest.issue(),
            search,
        }
    }

    /// Apply a search response. Returns `false` when it was stale and dropped.
    pub fn found(
        &mut self,
        generation: Generation,
        result: exn::Result<Vec<Place>, geocoding::Error>,
    ) -> bool {
        if !self.latest.is_current(generation) {
            tracing::debug!(?generation, "dropping stale facility result");
            return false;
        }
        match result {
            Ok(places) => {
                tracing::debug!(count = places.len(), "facility search results");
                match first(places) {
                    Some(facility) => {
                        tracing::info!(name = %facility.name, position = %facility.position, "facility found");
                        self.found = Some(facility);
                    }
                    None => tracing::warn!("no nearby hospital found"),
                }
            }
            Err(e) => tracing::warn!(%e, "hospital search failed"),
        }
        true
    }
}

#[must_use]
pub fn query(terms: &str, near: Coordinate) -> String {
    format!("{terms} near {near}")
}

/// Take the first hit, ignoring the rest. A first hit without usable
/// coordinates yields nothing.
#[must_use]
pub fn first(places: Vec<Place>) -> Option<Facility> {
    let place = places.into_iter().next()?;
    let position = place.position?;
    let name = if place.display_name.is_empty() {
        UNNAMED.to_owned()
    } else {
        place.display_name
    };
    Some(Facility { name, position })
}

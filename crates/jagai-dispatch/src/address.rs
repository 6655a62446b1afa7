//! The delivery address field and its autocomplete suggestions.

use jagai_geo::geocoding::{self, Place};
use jagai_geo::Coordinate;

use crate::generation::{Generation, Latest};

/// Who last wrote the address value.
///
/// Every writer replaces the value outright; the last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writer {
    /// A change event from the input.
    Typed,
    /// A suggestion picked from the list.
    Selected,
    /// The reverse-geocoded device position.
    Detected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub label: String,
    pub position: Option<Coordinate>,
}

/// A search to run for the current input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub generation: Generation,
    pub text: String,
    pub limit: usize,
}

pub struct AddressField {
    value: String,
    writer: Option<Writer>,
    /// Position of the picked suggestion, while the value still holds it.
    picked: Option<Coordinate>,
    suggestions: Vec<Suggestion>,
    loading: bool,
    latest: Latest,
    min_len: usize,
    limit: usize,
}

impl AddressField {
    #[must_use]
    pub fn new(min_len: usize, limit: usize) -> Self {
        Self {
            value: String::new(),
            writer: None,
            picked: None,
            suggestions: Vec::new(),
            loading: false,
            latest: Latest::default(),
            min_len,
            limit,
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn writer(&self) -> Option<Writer> {
        self.writer
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Coordinates of the current value, known only when it came from a
    /// picked suggestion.
    #[must_use]
    pub const fn picked_position(&self) -> Option<Coordinate> {
        self.picked
    }

    /// Handle a change event. Returns the search to issue, if any.
    ///
    /// Below the minimum length the suggestions are cleared and any search
    /// still in flight is made stale.
    pub fn change(&mut self, value: String) -> Option<Query> {
        self.write(value, Writer::Typed);

        if self.value.chars().count() < self.min_len {
            self.suggestions.clear();
            self.loading = false;
            self.latest.invalidate();
            return None;
        }

        self.loading = true;
        Some(Query {
            generation: self.latest.issue(),
            text: self.value.clone(),
            limit: self.limit,
        })
    }

    /// Store an address derived from the device position. Does not search.
    pub fn detected(&mut self, value: String) {
        self.write(value, Writer::Detected);
    }

    /// Pick the suggestion at `index`, returning its label.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        if index >= self.suggestions.len() {
            return None;
        }
        let picked = self.suggestions.swap_remove(index);
        self.suggestions.clear();
        self.loading = false;
        self.latest.invalidate();
        self.write(picked.label, Writer::Selected);
        self.picked = picked.position;
        Some(self.value.as_str())
    }

    /// Apply a search response. Returns `false` when it was stale and dropped.
    pub fn suggested(
        &mut self,
        generation: Generation,
        result: exn::Result<Vec<Place>, geocoding::Error>,
    ) -> bool {
        if !self.latest.is_current(generation) {
            tracing::debug!(?generation, "dropping stale suggestions");
            return false;
        }
        self.loading = false;
        match result {
            Ok(places) => {
                self.suggestions = places
                    .into_iter()
                    .take(self.limit)
                    .map(|place| Suggestion {
                        label: place.display_name,
                        position: place.position,
                    })
                    .collect();
                tracing::debug!(count = self.suggestions.len(), "suggestions updated");
            }
            Err(e) => {
                tracing::warn!(%e, "autocomplete failed");
            }
        }
        true
    }

    fn write(&mut self, value: String, writer: Writer) {
        if let Some(previous) = self.writer {
            if previous != writer {
                tracing::debug!(?previous, ?writer, "address overwritten");
            }
        }
        self.value = value;
        self.writer = Some(writer);
        self.picked = None;
    }
}

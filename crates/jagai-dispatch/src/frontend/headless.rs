use std::pin::Pin;

use futures_lite::Stream;

use crate::page::{Event, Page};

/// No input; the session only resolves the position and the facility.
pub struct Frontend;

impl crate::frontend::Frontend for Frontend {
    fn inputs(&self) -> Pin<Box<dyn Stream<Item = Event> + Send + '_>> {
        Box::pin(futures_lite::stream::empty())
    }

    fn render(&self, page: &Page) {
        tracing::debug!(
            address = page.address().value(),
            map = %crate::map::summary(&page.map_view()),
            "page updated"
        );
    }
}

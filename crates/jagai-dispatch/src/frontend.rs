pub mod headless;
pub mod terminal;

use std::pin::Pin;

use futures_lite::Stream;

use crate::page::{Event, Page};

/// The operator-facing side of a session.
///
/// Supplies user input as page events and shows the page after every
/// change.
pub trait Frontend: Send + Sync {
    /// Stream of user input. Ends when the operator is done.
    fn inputs(&self) -> Pin<Box<dyn Stream<Item = Event> + Send + '_>>;

    /// Show the current page state.
    fn render(&self, page: &Page);
}

#[must_use]
pub fn terminal() -> terminal::Frontend {
    terminal::Frontend::default()
}

#[must_use]
pub const fn headless() -> headless::Frontend {
    headless::Frontend
}

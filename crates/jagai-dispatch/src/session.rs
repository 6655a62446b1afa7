//! Drives a [`Page`]: executes its commands concurrently and feeds the
//! results back as events, in arrival order.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_lite::StreamExt;
use jagai_geo::geocoding::Geocoder;
use jagai_geo::locate::{self, Locator};

use crate::frontend::Frontend;
use crate::map::{self, MapView};
use crate::page::{Command, Event, Page};

/// The outside world a session talks to.
#[derive(Clone)]
pub struct Services {
    pub geocoder: Arc<dyn Geocoder>,
    pub locator: Arc<dyn Locator>,
    pub locate_timeout: Duration,
}

enum Next {
    Input(Option<Event>),
    Result(Result<Event, async_channel::RecvError>),
}

/// Run until the frontend's input ends and no command is in flight.
///
/// Returns the final page state.
pub async fn run<F: Frontend>(
    executor: &Arc<async_executor::Executor<'static>>,
    services: &Services,
    mut page: Page,
    frontend: &F,
    map_output: Option<&Path>,
) -> Page {
    let (tx, rx) = async_channel::unbounded::<Event>();
    let mut in_flight = 0usize;
    let mut shown_map: Option<MapView> = None;

    for command in page.start() {
        spawn(executor, services, command, &tx);
        in_flight += 1;
    }
    show(&page, frontend, map_output, &mut shown_map);

    let mut inputs = frontend.inputs();
    let mut input_open = true;

    while input_open || in_flight > 0 {
        let next = if input_open {
            futures_lite::future::or(async { Next::Input(inputs.next().await) }, async {
                Next::Result(rx.recv().await)
            })
            .await
        } else {
            Next::Result(rx.recv().await)
        };

        let event = match next {
            Next::Input(Some(event)) => event,
            Next::Input(None) => {
                tracing::debug!(in_flight, "input closed");
                input_open = false;
                continue;
            }
            Next::Result(Ok(event)) => {
                in_flight -= 1;
                event
            }
            // Unreachable while `tx` is held here.
            Next::Result(Err(_)) => break,
        };

        for command in page.apply(event) {
            spawn(executor, services, command, &tx);
            in_flight += 1;
        }
        show(&page, frontend, map_output, &mut shown_map);
    }

    page
}

fn show<F: Frontend>(
    page: &Page,
    frontend: &F,
    map_output: Option<&Path>,
    shown_map: &mut Option<MapView>,
) {
    frontend.render(page);

    let view = page.map_view();
    if shown_map.as_ref() == Some(&view) {
        return;
    }
    if let Some(path) = map_output {
        if let Err(e) = map::html::write(path, &view) {
            tracing::warn!(%e, "failed to write map");
        }
    }
    *shown_map = Some(view);
}

fn spawn(
    executor: &Arc<async_executor::Executor<'static>>,
    services: &Services,
    command: Command,
    tx: &async_channel::Sender<Event>,
) {
    tracing::debug!(?command, "issuing");
    let services = services.clone();
    let tx = tx.clone();
    executor
        .spawn(async move {
            let event = execute(services, command).await;
            let _ = tx.send(event).await;
        })
        .detach();
}

async fn execute(services: Services, command: Command) -> Event {
    match command {
        Command::Locate(request) => {
            let timeout = services.locate_timeout;
            let result = futures_lite::future::or(services.locator.locate(request), async {
                async_io::Timer::after(timeout).await;
                Err(locate::Error::Timeout.into())
            })
            .await;
            Event::Located(result)
        }
        Command::ReverseGeocode { at, language } => Event::Reversed {
            at,
            result: services.geocoder.reverse(at, language).await,
        },
        Command::Suggest { generation, search } => Event::Suggested {
            generation,
            result: services.geocoder.search(search).await,
        },
        Command::FindFacility { generation, search } => Event::FacilityFound {
            generation,
            result: services.geocoder.search(search).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use futures_lite::Stream;
    use jagai_geo::geocoding::{Place, ReverseFuture, Search, SearchFuture};
    use jagai_geo::Coordinate;

    use super::*;
    use crate::config::Config;
    use crate::map::MarkerKind;

    /// Answers every search with hits named after the query.
    #[derive(Default)]
    struct Canned {
        searches: AtomicUsize,
    }

    impl Geocoder for Canned {
        fn search(&self, search: Search) -> SearchFuture<'_> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok((1..=7u8)
                    .map(|i| Place {
                        display_name: format!("{} #{i}", search.text),
                        position: Some(Coordinate::new(f64::from(i), f64::from(i))),
                    })
                    .collect())
            })
        }

        fn reverse(&self, at: Coordinate, _language: Option<String>) -> ReverseFuture<'_> {
            Box::pin(async move { Ok(Some(format!("Address at {at}"))) })
        }
    }

    struct Scripted {
        inputs: Mutex<Vec<Event>>,
        renders: AtomicUsize,
    }

    impl Scripted {
        fn new(inputs: Vec<Event>) -> Self {
            Self {
                inputs: Mutex::new(inputs),
                renders: AtomicUsize::new(0),
            }
        }
    }

    impl Frontend for Scripted {
        fn inputs(&self) -> Pin<Box<dyn Stream<Item = Event> + Send + '_>> {
            let inputs = std::mem::take(&mut *self.inputs.lock().unwrap());
            Box::pin(futures_lite::stream::iter(inputs))
        }

        fn render(&self, _page: &Page) {
            self.renders.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Never reports a position.
    struct Stalled;

    impl Locator for Stalled {
        fn locate(
            &self,
            _request: locate::Request,
        ) -> Pin<Box<dyn Future<Output = exn::Result<Coordinate, locate::Error>> + Send + '_>>
        {
            Box::pin(futures_lite::future::pending())
        }
    }

    fn services(geocoder: Arc<Canned>, position: Option<Coordinate>) -> Services {
        Services {
            geocoder,
            locator: Arc::from(locate::resolve(position)),
            locate_timeout: Duration::from_secs(5),
        }
    }

    fn run_session(services: &Services, frontend: &Scripted, output: Option<&Path>) -> Page {
        let executor = Arc::new(async_executor::Executor::new());
        let page = Page::new(&Config::default());
        futures_lite::future::block_on(executor.run(run(
            &executor, services, page, frontend, output,
        )))
    }

    #[test]
    fn resolves_position_address_and_facility() {
        let geocoder = Arc::new(Canned::default());
        let services = services(geocoder.clone(), Some(Coordinate::new(40.0, -75.0)));
        let frontend = Scripted::new(Vec::new());
        let output = std::env::temp_dir().join(format!("jagai-session-{}.html", std::process::id()));

        let page = run_session(&services, &frontend, Some(&output));

        assert_eq!(page.user_position(), Some(Coordinate::new(40.0, -75.0)));
        assert_eq!(page.address().value(), "Address at 40,-75");
        let facility = page.facility().unwrap();
        assert_eq!(facility.name, "hospital, clinic near 40,-75 #1");
        assert_eq!(geocoder.searches.load(Ordering::SeqCst), 1);

        let view = page.map_view();
        assert!(view.marker(MarkerKind::User).is_some());
        assert!(view.marker(MarkerKind::Facility).is_some());

        let written = std::fs::read_to_string(&output).unwrap();
        let _ = std::fs::remove_file(&output);
        assert!(written.contains("hospital, clinic near 40,-75 #1"));
        assert!(frontend.renders.load(Ordering::SeqCst) >= 4);
    }

    #[test]
    fn no_position_falls_back() {
        let geocoder = Arc::new(Canned::default());
        let services = services(geocoder.clone(), None);
        let frontend = Scripted::new(Vec::new());

        let page = run_session(&services, &frontend, None);

        assert_eq!(page.user_position(), None);
        assert_eq!(page.address().value(), "");
        assert_eq!(geocoder.searches.load(Ordering::SeqCst), 0);
        let view = page.map_view();
        assert!(view.markers.is_empty());
        assert_eq!(view.center, map::FALLBACK_CENTER);
    }

    #[test]
    fn typing_searches_per_change_and_keeps_newest() {
        let geocoder = Arc::new(Canned::default());
        let services = services(geocoder.clone(), None);
        let frontend = Scripted::new(vec![
            Event::Input("Mai".to_owned()),
            Event::Input("Main".to_owned()),
            Event::Input("Main St".to_owned()),
        ]);

        let page = run_session(&services, &frontend, None);

        assert_eq!(geocoder.searches.load(Ordering::SeqCst), 2);
        assert_eq!(page.address().value(), "Main St");
        assert!(!page.address().is_loading());
        let labels: Vec<&str> = page
            .address()
            .suggestions()
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(
            labels,
            ["Main St #1", "Main St #2", "Main St #3", "Main St #4", "Main St #5"]
        );
    }

    #[test]
    fn stalled_position_request_times_out() {
        let geocoder = Arc::new(Canned::default());
        let services = Services {
            geocoder: geocoder.clone(),
            locator: Arc::new(Stalled),
            locate_timeout: Duration::from_millis(50),
        };
        let frontend = Scripted::new(Vec::new());

        let started = std::time::Instant::now();
        let page = run_session(&services, &frontend, None);

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(page.user_position(), None);
        assert_eq!(page.address().value(), "");
        assert_eq!(geocoder.searches.load(Ordering::SeqCst), 0);
        let view = page.map_view();
        assert!(view.markers.is_empty());
        assert_eq!(view.center, map::FALLBACK_CENTER);
    }
}

//! The page container: owns every component and is the single writer of
//! all session state.
//!
//! Input and network results arrive as [`Event`]s. Applying one may produce
//! [`Command`]s, which the session executes and answers with further events.

use std::fmt;

use jagai_geo::geocoding::{self, Place, Search};
use jagai_geo::order::Order;
use jagai_geo::{locate, Coordinate};

use crate::address::{AddressField, Writer};
use crate::config::Config;
use crate::facility::{Facility, FacilityFinder};
use crate::generation::Generation;
use crate::map::{self, MapConfig, MapView};
use crate::resolver::LocationResolver;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Urgency {
    #[default]
    Normal,
    Priority,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "Normal (2\u{2013}4 hours)",
            Self::Priority => "Priority (< 60 minutes)",
        })
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "normal" => Ok(Self::Normal),
            "priority" => Ok(Self::Priority),
            other => Err(format!("unknown urgency \"{other}\", expected normal or priority")),
        }
    }
}

pub enum Event {
    /// The address input changed to this value.
    Input(String),
    /// Pick the suggestion at this index.
    Select(usize),
    Item(String),
    Urgency(Urgency),
    /// The "Request Drone" button.
    Submit,
    Located(exn::Result<Coordinate, locate::Error>),
    Reversed {
        at: Coordinate,
        result: exn::Result<Option<String>, geocoding::Error>,
    },
    Suggested {
        generation: Generation,
        result: exn::Result<Vec<Place>, geocoding::Error>,
    },
    FacilityFound {
        generation: Generation,
        result: exn::Result<Vec<Place>, geocoding::Error>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Locate(locate::Request),
    ReverseGeocode {
        at: Coordinate,
        language: Option<String>,
    },
    Suggest {
        generation: Generation,
        search: Search,
    },
    FindFacility {
        generation: Generation,
        search: Search,
    },
}

pub struct Page {
    operator_id: String,
    language: Option<String>,
    locate_request: locate::Request,
    map_config: MapConfig,
    address: AddressField,
    resolver: LocationResolver,
    finder: FacilityFinder,
    item: String,
    urgency: Urgency,
    requested: Option<Order>,
}

impl Page {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            operator_id: config.operator_id.clone(),
            language: config.language(),
            locate_request: locate::Request {
                high_accuracy: config.location.high_accuracy,
            },
            map_config: config.map.clone(),
            address: AddressField::new(
                config.search.min_query_len,
                config.search.suggestion_limit,
            ),
            resolver: LocationResolver::default(),
            finder: FacilityFinder::new(
                config.facility.terms.clone(),
                config.facility.limit,
                config.language(),
            ),
            item: String::new(),
            urgency: Urgency::default(),
            requested: None,
        }
    }

    /// Commands to issue when the page is first shown.
    pub fn start(&mut self) -> Vec<Command> {
        if self.resolver.start() {
            vec![Command::Locate(self.locate_request)]
        } else {
            Vec::new()
        }
    }

    pub fn apply(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Input(value) => self
                .address
                .change(value)
                .map(|query| Command::Suggest {
                    generation: query.generation,
                    search: Search::new(query.text, query.limit).with_address_details(),
                })
                .into_iter()
                .collect(),
            Event::Select(index) => {
                if self.address.select(index).is_none() {
                    tracing::warn!(index, "no such suggestion");
                }
                Vec::new()
            }
            Event::Item(item) => {
                self.item = item;
                Vec::new()
            }
            Event::Urgency(urgency) => {
                self.urgency = urgency;
                Vec::new()
            }
            Event::Submit => {
                self.submit();
                Vec::new()
            }
            Event::Located(result) => match self.resolver.located(result) {
                Some(at) => {
                    let lookup = self.finder.lookup(at);
                    vec![
                        Command::ReverseGeocode {
                            at,
                            language: self.language.clone(),
                        },
                        Command::FindFacility {
                            generation: lookup.generation,
                            search: lookup.search,
                        },
                    ]
                }
                None => Vec::new(),
            },
            Event::Reversed { at, result } => {
                if let Some(address) = self.resolver.reversed(at, result) {
                    self.address.detected(address);
                }
                Vec::new()
            }
            Event::Suggested { generation, result } => {
                self.address.suggested(generation, result);
                Vec::new()
            }
            Event::FacilityFound { generation, result } => {
                self.finder.found(generation, result);
                Vec::new()
            }
        }
    }

    #[must_use]
    pub const fn address(&self) -> &AddressField {
        &self.address
    }

    #[must_use]
    pub const fn user_position(&self) -> Option<Coordinate> {
        self.resolver.position()
    }

    #[must_use]
    pub const fn facility(&self) -> Option<&Facility> {
        self.finder.facility()
    }

    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// The last accepted delivery request.
    #[must_use]
    pub const fn requested(&self) -> Option<&Order> {
        self.requested.as_ref()
    }

    #[must_use]
    pub fn map_view(&self) -> MapView {
        map::present(self.user_position(), self.facility(), &self.map_config)
    }

    /// Coordinates for the current address, when they are known.
    fn destination(&self) -> Option<Coordinate> {
        match self.address.writer()? {
            Writer::Selected => self.address.picked_position(),
            Writer::Detected => self.resolver.position(),
            Writer::Typed => None,
        }
    }

    fn submit(&mut self) {
        let Some(destination) = self.destination() else {
            tracing::warn!(
                address = self.address.value(),
                "delivery address has no coordinates, pick a suggestion first"
            );
            return;
        };
        let item = self.item.trim();
        if item.is_empty() {
            tracing::warn!("no item entered, delivery request rejected");
            return;
        }
        let order = Order::new(
            self.operator_id.clone(),
            vec![item.to_owned()],
            destination.into(),
        );
        tracing::info!(
            id = %order.id,
            address = self.address.value(),
            urgency = %self.urgency,
            status = %order.status(),
            "delivery requested"
        );
        self.requested = Some(order);
    }
}

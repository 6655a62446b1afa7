//! Delivery order model.
//!
//! An [`Order`] is a tagged-state entity: its [`OrderStatus`] only changes
//! through the transition methods, which reject moves the lifecycle does not
//! allow.
//!
//! ```text
//! pending -> preparing -> in_flight -> delivered
//!    \__________\______________________> cancelled
//! ```

use std::fmt;

use chrono::{DateTime, Utc};

/// Unique identifier for an [`Order`], backed by a ULID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OrderId(ulid::Ulid);

impl OrderId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivery destination.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl From<crate::Coordinate> for Location {
    fn from(c: crate::Coordinate) -> Self {
        Self {
            lat: c.latitude,
            lon: c.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    InFlight,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Preparing)
                | (Self::Preparing, Self::InFlight)
                | (Self::InFlight, Self::Delivered)
                | (Self::Pending | Self::Preparing, Self::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::InFlight => "in_flight",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "order cannot move from {from} to {to}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<String>,
    pub destination: Location,
    status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a pending order.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        items: Vec<String>,
        destination: Location,
    ) -> Self {
        Self {
            id: OrderId::new(),
            user_id: user_id.into(),
            items,
            destination,
            status: OrderStatus::Pending,
            eta_minutes: None,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn start_preparing(&mut self) -> exn::Result<(), Error> {
        self.transition(OrderStatus::Preparing)
    }

    /// Hand the order to a drone, optionally with an arrival estimate.
    pub fn launch(&mut self, eta_minutes: Option<u32>) -> exn::Result<(), Error> {
        self.transition(OrderStatus::InFlight)?;
        self.eta_minutes = eta_minutes;
        Ok(())
    }

    pub fn deliver(&mut self) -> exn::Result<(), Error> {
        self.transition(OrderStatus::Delivered)
    }

    pub fn cancel(&mut self) -> exn::Result<(), Error> {
        self.transition(OrderStatus::Cancelled)
    }

    fn transition(&mut self, to: OrderStatus) -> exn::Result<(), Error> {
        let from = self.status;
        if !from.can_become(to) {
            exn::bail!(Error::InvalidTransition { from, to });
        }
        self.status = to;
        if to.is_terminal() {
            self.eta_minutes = None;
        }
        self.updated_at = Utc::now();
        tracing::debug!(id = %self.id, %from, %to, "order transition");
        Ok(())
    }
}

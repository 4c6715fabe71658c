//! Location change requests and their tickets.
//!
//! Geocoding may be slow, so each request runs on its own worker thread and
//! reports back to the core loop as a [`SignalMessage::LocationResolved`].
//! Every request carries a [`RequestTicket`]; only the most recently issued
//! ticket may change the location. A result that arrives for an older ticket
//! is dropped and its requester is told it was superseded, even when it is
//! the last one to complete.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::appearance::AppearanceMode;
use crate::geo::{GeocodeError, Geocoder, Place};
use crate::io::signals::SignalMessage;

/// Sequence number tagging one geocode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What the requester of a location change is told.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LocationOutcome {
    Set {
        display_name: String,
        latitude: f64,
        longitude: f64,
        mode: Option<AppearanceMode>,
    },
    Failed {
        message: String,
    },
    /// A newer request was issued before this one completed.
    Superseded,
}

/// A request to look up `address` and make it the active location.
#[derive(Debug, Clone)]
pub struct LocationRequest {
    pub address: String,
    pub reply: Option<Sender<LocationOutcome>>,
}

impl LocationRequest {
    pub fn new(address: impl Into<String>, reply: Option<Sender<LocationOutcome>>) -> Self {
        Self {
            address: address.into(),
            reply,
        }
    }

    /// Send `outcome` to the requester, if it is still listening.
    pub fn respond(&self, outcome: LocationOutcome) {
        if let Some(reply) = &self.reply {
            let _ = reply.send(outcome);
        }
    }
}

/// A finished geocode, posted back to the core loop.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    pub ticket: RequestTicket,
    pub request: LocationRequest,
    pub result: Result<Place, GeocodeError>,
}

/// How the core should treat a finished geocode.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Accept(Place),
    Reject(GeocodeError),
    Stale,
}

/// Hands out tickets and remembers which one is current.
#[derive(Debug, Default)]
pub struct LocationRequests {
    latest: u64,
}

impl LocationRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket. It supersedes every earlier one.
    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        (self.latest > 0).then_some(RequestTicket(self.latest))
    }

    pub fn complete(
        &self,
        ticket: RequestTicket,
        result: Result<Place, GeocodeError>,
    ) -> Completion {
        if !self.is_current(ticket) {
            return Completion::Stale;
        }
        match result {
            Ok(place) => Completion::Accept(place),
            Err(e) => Completion::Reject(e),
        }
    }
}

/// Geocode on a worker thread and post the result to `sender`.
pub fn spawn_geocode(
    geocoder: Arc<dyn Geocoder>,
    ticket: RequestTicket,
    request: LocationRequest,
    sender: Sender<SignalMessage>,
) {
    thread::spawn(move || {
        let result = geocoder.geocode(&request.address);
        let resolved = ResolvedLocation {
            ticket,
            request,
            result,
        };
        // The core is gone if this fails; nothing left to tell.
        let _ = sender.send(SignalMessage::LocationResolved(resolved));
    });
}

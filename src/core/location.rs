//! Place search for trip destinations.
//!
//! Geocoding lives outside this crate behind [`PlaceSearch`]. Queries fire as the
//! user types, so [`SearchSession`] hands out tickets and drops the results of any
//! query that a newer one has superseded.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    /// Display name (e.g., "Cusco, Peru")
    pub name: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl PlaceResult {
    /// Creates a place.
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Checks the name is present and the coordinates are on the globe.
    ///
    /// # Errors
    /// [`Error::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Place name cannot be empty"));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::validation(format!(
                "Latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::validation(format!(
                "Longitude out of range: {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// External place search.
pub trait PlaceSearch {
    /// Looks up places matching free text.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<PlaceResult>>> + Send;
}

/// Identifies one query issued through a [`SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Tracks the newest query so stale results can be discarded.
#[derive(Debug, Default)]
pub struct SearchSession {
    latest: AtomicU64,
}

impl SearchSession {
    /// Creates a session with no queries issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new query, superseding every earlier ticket.
    pub fn begin(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer query has been issued since `ticket`.
    #[must_use]
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Runs a query, returning `Ok(None)` when a newer query superseded it.
    ///
    /// A blank query clears the results without calling the searcher. Failures of
    /// a superseded query are dropped along with its results.
    ///
    /// # Errors
    /// Whatever the searcher returns for a query that is still current.
    pub async fn search<S>(&self, searcher: &S, query: &str) -> Result<Option<Vec<PlaceResult>>>
    where
        S: PlaceSearch,
    {
        let ticket = self.begin();
        let query = query.trim();
        if query.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let outcome = searcher.search(query).await;
        if !self.is_current(ticket) {
            tracing::debug!("Discarding results for superseded query {:?}", query);
            return Ok(None);
        }
        outcome.map(Some)
    }
}

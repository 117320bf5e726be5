//! In-memory store of finished reports keyed by a random identifier.
//!
//! Constructed once at startup and shared via `Arc`. Entries live for the
//! lifetime of the process; there is no eviction.

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    str::FromStr,
    sync::Arc,
};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Opaque, globally unique report identifier (random UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ReportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A report as returned to the caller right after generation.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub id: ReportId,
    pub html: Arc<str>,
}

#[derive(Debug, Default)]
pub struct ReportRegistry {
    reports: RwLock<HashMap<ReportId, Arc<str>>>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `html` under a freshly generated identifier and returns it.
    ///
    /// The id is drawn while holding the write lock and redrawn if already
    /// taken, so an id is never handed out twice. Once this returns, `get`
    /// with the id sees the report.
    pub async fn put(&self, html: impl Into<Arc<str>>) -> ReportId {
        let html = html.into();
        let mut reports = self.reports.write().await;
        loop {
            let id = ReportId::random();
            if let Entry::Vacant(slot) = reports.entry(id) {
                slot.insert(html);
                debug!(%id, total = reports.len(), "report registered");
                return id;
            }
        }
    }

    /// Returns the report for `id`, or `None` if it was never registered.
    pub async fn get(&self, id: &ReportId) -> Option<Arc<str>> {
        self.reports.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

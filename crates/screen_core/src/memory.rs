//! In-process collaborators backed by plain collections.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use shared::{
    domain::{MovieId, MovieRecord},
    error::SearchFailure,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::collaborators::{FlagMutator, IdSink, MovieFlag, QuerySource, SearchGateway};

pub const NOT_FOUND_MESSAGE: &str = "Movie not found!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagPair {
    pub watch_later: bool,
    pub watched: bool,
}

/// Shared record of persisted flags, keyed by movie id.
#[derive(Debug, Clone, Default)]
pub struct FlagLedger {
    flags: Arc<RwLock<HashMap<MovieId, FlagPair>>>,
}

impl FlagLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn flags(&self, id: &MovieId) -> FlagPair {
        self.flags.read().await.get(id).copied().unwrap_or_default()
    }

    pub async fn snapshot(&self) -> HashMap<MovieId, FlagPair> {
        self.flags.read().await.clone()
    }

    pub fn watch_later_mutator(&self) -> LedgerFlagMutator {
        LedgerFlagMutator {
            ledger: self.clone(),
            flag: MovieFlag::WatchLater,
        }
    }

    pub fn watched_mutator(&self) -> LedgerFlagMutator {
        LedgerFlagMutator {
            ledger: self.clone(),
            flag: MovieFlag::Watched,
        }
    }

    async fn apply(&self, flag: MovieFlag, id: &MovieId, value: bool) {
        let mut flags = self.flags.write().await;
        let entry = flags.entry(id.clone()).or_default();
        match flag {
            MovieFlag::WatchLater => entry.watch_later = value,
            MovieFlag::Watched => entry.watched = value,
        }
    }

    /// Overlays persisted flags; records never written keep their own.
    async fn annotate(&self, mut record: MovieRecord) -> MovieRecord {
        if let Some(stored) = self.flags.read().await.get(&record.id) {
            record.watch_later = stored.watch_later;
            record.watched = stored.watched;
        }
        record
    }
}

#[derive(Debug, Clone)]
pub struct LedgerFlagMutator {
    ledger: FlagLedger,
    flag: MovieFlag,
}

#[async_trait]
impl FlagMutator for LedgerFlagMutator {
    async fn set_flag(&self, id: &MovieId, value: bool) -> Result<()> {
        if id.as_str().trim().is_empty() {
            bail!("cannot persist {} for an empty movie id", self.flag.as_str());
        }
        self.ledger.apply(self.flag, id, value).await;
        debug!(movie_id = %id, flag = self.flag.as_str(), value, "flag persisted");
        Ok(())
    }
}

/// Title search over a fixed record list, annotated with ledger flags.
pub struct InMemoryCatalog {
    records: Vec<MovieRecord>,
    ledger: FlagLedger,
    not_found_message: String,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self {
            records,
            ledger: FlagLedger::new(),
            not_found_message: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn with_ledger(mut self, ledger: FlagLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_not_found_message(mut self, message: impl Into<String>) -> Self {
        self.not_found_message = message.into();
        self
    }

    pub fn ledger(&self) -> &FlagLedger {
        &self.ledger
    }
}

#[async_trait]
impl SearchGateway for InMemoryCatalog {
    async fn search(&self, query: &str) -> std::result::Result<Vec<MovieRecord>, SearchFailure> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(SearchFailure::new(self.not_found_message.clone()));
        }

        let mut results = Vec::new();
        for record in &self.records {
            let matches = record
                .title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&needle));
            if matches {
                results.push(self.ledger.annotate(record.clone()).await);
            }
        }

        if results.is_empty() {
            return Err(SearchFailure::new(self.not_found_message.clone()));
        }
        Ok(results)
    }
}

#[derive(Debug, Clone)]
pub struct FixedQuery(pub String);

impl FixedQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }
}

impl QuerySource for FixedQuery {
    fn current_query(&self) -> String {
        self.0.clone()
    }
}

/// Remembers the last movie picked for the details screen.
#[derive(Debug, Clone, Default)]
pub struct SelectedMovieSlot {
    selected: Arc<Mutex<Option<MovieId>>>,
}

impl SelectedMovieSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<MovieId> {
        self.selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl IdSink for SelectedMovieSlot {
    fn store(&self, id: &MovieId) {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.clone());
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;

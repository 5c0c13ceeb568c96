//! Narrow contracts to the systems the list screen talks to.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{MovieId, MovieRecord},
    error::SearchFailure,
};

#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(&self, query: &str) -> std::result::Result<Vec<MovieRecord>, SearchFailure>;
}

/// Persists one per-movie flag. Callers never wait on the outcome; errors are
/// only logged.
#[async_trait]
pub trait FlagMutator: Send + Sync {
    async fn set_flag(&self, id: &MovieId, value: bool) -> Result<()>;
}

pub trait QuerySource: Send + Sync {
    fn current_query(&self) -> String;
}

pub trait IdSink: Send + Sync {
    fn store(&self, id: &MovieId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieFlag {
    WatchLater,
    Watched,
}

impl MovieFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WatchLater => "watch_later",
            Self::Watched => "watched",
        }
    }
}

pub struct MissingSearchGateway;

#[async_trait]
impl SearchGateway for MissingSearchGateway {
    async fn search(&self, query: &str) -> std::result::Result<Vec<MovieRecord>, SearchFailure> {
        Err(SearchFailure::new(format!(
            "search backend unavailable for query '{query}'"
        )))
    }
}

pub struct MissingFlagStore;

#[async_trait]
impl FlagMutator for MissingFlagStore {
    async fn set_flag(&self, id: &MovieId, _value: bool) -> Result<()> {
        Err(anyhow!("flag storage unavailable for movie {id}"))
    }
}

pub struct DiscardSelection;

impl IdSink for DiscardSelection {
    fn store(&self, _id: &MovieId) {}
}

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{MovieId, MovieRecord};

/// Root snapshot of the movie list screen.
///
/// `navigate_to_details` is a pulse: it is committed as `true` and then
/// immediately as `false`, so it never stays raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScreenState {
    pub items: Vec<MovieRecord>,
    pub error_message: Option<String>,
    pub navigate_to_details: bool,
}

impl ScreenState {
    /// Snapshot of search results. Later records repeating an id already
    /// seen are dropped, so each movie appears once in result order.
    pub fn loaded(items: Vec<MovieRecord>) -> Self {
        let mut seen = HashSet::with_capacity(items.len());
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn find(&self, id: &MovieId) -> Option<&MovieRecord> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn with_navigation(&self, navigate_to_details: bool) -> Self {
        Self {
            navigate_to_details,
            ..self.clone()
        }
    }

    /// Replaces the first record whose id matches, keeping order and every
    /// other field. Returns `None` when no record carries `id`.
    pub fn replace_item<F>(&self, id: &MovieId, update: F) -> Option<Self>
    where
        F: FnOnce(&MovieRecord) -> MovieRecord,
    {
        let index = self.items.iter().position(|item| &item.id == id)?;
        let mut items = self.items.clone();
        items[index] = update(&self.items[index]);
        Some(Self {
            items,
            error_message: self.error_message.clone(),
            navigate_to_details: self.navigate_to_details,
        })
    }
}

/// Lifecycle of one list screen controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenPhase {
    Uninitialized,
    Loading,
    Loaded,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    Details { id: MovieId },
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;

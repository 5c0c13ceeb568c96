use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MovieId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MovieId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single search result as shown on the list screen.
///
/// Records are values: flag changes go through [`MovieRecord::with_watch_later`]
/// and [`MovieRecord::with_watched`], which keep the id and return a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MovieRecord {
    pub id: MovieId,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub poster_link: Option<String>,
    #[serde(default)]
    pub watch_later: bool,
    #[serde(default)]
    pub watched: bool,
}

impl MovieRecord {
    pub fn new(id: impl Into<MovieId>) -> Self {
        Self {
            id: id.into(),
            year: None,
            title: None,
            kind: None,
            poster_link: None,
            watch_later: false,
            watched: false,
        }
    }

    pub fn titled(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::new(id)
        }
    }

    pub fn with_watch_later(&self, watch_later: bool) -> Self {
        Self {
            watch_later,
            ..self.clone()
        }
    }

    pub fn with_watched(&self, watched: bool) -> Self {
        Self {
            watched,
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;

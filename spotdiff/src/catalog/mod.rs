//! In-memory model of the puzzle catalog consumed by the game.
//!
//! The catalog is a list of puzzle sets, each pairing two image paths with
//! the detected difference regions. Reading and writing the catalog file is
//! left to the caller; this module only converts to and from JSON text.

mod validation;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::region::DifferenceRegion;

pub use validation::{IssueKind, Severity, ValidationIssue};

/// Puzzle difficulty shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Default policy: up to 3 regions is easy, up to 5 medium, more is hard.
    pub fn from_region_count(count: usize) -> Self {
        match count {
            0..=3 => Difficulty::Easy,
            4..=5 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Returned when parsing an unknown difficulty name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown difficulty '{0}', expected easy, medium or hard")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// One puzzle: two images and the regions where they differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSet {
    pub id: u32,
    pub image1: String,
    pub image2: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub differences: Vec<DifferenceRegion>,
}

impl PuzzleSet {
    /// Set with the conventional `images/set{id}/image{1,2}.png` paths and
    /// the `default` tag.
    pub fn new(id: u32, differences: Vec<DifferenceRegion>, difficulty: Difficulty) -> Self {
        Self {
            id,
            image1: format!("images/set{}/image1.png", id),
            image2: format!("images/set{}/image2.png", id),
            tags: vec!["default".to_string()],
            difficulty,
            differences,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Outcome of [`Catalog::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    Replaced,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub sets: Vec<PuzzleSet>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<&PuzzleSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Replace the set with the same id in place, or append it and keep the
    /// sets sorted by id.
    pub fn upsert(&mut self, set: PuzzleSet) -> Upsert {
        if let Some(existing) = self.sets.iter_mut().find(|s| s.id == set.id) {
            tracing::info!(id = set.id, "Set already exists, replacing");
            *existing = set;
            return Upsert::Replaced;
        }

        tracing::info!(id = set.id, "Adding new set");
        self.sets.push(set);
        self.sets.sort_by_key(|s| s.id);
        Upsert::Added
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty JSON with 4-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(out).expect("serde_json emits valid UTF-8"))
    }
}

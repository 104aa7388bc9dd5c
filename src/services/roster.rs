use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::{Profile, ProfileId};

/// Errors that can occur when loading the roster
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read roster file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static candidate pool loaded from a JSON array of profiles
#[derive(Debug, Clone, Default)]
pub struct Roster {
    profiles: Vec<Profile>,
}

impl Roster {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the roster from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let roster = Self::from_json(&raw)?;

        tracing::debug!(
            "Loaded {} profiles from {}",
            roster.len(),
            path.as_ref().display()
        );

        Ok(roster)
    }

    pub fn from_json(raw: &str) -> Result<Self, RosterError> {
        let profiles: Vec<Profile> = serde_json::from_str(raw)?;
        Ok(Self { profiles })
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn find(&self, id: &ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

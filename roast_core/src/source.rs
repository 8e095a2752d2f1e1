//! Seams for fetching roasts and goal definitions.
//!
//! The engine never does I/O; callers implement these over files, databases
//! or fixtures.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::goals::GoalDefinition;
use crate::snapshot::RoastSnapshot;

pub trait ProfileSource {
    /// Load the roast identified by `key`.
    fn fetch(&self, key: &str) -> Result<RoastSnapshot>;
}

pub trait GoalSource {
    fn goals(&self) -> Vec<GoalDefinition>;
}

/// In-memory roasts keyed by name.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    roasts: BTreeMap<String, RoastSnapshot>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, snap: RoastSnapshot) {
        self.roasts.insert(key.into(), snap);
    }
}

impl ProfileSource for MemorySource {
    fn fetch(&self, key: &str) -> Result<RoastSnapshot> {
        self.roasts
            .get(key)
            .cloned()
            .ok_or_else(|| eyre::eyre!("no roast named '{key}'"))
    }
}

impl GoalSource for Vec<GoalDefinition> {
    fn goals(&self) -> Vec<GoalDefinition> {
        self.clone()
    }
}

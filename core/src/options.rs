//! Run options — the caller-supplied configuration for one allocation
//! run, validated once before any data is touched.

use crate::{
    error::{AllocError, AllocResult},
    types::Activity,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_INTERVAL: i64 = 30;

/// Allocation strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Cover the slot file's imbalance, supergroup by supergroup.
    ByDelta,
    /// Redirect every matching omni agent for its whole recorded interval.
    Mass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Skill groups to keep from the activity file. Must be non-empty.
    pub skill_groups: Vec<String>,
    pub strategy: Strategy,
    /// Minimum overlap (minutes) for the full candidate tier. By-delta only.
    #[serde(default = "default_min_interval")]
    pub min_interval: i64,
    /// Allow any positive overlap to count toward a remainder need.
    #[serde(default)]
    pub partial_coverage: bool,
    /// Target activity for the mass strategy. Required when strategy = mass.
    #[serde(default)]
    pub mass_activity: Option<Activity>,
}

fn default_min_interval() -> i64 {
    DEFAULT_MIN_INTERVAL
}

impl RunOptions {
    pub fn by_delta(skill_groups: Vec<String>, min_interval: i64, partial_coverage: bool) -> Self {
        Self {
            skill_groups,
            strategy: Strategy::ByDelta,
            min_interval,
            partial_coverage,
            mass_activity: None,
        }
    }

    pub fn mass(skill_groups: Vec<String>, mass_activity: Activity) -> Self {
        Self {
            skill_groups,
            strategy: Strategy::Mass,
            min_interval: DEFAULT_MIN_INTERVAL,
            partial_coverage: false,
            mass_activity: Some(mass_activity),
        }
    }

    pub fn validate(&self) -> AllocResult<()> {
        if self.skill_groups.iter().all(|s| s.trim().is_empty()) {
            return Err(AllocError::EmptySkillGroups);
        }
        match self.strategy {
            Strategy::ByDelta if self.min_interval <= 0 => Err(AllocError::BadMinInterval),
            Strategy::Mass if self.mass_activity.is_none() => Err(AllocError::MissingMassActivity),
            _ => Ok(()),
        }
    }
}

//! Tunable weights for scoring and the merge tie-break policy.

use crate::error::{Result, TaskError};
use crate::sync::Reconciler;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which side keeps its scalar fields when both copies share an `updated_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    PreferRemote,
    PreferLocal,
}

/// Weights used to compute an importance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Multiplied by the priority code (1-4)
    pub priority_weight: f64,
    /// Added when the due date is at or before now
    pub overdue_boost: f64,
    /// Added when the due date falls within `due_soon_hours`
    pub due_soon_boost: f64,
    pub due_soon_hours: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            priority_weight: 10.0,
            overdue_boost: 15.0,
            due_soon_boost: 8.0,
            due_soon_hours: 48,
        }
    }
}

/// Library configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringWeights,
    pub tie_break: TieBreak,
}

impl Config {
    /// Load and validate a JSON config file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("priority_weight", self.scoring.priority_weight),
            ("overdue_boost", self.scoring.overdue_boost),
            ("due_soon_boost", self.scoring.due_soon_boost),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(TaskError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        // Priorities must map to distinct scores
        if self.scoring.priority_weight == 0.0 {
            return Err(TaskError::InvalidConfig(
                "priority_weight must be greater than zero".to_string(),
            ));
        }
        if self.scoring.due_soon_hours <= 0 {
            return Err(TaskError::InvalidConfig(format!(
                "due_soon_hours must be positive, got {}",
                self.scoring.due_soon_hours
            )));
        }
        if TimeDelta::try_hours(self.scoring.due_soon_hours).is_none() {
            return Err(TaskError::InvalidConfig(format!(
                "due_soon_hours is out of range, got {}",
                self.scoring.due_soon_hours
            )));
        }
        Ok(())
    }

    pub fn scoring(&self) -> ScoringWeights {
        self.scoring
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.tie_break)
    }
}

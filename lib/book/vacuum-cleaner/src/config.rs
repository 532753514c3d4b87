/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Run parameters, loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agents::AgentKind;
use crate::scoring::ScoringConfig;
use crate::vacuum_world::check_grid_size;
use crate::VacuumError;

/// Parameters of a run. Missing keys in a TOML file fall back to the defaults.
///
/// ```toml
/// grid_size = 5
/// dirt_probability = 0.01
/// turns = 200
/// seed = 42
/// agent = "greedy"
///
/// [scoring]
/// idle_penalty = -20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid dimension N.
    pub grid_size: usize,

    /// Probability that a tile gets dirty in a turn.
    pub dirt_probability: f64,

    /// Number of turns in a run.
    pub turns: usize,

    /// Seed for dirt injection and initial placement. Unseeded runs draw from the OS.
    pub seed: Option<u64>,

    /// Agent program to run.
    pub agent: AgentKind,

    /// Performance measure.
    pub scoring: ScoringConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            dirt_probability: 0.01,
            turns: 200,
            seed: None,
            agent: AgentKind::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from TOML and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, VacuumError> {
        let config: SimulationConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VacuumError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Reject configurations a run cannot be made from.
    pub fn validate(&self) -> Result<(), VacuumError> {
        check_grid_size(self.grid_size)?;
        if !(0.0..=1.0).contains(&self.dirt_probability) {
            return Err(VacuumError::InvalidConfig(format!(
                "dirt_probability must be within [0, 1], got {}",
                self.dirt_probability
            )));
        }
        self.scoring.validate()
    }
}

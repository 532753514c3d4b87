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

//! Agent programs for the vacuum world.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::vacuum_world::{Action, CellState, GridWorld};
use crate::{Agent, VacuumError};

/// Reflex agent that sees the whole grid and heads for the nearest dirt.
///
/// With no dirt anywhere it keeps moving rather than idling, since a move is cheaper than a STAY.
#[derive(Debug, Default)]
pub struct GreedyAgent {}

impl GreedyAgent {
    /// Create a new greedy agent.
    pub fn new() -> Self {
        Self {}
    }
}

impl Agent for GreedyAgent {
    fn act(&mut self, world: &GridWorld) -> Action {
        if world.current_cell() == CellState::Dirty {
            return Action::Suck;
        }

        let here = world.agent();
        let dirty = world.dirty_positions();

        if dirty.is_empty() {
            let wander = Action::MOVES.into_iter().find(|&action| {
                here.neighbour(action, world.size())
                    .map_or(false, |n| matches!(world.cell(n), Ok(CellState::Clean)))
            });
            return wander.unwrap_or(Action::Stay);
        }

        // min_by_key keeps the first of equally close tiles, i.e. row-major scan order.
        let target = dirty
            .iter()
            .min_by_key(|p| p.manhattan_distance(&here));
        match target {
            Some(target) if target.row > here.row => Action::Down,
            Some(target) if target.row < here.row => Action::Up,
            Some(target) if target.col > here.col => Action::Right,
            Some(target) if target.col < here.col => Action::Left,
            _ => Action::Stay,
        }
    }
}

/// Baseline reflex agent that only reacts to dirt under it or right next to it.
#[derive(Debug, Default)]
pub struct LazyAgent {}

impl LazyAgent {
    /// Create a new lazy agent.
    pub fn new() -> Self {
        Self {}
    }
}

impl Agent for LazyAgent {
    fn act(&mut self, world: &GridWorld) -> Action {
        if world.current_cell() == CellState::Dirty {
            return Action::Suck;
        }
        let here = world.agent();
        Action::MOVES
            .into_iter()
            .find(|&action| {
                here.neighbour(action, world.size())
                    .map_or(false, |n| matches!(world.cell(n), Ok(CellState::Dirty)))
            })
            .unwrap_or(Action::Stay)
    }
}

/// Replays a fixed sequence of actions, then stays put.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    actions: Vec<Action>,
    next: usize,
}

impl ScriptedAgent {
    /// Create an agent that replays the given actions.
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, next: 0 }
    }

    /// Parse a script of action tokens separated by whitespace or commas, e.g. "UP, UP, SUCK".
    ///
    /// Every token is checked up front, an unknown one is an error instead of a silent STAY.
    pub fn parse(script: &str) -> Result<Self, VacuumError> {
        let actions = script
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(Action::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(actions))
    }

    /// Actions not yet replayed.
    pub fn remaining(&self) -> &[Action] {
        &self.actions[self.next..]
    }
}

impl Agent for ScriptedAgent {
    fn act(&mut self, _world: &GridWorld) -> Action {
        match self.actions.get(self.next) {
            Some(&action) => {
                self.next += 1;
                action
            }
            None => Action::Stay,
        }
    }
}

/// Which built-in agent program to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// [`GreedyAgent`].
    #[default]
    Greedy,
    /// [`LazyAgent`].
    Lazy,
}

impl AgentKind {
    /// Instantiate the agent program.
    pub fn build(&self) -> Box<dyn Agent> {
        match self {
            AgentKind::Greedy => Box::new(GreedyAgent::new()),
            AgentKind::Lazy => Box::new(LazyAgent::new()),
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Greedy => write!(f, "greedy"),
            AgentKind::Lazy => write!(f, "lazy"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = VacuumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" | "custom" => Ok(AgentKind::Greedy),
            "lazy" => Ok(AgentKind::Lazy),
            other => Err(VacuumError::InvalidConfig(format!("unknown agent: {}", other))),
        }
    }
}

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

//! The grid itself: dirt map, agent coordinate and the movement rules.

use std::str::FromStr;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{Rng, VacuumError};

/// A coordinate on the grid. Row 0 is the top row, column 0 the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Row, increasing downwards.
    pub row: usize,
    /// Column, increasing to the right.
    pub col: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// |Δrow| + |Δcol|.
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The neighbouring position in the direction of a movement action, if it is on a grid of
    /// the given size. Returns None for non-movement actions.
    pub fn neighbour(&self, action: Action, size: usize) -> Option<Position> {
        let (row, col) = match action {
            Action::Up => (self.row.checked_sub(1)?, self.col),
            Action::Down => (self.row + 1, self.col),
            Action::Left => (self.row, self.col.checked_sub(1)?),
            Action::Right => (self.row, self.col + 1),
            Action::Suck | Action::Stay => return None,
        };
        (row < size && col < size).then_some(Position { row, col })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cleanliness of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// No dirt.
    Clean,
    /// Dirt that the agent can suck up.
    Dirty,
}

/// Everything an agent can do in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Move one row towards row 0.
    Up,
    /// Move one row away from row 0.
    Down,
    /// Move one column towards column 0.
    Left,
    /// Move one column away from column 0.
    Right,
    /// Suck up the dirt on the current tile.
    Suck,
    /// Do nothing.
    Stay,
}

impl Action {
    /// Movement actions, in the order agents check neighbours.
    pub const MOVES: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Every action.
    pub const ALL: [Action; 6] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Suck,
        Action::Stay,
    ];

    /// True for UP, DOWN, LEFT and RIGHT.
    pub fn is_move(&self) -> bool {
        matches!(
            self,
            Action::Up | Action::Down | Action::Left | Action::Right
        )
    }

    /// The token used in scripts, configuration and logs.
    pub fn token(&self) -> &'static str {
        match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
            Action::Suck => "SUCK",
            Action::Stay => "STAY",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Action {
    type Err = VacuumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VacuumError::InvalidAction(s.to_string()))
    }
}

/// Largest supported grid dimension N.
pub const MAX_GRID_SIZE: usize = 1024;

/// Reject grid dimensions outside `1..=MAX_GRID_SIZE`.
pub fn check_grid_size(size: usize) -> Result<(), VacuumError> {
    if size == 0 || size > MAX_GRID_SIZE {
        return Err(VacuumError::InvalidConfig(format!(
            "grid size must be within [1, {}], got {}",
            MAX_GRID_SIZE, size
        )));
    }
    Ok(())
}

/// A square grid of tiles with a single agent on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    size: usize,
    cells: Vec<CellState>,
    agent: Position,
}

impl GridWorld {
    /// Create an all-clean grid with the agent at the given position.
    pub fn new(size: usize, agent: Position) -> Result<Self, VacuumError> {
        check_grid_size(size)?;
        let mut world = Self {
            size,
            cells: vec![CellState::Clean; size * size],
            agent: Position::new(0, 0),
        };
        world.place_agent(agent)?;
        Ok(world)
    }

    /// Create an all-clean grid with the agent at a uniformly random position.
    pub fn random(size: usize, rng: &mut Rng) -> Result<Self, VacuumError> {
        check_grid_size(size)?;
        let agent = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        Self::new(size, agent)
    }

    /// Grid dimension N. The grid has N*N tiles.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Where the agent currently is.
    pub fn agent(&self) -> Position {
        self.agent
    }

    fn index(&self, position: Position) -> Result<usize, VacuumError> {
        if position.row >= self.size || position.col >= self.size {
            return Err(VacuumError::OutOfBounds {
                row: position.row,
                col: position.col,
                size: self.size,
            });
        }
        Ok(position.row * self.size + position.col)
    }

    /// State of the tile at a position.
    pub fn cell(&self, position: Position) -> Result<CellState, VacuumError> {
        let index = self.index(position)?;
        Ok(self.cells[index])
    }

    /// Overwrite the state of the tile at a position.
    pub fn set_cell(&mut self, position: Position, state: CellState) -> Result<(), VacuumError> {
        let index = self.index(position)?;
        self.cells[index] = state;
        Ok(())
    }

    /// Move the agent to a position without going through the movement rules.
    pub fn place_agent(&mut self, position: Position) -> Result<(), VacuumError> {
        self.index(position)?;
        self.agent = position;
        Ok(())
    }

    /// State of the tile under the agent.
    pub fn current_cell(&self) -> CellState {
        // agent is always in bounds, see place_agent and apply.
        self.cells[self.agent.row * self.size + self.agent.col]
    }

    /// Clear the dirt under the agent. Returns true if there was dirt to clear.
    pub fn clean_current(&mut self) -> bool {
        let index = self.agent.row * self.size + self.agent.col;
        let was_dirty = self.cells[index] == CellState::Dirty;
        self.cells[index] = CellState::Clean;
        was_dirty
    }

    /// Every tile independently gets dirty with the given probability. Tiles that are already
    /// dirty stay dirty. Returns how many tiles went from clean to dirty.
    pub fn inject_dirt(&mut self, probability: f64, rng: &mut Rng) -> usize {
        let mut added = 0;
        for cell in self.cells.iter_mut() {
            // always draw, so that the random stream does not depend on the dirt map.
            let draw: f64 = rng.gen();
            if draw < probability && *cell == CellState::Clean {
                *cell = CellState::Dirty;
                added += 1;
            }
        }
        added
    }

    /// Apply the structural part of an action and return where the agent was before.
    ///
    /// A move off the edge of the grid leaves the agent where it is; the caller can tell by
    /// comparing the returned position with [`GridWorld::agent`]. SUCK does not clean here, the
    /// scoring policy needs to see the dirt first.
    pub fn apply(&mut self, action: Action) -> Position {
        let previous = self.agent;
        if let Some(next) = self.agent.neighbour(action, self.size) {
            self.agent = next;
        }
        previous
    }

    /// Number of dirty tiles.
    pub fn count_dirty(&self) -> usize {
        self.cells
            .iter()
            .filter(|&c| *c == CellState::Dirty)
            .count()
    }

    /// Positions of every dirty tile in row-major order.
    pub fn dirty_positions(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == CellState::Dirty)
            .map(|(i, _)| Position::new(i / self.size, i % self.size))
            .collect()
    }
}

// one row per line: '.' clean, '#' dirty, 'A' agent on a clean tile, '@' agent on dirt.
impl std::fmt::Display for GridWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity(self.size * (self.size * 2));
        for row in 0..self.size {
            for col in 0..self.size {
                let cell = self.cells[row * self.size + col];
                let c = match (Position::new(row, col) == self.agent, cell) {
                    (false, CellState::Clean) => '.',
                    (false, CellState::Dirty) => '#',
                    (true, CellState::Clean) => 'A',
                    (true, CellState::Dirty) => '@',
                };
                s.push(c);
                if col < self.size - 1 {
                    s.push(' ');
                }
            }
            if row < self.size - 1 {
                s.push('\n');
            }
        }
        write!(f, "{}", s)
    }
}

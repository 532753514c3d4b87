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

//! Performance measure.
//!
//! Every turn is scored by a fixed list of rules that are all evaluated against the single action
//! of the turn. Their deltas add up; none of them short-circuits the others.

use serde::{Deserialize, Serialize};

use crate::vacuum_world::{Action, GridWorld, Position};
use crate::{HashSet, Score, VacuumError};

/// Largest magnitude a configured reward or penalty may have.
pub const MAX_SCORE_CONSTANT: Score = 1_000_000;

/// Rewards and penalties. Fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Sucking up dirt.
    pub cleaned_tile: Score,
    /// Sucking on a clean tile.
    pub unnecessary_suck: Score,
    /// Any movement action, whether or not it succeeded.
    pub move_penalty: Score,
    /// Movement into the edge of the grid, on top of the move penalty.
    pub out_of_bounds_attempt: Score,
    /// Every third consecutive successful clean.
    pub consecutive_cleans_bonus: Score,
    /// STAY.
    pub idle_penalty: Score,
    /// First time the agent stands on a tile.
    pub explored_new_tile: Score,
    /// Charged once at the end of the run for every tile that is still dirty.
    pub penalty_per_remaining_dirty_tile: Score,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let cleaned_tile = 200;
        Self {
            cleaned_tile,
            unnecessary_suck: -3 * cleaned_tile,
            move_penalty: -10,
            out_of_bounds_attempt: -500,
            consecutive_cleans_bonus: 400,
            idle_penalty: -20,
            explored_new_tile: 10,
            penalty_per_remaining_dirty_tile: -200,
        }
    }
}

impl ScoringConfig {
    /// Reject constants whose magnitude exceeds [`MAX_SCORE_CONSTANT`].
    pub fn validate(&self) -> Result<(), VacuumError> {
        let constants = [
            ("cleaned_tile", self.cleaned_tile),
            ("unnecessary_suck", self.unnecessary_suck),
            ("move_penalty", self.move_penalty),
            ("out_of_bounds_attempt", self.out_of_bounds_attempt),
            ("consecutive_cleans_bonus", self.consecutive_cleans_bonus),
            ("idle_penalty", self.idle_penalty),
            ("explored_new_tile", self.explored_new_tile),
            (
                "penalty_per_remaining_dirty_tile",
                self.penalty_per_remaining_dirty_tile,
            ),
        ];
        match constants
            .iter()
            .find(|(_, value)| value.unsigned_abs() > MAX_SCORE_CONSTANT.unsigned_abs())
        {
            Some((name, value)) => Err(VacuumError::InvalidConfig(format!(
                "scoring.{} must be within [-{max}, {max}], got {}",
                name,
                value,
                max = MAX_SCORE_CONSTANT
            ))),
            None => Ok(()),
        }
    }
}

/// A rule of the performance measure that can fire in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringRule {
    /// SUCK on a dirty tile.
    CleanedTile,
    /// SUCK on a clean tile.
    UnnecessarySuck,
    /// Any movement action.
    MovePenalty,
    /// Movement that was blocked by the edge of the grid.
    OutOfBoundsAttempt,
    /// A streak of successful cleans reached a multiple of three.
    ConsecutiveCleansBonus,
    /// STAY.
    IdlePenalty,
    /// The agent is on a tile it has never been on before.
    ExploredNewTile,
}

impl ScoringRule {
    /// Name used in the per-turn log.
    pub fn name(&self) -> &'static str {
        match self {
            ScoringRule::CleanedTile => "CLEANED_TILE",
            ScoringRule::UnnecessarySuck => "UNNECESSARY_SUCK",
            ScoringRule::MovePenalty => "MOVE_PENALTY",
            ScoringRule::OutOfBoundsAttempt => "OUT_OF_BOUNDS_ATTEMPT",
            ScoringRule::ConsecutiveCleansBonus => "CONSECUTIVE_CLEANS_BONUS",
            ScoringRule::IdlePenalty => "IDLE_PENALTY",
            ScoringRule::ExploredNewTile => "EXPLORED_NEW_TILE",
        }
    }
}

/// The rules that fired in one turn, in evaluation order, with their deltas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Rule and the delta it contributed.
    pub entries: Vec<(ScoringRule, Score)>,
}

impl ScoreBreakdown {
    fn push(&mut self, rule: ScoringRule, delta: Score) {
        self.entries.push((rule, delta));
    }

    /// Sum of all deltas.
    pub fn total(&self) -> Score {
        self.entries
            .iter()
            .fold(0, |total: Score, (_, delta)| total.saturating_add(*delta))
    }

    /// Whether a rule fired.
    pub fn fired(&self, rule: ScoringRule) -> bool {
        self.entries.iter().any(|(r, _)| *r == rule)
    }
}

// e.g. "CLEANED_TILE +200 | EXPLORED_NEW_TILE +10"
impl std::fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (rule, delta)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{} {:+}", rule.name(), delta)?;
        }
        Ok(())
    }
}

/// Bookkeeping that lives as long as one run: tiles visited, the current streak of successful
/// cleans, and the running score.
#[derive(Debug, Clone, Default)]
pub struct Episode {
    visited: HashSet<Position>,
    streak: u32,
    score: Score,
}

impl Episode {
    /// Fresh episode: nothing visited, no streak, score zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiles the agent has stood on after any scored turn.
    pub fn visited(&self) -> &HashSet<Position> {
        &self.visited
    }

    /// Consecutive successful cleans so far.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Sum of all turn deltas so far.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Add a turn delta to the running score.
    pub fn accumulate(&mut self, delta: Score) {
        self.score = self.score.saturating_add(delta);
    }
}

/// Scores turns according to a [`ScoringConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScoringPolicy {
    config: ScoringConfig,
}

impl ScoringPolicy {
    /// Create a policy with the given constants.
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Constants this policy scores with.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one turn.
    ///
    /// `world` must already reflect the movement of `action` (see [`GridWorld::apply`]) and
    /// `previous` is where the agent stood before it. For SUCK on a dirty tile this is where the
    /// tile gets cleaned. The streak and the visited tiles in `episode` are updated; its score is
    /// not, the caller accumulates the returned total.
    pub fn score(
        &self,
        episode: &mut Episode,
        world: &mut GridWorld,
        action: Action,
        previous: Position,
    ) -> ScoreBreakdown {
        let c = &self.config;
        let mut breakdown = ScoreBreakdown::default();

        let mut cleaned = false;
        if action == Action::Suck {
            if world.clean_current() {
                cleaned = true;
                breakdown.push(ScoringRule::CleanedTile, c.cleaned_tile);
            } else {
                breakdown.push(ScoringRule::UnnecessarySuck, c.unnecessary_suck);
            }
        }

        if action.is_move() {
            breakdown.push(ScoringRule::MovePenalty, c.move_penalty);
            if world.agent() == previous {
                breakdown.push(ScoringRule::OutOfBoundsAttempt, c.out_of_bounds_attempt);
            }
        }

        if cleaned {
            episode.streak += 1;
            if episode.streak % 3 == 0 {
                breakdown.push(ScoringRule::ConsecutiveCleansBonus, c.consecutive_cleans_bonus);
            }
        } else {
            episode.streak = 0;
        }

        if action == Action::Stay {
            breakdown.push(ScoringRule::IdlePenalty, c.idle_penalty);
        }

        if episode.visited.insert(world.agent()) {
            breakdown.push(ScoringRule::ExploredNewTile, c.explored_new_tile);
        }

        breakdown
    }

    /// One-time penalty for the tiles still dirty when the run ends.
    pub fn end_penalty(&self, remaining_dirty: usize) -> Score {
        let remaining = Score::try_from(remaining_dirty).unwrap_or(Score::MAX);
        self.config
            .penalty_per_remaining_dirty_tile
            .saturating_mul(remaining)
    }
}

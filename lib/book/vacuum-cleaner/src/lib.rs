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

#![warn(missing_docs)]

//! Vacuum-cleaner world.
//!
//! A reflex agent moves around a square grid that stochastically gets dirty. Every turn the
//! environment injects dirt, the agent picks an action, the world applies it and a configurable
//! performance measure scores it. At the end of the run every tile that is still dirty costs a
//! fixed penalty.
//
// PEAS - Performance, Environment, Action, Sensing
//
// See:
// -  Chapter 2: Intelligent Agents, page 40

pub mod agents;
pub mod config;
pub mod error;
pub mod scoring;
pub mod simulation;
pub mod vacuum_world;

pub use agents::{AgentKind, GreedyAgent, LazyAgent, ScriptedAgent};
pub use config::SimulationConfig;
pub use error::VacuumError;
pub use scoring::{Episode, ScoreBreakdown, ScoringConfig, ScoringPolicy, ScoringRule};
pub use simulation::{Observer, Report, RunState, Simulation, TurnRecord};
pub use vacuum_world::{Action, CellState, GridWorld, Position};

/// Scores are signed; penalties are negative deltas.
pub type Score = i64;

/// Random number generator used for dirt injection and initial placement.
pub type Rng = rand_pcg::Pcg64;

/// Hash set used for bookkeeping such as the visited tiles.
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

/// An Agent acts in a Performance, Environment, Action, Sensing (PEAS) cycle.
/// For the current state of the world, the Agent will return an Action.
///
/// The reference agents observe the whole grid and keep no state of their own. Implementations
/// that replay a script need `&mut self` to advance through it.
///
/// Notice that the Agent only reads the world. Cleaning, moving and scoring are done by the
/// simulation after the Agent has decided.
pub trait Agent {
    /// Choose the next action.
    fn act(&mut self, world: &GridWorld) -> Action;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn act(&mut self, world: &GridWorld) -> Action {
        (**self).act(world)
    }
}

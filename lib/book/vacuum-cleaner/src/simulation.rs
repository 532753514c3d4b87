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

//! Runs a single Agent in the vacuum world for a fixed number of turns.

use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::SimulationConfig;
use crate::scoring::{Episode, ScoreBreakdown, ScoringPolicy};
use crate::vacuum_world::{Action, GridWorld, Position};
use crate::{Agent, Rng, Score, VacuumError};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Constructed, world not initialised yet.
    NotStarted,
    /// Turns are being played.
    Running,
    /// All turns played, ready for the final accounting.
    Finished,
}

/// What happened in one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 1-based turn number.
    pub turn: usize,
    /// Tiles that got dirty at the start of the turn.
    pub dirt_added: usize,
    /// What the agent did.
    pub action: Action,
    /// Agent position before the action.
    pub previous: Position,
    /// Agent position after the action.
    pub position: Position,
    /// Score delta of the turn.
    pub delta: Score,
    /// Rules that made up the delta.
    pub breakdown: ScoreBreakdown,
}

/// Final accounting of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Seed the run was played with. Replaying it gives the same report.
    pub seed: u64,
    /// Grid dimension.
    pub grid_size: usize,
    /// Turns played.
    pub turns: usize,
    /// Sum of all turn deltas.
    pub total_before_penalty: Score,
    /// Dirty tiles when the run ended.
    pub remaining_dirty: usize,
    /// Penalty charged for the remaining dirty tiles.
    pub end_penalty: Score,
    /// `total_before_penalty + end_penalty`.
    pub final_score: Score,
    /// Every turn, in order.
    pub turn_log: Vec<TurnRecord>,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total Score: {}", self.total_before_penalty)?;
        writeln!(f, "Dirty tiles left: {}", self.remaining_dirty)?;
        writeln!(f, "Penalty for left dirty tiles: {}", self.end_penalty)?;
        write!(f, "Final Score: {}", self.final_score)
    }
}

/// Watches a run, e.g. to draw it. Called once per turn after the action has been applied and
/// scored. Only gets to read the world.
pub trait Observer {
    /// A turn has been played.
    fn observe(&mut self, record: &TurnRecord, world: &GridWorld);
}

impl<F> Observer for F
where
    F: FnMut(&TurnRecord, &GridWorld),
{
    fn observe(&mut self, record: &TurnRecord, world: &GridWorld) {
        self(record, world)
    }
}

/// A Simulation runs a single Agent for a fixed number of turns. Each turn dirt is injected, the
/// Agent decides, the world applies the action and the scoring policy scores it. The score is
/// continually kept up to date.
///
/// The Simulation owns the world and all of the run's bookkeeping, so independent runs do not
/// share any state.
pub struct Simulation<_Agent>
where
    _Agent: Agent,
{
    config: SimulationConfig,
    agent: _Agent,
    scoring: ScoringPolicy,
    state: RunState,
    world: GridWorld,
    episode: Episode,
    rng: Rng,
    seed: u64,
    turn: usize,
    turn_log: Vec<TurnRecord>,
}

impl<_Agent> Simulation<_Agent>
where
    _Agent: Agent,
{
    /// Create a simulation. The configuration is validated and then fixed for every run.
    pub fn new(config: SimulationConfig, agent: _Agent) -> Result<Self, VacuumError> {
        config.validate()?;
        let world = GridWorld::new(config.grid_size, Position::new(0, 0))?;
        let scoring = ScoringPolicy::new(config.scoring);
        Ok(Self {
            config,
            agent,
            scoring,
            state: RunState::NotStarted,
            world,
            episode: Episode::new(),
            rng: Rng::seed_from_u64(0),
            seed: 0,
            turn: 0,
            turn_log: Vec::new(),
        })
    }

    fn reseed(&mut self) {
        self.seed = self.config.seed.unwrap_or_else(rand::random);
        self.rng = Rng::seed_from_u64(self.seed);
    }

    /// Start a run: clean grid, agent at a random position, empty bookkeeping.
    pub fn start(&mut self) -> Result<(), VacuumError> {
        self.reseed();
        let world = GridWorld::random(self.config.grid_size, &mut self.rng)?;
        self.begin(world);
        Ok(())
    }

    /// Start a run with the agent at a chosen position.
    pub fn start_at(&mut self, position: Position) -> Result<(), VacuumError> {
        let world = GridWorld::new(self.config.grid_size, position)?;
        self.reseed();
        self.begin(world);
        Ok(())
    }

    fn begin(&mut self, world: GridWorld) {
        self.world = world;
        self.episode = Episode::new();
        self.turn = 0;
        self.turn_log.clear();
        self.state = if self.config.turns == 0 {
            RunState::Finished
        } else {
            RunState::Running
        };
        info!(
            seed = self.seed,
            grid_size = self.config.grid_size,
            dirt_probability = self.config.dirt_probability,
            turns = self.config.turns,
            start = %self.world.agent(),
            "starting run"
        );
    }

    /// Play one turn.
    pub fn step(&mut self) -> Result<TurnRecord, VacuumError> {
        if self.state != RunState::Running {
            return Err(VacuumError::InvalidState(self.state));
        }

        let dirt_added = self
            .world
            .inject_dirt(self.config.dirt_probability, &mut self.rng);
        trace!(dirt_added, dirty = self.world.count_dirty(), "injected dirt");

        let action = self.agent.act(&self.world);
        let previous = self.world.apply(action);
        let breakdown = self
            .scoring
            .score(&mut self.episode, &mut self.world, action, previous);
        let delta = breakdown.total();
        self.episode.accumulate(delta);
        self.turn += 1;

        debug!(
            turn = self.turn,
            %action,
            delta,
            score = self.episode.score(),
            "{}",
            breakdown
        );

        let record = TurnRecord {
            turn: self.turn,
            dirt_added,
            action,
            previous,
            position: self.world.agent(),
            delta,
            breakdown,
        };
        self.turn_log.push(record.clone());

        if self.turn >= self.config.turns {
            self.state = RunState::Finished;
        }
        Ok(record)
    }

    /// End-of-run accounting. Only available once every turn has been played.
    pub fn finish(&self) -> Result<Report, VacuumError> {
        if self.state != RunState::Finished {
            return Err(VacuumError::InvalidState(self.state));
        }
        let remaining_dirty = self.world.count_dirty();
        let end_penalty = self.scoring.end_penalty(remaining_dirty);
        let total_before_penalty = self.episode.score();
        let report = Report {
            seed: self.seed,
            grid_size: self.config.grid_size,
            turns: self.turn,
            total_before_penalty,
            remaining_dirty,
            end_penalty,
            final_score: total_before_penalty.saturating_add(end_penalty),
            turn_log: self.turn_log.clone(),
        };
        info!(
            total = report.total_before_penalty,
            remaining_dirty = report.remaining_dirty,
            end_penalty = report.end_penalty,
            final_score = report.final_score,
            "run finished"
        );
        Ok(report)
    }

    /// Play a whole run and return its report.
    pub fn run(&mut self) -> Result<Report, VacuumError> {
        self.run_with_observer(&mut |_: &TurnRecord, _: &GridWorld| {})
    }

    /// Play a whole run, showing every turn to the observer.
    ///
    /// A run that is already in progress, e.g. after [`Simulation::start_at`], is continued.
    /// Otherwise a new run is started.
    pub fn run_with_observer(
        &mut self,
        observer: &mut dyn Observer,
    ) -> Result<Report, VacuumError> {
        if self.state != RunState::Running {
            self.start()?;
        }
        while self.state == RunState::Running {
            let record = self.step()?;
            observer.observe(&record, &self.world);
        }
        self.finish()
    }

    /// Lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current world. Before the first start this is an empty placeholder grid.
    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Bookkeeping of the current run.
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Turns played so far.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Seed of the current run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration every run uses.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentKind, GreedyAgent, LazyAgent, ScriptedAgent};
    use crate::vacuum_world::CellState;

    fn config(grid_size: usize, dirt_probability: f64, turns: usize) -> SimulationConfig {
        SimulationConfig {
            grid_size,
            dirt_probability,
            turns,
            seed: Some(42),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_staying_on_a_clean_grid() {
        let agent = ScriptedAgent::parse("STAY STAY STAY STAY STAY").expect("parse failed");
        let mut simulation = Simulation::new(config(5, 0.0, 5), agent).expect("new failed");
        simulation
            .start_at(Position::new(2, 2))
            .expect("start failed");

        let report = simulation.run().expect("run failed");
        assert_eq!(report.turns, 5);
        assert_eq!(report.total_before_penalty, -90);
        assert_eq!(report.remaining_dirty, 0);
        assert_eq!(report.end_penalty, 0);
        assert_eq!(report.final_score, -90);
        assert!(report.turn_log.iter().all(|r| r.delta == -20 || r.turn == 1));
        assert_eq!(report.turn_log[0].delta, -10);
    }

    #[test]
    fn test_remaining_dirt_is_penalised_at_the_end() {
        let mut simulation =
            Simulation::new(config(5, 1.0, 1), ScriptedAgent::default()).expect("new failed");
        let report = simulation.run().expect("run failed");
        assert_eq!(report.turn_log[0].dirt_added, 25);
        assert_eq!(report.total_before_penalty, -10);
        assert_eq!(report.remaining_dirty, 25);
        assert_eq!(report.end_penalty, -5000);
        assert_eq!(report.final_score, -5010);
    }

    #[test]
    fn test_same_seed_same_run() {
        let play = || {
            let mut simulation =
                Simulation::new(config(5, 0.1, 200), GreedyAgent::new()).expect("new failed");
            simulation.run().expect("run failed")
        };
        let a = play();
        let b = play();
        assert_eq!(a, b);
        assert_eq!(a.seed, 42);
        assert_eq!(a.turn_log.len(), 200);
    }

    #[test]
    fn test_unseeded_run_reports_its_seed() {
        let mut unseeded = config(5, 0.2, 50);
        unseeded.seed = None;
        let mut simulation = Simulation::new(unseeded.clone(), GreedyAgent::new()).expect("new failed");
        let first = simulation.run().expect("run failed");

        unseeded.seed = Some(first.seed);
        let mut replay = Simulation::new(unseeded, GreedyAgent::new()).expect("new failed");
        assert_eq!(replay.run().expect("run failed"), first);
    }

    #[test]
    fn test_total_is_sum_of_turn_deltas() {
        let mut simulation =
            Simulation::new(config(5, 0.05, 200), AgentKind::Lazy.build()).expect("new failed");
        let report = simulation.run().expect("run failed");
        let sum: Score = report.turn_log.iter().map(|r| r.delta).sum();
        assert_eq!(report.total_before_penalty, sum);
        assert_eq!(simulation.episode().score(), sum);
        assert_eq!(
            report.final_score,
            sum - 200 * report.remaining_dirty as Score
        );
    }

    #[test]
    fn test_lazy_agent_idles_on_clean_grid() {
        let mut simulation =
            Simulation::new(config(5, 0.0, 200), LazyAgent::new()).expect("new failed");
        let report = simulation.run().expect("run failed");
        assert_eq!(report.final_score, 200 * -20 + 10);
    }

    #[test]
    fn test_greedy_agent_cleans_up() {
        let mut simulation =
            Simulation::new(config(5, 0.05, 200), GreedyAgent::new()).expect("new failed");
        let report = simulation.run().expect("run failed");
        assert!(report
            .turn_log
            .iter()
            .all(|r| !r.breakdown.fired(crate::ScoringRule::OutOfBoundsAttempt)));
        assert!(report
            .turn_log
            .iter()
            .all(|r| !r.breakdown.fired(crate::ScoringRule::UnnecessarySuck)));
    }

    #[test]
    fn test_observer_sees_every_turn_after_scoring() {
        let mut simulation =
            Simulation::new(config(4, 0.2, 30), GreedyAgent::new()).expect("new failed");
        let mut seen = 0;
        let mut observer = |record: &TurnRecord, world: &GridWorld| {
            seen += 1;
            assert_eq!(record.turn, seen);
            assert_eq!(world.agent(), record.position);
            if record.action == Action::Suck {
                assert_eq!(world.current_cell(), CellState::Clean);
            }
        };
        let report = simulation
            .run_with_observer(&mut observer)
            .expect("run failed");
        assert_eq!(seen, 30);
        assert_eq!(report.turns, 30);
    }

    #[test]
    fn test_lifecycle() {
        let mut simulation =
            Simulation::new(config(3, 0.0, 2), ScriptedAgent::default()).expect("new failed");
        assert_eq!(simulation.state(), RunState::NotStarted);
        assert!(matches!(
            simulation.step(),
            Err(VacuumError::InvalidState(RunState::NotStarted))
        ));

        simulation.start().expect("start failed");
        assert_eq!(simulation.state(), RunState::Running);
        assert!(matches!(
            simulation.finish(),
            Err(VacuumError::InvalidState(RunState::Running))
        ));

        simulation.step().expect("step failed");
        simulation.step().expect("step failed");
        assert_eq!(simulation.state(), RunState::Finished);
        assert_eq!(simulation.turn(), 2);
        assert!(matches!(
            simulation.step(),
            Err(VacuumError::InvalidState(RunState::Finished))
        ));
        assert!(simulation.finish().is_ok());

        // starting again resets the bookkeeping.
        simulation.start().expect("start failed");
        assert_eq!(simulation.turn(), 0);
        assert_eq!(simulation.episode().score(), 0);
        assert!(simulation.episode().visited().is_empty());
    }

    #[test]
    fn test_zero_turns() {
        let mut simulation =
            Simulation::new(config(3, 0.5, 0), GreedyAgent::new()).expect("new failed");
        let report = simulation.run().expect("run failed");
        assert_eq!(report.turns, 0);
        assert_eq!(report.final_score, 0);
    }

    #[test]
    fn test_invalid_config_and_start() {
        assert!(matches!(
            Simulation::new(config(0, 0.0, 1), GreedyAgent::new()),
            Err(VacuumError::InvalidConfig(_))
        ));
        let mut simulation =
            Simulation::new(config(3, 0.0, 1), GreedyAgent::new()).expect("new failed");
        assert!(matches!(
            simulation.start_at(Position::new(3, 1)),
            Err(VacuumError::OutOfBounds { .. })
        ));
        assert_eq!(simulation.state(), RunState::NotStarted);
    }

    #[test]
    fn test_report_serializes() {
        let mut simulation =
            Simulation::new(config(3, 0.0, 1), ScriptedAgent::default()).expect("new failed");
        simulation
            .start_at(Position::new(0, 0))
            .expect("start failed");
        let report = simulation.run().expect("run failed");
        let json = serde_json::to_value(&report).expect("serialize failed");
        assert_eq!(json["final_score"], -10);
        assert_eq!(json["turn_log"][0]["action"], "STAY");
        assert_eq!(
            format!("{}", report),
            "Total Score: -10\nDirty tiles left: 0\nPenalty for left dirty tiles: 0\nFinal Score: -10"
        );
    }
}

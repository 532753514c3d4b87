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

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vacuum_cleaner::{
    Agent, AgentKind, GridWorld, Report, ScriptedAgent, Simulation, SimulationConfig, TurnRecord,
};

// Chapter 2 Intelligent Agents Exercise 11, on an NxN grid that keeps getting dirty.
//
// Runs one episode headless and prints the final accounting. Flags override values from the
// configuration file, which in turn override the defaults.
#[derive(Debug, Parser)]
#[command(name = "vacuum-world", version, about = "Run a reflex agent in the vacuum world")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid dimension N.
    #[arg(long)]
    grid_size: Option<usize>,

    /// Probability that a tile gets dirty in a turn.
    #[arg(long)]
    dirt_probability: Option<f64>,

    /// Number of turns.
    #[arg(long)]
    turns: Option<usize>,

    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Agent program: greedy or lazy.
    #[arg(long)]
    agent: Option<AgentKind>,

    /// Replay these actions instead of running an agent program, e.g. "UP,UP,SUCK".
    #[arg(long, conflicts_with = "agent")]
    script: Option<String>,

    /// Draw the grid after every turn.
    #[arg(long)]
    render: bool,

    /// Pause between turns when drawing, in milliseconds.
    #[arg(long, default_value_t = 0, requires = "render")]
    delay_ms: u64,

    /// Print the report, including every turn, as JSON.
    #[arg(long, conflicts_with = "render")]
    json: bool,
}

fn build_config(args: &Args) -> anyhow::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(grid_size) = args.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(dirt_probability) = args.dirt_probability {
        config.dirt_probability = dirt_probability;
    }
    if let Some(turns) = args.turns {
        config.turns = turns;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(agent) = args.agent {
        config.agent = agent;
    }
    config.validate()?;
    Ok(config)
}

fn play<A: Agent>(config: SimulationConfig, agent: A, args: &Args) -> anyhow::Result<Report> {
    let mut simulation = Simulation::new(config, agent)?;
    if !args.render {
        return Ok(simulation.run()?);
    }

    let delay = Duration::from_millis(args.delay_ms);
    let mut renderer = |record: &TurnRecord, world: &GridWorld| {
        println!(
            "turn {}: {} {:+} [{}]",
            record.turn, record.action, record.delta, record.breakdown
        );
        println!("{}\n", world);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    };
    Ok(simulation.run_with_observer(&mut renderer)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let report = match &args.script {
        Some(script) => {
            let agent = ScriptedAgent::parse(script).context("parsing --script")?;
            play(config, agent, &args)?
        }
        None => {
            let agent = config.agent.build();
            play(config, agent, &args)?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

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

//! Errors raised by the vacuum world.

use crate::simulation::RunState;

/// Vacuum world error.
///
/// These are programmer errors: a misconfigured run, a policy emitting a token that is not an
/// action, or a coordinate outside of the grid. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum VacuumError {
    /// Token is not one of UP, DOWN, LEFT, RIGHT, SUCK, STAY.
    #[error("invalid action: {0:?}")]
    InvalidAction(String),

    /// Coordinate is outside of the grid.
    #[error("position ({row}, {col}) is out of bounds for a {size}x{size} grid")]
    OutOfBounds {
        /// Row that was requested.
        row: usize,
        /// Column that was requested.
        col: usize,
        /// Grid dimension.
        size: usize,
    },

    /// Configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation is not allowed in the current state of the run.
    #[error("operation not allowed while simulation is {0:?}")]
    InvalidState(RunState),

    /// Configuration file could not be parsed.
    #[error("could not parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

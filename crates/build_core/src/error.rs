//! Error types for the scheduling engine.
//!
//! Scheduling infeasibility is not an error: it is reported through
//! [`crate::availability::Availability`]. The variants here are either
//! broken invariants inside the engine, bad input data, or the terminal
//! failure of a build order that can not be scheduled at all.

use thiserror::Error;

use crate::math::Time;

/// Result type alias using [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;

/// Top-level error type for the engine.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A worker count on a mineral patch or extraction point would drop below zero.
    #[error("Cannot take {requested} workers off a {site} with {available}")]
    NegativeWorkers {
        /// "base" or "extraction point".
        site: &'static str,
        /// Workers requested.
        requested: i32,
        /// Workers present.
        available: i32,
    },

    /// Gas workers were moved while no extraction point exists.
    #[error("Cannot assign gas workers without an extraction point")]
    NoExtractor,

    /// Mineral workers were moved while no base exists.
    #[error("Cannot assign mineral workers without a base")]
    NoBase,

    /// A transfer needs at least two sources.
    #[error("Cannot transfer workers, there is only one {0}")]
    NothingToTransferFrom(&'static str),

    /// A base or extraction point completed that was never started.
    #[error("No {0} under construction to complete")]
    NothingToComplete(&'static str),

    /// Larvae were drawn while no hatchery had any.
    #[error("No larva available at {time}")]
    NoLarvaAvailable {
        /// Time of the draw.
        time: Time,
    },

    /// Energy was drawn while no caster could afford it.
    #[error("No {caster} with {energy} energy available at {time}")]
    NoCasterAvailable {
        /// Caster name.
        caster: String,
        /// Energy requested.
        energy: i32,
        /// Time of the draw.
        time: Time,
    },

    /// No production queue of the requested kinds is free.
    #[error("No production queue available at {time} for {types}")]
    NoQueueAvailable {
        /// Queue type names.
        types: String,
        /// Time of the request.
        time: Time,
    },

    /// A subsystem was asked to move backwards in time.
    #[error("Cannot update {subsystem} to {requested}, it was last updated at {last}")]
    TimeTravel {
        /// Subsystem name.
        subsystem: &'static str,
        /// Requested time.
        requested: Time,
        /// Time of the last update.
        last: Time,
    },

    /// An object identifier is not in the catalog.
    #[error("Unknown object: {0}")]
    UnknownObject(String),

    /// A job descriptor is malformed.
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// A cancel job found no recurring job to cancel.
    #[error("There is no recurring job building {0} to cancel")]
    NothingToCancel(String),

    /// The build order mixes jobs of several races.
    #[error("Build order mixes {first} and {second} jobs")]
    MixedRaces {
        /// First race seen.
        first: String,
        /// Conflicting race.
        second: String,
    },

    /// The build order has no race-specific job.
    #[error("Cannot tell which race this build order is for")]
    NoRace,

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// A job can not be scheduled at all.
    #[error("{job} cannot be scheduled: {reason}")]
    Unschedulable {
        /// Job description.
        job: String,
        /// Short reason.
        reason: String,
        /// Long-form explanation.
        description: String,
    },

    /// Invalid engine state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl BuildError {
    /// Long-form explanation for user-facing failures.
    #[must_use]
    pub fn long_description(&self) -> Option<&str> {
        match self {
            Self::Unschedulable { description, .. } => Some(description),
            _ => None,
        }
    }
}

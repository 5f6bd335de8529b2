//! # Build Core
//!
//! Deterministic build order scheduling engine.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! A build order is a list of jobs, some pinned to a supply count or a
//! resource threshold and some left floating. The engine simulates the
//! economy (mining, larvae, energy, supply, production queues) and finds
//! the earliest time every job can start, squeezing floating jobs in
//! wherever they do not delay the pinned ones.
//!
//! ## Crate Structure
//!
//! - [`catalog`] - Buildable objects and their costs
//! - [`data`] - RON forms of catalogs and build orders
//! - [`ledger`] - Mineral and gas income over time
//! - [`timeline`] - Game state and the checks that place a job
//! - [`scheduler`] - Ordering of fixed, floating and recurring jobs
//! - [`build`] - Entry point: build order in, [`report::BuildReport`] out
//! - [`math`] - Fixed-point time and resources

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod availability;
pub mod build;
pub mod catalog;
pub mod config;
pub mod data;
pub mod energy;
pub mod error;
pub mod job;
pub mod larva;
pub mod ledger;
pub mod math;
pub mod mutation;
pub mod production;
pub mod report;
pub mod scheduler;
pub mod supply;
pub mod timeline;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::availability::Availability;
    pub use crate::build::{BuildOrder, CHECKPOINT};
    pub use crate::catalog::{Catalog, ObjectDef, ObjectId, ObjectKind, Race, Roles, SpecialRole};
    pub use crate::config::{EconomyRules, ScheduleOptions};
    pub use crate::data::{BuildOrderData, CatalogData};
    pub use crate::error::{BuildError, Result};
    pub use crate::job::{DependencyPoint, Initiate, Job, JobId, JobKind, Trigger};
    pub use crate::math::{Fixed, Resources, Time};
    pub use crate::mutation::MutationKind;
    pub use crate::report::BuildReport;
    pub use crate::scheduler::Schedule;
}

//! Why a job can not start yet.
//!
//! An [`Availability`] is not an error. The timeline attaches one to every
//! job it evaluates, and the scheduler uses it to decide whether squeezing
//! in another job could help. Only when nothing can help is it turned into
//! a [`BuildError::Unschedulable`](crate::error::BuildError::Unschedulable).

use std::fmt;

use crate::catalog::Catalog;
use crate::job::{Job, JobId};

/// Reason a job can or can not be scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Availability {
    /// The job can start.
    #[default]
    Available,
    /// The supply count does not match the job's supply trigger.
    InsufficientSupply {
        /// Supply count reached so far.
        count: i32,
        /// Supply count the job waits for.
        needed: i32,
    },
    /// Supply capacity will never be high enough.
    InsufficientSupplyCapacity,
    /// Gas is needed but none is mined.
    NoGasProduction,
    /// Larvae are needed but none are generated.
    NoLarvaProduction {
        /// Hatchery tags the job is restricted to.
        tags: Option<Vec<String>>,
    },
    /// Minerals are needed but none are mined.
    NoMineralProduction,
    /// The job this one depends on is not scheduled.
    MissingDependency {
        /// The job waited for.
        job: JobId,
    },
    /// A prerequisite is never built.
    MissingPrerequisite {
        /// Name of the prerequisite.
        object: String,
    },
    /// No production queue of the needed types exists.
    MissingProductionQueue {
        /// Names of the missing queue types.
        types: Vec<String>,
        /// Queue tags the job is restricted to.
        tags: Option<Vec<String>>,
    },
    /// No caster of the needed type exists.
    MissingCaster {
        /// Name of the caster type.
        caster: String,
        /// Caster tags the job is restricted to.
        tags: Option<Vec<String>>,
    },
}

fn tag_suffix(tags: Option<&Vec<String>>) -> String {
    match tags {
        Some(tags) if !tags.is_empty() => {
            let plural = if tags.len() > 1 { "s" } else { "" };
            let list: Vec<String> = tags.iter().map(|t| format!("#{t}")).collect();
            format!(" with tag{plural} {}", list.join(" or "))
        }
        _ => String::new(),
    }
}

impl Availability {
    /// Whether the job can start.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether the job waits on another unscheduled job; such failures
    /// are reported through their root cause instead.
    #[must_use]
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }

    /// Long-form explanation with a hint on how to fix the build order.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Available | Self::MissingDependency { .. } => String::new(),
            Self::InsufficientSupply { count, needed } => format!(
                "The trigger supply count for this job is {needed}, but at this point in the build order the achieved supply count is {} {count}.",
                if count > needed { "already" } else { "only" }
            ),
            Self::InsufficientSupplyCapacity => {
                "You may need to add some Overlords, Supply Depots or Pylons to accommodate it.".into()
            }
            Self::NoGasProduction => {
                "Usually this means that no workers were put on gas, or that they were taken off gas before enough gas was gathered.".into()
            }
            Self::NoLarvaProduction { .. } => {
                "No hatchery that matches the job exists at this point in the build order.".into()
            }
            Self::NoMineralProduction => {
                "You may have taken all remaining workers off minerals, or used up all your Drones to build structures.".into()
            }
            Self::MissingPrerequisite { .. } => {
                "You must ensure that the prerequisite structure or upgrade can be scheduled before this job.".into()
            }
            Self::MissingProductionQueue { .. } => {
                "You must ensure that the required production queue exists before this job.".into()
            }
            Self::MissingCaster { .. } => {
                "You must ensure that the required caster exists before this job.".into()
            }
        }
    }

    /// Whether scheduling `job` first could lift this restriction.
    #[must_use]
    pub fn solved_by(&self, job: &Job, catalog: &Catalog) -> bool {
        match self {
            Self::Available => true,
            Self::InsufficientSupply { count, needed } => {
                let gap = needed - count;
                let cost = job.supply_cost(catalog, true);
                if gap > 0 {
                    cost > 0 && cost <= gap
                } else if gap < 0 {
                    cost < 0 && cost >= gap
                } else {
                    true
                }
            }
            Self::InsufficientSupplyCapacity => job
                .products_created(catalog)
                .iter()
                .flatten()
                .any(|id| catalog.object(*id).supply_capacity > 0),
            Self::NoGasProduction
            | Self::NoLarvaProduction { .. }
            | Self::NoMineralProduction
            | Self::MissingDependency { .. }
            | Self::MissingPrerequisite { .. }
            | Self::MissingProductionQueue { .. }
            | Self::MissingCaster { .. } => false,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => Ok(()),
            Self::InsufficientSupply { count, needed } => write!(
                f,
                "There is {} supply.",
                if count > needed { "too much" } else { "insufficient" }
            ),
            Self::InsufficientSupplyCapacity => f.write_str("There is insufficient supply capacity."),
            Self::NoGasProduction => f.write_str("No gas is being mined."),
            Self::NoLarvaProduction { tags } => {
                let suffix = tag_suffix(tags.as_ref()).replacen(" with", " from a hatchery with", 1);
                write!(f, "No larvae are being generated{suffix}.")
            }
            Self::NoMineralProduction => f.write_str("No minerals are being mined."),
            Self::MissingDependency { job } => {
                write!(f, "The {job} on which it depends could not be scheduled.")
            }
            Self::MissingPrerequisite { object } => {
                write!(f, "The prerequisite {object} does not exist.")
            }
            Self::MissingProductionQueue { types, tags } => {
                let list = match types.split_last() {
                    Some((last, rest)) if !rest.is_empty() => format!("{} and {last}", rest.join(", ")),
                    Some((last, _)) => last.clone(),
                    None => String::new(),
                };
                let (noun, verb) = if types.len() > 1 { ("queues", "exist") } else { ("queue", "exists") };
                write!(
                    f,
                    "No production {noun} of type {list} {verb}{}.",
                    tag_suffix(tags.as_ref())
                )
            }
            Self::MissingCaster { caster, tags } => {
                write!(f, "No casters of type {caster} exist{}.", tag_suffix(tags.as_ref()))
            }
        }
    }
}

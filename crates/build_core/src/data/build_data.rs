//! Build order file format.

use serde::{Deserialize, Serialize};

use crate::build::BuildOrder;
use crate::catalog::{Catalog, ObjectId};
use crate::config::ScheduleOptions;
use crate::error::{BuildError, Result};
use crate::job::{DependencyPoint, Initiate, Job, JobId, JobKind, Trigger};
use crate::math::Fixed;
use crate::mutation::MutationKind;

/// Most structures a single trick may pledge.
const MAX_PLEDGES: u32 = 2;

/// What a job does, with objects named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionData {
    /// Build the named object.
    Build(String),
    /// Stop the recurring job building the named object.
    Cancel(String),
    /// Lose the named object.
    Kill(String),
    /// Change the worker layout.
    Mutate {
        /// The change.
        change: MutationKind,
        /// Travel time of the moved workers, in seconds.
        #[serde(default)]
        delay: Option<i32>,
    },
    /// Send a worker to scout.
    Scout {
        /// Seconds the scout is away.
        #[serde(default)]
        delay: Option<i32>,
    },
    /// Pledge structures for supply and cancel them afterwards.
    Trick {
        /// Structure pledged.
        pledge: String,
        /// Structures pledged.
        #[serde(default = "default_count")]
        count: u32,
        /// Unit built with the freed supply.
        #[serde(default)]
        turn: Option<String>,
        /// Units built.
        #[serde(default = "default_count")]
        turn_count: u32,
    },
}

const fn default_count() -> u32 {
    1
}

/// Reference to an earlier line of the build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyData {
    /// Index of the job in the build order, from 0.
    pub job: usize,
    /// Moment waited for.
    #[serde(default = "default_point")]
    pub point: DependencyPoint,
}

const fn default_point() -> DependencyPoint {
    DependencyPoint::AtCompletion
}

/// One line of a build order.
///
/// # Example RON
///
/// ```ron
/// (
///     action: Build("Gateway"),
///     trigger: Some(Supply(14)),
///     send: Some(Minerals(100)),
///     tag: Some("main"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobData {
    /// What the job does.
    pub action: ActionData,
    /// Fixed trigger.
    #[serde(default)]
    pub trigger: Option<Trigger>,
    /// Job that must come first.
    #[serde(default)]
    pub after: Option<DependencyData>,
    /// When to send the worker ahead.
    #[serde(default)]
    pub send: Option<Initiate>,
    /// Extra production queue used, by name.
    #[serde(default)]
    pub with: Option<String>,
    /// Tag given to whatever the job creates.
    #[serde(default)]
    pub tag: Option<String>,
    /// Only use entities carrying one of these tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Repeat until cancelled.
    #[serde(default)]
    pub recurring: bool,
    /// Chrono Boosts to spend.
    #[serde(default)]
    pub chronoboost: u32,
}

/// A whole build order file.
///
/// # Example RON
///
/// ```ron
/// (
///     options: (startup_build_delay: 2),
///     checkpoints: [60, 120],
///     jobs: [
///         (action: Build("Pylon"), trigger: Some(Supply(14))),
///         (action: Build("Gateway"), after: Some((job: 0))),
///         (action: Mutate(change: Workers(minerals: -3, gas: 3), delay: Some(2))),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrderData {
    /// Per-run options.
    #[serde(default)]
    pub options: ScheduleOptions,
    /// Checkpoint times in whole seconds.
    #[serde(default)]
    pub checkpoints: Vec<i32>,
    /// Jobs in written order.
    pub jobs: Vec<JobData>,
}

impl BuildOrderData {
    /// Parse RON text read from `origin`.
    pub fn from_ron(text: &str, origin: &str) -> Result<Self> {
        super::from_ron(text, origin)
    }

    /// Problems with the build order that need no catalog to spot.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (index, job) in self.jobs.iter().enumerate() {
            if let Some(after) = job.after {
                if after.job >= index {
                    problems.push(format!("job {index} depends on job {}, which is not earlier", after.job));
                }
            }
            if let ActionData::Trick { count, turn_count, turn, .. } = &job.action {
                if !(1..=MAX_PLEDGES).contains(count) {
                    problems.push(format!("job {index} pledges {count} structures, expected 1 or 2"));
                }
                if turn.is_some() && *turn_count == 0 {
                    problems.push(format!("job {index} turns the freed supply into nothing"));
                }
            }
            if job.recurring && !matches!(job.action, ActionData::Build(_)) {
                problems.push(format!("job {index} repeats something other than a build"));
            }
        }
        problems
    }

    /// Resolve names against `catalog` into a build order.
    pub fn resolve(&self, catalog: &Catalog) -> Result<BuildOrder> {
        if let Some(problem) = self.validate().into_iter().next() {
            return Err(BuildError::InvalidJob(problem));
        }
        let lookup = |name: &str| catalog.lookup(name);

        let mut order = BuildOrder::new().with_options(self.options.clone());
        for secs in &self.checkpoints {
            order.checkpoint(Fixed::from_num(*secs));
        }
        for data in &self.jobs {
            let mut job = Job::new(data.action.resolve(lookup)?);
            job.trigger = data.trigger;
            job.initiate = data.send;
            job.tag.clone_from(&data.tag);
            job.tags_required.clone_from(&data.tags);
            job.recurring = data.recurring;
            job.chronoboost = data.chronoboost;
            if let Some(name) = &data.with {
                job = job.with_queue_expended(lookup(name)?);
            }
            if let Some(after) = data.after {
                job = job.after(JobId(after.job), after.point);
            }
            order.push(job);
        }
        tracing::debug!(jobs = order.jobs().len(), "build order resolved");
        Ok(order)
    }
}

impl ActionData {
    fn resolve(&self, lookup: impl Fn(&str) -> Result<ObjectId>) -> Result<JobKind> {
        let seconds = |delay: Option<i32>| delay.map(|d| Fixed::from_num(d.max(0)));
        Ok(match self {
            Self::Build(name) => JobKind::Build { product: lookup(name)? },
            Self::Cancel(name) => JobKind::Cancel { product: lookup(name)? },
            Self::Kill(name) => JobKind::Kill { product: lookup(name)? },
            Self::Mutate { change, delay } => JobKind::Mutate {
                kind: *change,
                delay: seconds(*delay),
            },
            Self::Scout { delay } => JobKind::Scout { delay: seconds(*delay) },
            Self::Trick { pledge, count, turn, turn_count } => JobKind::Trick {
                pledge: lookup(pledge)?,
                pledge_count: *count,
                turn: turn.as_deref().map(&lookup).transpose()?,
                turn_count: *turn_count,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ObjectDef, Race};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register(ObjectDef::structure("Pylon", Race::Protoss).with_cost(100, 0));
        catalog.register(ObjectDef::structure("Extractor", Race::Zerg).with_cost(25, 0));
        catalog.register(ObjectDef::unit("Zergling", Race::Zerg).with_cost(50, 0).with_supply(1));
        catalog
    }

    #[test]
    fn test_resolve_jobs() {
        let text = r#"(
            options: (startup_build_delay: 2),
            checkpoints: [90, 30],
            jobs: [
                (action: Build("pylon"), trigger: Some(Supply(14)), send: Some(Minerals(60)), tag: Some("wall")),
                (action: Build("Pylon"), after: Some((job: 0, point: AtStart)), recurring: true),
                (action: Mutate(change: Transfer(minerals: 4, gas: 0), delay: Some(5))),
            ],
        )"#;
        let order = BuildOrderData::from_ron(text, "build.ron").unwrap().resolve(&catalog()).unwrap();
        assert_eq!(order.options.startup_build_delay, 2);
        assert_eq!(order.checkpoints, vec![Fixed::from_num(90), Fixed::from_num(30)]);

        let jobs = order.jobs();
        assert_eq!(jobs[0].trigger, Some(Trigger::Supply(14)));
        assert_eq!(jobs[0].initiate, Some(Initiate::Minerals(60)));
        assert_eq!(jobs[0].tag.as_deref(), Some("wall"));
        let dependency = jobs[1].dependency.unwrap();
        assert_eq!(dependency.job, JobId(0));
        assert_eq!(dependency.point, DependencyPoint::AtStart);
        assert!(jobs[1].recurring);
        assert_eq!(
            jobs[2].kind,
            JobKind::Mutate {
                kind: MutationKind::Transfer { minerals: 4, gas: 0 },
                delay: Some(Fixed::from_num(5)),
            }
        );
    }

    #[test]
    fn test_trick_defaults_and_limits() {
        let text = r#"(jobs: [(action: Trick(pledge: "Extractor", turn: Some("Zergling")))])"#;
        let order = BuildOrderData::from_ron(text, "trick.ron").unwrap().resolve(&catalog()).unwrap();
        assert!(matches!(
            order.jobs()[0].kind,
            JobKind::Trick { pledge_count: 1, turn_count: 1, turn: Some(_), .. }
        ));

        let text = r#"(jobs: [(action: Trick(pledge: "Extractor", count: 3))])"#;
        let err = BuildOrderData::from_ron(text, "trick.ron").unwrap().resolve(&catalog()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidJob(_)));
    }

    #[test]
    fn test_forward_dependency_rejected() {
        let data = BuildOrderData {
            jobs: vec![JobData {
                action: ActionData::Build("Pylon".into()),
                trigger: None,
                after: Some(DependencyData { job: 0, point: DependencyPoint::AtCompletion }),
                send: None,
                with: None,
                tag: None,
                tags: None,
                recurring: false,
                chronoboost: 0,
            }],
            ..BuildOrderData::default()
        };
        assert_eq!(data.validate().len(), 1);
    }

    #[test]
    fn test_unknown_name() {
        let text = r#"(jobs: [(action: Build("Stargate"))])"#;
        let err = BuildOrderData::from_ron(text, "b.ron").unwrap().resolve(&catalog()).unwrap_err();
        assert!(matches!(err, BuildError::UnknownObject(name) if name == "Stargate"));
    }
}

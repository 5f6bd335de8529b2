//! A complete build order and the entry point that runs it.

use crate::catalog::{Catalog, Race};
use crate::config::{EconomyRules, ScheduleOptions};
use crate::error::{BuildError, Result};
use crate::job::{Job, JobId};
use crate::math::Fixed;
use crate::report::BuildReport;
use crate::scheduler::{Schedule, Scheduler};
use crate::timeline::Timeline;

/// Label of requested checkpoints.
pub const CHECKPOINT: &str = "Checkpoint";

/// Jobs, checkpoints and options of one build.
#[derive(Debug, Clone, Default)]
pub struct BuildOrder {
    jobs: Vec<Job>,
    /// Times to report the state at, in seconds.
    pub checkpoints: Vec<Fixed>,
    /// Per-run options.
    pub options: ScheduleOptions,
}

impl BuildOrder {
    /// Create an empty build order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job and return the identifier dependencies refer to it by.
    pub fn push(&mut self, mut job: Job) -> JobId {
        let id = JobId(self.jobs.len());
        job.id = id;
        self.jobs.push(job);
        id
    }

    /// Jobs in written order.
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Request a checkpoint at `secs`.
    pub fn checkpoint(&mut self, secs: Fixed) {
        self.checkpoints.push(secs);
    }

    /// Set the options.
    #[must_use]
    pub fn with_options(mut self, options: ScheduleOptions) -> Self {
        self.options = options;
        self
    }

    /// Race of the build, taken from its race-specific jobs.
    pub fn race(&self, catalog: &Catalog) -> Result<Race> {
        let mut race: Option<Race> = None;
        for job in &self.jobs {
            let Some(own) = job.race(catalog) else {
                continue;
            };
            match race {
                Some(first) if first != own => {
                    return Err(BuildError::MixedRaces {
                        first: first.to_string(),
                        second: own.to_string(),
                    });
                }
                _ => race = Some(own),
            }
        }
        race.ok_or(BuildError::NoRace)
    }

    /// Check jobs against the catalog before anything is simulated.
    fn check(&self, catalog: &Catalog) -> Result<()> {
        let problems = catalog.validate();
        if !problems.is_empty() {
            return Err(BuildError::InvalidState(format!(
                "catalog has {} problem(s): {}",
                problems.len(),
                problems.join("; ")
            )));
        }
        for job in &self.jobs {
            if let Some(dependency) = job.dependency {
                if dependency.job.0 >= self.jobs.len() || dependency.job == job.id {
                    return Err(BuildError::InvalidJob(format!(
                        "{} depends on unknown {}",
                        job.description(catalog),
                        dependency.job
                    )));
                }
            }
        }
        Ok(())
    }

    /// Schedule the build order and keep the final timeline.
    pub fn schedule<'a>(&self, catalog: &'a Catalog, rules: EconomyRules) -> Result<Schedule<'a>> {
        let _span = tracing::info_span!("schedule").entered();
        self.check(catalog)?;
        let race = self.race(catalog)?;

        let mut timeline = Timeline::new(catalog, race, rules, self.options.clone())?;
        let mut checkpoints = self.checkpoints.clone();
        checkpoints.sort();
        for secs in checkpoints {
            timeline.add_checkpoint(CHECKPOINT, secs, secs);
        }

        let worker = catalog
            .worker(race)
            .ok_or_else(|| BuildError::UnknownObject(format!("{race} worker")))?;
        let mut jobs = self.jobs.clone();
        let mut auto = Job::build(worker.id).recurring();
        auto.id = JobId(jobs.len());
        jobs.push(auto);

        tracing::debug!(%race, jobs = jobs.len(), "build order loaded");
        Scheduler::new(timeline, jobs).schedule()
    }

    /// Schedule the build order and summarize the result.
    pub fn run(&self, catalog: &Catalog, rules: EconomyRules) -> Result<BuildReport> {
        let schedule = self.schedule(catalog, rules)?;
        Ok(BuildReport::new(&schedule))
    }
}

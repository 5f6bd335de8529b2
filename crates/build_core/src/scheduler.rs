//! Job ordering.
//!
//! Jobs with a trigger are fixed: they are committed in the order they
//! were written. Everything else floats and is fitted in around them:
//!
//! 1. For every fixed job, floating jobs are squeezed in while the fixed
//!    job can not start at all, then again as long as they fit without
//!    delaying it.
//! 2. Remaining floating jobs are committed earliest first, with
//!    recurring jobs squeezed in before each.
//! 3. Checkpoints still pending are logged.

use std::collections::VecDeque;
use std::iter;

use crate::error::{BuildError, Result};
use crate::job::{Job, Trigger};
use crate::math::{round_whole, Time};
use crate::timeline::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pool {
    Floating,
    Recurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    pool: Pool,
    index: usize,
}

/// Which floating jobs may be squeezed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidates {
    All,
    Recurring,
}

/// Scheduled jobs and the timeline they were committed to.
#[derive(Debug, Clone)]
pub struct Schedule<'a> {
    /// Jobs in commit order.
    pub jobs: Vec<Job>,
    /// Final state.
    pub timeline: Timeline<'a>,
}

/// Orders jobs onto a timeline.
#[derive(Debug)]
pub struct Scheduler<'a> {
    timeline: Timeline<'a>,
    fixed: VecDeque<Job>,
    floating: Vec<Job>,
    recurring: Vec<Job>,
    scheduled: Vec<Job>,
}

impl<'a> Scheduler<'a> {
    /// Sort `jobs` into fixed, floating and recurring.
    #[must_use]
    pub fn new(timeline: Timeline<'a>, jobs: Vec<Job>) -> Self {
        let mut scheduler = Self {
            timeline,
            fixed: VecDeque::new(),
            floating: Vec::new(),
            recurring: Vec::new(),
            scheduled: Vec::new(),
        };
        for job in jobs {
            if job.is_fixed() {
                scheduler.fixed.push_back(job);
            } else if job.recurring {
                scheduler.recurring.push(job);
            } else {
                scheduler.floating.push(job);
            }
        }
        scheduler
    }

    /// Schedule every job.
    pub fn schedule(mut self) -> Result<Schedule<'a>> {
        let catalog = self.timeline.catalog();
        tracing::debug!(
            fixed = self.fixed.len(),
            floating = self.floating.len(),
            recurring = self.recurring.len(),
            "scheduling"
        );

        while let Some(mut job) = self.fixed.pop_front() {
            let _span = tracing::debug_span!("fixed", job = %job.label(catalog)).entered();

            loop {
                self.evaluate(&mut job)?;
                if job.time_started.is_finite() || self.dead_end(&job)? || !self.squeeze(&job, Candidates::All)? {
                    break;
                }
            }
            if job.time_started.is_never() {
                return Err(self.report_unavailable(&mut [job]));
            }

            // A job without a supply trigger inherits one, so nothing
            // squeezed in front of it spoils the next supply trigger.
            if !matches!(job.trigger, Some(Trigger::Supply(_))) {
                let mut delta = 0;
                let mut goal = 0;
                for other in iter::once(&job).chain(self.fixed.iter()) {
                    if let Some(Trigger::Supply(supply)) = other.trigger {
                        goal = supply;
                        break;
                    }
                    delta += other.supply_cost(catalog, false);
                }
                job.supply_target = Some(goal - delta);
            }

            while self.squeeze(&job, Candidates::All)? {
                self.evaluate(&mut job)?;
                if job.time_started.is_never() {
                    return Err(self.report_unavailable(&mut [job]));
                }
            }

            self.commit(job)?;
        }

        while !self.floating.is_empty() {
            let slots: Vec<Slot> = (0..self.floating.len())
                .map(|index| Slot { pool: Pool::Floating, index })
                .collect();
            let Some(slot) = self.earliest(&slots)? else {
                let mut remaining = std::mem::take(&mut self.floating);
                return Err(self.report_unavailable(&mut remaining));
            };
            let mut job = self.floating.remove(slot.index);
            let _span = tracing::debug_span!("floating", job = %job.label(catalog)).entered();

            while self.squeeze(&job, Candidates::Recurring)? {
                self.evaluate(&mut job)?;
                if job.time_started.is_never() {
                    return Err(self.report_unavailable(&mut [job]));
                }
            }
            self.commit(job)?;
        }

        self.timeline.process_checkpoints(Time::Never)?;

        #[cfg(feature = "debug-validation")]
        self.validate()?;

        tracing::info!(jobs = self.scheduled.len(), events = self.timeline.events().len(), "build order scheduled");
        Ok(Schedule {
            jobs: self.scheduled,
            timeline: self.timeline,
        })
    }

    fn pool(&self, pool: Pool) -> &Vec<Job> {
        match pool {
            Pool::Floating => &self.floating,
            Pool::Recurring => &self.recurring,
        }
    }

    fn pool_mut(&mut self, pool: Pool) -> &mut Vec<Job> {
        match pool {
            Pool::Floating => &mut self.floating,
            Pool::Recurring => &mut self.recurring,
        }
    }

    fn job(&self, slot: Slot) -> &Job {
        &self.pool(slot.pool)[slot.index]
    }

    fn evaluate(&self, job: &mut Job) -> Result<()> {
        self.timeline.calculate(job, &self.scheduled)?.apply_to(job);
        Ok(())
    }

    fn evaluate_slot(&mut self, slot: Slot) -> Result<()> {
        let calculation = self.timeline.calculate(self.job(slot), &self.scheduled)?;
        calculation.apply_to(&mut self.pool_mut(slot.pool)[slot.index]);
        Ok(())
    }

    /// Floating slots of the requested kind, freshly evaluated.
    fn candidates(&mut self, which: Candidates) -> Result<Vec<Slot>> {
        let mut slots = Vec::new();
        if which == Candidates::All {
            slots.extend((0..self.floating.len()).map(|index| Slot { pool: Pool::Floating, index }));
        }
        slots.extend((0..self.recurring.len()).map(|index| Slot { pool: Pool::Recurring, index }));
        for &slot in &slots {
            self.evaluate_slot(slot)?;
        }
        Ok(slots)
    }

    /// The slot that can start first; the earliest listed wins ties.
    fn earliest(&mut self, slots: &[Slot]) -> Result<Option<Slot>> {
        let mut pick: Option<(Slot, Time)> = None;
        for &slot in slots {
            self.evaluate_slot(slot)?;
            let started = self.job(slot).time_started;
            if started.is_finite() && pick.map_or(true, |(_, best)| started < best) {
                pick = Some((slot, started));
            }
        }
        Ok(pick.map(|(slot, _)| slot))
    }

    /// Whether nothing that could still be squeezed in would help `job`.
    /// Never true while non-recurring floating jobs remain.
    fn dead_end(&mut self, job: &Job) -> Result<bool> {
        let catalog = self.timeline.catalog();
        for slot in self.candidates(Candidates::All)? {
            let candidate = self.job(slot);
            if candidate.time_started.is_never() {
                continue;
            }
            if !candidate.recurring || job.availability.solved_by(candidate, catalog) {
                tracing::trace!(reason = %job.availability, by = %candidate.label(catalog), "not a dead end");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Supply still to be added before the next supply goal is reached.
    fn supply_gap(&self, current: Option<&Job>) -> Option<i32> {
        current
            .into_iter()
            .chain(self.fixed.iter())
            .find_map(Job::supply_goal)
            .map(|goal| goal - self.timeline.supply_count)
    }

    /// Commit one floating job in front of `fixed`.
    ///
    /// While `fixed` can not start, any job that can start at all is a
    /// candidate and running out of candidates is fatal. Otherwise a
    /// candidate must leave `fixed` undelayed. Returns whether a job was
    /// committed.
    fn squeeze(&mut self, fixed: &Job, which: Candidates) -> Result<bool> {
        let catalog = self.timeline.catalog();
        let mandatory = !fixed.availability.is_available();
        let current = (which == Candidates::All).then_some(fixed);

        let mut slots = self.candidates(which)?;

        if !mandatory {
            if let Some(product) = fixed.product() {
                slots.retain(|&slot| {
                    let job = self.job(slot);
                    !(job.recurring && job.product() == Some(product))
                });
            }
        }

        slots.retain(|&slot| {
            let started = self.job(slot).time_started;
            if mandatory {
                started.is_finite()
            } else {
                started <= fixed.time_started
            }
        });

        if let Some(goal) = fixed.supply_goal() {
            let gap = goal - self.timeline.supply_count;
            slots.retain(|&slot| {
                let cost = self.job(slot).supply_cost(catalog, true);
                match gap {
                    0 => cost == 0,
                    gap if gap > 0 => cost >= 0 && cost <= gap,
                    gap => cost <= 0 && cost >= gap,
                }
            });
        }

        if !mandatory {
            let mut affordable = Vec::with_capacity(slots.len());
            for slot in slots {
                if self.leaves_funds(self.job(slot), fixed)? {
                    affordable.push(slot);
                }
            }
            slots = affordable;

            let mut accommodated = Vec::with_capacity(slots.len());
            for slot in slots {
                if self.timeline.can_accommodate(self.job(slot), fixed)? {
                    accommodated.push(slot);
                } else {
                    tracing::trace!(candidate = %self.job(slot).label(catalog), "would stall larvae, queues or energy");
                }
            }
            slots = accommodated;
        }

        if let Some(gap) = self.supply_gap(current) {
            if gap >= 0 {
                slots.retain(|&slot| self.job(slot).supply_cost(catalog, true) <= gap);
            }
        }

        slots.retain(|&slot| {
            let cost = self.job(slot).supply_cost(catalog, true);
            if cost <= 0 {
                return true;
            }
            let needed = self.timeline.supply_count + fixed.supply_cost(catalog, true) + cost;
            let ready = self.timeline.supply.when(needed);
            if mandatory {
                ready.is_finite()
            } else {
                ready <= fixed.time_started
            }
        });

        if slots.is_empty() {
            if mandatory {
                let mut blocked = [fixed.clone()];
                return Err(self.report_unavailable(&mut blocked));
            }
            return Ok(false);
        }

        let Some(slot) = self.earliest(&slots)? else {
            return Ok(false);
        };
        let job = self.pool_mut(slot.pool).remove(slot.index);
        tracing::debug!(
            job = %job.label(catalog),
            before = %fixed.label(catalog),
            mandatory,
            "squeezed in"
        );
        let again = job.recurring.then(|| job.recurrence());
        self.commit(job)?;
        if let Some(again) = again {
            self.recurring.push(again);
        }
        Ok(true)
    }

    /// Whether minerals and gas at `fixed`'s start cover both jobs, with
    /// the income effects of `candidate` applied.
    fn leaves_funds(&self, candidate: &Job, fixed: &Job) -> Result<bool> {
        let catalog = self.timeline.catalog();
        let costs = candidate.costs(catalog);
        if costs.is_zero() {
            return Ok(true);
        }
        let Time::At(deadline) = fixed.time_started else {
            return Ok(false);
        };

        let mut stamped = candidate.clone();
        stamped.time_completed = self.timeline.when_complete(&stamped)?;
        let mutations = stamped.mutations(catalog);

        let surplus = if mutations.is_empty() {
            self.timeline.ledger.surplus(deadline)
        } else {
            let mut ledger = self.timeline.ledger.clone();
            for mutation in mutations {
                if let Err(err) = ledger.splice(mutation) {
                    tracing::trace!(candidate = %candidate.label(catalog), %err, "income change rejected");
                    return Ok(false);
                }
            }
            ledger.surplus(deadline)
        };

        let both = costs + fixed.costs(catalog);
        Ok(round_whole(surplus.minerals) >= round_whole(both.minerals)
            && round_whole(surplus.gas) >= round_whole(both.gas))
    }

    /// Commit `job`, cancel recurring jobs it stops, and commit every
    /// floating job that consumes nothing and is possible now.
    fn commit(&mut self, mut job: Job) -> Result<()> {
        let catalog = self.timeline.catalog();
        job.pick_order = Some(self.scheduled.len());
        self.timeline.process(&mut job, false)?;
        let cancels = job.cancels();
        self.scheduled.push(job);

        if let Some(product) = cancels {
            let before = self.recurring.len();
            self.recurring.retain(|j| j.product() != Some(product));
            if self.recurring.len() == before {
                return Err(BuildError::NothingToCancel(catalog.name(product).to_string()));
            }
        }

        let mut index = 0;
        while index < self.floating.len() {
            if !self.floating[index].consumptive() {
                let slot = Slot { pool: Pool::Floating, index };
                self.evaluate_slot(slot)?;
                if self.floating[index].time_started.is_finite() {
                    let mut job = self.floating.remove(index);
                    self.timeline.process(&mut job, true)?;
                    job.pick_order = Some(self.scheduled.len());
                    self.scheduled.push(job);
                    continue;
                }
            }
            index += 1;
        }
        Ok(())
    }

    /// Turn the first job that is blocked for a reason of its own into an
    /// error. Jobs only waiting on another blocked job are skipped.
    fn report_unavailable(&self, jobs: &mut [Job]) -> BuildError {
        let catalog = self.timeline.catalog();
        for job in jobs.iter_mut() {
            if let Err(err) = self.evaluate(job) {
                return err;
            }
        }
        let culprit = jobs
            .iter()
            .find(|job| !job.availability.is_missing_dependency() && !job.availability.is_available())
            .or_else(|| jobs.first());
        match culprit {
            Some(job) => {
                tracing::debug!(job = %job.label(catalog), reason = %job.availability, "unschedulable");
                BuildError::Unschedulable {
                    job: job.label(catalog),
                    reason: job.availability.to_string(),
                    description: job.availability.description(),
                }
            }
            None => BuildError::InvalidState("no job left to report".into()),
        }
    }

    #[cfg(feature = "debug-validation")]
    fn validate(&self) -> Result<()> {
        for (order, job) in self.scheduled.iter().enumerate() {
            if job.pick_order != Some(order) {
                return Err(BuildError::InvalidState(format!("job {order} has pick order {:?}", job.pick_order)));
            }
            if job.time_started.is_never() || job.time_completed < job.time_started {
                return Err(BuildError::InvalidState(format!(
                    "job {order} runs from {} to {}",
                    job.time_started, job.time_completed
                )));
            }
        }
        let events = self.timeline.events();
        if events.windows(2).any(|pair| pair[0].order >= pair[1].order) {
            return Err(BuildError::InvalidState("event log out of order".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ObjectDef, ObjectId, Race, Roles};
    use crate::config::{EconomyRules, ScheduleOptions};
    use crate::job::JobKind;
    use crate::math::Fixed;

    fn f(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn catalog() -> (Catalog, ObjectId, ObjectId, ObjectId) {
        let mut catalog = Catalog::new();
        let nexus = catalog.register(
            ObjectDef::structure("Nexus", Race::Protoss)
                .with_cost(400, 0)
                .with_build_time(71)
                .with_supply_capacity(10)
                .with_roles(Roles { base: true, ..Roles::default() }),
        );
        let probe = catalog.register(
            ObjectDef::unit("Probe", Race::Protoss)
                .with_cost(50, 0)
                .with_supply(1)
                .with_build_time(12)
                .with_producers(vec![nexus])
                .with_roles(Roles { worker: true, ..Roles::default() }),
        );
        let pylon = catalog.register(
            ObjectDef::structure("Pylon", Race::Protoss)
                .with_cost(100, 0)
                .with_build_time(18)
                .with_supply_capacity(8),
        );
        let gateway = catalog.register(
            ObjectDef::structure("Gateway", Race::Protoss)
                .with_cost(150, 0)
                .with_build_time(46)
                .with_prerequisites(vec![pylon]),
        );
        (catalog, probe, pylon, gateway)
    }

    fn run(catalog: &Catalog, jobs: Vec<Job>) -> Result<Schedule<'_>> {
        let timeline = Timeline::new(catalog, Race::Protoss, EconomyRules::default(), ScheduleOptions::default())?;
        Scheduler::new(timeline, jobs).schedule()
    }

    #[test]
    fn test_workers_squeezed_until_supply_trigger() {
        let (catalog, probe, pylon, _) = catalog();
        let jobs = vec![
            Job::build(probe).recurring(),
            Job::build(pylon).with_trigger(Trigger::Supply(9)),
        ];
        let schedule = run(&catalog, jobs).unwrap();

        let products: Vec<_> = schedule.jobs.iter().map(|j| j.product()).collect();
        assert_eq!(products, vec![Some(probe), Some(probe), Some(probe), Some(pylon)]);
        let starts: Vec<Time> = schedule.jobs.iter().take(3).map(|j| j.time_started).collect();
        assert_eq!(starts, vec![Time::ZERO, Time::At(f(12)), Time::At(f(24))]);
        assert_eq!(schedule.jobs[3].pick_order, Some(3));
        assert_eq!(schedule.timeline.events()[3].supply_count, 9);
    }

    #[test]
    fn test_floating_jobs_run_earliest_first() {
        let (catalog, probe, pylon, gateway) = catalog();
        let jobs = vec![Job::build(gateway), Job::build(pylon), Job::build(probe)];
        let schedule = run(&catalog, jobs).unwrap();
        let products: Vec<_> = schedule.jobs.iter().map(|j| j.product()).collect();
        assert_eq!(products, vec![Some(probe), Some(pylon), Some(gateway)]);
        assert!(schedule.jobs[2].time_started >= schedule.jobs[1].time_completed);
    }

    #[test]
    fn test_cancel_without_recurring_job_fails() {
        let (catalog, probe, _, _) = catalog();
        let jobs = vec![Job::new(JobKind::Cancel { product: probe })];
        assert!(matches!(
            run(&catalog, jobs),
            Err(BuildError::NothingToCancel(name)) if name == "Probe"
        ));
    }

    #[test]
    fn test_cancel_stops_recurring_job() {
        let (catalog, probe, pylon, _) = catalog();
        let jobs = vec![
            Job::build(probe).recurring(),
            Job::build(pylon).with_trigger(Trigger::Supply(8)),
            Job::new(JobKind::Cancel { product: probe }).with_trigger(Trigger::Supply(8)),
        ];
        let schedule = run(&catalog, jobs).unwrap();
        let probes = schedule.jobs.iter().filter(|j| j.product() == Some(probe)).count();
        assert_eq!(probes, 2);
        assert_eq!(schedule.jobs.last().and_then(Job::cancels), Some(probe));
    }

    #[test]
    fn test_missing_prerequisite_is_reported() {
        let (catalog, _, _, gateway) = catalog();
        let err = run(&catalog, vec![Job::build(gateway)]).unwrap_err();
        match err {
            BuildError::Unschedulable { job, reason, description } => {
                assert_eq!(job, "Gateway");
                assert_eq!(reason, "The prerequisite Pylon does not exist.");
                assert!(!description.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_supply_trigger_out_of_reach() {
        let (catalog, _, pylon, _) = catalog();
        let err = run(&catalog, vec![Job::build(pylon).with_trigger(Trigger::Supply(9))]).unwrap_err();
        assert!(matches!(err, BuildError::Unschedulable { ref reason, .. } if reason == "There is insufficient supply."));
    }
}

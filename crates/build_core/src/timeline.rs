//! The simulated game state and its history.
//!
//! [`Timeline`] owns one of each subsystem: the resource ledger, supply
//! capacity, hatcheries, casters and production queues. It answers two
//! questions for the scheduler:
//!
//! - [`Timeline::calculate`]: when could this job start, and if never,
//!   why not? This never changes any state.
//! - [`Timeline::process`]: commit this job at the time calculated for it.
//!
//! Anything speculative (a tentative Chrono Boost placement, the
//! [`Timeline::can_accommodate`] probe, multi-larva lookahead) runs on
//! clones of the subsystems involved, which are dropped afterwards.

use serde::{Deserialize, Serialize};

use crate::availability::Availability;
use crate::catalog::{Catalog, ObjectId, ObjectKind, Race, SpecialRole};
use crate::config::{EconomyRules, ScheduleOptions};
use crate::energy::{Caster, Casters};
use crate::error::{BuildError, Result};
use crate::job::{DependencyPoint, Initiate, Job, Trigger};
use crate::larva::Hatcheries;
use crate::ledger::ResourceLedger;
use crate::math::{fixed_serde, overlap, round_whole, Fixed, Resources, Time};
use crate::mutation::Mutation;
use crate::production::{ProductionQueue, ProductionQueues};
use crate::supply::SupplyTrack;

/// A point in time to report on, not yet logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Text shown in the log.
    pub description: String,
    /// When the checkpoint fires.
    #[serde(with = "fixed_serde")]
    pub time_started: Fixed,
    /// End time shown in the log.
    #[serde(with = "fixed_serde")]
    pub time_completed: Fixed,
}

/// A logged job or checkpoint with the state at its start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the log.
    pub order: usize,
    /// What happened.
    pub description: String,
    /// Start time.
    #[serde(with = "fixed_serde")]
    pub time_started: Fixed,
    /// Completion time.
    #[serde(with = "fixed_serde")]
    pub time_completed: Fixed,
    /// Supply count after the previous job.
    pub supply_count: i32,
    /// Supply capacity at the start.
    pub supply_capacity: i32,
    /// Minerals banked at the start.
    pub minerals: i32,
    /// Gas banked at the start.
    pub gas: i32,
    /// Larvae per hatchery at the start.
    pub larvae: Vec<u32>,
    /// Energy per caster at the start.
    pub energy: Vec<i32>,
}

/// Result of [`Timeline::calculate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    /// When the worker would leave for the build site.
    pub initiated: Time,
    /// Earliest start, or `Never`.
    pub started: Time,
    /// Why the job can or can not start.
    pub availability: Availability,
}

impl Calculation {
    fn blocked(availability: Availability) -> Self {
        Self {
            initiated: Time::Never,
            started: Time::Never,
            availability,
        }
    }

    /// Store the outcome on `job`.
    pub fn apply_to(self, job: &mut Job) {
        job.time_initiated = self.initiated;
        job.time_started = self.started;
        job.availability = self.availability;
    }
}

/// Production queues a job would use and when it would finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    /// Completion time.
    pub completed: Fixed,
    /// Indices of the queues used.
    pub queues: Vec<usize>,
    /// Start times of the Chrono Boosts placed on the job.
    pub boosts: Vec<Fixed>,
}

/// Chrono Boost parameters looked up from the catalog.
#[derive(Debug, Clone, Copy)]
struct Boost {
    caster: ObjectId,
    energy: i32,
    duration: Fixed,
}

/// The whole simulated game state.
#[derive(Debug, Clone)]
pub struct Timeline<'a> {
    catalog: &'a Catalog,
    rules: EconomyRules,
    options: ScheduleOptions,
    race: Race,
    /// Minerals and gas.
    pub ledger: ResourceLedger,
    /// Supply capacity.
    pub supply: SupplyTrack,
    /// Larva generation.
    pub hatcheries: Hatcheries,
    /// Energy pools.
    pub casters: Casters,
    /// Production queues.
    pub queues: ProductionQueues,
    /// Supply used by everything committed so far.
    pub supply_count: i32,
    checkpoints: Vec<Checkpoint>,
    events: Vec<Event>,
    last_updated: Fixed,
}

impl<'a> Timeline<'a> {
    /// Set up the opening position of `race`.
    pub fn new(catalog: &'a Catalog, race: Race, rules: EconomyRules, options: ScheduleOptions) -> Result<Self> {
        let base = catalog
            .base(race)
            .ok_or_else(|| BuildError::UnknownObject(format!("{race} base")))?;

        let ledger = ResourceLedger::opening(&options, rules);
        let supply_count = options.initial_supply;
        let mut timeline = Self {
            catalog,
            rules,
            options,
            race,
            ledger,
            supply: SupplyTrack::new(),
            hatcheries: Hatcheries::new(rules),
            casters: Casters::new(rules),
            queues: ProductionQueues::new(),
            supply_count,
            checkpoints: Vec::new(),
            events: Vec::new(),
            last_updated: Fixed::ZERO,
        };

        timeline.supply.add(base.supply_capacity, Fixed::ZERO);
        if let Some(profile) = base.energy {
            timeline
                .casters
                .add(Caster::new(base.id, Fixed::ZERO, profile.start, profile.max, None));
        }
        if base.spawns_larvae() {
            timeline.hatcheries.add(Fixed::ZERO, rules.larva_threshold, None);
            let overlord = catalog.iter().find(|def| {
                def.race == Some(race) && matches!(def.kind, ObjectKind::Unit) && def.supply_capacity > 0
            });
            if let Some(overlord) = overlord {
                timeline.supply.add(overlord.supply_capacity, Fixed::ZERO);
            }
        }
        timeline
            .queues
            .add(ProductionQueue::new(base.id, Fixed::ZERO, None));

        Ok(timeline)
    }

    /// The catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Economy constants in use.
    #[must_use]
    pub fn rules(&self) -> &EconomyRules {
        &self.rules
    }

    /// Race being simulated.
    #[must_use]
    pub fn race(&self) -> Race {
        self.race
    }

    /// Committed events in order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Checkpoints not yet logged, in time order.
    #[must_use]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Schedule a checkpoint.
    pub fn add_checkpoint(&mut self, description: impl Into<String>, started: Fixed, completed: Fixed) {
        let description = description.into();
        let started = if started < Fixed::ZERO {
            tracing::warn!(%description, time = %started, "checkpoint before the start of the game, moved to 0:00");
            Fixed::ZERO
        } else {
            started
        };
        let index = self.checkpoints.partition_point(|c| c.time_started <= started);
        self.checkpoints.insert(
            index,
            Checkpoint {
                description,
                time_started: started,
                time_completed: completed.max(started),
            },
        );
    }

    fn boost(&self) -> Option<Boost> {
        let ability = self.catalog.special(SpecialRole::ChronoBoost)?;
        Some(Boost {
            caster: ability.caster()?,
            energy: ability.cost.energy,
            duration: ability.build_time,
        })
    }

    /// Earliest time `job` could start given everything committed so far.
    ///
    /// `scheduled` holds the committed jobs; they satisfy dependencies and
    /// prerequisites. No state is changed.
    pub fn calculate(&self, job: &Job, scheduled: &[Job]) -> Result<Calculation> {
        let catalog = self.catalog;
        let tags = job.tags();
        let mut start = Time::At(self.options.build_delay());

        if let Some(Trigger::Supply(needed)) = job.trigger {
            if needed != self.supply_count {
                return Ok(Calculation::blocked(Availability::InsufficientSupply {
                    count: self.supply_count,
                    needed,
                }));
            }
        }

        if let Some(dependency) = job.dependency {
            let Some(other) = scheduled.iter().find(|j| j.id == dependency.job) else {
                return Ok(Calculation::blocked(Availability::MissingDependency { job: dependency.job }));
            };
            start = start.max(match dependency.point {
                DependencyPoint::AtStart => other.time_started,
                DependencyPoint::AtCompletion => other.time_completed,
            });
        }

        for prerequisite in job.prerequisites(catalog) {
            if catalog.object(prerequisite).roles.base {
                continue;
            }
            let met = scheduled
                .iter()
                .filter(|j| j.products_created(catalog).contains(&Some(prerequisite)))
                .map(|j| j.time_completed)
                .min()
                .unwrap_or(Time::Never);
            if met.is_never() {
                return Ok(Calculation::blocked(Availability::MissingPrerequisite {
                    object: catalog.name(prerequisite).to_string(),
                }));
            }
            start = start.max(met);
        }

        let energy = job.energy_cost(catalog);
        if energy > 0 {
            let caster = job.caster_type(catalog);
            let ready = caster.map_or(Time::Never, |c| self.casters.when(c, energy, tags));
            start = start.max(ready);
            if start.is_never() {
                return Ok(Calculation::blocked(Availability::MissingCaster {
                    caster: caster.map_or("?", |c| catalog.name(c)).to_string(),
                    tags: job.tags_required.clone(),
                }));
            }
        }

        let larvae = job.larva_cost(catalog);
        if larvae > 0 {
            start = start.max(self.hatcheries.when(larvae, tags)?);
            if start.is_never() {
                return Ok(Calculation::blocked(Availability::NoLarvaProduction {
                    tags: job.tags_required.clone(),
                }));
            }
        }

        if job.supply_cost(catalog, false) > 0 {
            start = start.max(self.supply.when(self.supply_count + job.supply_cost(catalog, true)));
            if start.is_never() {
                return Ok(Calculation::blocked(Availability::InsufficientSupplyCapacity));
            }
        }

        let (types, needs_all) = job.queue_types_expended(catalog);
        if !types.is_empty() {
            let (ready, missing) = self.queues.when(&types, needs_all, tags);
            start = start.max(ready);
            if start.is_never() {
                return Ok(Calculation::blocked(Availability::MissingProductionQueue {
                    types: missing.iter().map(|id| catalog.name(*id).to_string()).collect(),
                    tags: job.tags_required.clone(),
                }));
            }
        }

        let spawns_larvae = job
            .products_created(catalog)
            .first()
            .copied()
            .flatten()
            .is_some_and(|p| catalog.object(p).is(SpecialRole::SpawnLarvae));
        if spawns_larvae {
            start = start.max(self.hatcheries.when_burst());
        }

        if let Time::At(at) = start {
            start = start.max(job.gas_room_ready(&self.ledger, at));
        }

        let costs = job.costs(catalog);
        let initiate_need = match job.initiate {
            Some(Initiate::Minerals(minerals)) => Resources::whole(minerals, costs.gas.to_num()),
            Some(Initiate::Gas(gas)) => Resources::whole(costs.minerals.to_num(), gas),
            None => costs,
        };
        let need = match job.trigger {
            Some(Trigger::Minerals(minerals)) => Resources::new(costs.minerals.max(Fixed::from_num(minerals)), costs.gas),
            Some(Trigger::Gas(gas)) => Resources::new(costs.minerals, costs.gas.max(Fixed::from_num(gas))),
            _ => costs,
        };

        let initiated = self.ledger.when(initiate_need);
        let funded = match initiated {
            Time::Never => Time::Never,
            Time::At(leaves) if job.initiate.is_some() => {
                let mut probe = self.ledger.clone();
                probe.splice(Mutation::workers(-1, 0, leaves))?;
                probe.when(need)
            }
            Time::At(_) => self.ledger.when(need),
        };
        start = start.max(funded);

        if start.is_never() {
            let (minerals, _) = self.ledger.when_each(if initiated.is_never() { initiate_need } else { need });
            let availability = if minerals.is_never() {
                Availability::NoMineralProduction
            } else {
                Availability::NoGasProduction
            };
            return Ok(Calculation::blocked(availability));
        }

        Ok(Calculation {
            initiated,
            started: start,
            availability: Availability::Available,
        })
    }

    /// Whether `candidate`, started at its calculated time, leaves larvae,
    /// production queues and energy for `fixed` at `fixed`'s calculated
    /// start. Runs on copies of those subsystems.
    pub fn can_accommodate(&self, candidate: &Job, fixed: &Job) -> Result<bool> {
        let catalog = self.catalog;
        let contends = |job: &Job| {
            job.larva_cost(catalog) > 0
                || job.energy_cost(catalog) > 0
                || !job.queue_types_expended(catalog).0.is_empty()
        };
        if !contends(candidate) || !contends(fixed) {
            return Ok(true);
        }
        let (Time::At(start), deadline) = (candidate.time_started, fixed.time_started) else {
            return Ok(false);
        };

        let mut hatcheries = self.hatcheries.clone();
        let mut queues = self.queues.clone();
        let mut casters = self.casters.clone();

        let larvae = candidate.larva_cost(catalog);
        if larvae > 0 {
            hatcheries.expend(start, larvae, candidate.tags())?;
        }
        let larvae_ready = match fixed.larva_cost(catalog) {
            0 => Time::ZERO,
            n => hatcheries.when(n, fixed.tags())?,
        };

        if !candidate.queue_types_expended(catalog).0.is_empty() {
            self.occupy(candidate, start, &mut queues, &casters)?;
        }
        let (fixed_types, fixed_all) = fixed.queue_types_expended(catalog);
        let queues_ready = if fixed_types.is_empty() {
            Time::ZERO
        } else {
            queues.when(&fixed_types, fixed_all, fixed.tags()).0
        };

        let energy = candidate.energy_cost(catalog);
        if let (true, Some(caster)) = (energy > 0, candidate.caster_type(catalog)) {
            casters.update(start);
            casters.expend(caster, energy, start, candidate.tags())?;
        }
        let energy_ready = match (fixed.energy_cost(catalog), fixed.caster_type(catalog)) {
            (n, Some(caster)) if n > 0 => casters.when(caster, n, fixed.tags()),
            _ => Time::ZERO,
        };

        Ok(larvae_ready <= deadline && queues_ready <= deadline && energy_ready <= deadline)
    }

    /// Completion time of `job` if started at its calculated time, with
    /// boosts placed tentatively.
    pub fn when_complete(&self, job: &Job) -> Result<Time> {
        let Time::At(start) = job.time_started else {
            return Ok(Time::Never);
        };
        let mut queues = self.queues.clone();
        Ok(Time::At(self.occupy(job, start, &mut queues, &self.casters)?.completed))
    }

    /// Pick production queues for `job` starting at `start`, place its
    /// Chrono Boosts and mark the queues busy until completion.
    ///
    /// Boost energy is drawn from a copy of `casters`; the caller decides
    /// whether to reserve it on the real ones.
    pub fn occupy(
        &self,
        job: &Job,
        start: Fixed,
        queues: &mut ProductionQueues,
        casters: &Casters,
    ) -> Result<Occupancy> {
        let catalog = self.catalog;
        let (types, needs_all) = job.queue_types_expended(catalog);
        let chosen = if types.is_empty() {
            Vec::new()
        } else {
            queues.choose(start, &types, needs_all, job.tags())?
        };

        let mut build = job.duration(catalog);
        let mut boosts = Vec::new();

        if let [index] = chosen[..] {
            let queue = queues
                .get_mut(index)
                .ok_or_else(|| BuildError::InvalidState(format!("production queue {index} vanished")))?;
            if catalog.object(queue.structure).is(SpecialRole::Warpgate) {
                build -= self.rules.warpgate_reduction;
            }

            if let Some(boost) = self.boost() {
                let window = boost.duration * self.rules.boost_rate;
                let speedup = |from: Fixed, build: Fixed| {
                    let shared = overlap(from, from + window, start, start + build);
                    shared - shared / self.rules.boost_rate
                };

                if let Some(last) = queue.boosted {
                    if last + boost.duration > start {
                        build -= speedup(last, build);
                    }
                }

                let mut probe = casters.clone();
                for _ in 0..job.chronoboost {
                    let slot_free = queue.boosted.map_or(Time::ZERO, |last| Time::At(last + boost.duration));
                    let ready = slot_free.max(probe.when(boost.caster, boost.energy, None));
                    let Time::At(at) = ready else { break };
                    if at >= start + build {
                        break;
                    }
                    let at = at.max(start + self.rules.boost_delay);
                    build -= speedup(at, build);
                    probe.update(at);
                    probe.expend(boost.caster, boost.energy, at, None)?;
                    queue.boosted = Some(at);
                    boosts.push(at);
                    tracing::trace!(time = %Time::At(at), build = %build, "chrono boost placed");
                }
            }
        }

        let completed = start + build;
        let productive = job.busies_queues(catalog);
        for &index in &chosen {
            if let Some(queue) = queues.get_mut(index) {
                queue.occupy(start, completed, productive);
            }
        }

        Ok(Occupancy {
            completed,
            queues: chosen,
            boosts,
        })
    }

    /// Commit `job` at its calculated start.
    ///
    /// With `in_future`, the subsystems are not advanced to the job's start
    /// and the job is logged as a checkpoint; this is used for worker
    /// moves that are committed as soon as they are possible.
    pub fn process(&mut self, job: &mut Job, in_future: bool) -> Result<()> {
        let catalog = self.catalog;
        let label = job.label(catalog);
        let _span = tracing::debug_span!("process", job = %label).entered();

        let Time::At(start) = job.time_started else {
            return Err(BuildError::InvalidState(format!("{label} has no start time")));
        };

        job.time_completed = Time::Never;
        for mutation in job.mutations(catalog) {
            if mutation.time < start {
                self.ledger.splice(mutation)?;
            }
        }

        if !in_future {
            self.process_checkpoints(Time::At(start))?;
            self.update(start)?;
        }

        self.ledger.expend(job.costs(catalog));
        let mut completed = start + job.duration(catalog);
        self.ledger.expend(Resources::ZERO - job.refunds(catalog, &self.rules));

        let mut chosen = Vec::new();
        if !job.queue_types_expended(catalog).0.is_empty() {
            let mut queues = std::mem::take(&mut self.queues);
            let committed = self.occupy(job, start, &mut queues, &self.casters);
            self.queues = queues;
            let committed = committed?;
            completed = committed.completed;
            if let Some(boost) = self.boost() {
                for at in &committed.boosts {
                    self.casters.reserve(boost.caster, boost.energy, *at, None)?;
                    self.add_checkpoint(
                        format!("CB: {}", job.description(catalog)),
                        *at,
                        *at + boost.duration,
                    );
                }
            }
            chosen = committed.queues;
        }

        let energy = job.energy_cost(catalog);
        if energy > 0 {
            let caster = job
                .caster_type(catalog)
                .ok_or_else(|| BuildError::InvalidJob(format!("{label} costs energy but has no caster")))?;
            self.casters.expend(caster, energy, start, job.tags())?;
        }

        if let [index] = chosen[..] {
            let warped = self
                .queues
                .get(index)
                .is_some_and(|q| catalog.object(q.structure).is(SpecialRole::Warpgate));
            if warped {
                completed = start + self.rules.warp_in_time;
            }
        }
        job.time_completed = Time::At(completed);

        let larvae = job.larva_cost(catalog);
        if larvae > 0 {
            self.hatcheries.expend(start, larvae, job.tags())?;
        }

        for product in job.products_created(catalog).into_iter().flatten() {
            let def = catalog.object(product);
            if def.is(SpecialRole::SpawnLarvae) {
                self.hatcheries.queue_burst(start, def.build_time)?;
            }
            if def.spawns_larvae() {
                self.hatcheries.add(completed, 1, job.tag.clone());
            }
            if let Some(profile) = def.energy {
                self.casters
                    .add(Caster::new(product, completed, profile.start, profile.max, job.tag.clone()));
            }
            if def.supply_capacity > 0 {
                self.supply.add(def.supply_capacity, completed);
            }
        }

        for product in job.products_destroyed() {
            let def = catalog.object(product);
            if def.is_caster() {
                self.casters.remove(product, completed)?;
            }
            if def.supply_capacity > 0 && !self.supply.remove(def.supply_capacity, completed) {
                tracing::warn!(product = %def.name, "no supply provider left to lose");
            }
            if def.spawns_larvae() && !self.hatcheries.remove(completed) {
                tracing::warn!(product = %def.name, "no hatchery left to lose");
            }
        }

        for mutation in job.mutations(catalog) {
            if mutation.time >= start {
                self.ledger.splice(mutation)?;
            }
        }

        let created = job.queue_types_created(catalog);
        if !created.is_empty() {
            if !chosen.is_empty() && job.is_morph(catalog) {
                self.queues.morph(&chosen, start, &created, completed);
            } else {
                for structure in created.into_iter().flatten() {
                    self.queues
                        .add(ProductionQueue::new(structure, completed, job.tag.clone()));
                }
            }
        }

        let description = job.description(catalog);
        if in_future {
            self.add_checkpoint(description, start, completed);
        } else {
            self.log(description, start, completed);
        }

        self.supply_count += job.supply_cost(catalog, false);
        tracing::debug!(
            start = %Time::At(start),
            completed = %Time::At(completed),
            supply = self.supply_count,
            "committed"
        );
        Ok(())
    }

    /// Log every checkpoint due at or before `until`.
    pub fn process_checkpoints(&mut self, until: Time) -> Result<()> {
        while let Some(checkpoint) = self.checkpoints.first() {
            if Time::At(checkpoint.time_started) > until {
                break;
            }
            let checkpoint = self.checkpoints.remove(0);
            if checkpoint.time_started < self.last_updated {
                tracing::warn!(
                    description = %checkpoint.description,
                    time = %Time::At(checkpoint.time_started),
                    "checkpoint lies before the current time, logged without update"
                );
            } else {
                self.update(checkpoint.time_started)?;
            }
            self.log(checkpoint.description, checkpoint.time_started, checkpoint.time_completed);
        }
        Ok(())
    }

    /// Advance every subsystem to `time`.
    pub fn update(&mut self, time: Fixed) -> Result<()> {
        self.ledger.update(time);
        self.hatcheries.update(time)?;
        self.casters.update(time);
        self.queues.update(time);
        self.last_updated = time;
        Ok(())
    }

    fn log(&mut self, description: String, started: Fixed, completed: Fixed) {
        let banked = self.ledger.surplus(started);
        self.events.push(Event {
            order: self.events.len(),
            description,
            time_started: started,
            time_completed: completed,
            supply_count: self.supply_count,
            supply_capacity: self.supply.surplus(started),
            minerals: round_whole(banked.minerals),
            gas: round_whole(banked.gas),
            larvae: self.hatcheries.surplus(started, None),
            energy: self.casters.surplus(None, started, None),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ObjectDef, Roles};
    use crate::job::JobId;

    fn f(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    struct Ids {
        probe: ObjectId,
        pylon: ObjectId,
        gateway: ObjectId,
        drone: ObjectId,
    }

    fn catalog() -> (Catalog, Ids) {
        let mut catalog = Catalog::new();
        let nexus = catalog.register(
            ObjectDef::structure("Nexus", Race::Protoss)
                .with_cost(400, 0)
                .with_build_time(71)
                .with_supply_capacity(15)
                .with_energy(50, 200)
                .with_roles(Roles {
                    base: true,
                    booster: true,
                    ..Roles::default()
                }),
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
        catalog.register(
            ObjectDef::ability("Chrono Boost", Race::Protoss, nexus)
                .with_energy_cost(50)
                .with_build_time(20)
                .with_special(SpecialRole::ChronoBoost),
        );
        catalog.register(
            ObjectDef::structure("Hatchery", Race::Zerg)
                .with_cost(300, 0)
                .with_build_time(71)
                .with_supply_capacity(6)
                .with_roles(Roles { base: true, ..Roles::default() }),
        );
        let drone = catalog.register(
            ObjectDef::unit("Drone", Race::Zerg)
                .with_cost(50, 0)
                .with_supply(1)
                .with_larva(1)
                .with_build_time(12)
                .with_roles(Roles { worker: true, ..Roles::default() }),
        );
        catalog.register(
            ObjectDef::unit("Overlord", Race::Zerg)
                .with_cost(100, 0)
                .with_larva(1)
                .with_build_time(18)
                .with_supply_capacity(8),
        );
        (catalog, Ids { probe, pylon, gateway, drone })
    }

    fn timeline(catalog: &Catalog, race: Race) -> Timeline<'_> {
        Timeline::new(catalog, race, EconomyRules::default(), ScheduleOptions::default()).unwrap()
    }

    fn evaluated(timeline: &Timeline<'_>, job: Job, scheduled: &[Job]) -> Job {
        let mut job = job;
        timeline.calculate(&job, scheduled).unwrap().apply_to(&mut job);
        job
    }

    #[test]
    fn test_opening_positions() {
        let (catalog, _) = catalog();
        let protoss = timeline(&catalog, Race::Protoss);
        assert_eq!(protoss.supply.surplus(Fixed::ZERO), 15);
        assert_eq!(protoss.casters.surplus(None, Fixed::ZERO, None), vec![50]);
        assert_eq!(protoss.queues.queues().len(), 1);
        assert!(protoss.hatcheries.is_empty());

        let zerg = timeline(&catalog, Race::Zerg);
        assert_eq!(zerg.supply.surplus(Fixed::ZERO), 14);
        assert_eq!(zerg.hatcheries.surplus(Fixed::ZERO, None), vec![3]);
        assert!(zerg.casters.casters().is_empty());
    }

    #[test]
    fn test_first_worker_starts_immediately() {
        let (catalog, ids) = catalog();
        let timeline = timeline(&catalog, Race::Protoss);
        let calculation = timeline.calculate(&Job::build(ids.probe), &[]).unwrap();
        assert!(calculation.availability.is_available());
        assert_eq!(calculation.started, Time::ZERO);
    }

    #[test]
    fn test_second_worker_waits_for_queue() {
        let (catalog, ids) = catalog();
        let mut timeline = timeline(&catalog, Race::Protoss);
        let mut first = evaluated(&timeline, Job::build(ids.probe), &[]);
        timeline.process(&mut first, false).unwrap();
        assert_eq!(first.time_completed, Time::At(f(12)));

        // Funds return after 50 / 4.2 s, the Nexus only at 12 s.
        let second = timeline.calculate(&Job::build(ids.probe), &[first]).unwrap();
        assert_eq!(second.started, Time::At(f(12)));
        assert_eq!(timeline.supply_count, 7);
        assert_eq!(timeline.events().len(), 1);
    }

    #[test]
    fn test_missing_prerequisite() {
        let (catalog, ids) = catalog();
        let timeline = timeline(&catalog, Race::Protoss);
        let calculation = timeline.calculate(&Job::build(ids.gateway), &[]).unwrap();
        assert_eq!(
            calculation.availability,
            Availability::MissingPrerequisite { object: "Pylon".into() }
        );
        assert_eq!(calculation.started, Time::Never);
    }

    #[test]
    fn test_prerequisite_delays_until_complete() {
        let (catalog, ids) = catalog();
        let mut timeline = timeline(&catalog, Race::Protoss);
        let mut pylon = evaluated(&timeline, Job::build(ids.pylon), &[]);
        timeline.process(&mut pylon, false).unwrap();
        let completed = pylon.time_completed;
        let gateway = timeline.calculate(&Job::build(ids.gateway), &[pylon]).unwrap();
        assert!(gateway.availability.is_available());
        assert!(gateway.started >= completed);
    }

    #[test]
    fn test_supply_trigger_mismatch() {
        let (catalog, ids) = catalog();
        let timeline = timeline(&catalog, Race::Protoss);
        let job = Job::build(ids.pylon).with_trigger(Trigger::Supply(9));
        let calculation = timeline.calculate(&job, &[]).unwrap();
        assert_eq!(
            calculation.availability,
            Availability::InsufficientSupply { count: 6, needed: 9 }
        );
    }

    #[test]
    fn test_supply_capacity_exhausted() {
        let (catalog, ids) = catalog();
        let mut timeline = timeline(&catalog, Race::Protoss);
        timeline.supply_count = 15;
        let calculation = timeline.calculate(&Job::build(ids.probe), &[]).unwrap();
        assert_eq!(calculation.availability, Availability::InsufficientSupplyCapacity);
    }

    #[test]
    fn test_missing_dependency() {
        let (catalog, ids) = catalog();
        let timeline = timeline(&catalog, Race::Protoss);
        let job = Job::build(ids.pylon).after(JobId(3), DependencyPoint::AtCompletion);
        let calculation = timeline.calculate(&job, &[]).unwrap();
        assert!(calculation.availability.is_missing_dependency());
    }

    #[test]
    fn test_chrono_boost_shortens_build() {
        let (catalog, ids) = catalog();
        let mut timeline = timeline(&catalog, Race::Protoss);
        let mut probe = evaluated(&timeline, Job::build(ids.probe).with_chronoboost(1), &[]);
        let projected = timeline.when_complete(&probe).unwrap();
        timeline.process(&mut probe, false).unwrap();

        assert_eq!(probe.time_completed, projected);
        assert!(probe.time_completed < Time::At(f(12)));
        assert_eq!(timeline.checkpoints().len(), 1);
        assert_eq!(timeline.checkpoints()[0].description, "CB: Probe");
        assert_eq!(timeline.casters.casters()[0].reservations().len(), 1);
        assert_eq!(timeline.queues.queues()[0].boosted, Some(timeline.rules().boost_delay));
    }

    #[test]
    fn test_can_accommodate_larvae() {
        let (catalog, ids) = catalog();
        let mut timeline = timeline(&catalog, Race::Zerg);
        let candidate = evaluated(&timeline, Job::build(ids.drone), &[]);
        let fixed = evaluated(&timeline, Job::build(ids.drone), &[]);
        assert!(timeline.can_accommodate(&candidate, &fixed).unwrap());

        timeline.hatcheries.expend(Fixed::ZERO, 2, None).unwrap();
        assert!(!timeline.can_accommodate(&candidate, &fixed).unwrap());
    }

    #[test]
    fn test_checkpoints_are_ordered_and_clamped() {
        let (catalog, _) = catalog();
        let mut timeline = timeline(&catalog, Race::Protoss);
        timeline.add_checkpoint("later", f(30), f(30));
        timeline.add_checkpoint("early", f(-5), f(1));
        assert_eq!(timeline.checkpoints()[0].description, "early");
        assert_eq!(timeline.checkpoints()[0].time_started, Fixed::ZERO);

        timeline.process_checkpoints(Time::At(f(10))).unwrap();
        assert_eq!(timeline.events().len(), 1);
        assert_eq!(timeline.checkpoints().len(), 1);
        timeline.process_checkpoints(Time::Never).unwrap();
        assert_eq!(timeline.events()[1].description, "later");
        assert_eq!(timeline.events()[1].minerals, 50 + 126);
    }
}

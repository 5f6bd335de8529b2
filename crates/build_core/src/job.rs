//! Job descriptors.
//!
//! A [`Job`] is one line of a build order. Everything a job costs,
//! creates or occupies is derived from its [`JobKind`] and the catalog on
//! demand; the job itself only carries the scheduling metadata and the
//! times the scheduler computed for it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::availability::Availability;
use crate::catalog::{Catalog, ObjectId, Race, SpecialRole};
use crate::config::EconomyRules;
use crate::ledger::ResourceLedger;
use crate::math::{Fixed, Resources, Time};
use crate::mutation::{Mutation, MutationKind};

/// Position of a job in its build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job {}", self.0)
    }
}

/// Condition that fixes a job's place in the build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Start at exactly this supply count.
    Supply(i32),
    /// Start once this many minerals are banked.
    Minerals(i32),
    /// Start once this much gas is banked.
    Gas(i32),
}

/// Threshold at which the worker is sent to the build site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Initiate {
    /// Send the worker at this many minerals.
    Minerals(i32),
    /// Send the worker at this much gas.
    Gas(i32),
}

/// Which moment of the other job a dependency waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyPoint {
    /// The other job's start.
    AtStart,
    /// The other job's completion.
    AtCompletion,
}

/// A job that must be scheduled before this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// The job waited for.
    pub job: JobId,
    /// Moment waited for.
    pub point: DependencyPoint,
}

/// What a job does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// Build, train, research, morph or cast `product`.
    Build {
        /// Object produced.
        product: ObjectId,
    },
    /// Stop a recurring job building `product`.
    Cancel {
        /// Product of the recurring job.
        product: ObjectId,
    },
    /// Change the worker layout.
    Mutate {
        /// The change.
        kind: MutationKind,
        /// Travel time of the moved workers.
        delay: Option<Fixed>,
    },
    /// Send a worker to scout.
    Scout {
        /// Time the scout is away from the mineral line.
        delay: Option<Fixed>,
    },
    /// Pledge structures to free supply, build units with it, and cancel
    /// the structures again.
    Trick {
        /// Structure pledged.
        pledge: ObjectId,
        /// Structures pledged.
        pledge_count: u32,
        /// Unit built with the freed supply.
        turn: Option<ObjectId>,
        /// Units built.
        turn_count: u32,
    },
    /// Lose `product`.
    Kill {
        /// Object lost.
        product: ObjectId,
    },
}

/// One line of a build order.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Position in the build order.
    pub id: JobId,
    /// What the job does.
    pub kind: JobKind,
    /// Fixed trigger, if any.
    pub trigger: Option<Trigger>,
    /// Estimated supply count for fixed jobs without a supply trigger.
    pub supply_target: Option<i32>,
    /// Job that must come first.
    pub dependency: Option<Dependency>,
    /// When to send the worker ahead.
    pub initiate: Option<Initiate>,
    /// Extra production queue used, such as a scouting worker.
    pub queue_expended: Option<ObjectId>,
    /// Tag given to whatever the job creates.
    pub tag: Option<String>,
    /// Tags restricting which queues, hatcheries and casters may be used.
    pub tags_required: Option<Vec<String>>,
    /// Whether the job repeats until cancelled.
    pub recurring: bool,
    /// Chrono Boosts to spend on the job.
    pub chronoboost: u32,
    /// When the worker left for the build site.
    pub time_initiated: Time,
    /// When the job starts.
    pub time_started: Time,
    /// When the job completes.
    pub time_completed: Time,
    /// Outcome of the last evaluation.
    pub availability: Availability,
    /// Position in the committed schedule.
    pub pick_order: Option<usize>,
}

impl Job {
    /// Create a job with no trigger or restrictions.
    #[must_use]
    pub fn new(kind: JobKind) -> Self {
        Self {
            id: JobId(0),
            kind,
            trigger: None,
            supply_target: None,
            dependency: None,
            initiate: None,
            queue_expended: None,
            tag: None,
            tags_required: None,
            recurring: false,
            chronoboost: 0,
            time_initiated: Time::Never,
            time_started: Time::Never,
            time_completed: Time::Never,
            availability: Availability::Available,
            pick_order: None,
        }
    }

    /// Build `product`.
    #[must_use]
    pub fn build(product: ObjectId) -> Self {
        Self::new(JobKind::Build { product })
    }

    /// Set the trigger.
    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Start once `job` reaches `point`.
    #[must_use]
    pub fn after(mut self, job: JobId, point: DependencyPoint) -> Self {
        self.dependency = Some(Dependency { job, point });
        self
    }

    /// Send the worker ahead at the given threshold.
    #[must_use]
    pub fn with_initiate(mut self, initiate: Initiate) -> Self {
        self.initiate = Some(initiate);
        self
    }

    /// Also occupy a queue of `structure`.
    #[must_use]
    pub fn with_queue_expended(mut self, structure: ObjectId) -> Self {
        self.queue_expended = Some(structure);
        self
    }

    /// Tag whatever the job creates.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Restrict the job to entities carrying one of `tags`.
    #[must_use]
    pub fn with_tags_required(mut self, tags: Vec<String>) -> Self {
        self.tags_required = Some(tags);
        self
    }

    /// Spend `count` Chrono Boosts on the job.
    #[must_use]
    pub fn with_chronoboost(mut self, count: u32) -> Self {
        self.chronoboost = count;
        self
    }

    /// Repeat the job until cancelled.
    #[must_use]
    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    /// Whether the job has a fixed trigger.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.trigger.is_some()
    }

    /// Supply count the job is aimed at: its supply trigger or, failing
    /// that, the estimate made by the scheduler.
    #[must_use]
    pub fn supply_goal(&self) -> Option<i32> {
        match self.trigger {
            Some(Trigger::Supply(supply)) => Some(supply),
            _ => self.supply_target,
        }
    }

    /// Tags required, as a slice.
    #[must_use]
    pub fn tags(&self) -> Option<&[String]> {
        self.tags_required.as_deref()
    }

    /// A fresh copy for the next round of a recurring job.
    #[must_use]
    pub fn recurrence(&self) -> Self {
        Self {
            time_initiated: Time::Never,
            time_started: Time::Never,
            time_completed: Time::Never,
            availability: Availability::Available,
            pick_order: None,
            ..self.clone()
        }
    }

    /// Object built, for build jobs.
    #[must_use]
    pub fn product(&self) -> Option<ObjectId> {
        match self.kind {
            JobKind::Build { product } => Some(product),
            _ => None,
        }
    }

    /// Product of the recurring job this one cancels.
    #[must_use]
    pub fn cancels(&self) -> Option<ObjectId> {
        match self.kind {
            JobKind::Cancel { product } => Some(product),
            _ => None,
        }
    }

    /// Minerals and gas paid at the start.
    #[must_use]
    pub fn costs(&self, catalog: &Catalog) -> Resources {
        match self.kind {
            JobKind::Build { product } => {
                let cost = &catalog.object(product).cost;
                Resources::whole(cost.minerals, cost.gas)
            }
            JobKind::Trick { pledge, pledge_count, turn, turn_count } => {
                let pledged = &catalog.object(pledge).cost;
                let mut minerals = pledge_count as i32 * pledged.minerals;
                let mut gas = pledge_count as i32 * pledged.gas;
                if let Some(turn) = turn {
                    let turned = &catalog.object(turn).cost;
                    minerals += turn_count as i32 * turned.minerals;
                    gas += turn_count as i32 * turned.gas;
                }
                Resources::whole(minerals, gas)
            }
            _ => Resources::ZERO,
        }
    }

    /// Minerals and gas returned at the start.
    #[must_use]
    pub fn refunds(&self, catalog: &Catalog, rules: &EconomyRules) -> Resources {
        match self.kind {
            JobKind::Trick { pledge, pledge_count, .. } => {
                let pledged = &catalog.object(pledge).cost;
                let count = pledge_count as i32;
                Resources::whole(count * rules.refund(pledged.minerals), count * rules.refund(pledged.gas))
            }
            _ => Resources::ZERO,
        }
    }

    /// Larvae used.
    #[must_use]
    pub fn larva_cost(&self, catalog: &Catalog) -> u32 {
        match self.kind {
            JobKind::Build { product } => catalog.object(product).cost.larva,
            JobKind::Trick { pledge, pledge_count, turn, turn_count } => {
                pledge_count * catalog.object(pledge).cost.larva
                    + turn.map_or(0, |t| turn_count * catalog.object(t).cost.larva)
            }
            _ => 0,
        }
    }

    /// Energy used.
    #[must_use]
    pub fn energy_cost(&self, catalog: &Catalog) -> i32 {
        self.product().map_or(0, |p| catalog.object(p).cost.energy)
    }

    /// Type of caster the energy comes from.
    #[must_use]
    pub fn caster_type(&self, catalog: &Catalog) -> Option<ObjectId> {
        self.product().and_then(|p| catalog.object(p).caster())
    }

    /// Change in supply count. With `allow_trick`, supply that a trick
    /// only borrows is counted too.
    #[must_use]
    pub fn supply_cost(&self, catalog: &Catalog, allow_trick: bool) -> i32 {
        match self.kind {
            JobKind::Build { product } => catalog.object(product).cost.supply,
            JobKind::Kill { product } => -catalog.object(product).cost.supply,
            JobKind::Trick { pledge, pledge_count, turn, turn_count } => {
                let turned = turn.map_or(0, |t| turn_count as i32 * catalog.object(t).cost.supply);
                if allow_trick {
                    pledge_count as i32 * catalog.object(pledge).cost.supply + turned
                } else {
                    turned
                }
            }
            _ => 0,
        }
    }

    /// Time from start to completion.
    #[must_use]
    pub fn duration(&self, catalog: &Catalog) -> Fixed {
        match self.kind {
            JobKind::Build { product } => catalog.object(product).build_time,
            JobKind::Mutate { delay, .. } | JobKind::Scout { delay } => delay.unwrap_or(Fixed::ZERO),
            JobKind::Trick { turn: Some(turn), .. } => catalog.object(turn).build_time,
            _ => Fixed::ZERO,
        }
    }

    /// Whether the time spent in a production queue counts as busy.
    /// Morphs hold their queue without producing anything.
    #[must_use]
    pub fn busies_queues(&self, catalog: &Catalog) -> bool {
        self.product().is_some_and(|p| !catalog.object(p).is_morph())
    }

    /// Whether the job is a morph.
    #[must_use]
    pub fn is_morph(&self, catalog: &Catalog) -> bool {
        self.product().is_some_and(|p| catalog.object(p).is_morph())
    }

    /// Whether the job consumes anything. Jobs that do not are committed
    /// as soon as they become available.
    #[must_use]
    pub fn consumptive(&self) -> bool {
        !matches!(self.kind, JobKind::Mutate { .. } | JobKind::Scout { .. })
    }

    /// Objects that must exist first.
    #[must_use]
    pub fn prerequisites(&self, catalog: &Catalog) -> Vec<ObjectId> {
        match self.kind {
            JobKind::Build { product } => catalog.object(product).prerequisites.clone(),
            JobKind::Trick { pledge, turn, .. } => {
                let mut all = catalog.object(pledge).prerequisites.clone();
                if let Some(turn) = turn {
                    all.extend(&catalog.object(turn).prerequisites);
                }
                all
            }
            _ => Vec::new(),
        }
    }

    /// Objects brought into existence; morphs may yield empty slots.
    #[must_use]
    pub fn products_created(&self, catalog: &Catalog) -> Vec<Option<ObjectId>> {
        match self.kind {
            JobKind::Build { product } => {
                let def = catalog.object(product);
                if def.is_morph() {
                    def.yields().to_vec()
                } else {
                    vec![Some(product)]
                }
            }
            JobKind::Trick { turn: Some(turn), turn_count, .. } => vec![Some(turn); turn_count as usize],
            _ => Vec::new(),
        }
    }

    /// Objects lost.
    #[must_use]
    pub fn products_destroyed(&self) -> Vec<ObjectId> {
        match self.kind {
            JobKind::Kill { product } => vec![product],
            _ => Vec::new(),
        }
    }

    /// Production queues that appear when the job completes.
    #[must_use]
    pub fn queue_types_created(&self, catalog: &Catalog) -> Vec<Option<ObjectId>> {
        match self.kind {
            JobKind::Build { product } => {
                let def = catalog.object(product);
                if def.is_morph() {
                    def.yields().to_vec()
                } else if def.is_structure() || def.is_caster() {
                    vec![Some(product)]
                } else {
                    Vec::new()
                }
            }
            JobKind::Scout { .. } => catalog
                .special(SpecialRole::ScoutingWorker)
                .map(|def| vec![Some(def.id)])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Production queue types used, and whether one of each is needed.
    #[must_use]
    pub fn queue_types_expended(&self, catalog: &Catalog) -> (Vec<ObjectId>, bool) {
        let (mut types, needs_all) = match self.kind {
            JobKind::Build { product } => {
                let producers = &catalog.object(product).producers;
                (producers.types.clone(), producers.needs_all)
            }
            _ => (Vec::new(), false),
        };
        types.extend(self.queue_expended);
        (types, needs_all)
    }

    /// Race the job belongs to, if race specific.
    #[must_use]
    pub fn race(&self, catalog: &Catalog) -> Option<Race> {
        match self.kind {
            JobKind::Build { product } => catalog.object(product).race,
            JobKind::Trick { pledge, .. } => catalog.object(pledge).race,
            _ => None,
        }
    }

    /// Human-readable description of what the job does.
    #[must_use]
    pub fn description(&self, catalog: &Catalog) -> String {
        match &self.kind {
            JobKind::Build { product } => catalog.name(*product).to_string(),
            JobKind::Cancel { product } => format!("Cancel {}", catalog.name(*product)),
            JobKind::Mutate { kind, .. } => kind.to_string(),
            JobKind::Scout { .. } => MutationKind::Scout.to_string(),
            JobKind::Kill { product } => format!("Kill {}", catalog.name(*product)),
            JobKind::Trick { pledge, pledge_count, turn, turn_count } => {
                let mut text = match pledge_count {
                    1 => String::new(),
                    2 => "Double ".to_string(),
                    n => format!("{n}x "),
                };
                let pledged = catalog.name(*pledge);
                if turn.is_some() {
                    text.push_str(&format!("{pledged} Trick"));
                } else {
                    text.push_str(&format!("Fake {pledged}"));
                }
                if let Some(turn) = turn {
                    let into_one_worker = *turn_count == 1 && catalog.object(*turn).roles.worker;
                    if *turn_count != 0 && !into_one_worker {
                        text.push_str(&format!(" into {turn_count} {}s", catalog.name(*turn)));
                    }
                }
                text
            }
        }
    }

    /// Description with the trigger and the recurring marker.
    #[must_use]
    pub fn label(&self, catalog: &Catalog) -> String {
        let prefix = match self.trigger {
            Some(Trigger::Gas(gas)) => format!("@{gas} gas "),
            Some(Trigger::Minerals(minerals)) => format!("@{minerals} minerals "),
            Some(Trigger::Supply(supply)) => format!("{supply} "),
            None => String::new(),
        };
        let suffix = if self.recurring { " [auto]" } else { "" };
        format!("{prefix}{}{suffix}", self.description(catalog))
    }

    /// Earliest start allowed by the gas layout: workers can only be put
    /// on gas once an extraction point has room for them.
    #[must_use]
    pub fn gas_room_ready(&self, ledger: &ResourceLedger, after: Fixed) -> Time {
        match self.kind {
            JobKind::Mutate { kind, .. } if kind.adds_gas_workers() => ledger.when_gas_room(after),
            _ => Time::ZERO,
        }
    }

    /// Changes to the worker layout caused by this job, in time order.
    ///
    /// Mutations are placed at the job's computed times, so the result is
    /// only meaningful once the job has been evaluated.
    #[must_use]
    pub fn mutations(&self, catalog: &Catalog) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        let mut push = |kind: MutationKind, time: Time| {
            if let Time::At(time) = time {
                mutations.push(Mutation::new(kind, time));
            }
        };

        match &self.kind {
            JobKind::Cancel { .. } => {}
            JobKind::Mutate { kind, delay } => {
                if let Time::At(start) = self.time_started {
                    mutations.push(Mutation::new(*kind, start).with_delay(*delay));
                }
            }
            JobKind::Scout { delay } => {
                if let Time::At(start) = self.time_started {
                    mutations.push(Mutation::new(MutationKind::Scout, start).with_delay(*delay));
                }
            }
            JobKind::Build { .. } | JobKind::Trick { .. } | JobKind::Kill { .. } => {
                for product in self.products_created(catalog).into_iter().flatten() {
                    let def = catalog.object(product);
                    if def.roles.worker {
                        push(MutationKind::Workers { minerals: 1, gas: 0 }, self.time_completed);
                    }
                    if def.roles.base {
                        push(MutationKind::BaseStarted, self.time_started);
                        push(MutationKind::BaseCompleted, self.time_completed);
                    }
                    if def.roles.extractor {
                        push(MutationKind::ExtractorStarted, self.time_started);
                        push(MutationKind::ExtractorCompleted, self.time_completed);
                    }
                    if def.is(SpecialRole::Mule) {
                        push(MutationKind::Mules(1), self.time_started);
                        push(MutationKind::Mules(-1), self.time_completed);
                    }
                }

                if let Some(product) = self.product() {
                    let def = catalog.object(product);
                    if def.is_structure() {
                        self.occupy_worker(def.race, &mut push);
                    }
                }
            }
        }

        mutations.sort_by_key(|m| m.time);
        mutations
    }

    /// A worker walks to the build site and, depending on the race, comes
    /// back after placing the structure, after finishing it, or never.
    fn occupy_worker(&self, race: Option<Race>, push: &mut impl FnMut(MutationKind, Time)) {
        let (Time::At(leaves), Time::At(started)) = (self.time_initiated, self.time_started) else {
            return;
        };
        let travel = started - leaves;
        let returns = match race {
            Some(Race::Zerg) => Time::Never,
            Some(Race::Terran) => self.time_completed + travel,
            _ => Time::At(started + travel),
        };
        if Time::At(leaves) != returns {
            push(MutationKind::Workers { minerals: -1, gas: 0 }, Time::At(leaves));
            push(MutationKind::Workers { minerals: 1, gas: 0 }, returns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ObjectDef, Roles};

    fn f(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    struct Ids {
        probe: ObjectId,
        pylon: ObjectId,
        gateway: ObjectId,
        drone: ObjectId,
        extractor: ObjectId,
        zergling: ObjectId,
        barracks: ObjectId,
    }

    fn catalog() -> (Catalog, Ids) {
        let mut catalog = Catalog::new();
        let nexus = catalog.register(ObjectDef::structure("Nexus", Race::Protoss).with_roles(Roles {
            base: true,
            ..Roles::default()
        }));
        let probe = catalog.register(
            ObjectDef::unit("Probe", Race::Protoss)
                .with_cost(50, 0)
                .with_supply(1)
                .with_build_time(17)
                .with_producers(vec![nexus])
                .with_roles(Roles { worker: true, ..Roles::default() }),
        );
        let pylon = catalog.register(
            ObjectDef::structure("Pylon", Race::Protoss)
                .with_cost(100, 0)
                .with_build_time(25)
                .with_supply_capacity(8),
        );
        let gateway = catalog.register(
            ObjectDef::structure("Gateway", Race::Protoss)
                .with_cost(150, 0)
                .with_build_time(65)
                .with_prerequisites(vec![pylon]),
        );
        let hatchery = catalog.register(ObjectDef::structure("Hatchery", Race::Zerg).with_roles(Roles {
            base: true,
            ..Roles::default()
        }));
        let drone = catalog.register(
            ObjectDef::unit("Drone", Race::Zerg)
                .with_cost(50, 0)
                .with_supply(1)
                .with_larva(1)
                .with_build_time(17)
                .with_producers(vec![hatchery])
                .with_roles(Roles { worker: true, ..Roles::default() }),
        );
        let extractor = catalog.register(
            ObjectDef::structure("Extractor", Race::Zerg)
                .with_cost(25, 0)
                .with_supply(-1)
                .with_build_time(30)
                .with_roles(Roles { extractor: true, ..Roles::default() }),
        );
        let zergling = catalog.register(
            ObjectDef::unit("Zergling", Race::Zerg)
                .with_cost(50, 0)
                .with_supply(1)
                .with_larva(1)
                .with_build_time(24),
        );
        let barracks = catalog.register(
            ObjectDef::structure("Barracks", Race::Terran)
                .with_cost(150, 0)
                .with_build_time(65),
        );
        (
            catalog,
            Ids {
                probe,
                pylon,
                gateway,
                drone,
                extractor,
                zergling,
                barracks,
            },
        )
    }

    fn timed(mut job: Job, initiated: i32, started: i32, completed: i32) -> Job {
        job.time_initiated = Time::At(f(initiated));
        job.time_started = Time::At(f(started));
        job.time_completed = Time::At(f(completed));
        job
    }

    #[test]
    fn test_trick_costs_and_refunds() {
        let (catalog, ids) = catalog();
        let job = Job::new(JobKind::Trick {
            pledge: ids.extractor,
            pledge_count: 2,
            turn: Some(ids.zergling),
            turn_count: 2,
        });
        assert_eq!(job.costs(&catalog), Resources::whole(150, 0));
        // floor(3 * 25 / 4) = 18 per extractor
        assert_eq!(job.refunds(&catalog, &EconomyRules::default()), Resources::whole(36, 0));
        assert_eq!(job.supply_cost(&catalog, false), 2);
        assert_eq!(job.supply_cost(&catalog, true), 0);
        assert_eq!(job.larva_cost(&catalog), 2);
        assert_eq!(job.description(&catalog), "Double Extractor Trick into 2 Zerglings");
    }

    #[test]
    fn test_trick_into_single_worker_is_plain() {
        let (catalog, ids) = catalog();
        let job = Job::new(JobKind::Trick {
            pledge: ids.extractor,
            pledge_count: 1,
            turn: Some(ids.drone),
            turn_count: 1,
        });
        assert_eq!(job.description(&catalog), "Extractor Trick");
        let fake = Job::new(JobKind::Trick {
            pledge: ids.extractor,
            pledge_count: 1,
            turn: None,
            turn_count: 0,
        });
        assert_eq!(fake.description(&catalog), "Fake Extractor");
        assert_eq!(fake.duration(&catalog), Fixed::ZERO);
    }

    #[test]
    fn test_label_shows_trigger_and_recurrence() {
        let (catalog, ids) = catalog();
        let job = Job::build(ids.pylon).with_trigger(Trigger::Supply(9));
        assert_eq!(job.label(&catalog), "9 Pylon");
        let gas = Job::build(ids.gateway).with_trigger(Trigger::Gas(100));
        assert_eq!(gas.label(&catalog), "@100 gas Gateway");
        let auto = Job::build(ids.probe).recurring();
        assert_eq!(auto.label(&catalog), "Probe [auto]");
    }

    #[test]
    fn test_worker_product_adds_miner_at_completion() {
        let (catalog, ids) = catalog();
        let job = timed(Job::build(ids.probe), 0, 10, 27);
        let mutations = job.mutations(&catalog);
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].time, f(27));
        assert_eq!(mutations[0].kind, MutationKind::Workers { minerals: 1, gas: 0 });
    }

    #[test]
    fn test_protoss_builder_returns_after_placing() {
        let (catalog, ids) = catalog();
        let job = timed(Job::build(ids.pylon), 20, 24, 49);
        let mutations = job.mutations(&catalog);
        let times: Vec<Fixed> = mutations.iter().map(|m| m.time).collect();
        assert_eq!(times, vec![f(20), f(28)]);
    }

    #[test]
    fn test_terran_builder_returns_after_finishing() {
        let (catalog, ids) = catalog();
        let job = timed(Job::build(ids.barracks), 20, 24, 89);
        let times: Vec<Fixed> = job.mutations(&catalog).iter().map(|m| m.time).collect();
        assert_eq!(times, vec![f(20), f(93)]);
    }

    #[test]
    fn test_zerg_builder_is_consumed() {
        let (catalog, ids) = catalog();
        let job = timed(Job::build(ids.extractor), 30, 30, 60);
        let kinds: Vec<MutationKind> = job.mutations(&catalog).iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MutationKind::ExtractorStarted,
                MutationKind::Workers { minerals: -1, gas: 0 },
                MutationKind::ExtractorCompleted,
            ]
        );
    }

    #[test]
    fn test_unevaluated_job_has_no_mutations() {
        let (catalog, ids) = catalog();
        assert!(Job::build(ids.pylon).mutations(&catalog).is_empty());
    }

    #[test]
    fn test_supply_goal_prefers_trigger() {
        let (_, ids) = catalog();
        let mut job = Job::build(ids.gateway).with_trigger(Trigger::Minerals(200));
        assert_eq!(job.supply_goal(), None);
        job.supply_target = Some(14);
        assert_eq!(job.supply_goal(), Some(14));
        let pylon = Job::build(ids.pylon).with_trigger(Trigger::Supply(9));
        assert_eq!(pylon.supply_goal(), Some(9));
    }

    #[test]
    fn test_supply_reason_solved_by_fitting_jobs_only() {
        let (catalog, ids) = catalog();
        let reason = Availability::InsufficientSupply { count: 8, needed: 9 };
        assert!(reason.solved_by(&Job::build(ids.probe), &catalog));
        assert!(!reason.solved_by(&Job::build(ids.pylon), &catalog));

        let capacity = Availability::InsufficientSupplyCapacity;
        assert!(capacity.solved_by(&Job::build(ids.pylon), &catalog));
        assert!(!capacity.solved_by(&Job::build(ids.gateway), &catalog));
    }
}

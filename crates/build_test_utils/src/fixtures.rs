//! Test fixtures and helpers.
//!
//! A catalog with the objects of all three races that carry mechanics
//! of their own, and one opening per race that exercises them.

use build_core::prelude::*;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In engine code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

fn roles(worker: bool, base: bool, extractor: bool, booster: bool) -> Roles {
    Roles {
        worker,
        base,
        extractor,
        booster,
    }
}

/// Catalog of the standard objects.
///
/// Costs and build times follow the game's 1.4 balance.
#[must_use]
pub fn standard_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    let mut add = |def: ObjectDef| catalog.register(def);

    // Protoss
    let nexus = add(ObjectDef::structure("Nexus", Race::Protoss)
        .with_cost(400, 0)
        .with_build_time(100)
        .with_supply_capacity(10)
        .with_energy(0, 100)
        .with_roles(roles(false, true, false, true)));
    let pylon = add(ObjectDef::structure("Pylon", Race::Protoss)
        .with_cost(100, 0)
        .with_build_time(25)
        .with_supply_capacity(8));
    add(ObjectDef::structure("Assimilator", Race::Protoss)
        .with_cost(75, 0)
        .with_build_time(30)
        .with_roles(roles(false, false, true, false)));
    let gateway = add(ObjectDef::structure("Gateway", Race::Protoss)
        .with_cost(150, 0)
        .with_build_time(65)
        .with_prerequisites(vec![nexus, pylon]));
    let warpgate = add(ObjectDef::structure("Warpgate", Race::Protoss).with_special(SpecialRole::Warpgate));
    let forge = add(ObjectDef::structure("Forge", Race::Protoss)
        .with_cost(150, 0)
        .with_build_time(45)
        .with_prerequisites(vec![nexus, pylon]));
    add(ObjectDef::structure("Photon Cannon", Race::Protoss)
        .with_cost(150, 0)
        .with_build_time(40)
        .with_prerequisites(vec![forge, pylon]));
    let core = add(ObjectDef::structure("Cybernetics Core", Race::Protoss)
        .with_cost(150, 0)
        .with_build_time(50)
        .with_prerequisites(vec![gateway, pylon]));
    let twilight = add(ObjectDef::structure("Twilight Council", Race::Protoss)
        .with_cost(150, 100)
        .with_build_time(50)
        .with_prerequisites(vec![core, pylon]));
    let robo = add(ObjectDef::structure("Robotics Facility", Race::Protoss)
        .with_cost(200, 100)
        .with_build_time(65)
        .with_prerequisites(vec![core, pylon]));
    add(ObjectDef::structure("Stargate", Race::Protoss)
        .with_cost(150, 150)
        .with_build_time(60)
        .with_prerequisites(vec![core, pylon]));
    let research = add(ObjectDef::upgrade("Warpgate Research", Race::Protoss)
        .with_cost(50, 50)
        .with_build_time(160)
        .with_producers(vec![core]));
    add(ObjectDef::upgrade("Blink", Race::Protoss)
        .with_cost(150, 150)
        .with_build_time(140)
        .with_producers(vec![twilight]));
    add(ObjectDef::morph("Transform to Warpgate", Race::Protoss, vec![Some(warpgate)])
        .with_build_time(10)
        .with_prerequisites(vec![research])
        .with_producers(vec![gateway]));
    add(ObjectDef::morph("Transform to Gateway", Race::Protoss, vec![Some(gateway)])
        .with_build_time(10)
        .with_prerequisites(vec![research])
        .with_producers(vec![warpgate]));
    add(ObjectDef::unit("Probe", Race::Protoss)
        .with_cost(50, 0)
        .with_supply(1)
        .with_build_time(17)
        .with_producers(vec![nexus])
        .with_roles(roles(true, false, false, false)));
    add(ObjectDef::unit("Zealot", Race::Protoss)
        .with_cost(100, 0)
        .with_supply(2)
        .with_build_time(38)
        .with_producers(vec![gateway, warpgate]));
    add(ObjectDef::unit("Stalker", Race::Protoss)
        .with_cost(125, 50)
        .with_supply(2)
        .with_build_time(42)
        .with_prerequisites(vec![core])
        .with_producers(vec![gateway, warpgate]));
    add(ObjectDef::unit("Sentry", Race::Protoss)
        .with_cost(50, 100)
        .with_supply(2)
        .with_build_time(37)
        .with_prerequisites(vec![core])
        .with_producers(vec![gateway, warpgate]));
    add(ObjectDef::unit("Observer", Race::Protoss)
        .with_cost(25, 75)
        .with_supply(1)
        .with_build_time(40)
        .with_producers(vec![robo]));
    add(ObjectDef::ability("Chrono Boost", Race::Protoss, nexus)
        .with_energy_cost(25)
        .with_build_time(20)
        .with_special(SpecialRole::ChronoBoost));

    // Terran
    let command_center = add(ObjectDef::structure("Command Center", Race::Terran)
        .with_cost(400, 0)
        .with_build_time(100)
        .with_supply_capacity(11)
        .with_roles(roles(false, true, false, false)));
    let orbital = add(ObjectDef::structure("Orbital Command", Race::Terran)
        .with_energy(50, 100)
        .with_roles(roles(false, false, false, true)));
    let depot = add(ObjectDef::structure("Supply Depot", Race::Terran)
        .with_cost(100, 0)
        .with_build_time(30)
        .with_prerequisites(vec![command_center])
        .with_supply_capacity(8));
    add(ObjectDef::structure("Refinery", Race::Terran)
        .with_cost(75, 0)
        .with_build_time(30)
        .with_prerequisites(vec![command_center])
        .with_roles(roles(false, false, true, false)));
    let barracks = add(ObjectDef::structure("Barracks", Race::Terran)
        .with_cost(150, 0)
        .with_build_time(65)
        .with_prerequisites(vec![depot]));
    let engineering_bay = add(ObjectDef::structure("Engineering Bay", Race::Terran)
        .with_cost(125, 0)
        .with_build_time(35)
        .with_prerequisites(vec![command_center]));
    add(ObjectDef::structure("Factory", Race::Terran)
        .with_cost(150, 100)
        .with_build_time(60)
        .with_prerequisites(vec![barracks]));
    add(ObjectDef::morph("Upgrade to Orbital Command", Race::Terran, vec![Some(orbital)])
        .with_cost(150, 0)
        .with_build_time(35)
        .with_prerequisites(vec![barracks])
        .with_producers(vec![command_center]));
    add(ObjectDef::unit("SCV", Race::Terran)
        .with_cost(50, 0)
        .with_supply(1)
        .with_build_time(17)
        .with_producers(vec![command_center, orbital])
        .with_roles(roles(true, false, false, false)));
    add(ObjectDef::unit("Marine", Race::Terran)
        .with_cost(50, 0)
        .with_supply(1)
        .with_build_time(25)
        .with_producers(vec![barracks]));
    add(ObjectDef::upgrade("Infantry Weapons Level 1", Race::Terran)
        .with_cost(100, 100)
        .with_build_time(160)
        .with_producers(vec![engineering_bay]));
    add(ObjectDef::ability("Calldown: MULE", Race::Terran, orbital)
        .with_energy_cost(50)
        .with_build_time(90)
        .with_special(SpecialRole::Mule));

    // Zerg
    let hatchery = add(ObjectDef::structure("Hatchery", Race::Zerg)
        .with_cost(300, 0)
        .with_supply(-1)
        .with_build_time(100)
        .with_supply_capacity(2)
        .with_roles(roles(false, true, false, false)));
    add(ObjectDef::structure("Extractor", Race::Zerg)
        .with_cost(25, 0)
        .with_supply(-1)
        .with_build_time(30)
        .with_roles(roles(false, false, true, false)));
    let pool = add(ObjectDef::structure("Spawning Pool", Race::Zerg)
        .with_cost(200, 0)
        .with_supply(-1)
        .with_build_time(65)
        .with_prerequisites(vec![hatchery]));
    add(ObjectDef::structure("Evolution Chamber", Race::Zerg)
        .with_cost(75, 0)
        .with_supply(-1)
        .with_build_time(35)
        .with_prerequisites(vec![hatchery]));
    let warren = add(ObjectDef::structure("Roach Warren", Race::Zerg)
        .with_cost(150, 0)
        .with_supply(-1)
        .with_build_time(55)
        .with_prerequisites(vec![pool]));
    let lair = add(ObjectDef::structure("Lair", Race::Zerg));
    add(ObjectDef::morph("Morph to Lair", Race::Zerg, vec![Some(lair)])
        .with_cost(150, 100)
        .with_build_time(80)
        .with_prerequisites(vec![pool])
        .with_producers(vec![hatchery]));
    add(ObjectDef::unit("Drone", Race::Zerg)
        .with_cost(50, 0)
        .with_larva(1)
        .with_supply(1)
        .with_build_time(17)
        .with_roles(roles(true, false, false, false)));
    add(ObjectDef::unit("Overlord", Race::Zerg)
        .with_cost(100, 0)
        .with_larva(1)
        .with_build_time(25)
        .with_supply_capacity(8));
    let queen = add(ObjectDef::unit("Queen", Race::Zerg)
        .with_cost(150, 0)
        .with_supply(2)
        .with_build_time(50)
        .with_prerequisites(vec![pool])
        .with_producers(vec![hatchery, lair])
        .with_energy(25, 200)
        .with_roles(roles(false, false, false, true)));
    add(ObjectDef::unit("Zergling", Race::Zerg)
        .with_cost(50, 0)
        .with_larva(1)
        .with_supply(1)
        .with_build_time(24)
        .with_prerequisites(vec![pool]));
    add(ObjectDef::unit("Roach", Race::Zerg)
        .with_cost(75, 25)
        .with_larva(1)
        .with_supply(2)
        .with_build_time(27)
        .with_prerequisites(vec![warren]));
    add(ObjectDef::ability("Spawn Larvae", Race::Zerg, queen)
        .with_energy_cost(25)
        .with_build_time(40)
        .with_special(SpecialRole::SpawnLarvae));

    add(ObjectDef::new("Scouting Worker", None, ObjectKind::Unit).with_special(SpecialRole::ScoutingWorker));

    catalog
}

/// Look up `name`, panicking on typos in test code.
///
/// # Panics
///
/// Panics if the catalog has no such object.
#[must_use]
pub fn id(catalog: &Catalog, name: &str) -> ObjectId {
    catalog
        .lookup(name)
        .unwrap_or_else(|err| panic!("fixture catalog: {err}"))
}

/// Pylon, Gateway, Assimilator and Cybernetics Core on supply triggers,
/// then a chrono boosted Stalker.
#[must_use]
pub fn protoss_opening(catalog: &Catalog) -> BuildOrder {
    let mut order = BuildOrder::new();
    order.push(Job::build(id(catalog, "Pylon")).with_trigger(Trigger::Supply(9)));
    order.push(Job::build(id(catalog, "Gateway")).with_trigger(Trigger::Supply(12)));
    order.push(Job::build(id(catalog, "Assimilator")).with_trigger(Trigger::Supply(13)));
    order.push(
        Job::new(JobKind::Mutate {
            kind: MutationKind::Workers { minerals: -3, gas: 3 },
            delay: Some(fixed(2)),
        })
        .with_trigger(Trigger::Supply(14)),
    );
    order.push(Job::build(id(catalog, "Cybernetics Core")).with_trigger(Trigger::Supply(15)));
    order.push(Job::build(id(catalog, "Pylon")).with_trigger(Trigger::Supply(16)));
    order.push(Job::build(id(catalog, "Stalker")).with_chronoboost(1));
    order.checkpoint(fixed(120));
    order
}

/// Supply Depot, Barracks and Refinery, then an Orbital Command calling
/// down a MULE.
#[must_use]
pub fn terran_opening(catalog: &Catalog) -> BuildOrder {
    let mut order = BuildOrder::new();
    order.push(Job::build(id(catalog, "Supply Depot")).with_trigger(Trigger::Supply(10)));
    order.push(Job::build(id(catalog, "Barracks")).with_trigger(Trigger::Supply(12)));
    order.push(Job::build(id(catalog, "Refinery")).with_trigger(Trigger::Supply(13)));
    let orbital = order.push(Job::build(id(catalog, "Upgrade to Orbital Command")).with_trigger(Trigger::Supply(15)));
    order.push(Job::build(id(catalog, "Marine")));
    order.push(Job::build(id(catalog, "Calldown: MULE")).after(orbital, DependencyPoint::AtCompletion));
    order
}

/// Overlord, Spawning Pool and Extractor, a second Overlord, then a Queen,
/// Zerglings and a Spawn Larvae.
#[must_use]
pub fn zerg_opening(catalog: &Catalog) -> BuildOrder {
    let mut order = BuildOrder::new();
    order.push(Job::build(id(catalog, "Overlord")).with_trigger(Trigger::Supply(9)));
    order.push(Job::build(id(catalog, "Spawning Pool")).with_trigger(Trigger::Supply(13)));
    order.push(Job::build(id(catalog, "Extractor")).with_trigger(Trigger::Supply(13)));
    order.push(Job::build(id(catalog, "Overlord")).with_trigger(Trigger::Supply(16)));
    let queen = order.push(Job::build(id(catalog, "Queen")).with_trigger(Trigger::Supply(16)));
    order.push(Job::build(id(catalog, "Zergling")).with_trigger(Trigger::Supply(18)));
    order.push(Job::build(id(catalog, "Spawn Larvae")).after(queen, DependencyPoint::AtCompletion));
    order
}

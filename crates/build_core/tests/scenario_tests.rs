//! Whole build orders scheduled against the standard catalog.

use build_core::data::BuildOrderData;
use build_core::prelude::*;
use build_test_utils::determinism::{run_parallel, verify_determinism, verify_ron_round_trip};
use build_test_utils::fixtures::{
    fixed, fixed_f, id, protoss_opening, standard_catalog, terran_opening, zerg_opening,
};

fn run(catalog: &Catalog, order: &BuildOrder) -> BuildReport {
    order
        .run(catalog, EconomyRules::default())
        .unwrap_or_else(|err| panic!("{err}: {}", err.long_description().unwrap_or_default()))
}

fn descriptions(report: &BuildReport) -> Vec<&str> {
    report.events.iter().map(|e| e.description.as_str()).collect()
}

// ==========================================================================
// Supply triggers
// ==========================================================================

#[test]
fn test_single_job_starts_when_affordable() {
    let catalog = standard_catalog();
    let options = ScheduleOptions {
        initial_supply: 10,
        ..ScheduleOptions::default()
    };
    let mut order = BuildOrder::new().with_options(options);
    order.push(Job::build(id(&catalog, "Pylon")).with_trigger(Trigger::Supply(10)));

    let report = run(&catalog, &order);
    let pylon = report.event("Pylon").unwrap();
    // 50 minerals short, six workers at 0.7 per second.
    let expected = fixed(50) / fixed_f(4.2);
    assert!((pylon.time_started - expected).abs() < fixed_f(0.01));
    assert_eq!(pylon.supply_count, 10);
}

#[test]
fn test_workers_fill_gaps_between_fixed_jobs() {
    let catalog = standard_catalog();
    let mut order = BuildOrder::new();
    order.push(Job::build(id(&catalog, "Pylon")).with_trigger(Trigger::Supply(10)));
    order.push(Job::build(id(&catalog, "Gateway")).with_trigger(Trigger::Supply(12)));

    let report = run(&catalog, &order);
    assert_eq!(
        descriptions(&report),
        vec!["Probe", "Probe", "Probe", "Probe", "Pylon", "Probe", "Probe", "Gateway"]
    );

    let pylon = report.event("Pylon").unwrap();
    let gateway = report.event("Gateway").unwrap();
    assert_eq!(pylon.supply_count, 10);
    assert_eq!(gateway.supply_count, 12);
    // The Gateway needs the finished Pylon.
    assert!(gateway.time_started >= pylon.time_completed);
}

#[test]
fn test_cancel_stops_automatic_workers() {
    let catalog = standard_catalog();
    let probe = id(&catalog, "Probe");
    let mut order = BuildOrder::new();
    order.push(Job::new(JobKind::Cancel { product: probe }).with_trigger(Trigger::Supply(8)));
    order.push(Job::build(id(&catalog, "Pylon")));

    let report = run(&catalog, &order);
    let probes = report.jobs.iter().filter(|j| j.label.ends_with("Probe [auto]")).count();
    assert_eq!(probes, 2);
}

// ==========================================================================
// Race mechanics
// ==========================================================================

#[test]
fn test_protoss_opening_uses_chrono_boost() {
    let catalog = standard_catalog();
    let report = run(&catalog, &protoss_opening(&catalog));

    assert_eq!(report.race, Race::Protoss);
    assert!(report.event("CB: Stalker").is_some());
    assert!(report.event(CHECKPOINT).is_some());
    assert!(report.gas_mined > 0);
    assert!(report.jobs.iter().all(|j| j.started <= j.completed));
}

#[test]
fn test_warpgate_shortens_builds() {
    let catalog = standard_catalog();
    let probe = id(&catalog, "Probe");
    let mut order = protoss_opening(&catalog);
    order.push(Job::new(JobKind::Cancel { product: probe }).with_trigger(Trigger::Supply(17)));
    order.push(Job::build(id(&catalog, "Warpgate Research")));
    let transform = order.push(Job::build(id(&catalog, "Transform to Warpgate")));
    order.push(Job::build(id(&catalog, "Zealot")).after(transform, DependencyPoint::AtCompletion));

    let schedule = order.schedule(&catalog, EconomyRules::default()).unwrap();
    let zealot = schedule
        .jobs
        .iter()
        .find(|j| j.product() == Some(id(&catalog, "Zealot")))
        .unwrap();
    let duration = zealot.time_completed.secs().unwrap() - zealot.time_started.secs().unwrap();
    assert_eq!(duration, fixed(5));

    let report = BuildReport::new(&schedule);
    assert!(report.queues.iter().any(|q| q.structure == "Warpgate"));
}

#[test]
fn test_terran_opening_calls_down_mule() {
    let catalog = standard_catalog();
    let report = run(&catalog, &terran_opening(&catalog));

    assert_eq!(report.race, Race::Terran);
    assert!(report.segments.iter().any(|s| s.mules == 1));
    let orbital = report.event("Upgrade to Orbital Command").unwrap();
    let mule = report.event("Calldown: MULE").unwrap();
    assert!(mule.time_started >= orbital.time_completed);
}

#[test]
fn test_zerg_opening_tracks_larvae() {
    let catalog = standard_catalog();
    let report = run(&catalog, &zerg_opening(&catalog));

    assert_eq!(report.race, Race::Zerg);
    assert_eq!(report.hatcheries.len(), 1);
    assert!(report.hatcheries[0].larvae <= EconomyRules::default().larva_cap);
    // Drones that became structures never come back.
    let pool = report.event("Spawning Pool").unwrap();
    assert_eq!(pool.supply_count, 13);
    let queen = report.event("Queen").unwrap();
    assert!(queen.time_started >= pool.time_completed);
}

#[test]
fn test_zerg_opening_stays_under_capacity() {
    let catalog = standard_catalog();
    let report = run(&catalog, &zerg_opening(&catalog));

    let overlords = report.events.iter().filter(|e| e.description == "Overlord").count();
    assert_eq!(overlords, 2);
    let zergling = report.event("Zergling").unwrap();
    assert_eq!(zergling.supply_count, 18);
    assert!(report.event("Spawn Larvae").is_some());
    for event in &report.events {
        assert!(
            event.supply_count <= event.supply_capacity,
            "{} at {}/{}",
            event.description,
            event.supply_count,
            event.supply_capacity
        );
    }
}

// ==========================================================================
// Failures
// ==========================================================================

#[test]
fn test_missing_gas_is_named() {
    let catalog = standard_catalog();
    let mut order = BuildOrder::new();
    order.push(Job::build(id(&catalog, "Spawning Pool")).with_trigger(Trigger::Supply(10)));
    order.push(Job::build(id(&catalog, "Morph to Lair")).with_trigger(Trigger::Supply(9)));

    let err = order.run(&catalog, EconomyRules::default()).unwrap_err();
    match err {
        BuildError::Unschedulable { job, reason, description } => {
            assert!(job.contains("Morph to Lair"));
            assert_eq!(reason, "No gas is being mined.");
            assert!(description.contains("workers were put on gas"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_queue_is_named() {
    let catalog = standard_catalog();
    let mut order = BuildOrder::new();
    order.push(Job::build(id(&catalog, "Infantry Weapons Level 1")).with_trigger(Trigger::Supply(8)));

    let err = order.run(&catalog, EconomyRules::default()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Unschedulable { ref reason, .. }
            if reason == "No production queue of type Engineering Bay exists."
    ));
}

// ==========================================================================
// Data files and determinism
// ==========================================================================

#[test]
fn test_build_order_from_ron() {
    let catalog = standard_catalog();
    let text = r#"(
        checkpoints: [60],
        jobs: [
            (action: Build("Overlord"), trigger: Some(Supply(9))),
            (action: Build("Spawning Pool"), trigger: Some(Supply(12)), tag: Some("pool")),
            (action: Trick(pledge: "Extractor", turn: Some("Drone")), trigger: Some(Supply(12))),
            (action: Build("Zergling")),
        ],
    )"#;
    let order = BuildOrderData::from_ron(text, "pool.ron").unwrap().resolve(&catalog).unwrap();
    let report = run(&catalog, &order);

    assert!(report.event("Extractor Trick").is_some());
    assert!(report.event("Zergling").is_some());
    assert!(report.event(CHECKPOINT).is_some());
}

#[test]
fn test_openings_are_deterministic() {
    let catalog = standard_catalog();
    for order in [protoss_opening(&catalog), terran_opening(&catalog), zerg_opening(&catalog)] {
        verify_determinism(3, &catalog, &order).assert_deterministic();
        run_parallel(4, &catalog, &order).assert_deterministic();
    }
}

#[test]
fn test_report_survives_ron() {
    let catalog = standard_catalog();
    let report = run(&catalog, &zerg_opening(&catalog));
    assert!(verify_ron_round_trip(&report));
}

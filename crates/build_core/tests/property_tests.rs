//! Property tests for the engine's subsystems and the scheduler.
//!
//! Each property holds for any input the strategies produce, not just
//! the hand-picked cases in the unit tests.

use build_core::config::{EconomyRules, ScheduleOptions};
use build_core::energy::{Caster, Casters};
use build_core::larva::Hatcheries;
use build_core::ledger::ResourceLedger;
use build_core::math::{Fixed, Time};
use build_core::mutation::Mutation;
use build_core::prelude::*;
use build_test_utils::determinism::strategies::{arb_pylon_supply, arb_seconds, arb_time, arb_worker_change};
use build_test_utils::fixtures::{fixed, id, standard_catalog};
use proptest::prelude::*;

fn opening_ledger() -> ResourceLedger {
    ResourceLedger::opening(&ScheduleOptions::default(), EconomyRules::default())
}

// ==========================================================================
// Ledger
// ==========================================================================

proptest! {
    /// Without spending, the bank only ever grows.
    #[test]
    fn prop_surplus_is_monotone(
        changes in prop::collection::vec((arb_seconds(), arb_worker_change()), 0..3),
        a in arb_time(),
        b in arb_time(),
    ) {
        let mut ledger = opening_ledger();
        for (time, kind) in changes {
            ledger.splice(Mutation::new(kind, time)).unwrap();
        }
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let before = ledger.surplus(early);
        let after = ledger.surplus(late);
        prop_assert!(before.minerals <= after.minerals);
        prop_assert!(before.gas <= after.gas);
    }

    /// A mutation that changes nothing leaves every balance alone, up to
    /// the last bits of fixed-point rounding.
    #[test]
    fn prop_zero_mutation_changes_nothing(
        at in arb_time(),
        queries in prop::collection::vec(arb_time(), 1..8),
    ) {
        let ledger = opening_ledger();
        let mut spliced = ledger.clone();
        spliced.splice(Mutation::workers(0, 0, at)).unwrap();
        let tolerance = Fixed::from_num(0.000_001);
        for query in queries {
            let (plain, split) = (ledger.surplus(query), spliced.surplus(query));
            prop_assert!((plain.minerals - split.minerals).abs() <= tolerance);
            prop_assert!((plain.gas - split.gas).abs() <= tolerance);
        }
    }

    /// `when` answers with a time at which the bank really covers the need.
    #[test]
    fn prop_when_is_sufficient(minerals in 0i32..2000) {
        let ledger = opening_ledger();
        let need = Resources::whole(minerals, 0);
        let Time::At(at) = ledger.when(need) else {
            return Err(TestCaseError::fail("minerals are always mined"));
        };
        let banked = ledger.surplus(at + Fixed::from_num(0.001));
        prop_assert!(banked.minerals >= need.minerals);
    }
}

// ==========================================================================
// Larvae
// ==========================================================================

proptest! {
    /// Larvae never exceed the cap, however spending and bursts interleave.
    #[test]
    fn prop_larvae_stay_within_cap(
        steps in prop::collection::vec((1i32..30, any::<bool>()), 1..40),
    ) {
        let rules = EconomyRules::default();
        let mut hatcheries = Hatcheries::new(rules);
        hatcheries.add(Fixed::ZERO, rules.larva_threshold, None);

        let mut now = Fixed::ZERO;
        for (elapsed, burst) in steps {
            now += Fixed::from_num(elapsed);
            hatcheries.update(now).unwrap();
            if burst {
                hatcheries.queue_burst(now, Fixed::from_num(40)).unwrap();
            } else if hatcheries.surplus(now, None)[0] > 0 {
                hatcheries.expend(now, 1, None).unwrap();
            }
            for larvae in hatcheries.surplus(now, None) {
                prop_assert!(larvae <= rules.larva_cap);
            }
        }
        let later = now + Fixed::from_num(600);
        for larvae in hatcheries.surplus(later, None) {
            prop_assert!(larvae <= rules.larva_cap);
        }
    }

    /// Asking for several larvae at once agrees with asking one at a time.
    #[test]
    fn prop_larva_lookahead_matches_draws(count in 1u32..8, spent in 0u32..3) {
        let rules = EconomyRules::default();
        let mut hatcheries = Hatcheries::new(rules);
        hatcheries.add(Fixed::ZERO, rules.larva_threshold, None);
        hatcheries.expend(Fixed::ZERO, spent, None).unwrap();

        let together = hatcheries.when(count, None).unwrap();
        let mut single = hatcheries.clone();
        let mut last = Time::ZERO;
        for _ in 0..count {
            last = single.when(1, None).unwrap();
            single.expend(last.secs().unwrap(), 1, None).unwrap();
        }
        prop_assert_eq!(together, last);
    }
}

// ==========================================================================
// Energy
// ==========================================================================

proptest! {
    /// Reservations only ever reduce the free view of a caster's energy.
    #[test]
    fn prop_free_energy_never_exceeds_stored(
        reservations in prop::collection::vec((arb_seconds(), 1i32..50), 0..5),
        at in arb_seconds(),
    ) {
        let caster_type = ObjectId::new(0);
        let mut casters = Casters::new(EconomyRules::default());
        casters.add(Caster::new(caster_type, Fixed::ZERO, 50, 200, None));
        for (time, amount) in reservations {
            casters.reserve(caster_type, amount, time, None).unwrap();
        }
        casters.update(at);
        let caster = &casters.casters()[0];
        prop_assert!(caster.energy(false) >= caster.energy(true));
    }
}

// ==========================================================================
// Scheduler
// ==========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every committed job starts before it completes and after whatever
    /// it depends on.
    #[test]
    fn prop_schedule_respects_order(pylon_supply in arb_pylon_supply(), gateway_after_start in any::<bool>()) {
        let catalog = standard_catalog();
        let mut order = BuildOrder::new();
        let pylon = order.push(Job::build(id(&catalog, "Pylon")).with_trigger(Trigger::Supply(pylon_supply)));
        let point = if gateway_after_start { DependencyPoint::AtStart } else { DependencyPoint::AtCompletion };
        order.push(Job::build(id(&catalog, "Gateway")).after(pylon, point));
        order.push(Job::build(id(&catalog, "Zealot")));
        order.checkpoint(fixed(90));

        let schedule = order.schedule(&catalog, EconomyRules::default()).unwrap();
        for job in &schedule.jobs {
            prop_assert!(job.time_started.is_finite());
            prop_assert!(job.time_started <= job.time_completed);
            if let Some(dependency) = job.dependency {
                let other = schedule.jobs.iter().find(|j| j.id == dependency.job).unwrap();
                let ready = match dependency.point {
                    DependencyPoint::AtStart => other.time_started,
                    DependencyPoint::AtCompletion => other.time_completed,
                };
                prop_assert!(ready <= job.time_started);
            }
        }
    }
}

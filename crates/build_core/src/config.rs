//! Economic constants and per-run options.
//!
//! Nothing in the engine reads global state: a [`Timeline`] receives its
//! [`EconomyRules`] and [`ScheduleOptions`] when it is built, and every
//! subsystem that needs a constant gets it from there.
//!
//! [`Timeline`]: crate::timeline::Timeline

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Resources};

/// Constants of the game economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyRules {
    /// Minerals per second for each of the first `mineral_saturation` workers on a base.
    #[serde(with = "fixed_serde")]
    pub mineral_rate: Fixed,
    /// Workers per base mining at the full rate.
    pub mineral_saturation: i32,
    /// Minerals per second for each worker past saturation.
    #[serde(with = "fixed_serde")]
    pub oversaturated_mineral_rate: Fixed,
    /// Workers past saturation that still contribute.
    pub oversaturation_cap: i32,
    /// Gas per second for each worker on an extraction point.
    #[serde(with = "fixed_serde")]
    pub gas_rate: Fixed,
    /// Workers per extraction point that contribute.
    pub gas_saturation: i32,
    /// Minerals per second for each MULE.
    #[serde(with = "fixed_serde")]
    pub mule_rate: Fixed,
    /// Seconds between natural larva spawns.
    #[serde(with = "fixed_serde")]
    pub larva_interval: Fixed,
    /// Maximum larvae per hatchery.
    pub larva_cap: u32,
    /// Natural larva generation pauses at this many larvae.
    pub larva_threshold: u32,
    /// Larvae granted when a Spawn Larvae expires.
    pub burst_larvae: u32,
    /// Energy regenerated per second.
    #[serde(with = "fixed_serde")]
    pub energy_rate: Fixed,
    /// Production speed factor while boosted.
    #[serde(with = "fixed_serde")]
    pub boost_rate: Fixed,
    /// Reaction time before a boost lands on a fresh job.
    #[serde(with = "fixed_serde")]
    pub boost_delay: Fixed,
    /// Seconds shaved off a build when a warpgate is used.
    #[serde(with = "fixed_serde")]
    pub warpgate_reduction: Fixed,
    /// Build time of a warped-in unit.
    #[serde(with = "fixed_serde")]
    pub warp_in_time: Fixed,
    /// Refund fraction numerator of a cancelled pledge.
    pub refund_numerator: i32,
    /// Refund fraction denominator of a cancelled pledge.
    pub refund_denominator: i32,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            mineral_rate: Fixed::from_num(0.7),
            mineral_saturation: 16,
            oversaturated_mineral_rate: Fixed::from_num(0.3),
            oversaturation_cap: 8,
            gas_rate: Fixed::from_num(0.63),
            gas_saturation: 3,
            mule_rate: Fixed::from_num(2.9),
            larva_interval: Fixed::from_num(15),
            larva_cap: 19,
            larva_threshold: 3,
            burst_larvae: 4,
            energy_rate: Fixed::from_num(0.5625),
            boost_rate: Fixed::from_num(1.5),
            boost_delay: Fixed::from_num(0.1),
            warpgate_reduction: Fixed::from_num(10),
            warp_in_time: Fixed::from_num(5),
            refund_numerator: 3,
            refund_denominator: 4,
        }
    }
}

impl EconomyRules {
    /// Mineral income of one base with `workers` on it.
    #[must_use]
    pub fn base_income(&self, workers: i32) -> Fixed {
        let saturated = workers.clamp(0, self.mineral_saturation);
        let extra = (workers - self.mineral_saturation).clamp(0, self.oversaturation_cap);
        self.mineral_rate * Fixed::from_num(saturated)
            + self.oversaturated_mineral_rate * Fixed::from_num(extra)
    }

    /// Gas income of one extraction point with `workers` on it.
    #[must_use]
    pub fn extractor_income(&self, workers: i32) -> Fixed {
        self.gas_rate * Fixed::from_num(workers.clamp(0, self.gas_saturation))
    }

    /// Amount returned when a pledge costing `cost` is cancelled.
    #[must_use]
    pub fn refund(&self, cost: i32) -> i32 {
        (self.refund_numerator * cost).div_euclid(self.refund_denominator)
    }
}

/// Options of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Seconds before the first job may start.
    pub startup_build_delay: i32,
    /// Seconds before the initial workers start mining.
    pub startup_mining_delay: i32,
    /// Minerals at game start.
    pub initial_minerals: i32,
    /// Gas at game start.
    pub initial_gas: i32,
    /// Mineral workers at game start.
    pub initial_workers: i32,
    /// Supply used at game start.
    pub initial_supply: i32,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            startup_build_delay: 0,
            startup_mining_delay: 0,
            initial_minerals: 50,
            initial_gas: 0,
            initial_workers: 6,
            initial_supply: 6,
        }
    }
}

impl ScheduleOptions {
    /// Stockpile at game start.
    #[must_use]
    pub fn initial_resources(&self) -> Resources {
        Resources::whole(self.initial_minerals, self.initial_gas)
    }

    /// Startup build delay in seconds.
    #[must_use]
    pub fn build_delay(&self) -> Fixed {
        Fixed::from_num(self.startup_build_delay.max(0))
    }

    /// Startup mining delay in seconds.
    #[must_use]
    pub fn mining_delay(&self) -> Fixed {
        Fixed::from_num(self.startup_mining_delay.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_income_tiers() {
        let rules = EconomyRules::default();
        let close = |a: Fixed, b: f64| (a - Fixed::from_num(b)).abs() < Fixed::from_num(0.0001);

        assert!(close(rules.base_income(6), 4.2));
        assert!(close(rules.base_income(16), 11.2));
        // 16 full workers plus 8 at the reduced rate.
        assert!(close(rules.base_income(24), 13.6));
        // Workers past 24 add nothing.
        assert!(close(rules.base_income(30), 13.6));
        assert_eq!(rules.base_income(0), Fixed::ZERO);
    }

    #[test]
    fn test_extractor_income_caps_at_three() {
        let rules = EconomyRules::default();
        assert_eq!(rules.extractor_income(5), rules.extractor_income(3));
        assert_eq!(rules.extractor_income(0), Fixed::ZERO);
    }

    #[test]
    fn test_refund_floors() {
        let rules = EconomyRules::default();
        assert_eq!(rules.refund(25), 18);
        assert_eq!(rules.refund(75), 56);
        assert_eq!(rules.refund(0), 0);
    }

    #[test]
    fn test_options_from_ron() {
        let options: ScheduleOptions = ron::from_str("(startup_mining_delay: 2)").unwrap();
        assert_eq!(options.startup_mining_delay, 2);
        assert_eq!(options.initial_minerals, 50);
    }
}

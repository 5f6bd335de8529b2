//! Larva generation.
//!
//! Every hatchery spawns a larva on a fixed interval until it holds
//! `larva_threshold` larvae; generation then pauses. Spawn Larvae queues a
//! burst that lands a fixed time after the cast and may push the count
//! past the threshold, up to `larva_cap`.
//!
//! When a burst pushes a hatchery over the threshold mid-interval, the
//! time already spent on the current larva is kept as a rebate. Once
//! larvae are spent back below the threshold the timer resumes with that
//! rebate subtracted instead of starting a fresh interval.

use serde::{Deserialize, Serialize};

use crate::config::EconomyRules;
use crate::error::{BuildError, Result};
use crate::math::{fixed_serde, vec_fixed_serde, Fixed, Time};

/// A single larva-producing structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hatchery {
    /// Completion time.
    #[serde(with = "fixed_serde")]
    pub created: Fixed,
    /// When the hatchery is lost.
    pub destroyed: Time,
    /// Larvae available.
    pub larvae: u32,
    /// Position in creation order, starting at 1.
    pub order: usize,
    /// Tag for targeting this hatchery.
    pub tag: Option<String>,
    #[serde(with = "fixed_serde")]
    next_larva: Fixed,
    #[serde(with = "fixed_serde")]
    rebate: Fixed,
    #[serde(with = "vec_fixed_serde")]
    bursts: Vec<Fixed>,
    #[serde(with = "fixed_serde")]
    last_updated: Fixed,
}

impl Hatchery {
    /// Create a hatchery completing at `created` with `larvae` larvae.
    #[must_use]
    pub fn new(created: Fixed, larvae: u32, tag: Option<String>, rules: &EconomyRules) -> Self {
        let mut hatchery = Self {
            created,
            destroyed: Time::Never,
            larvae: 0,
            order: 0,
            tag,
            next_larva: created,
            rebate: Fixed::ZERO,
            bursts: Vec::new(),
            last_updated: created,
        };
        hatchery.generate(created, larvae, true, rules);
        hatchery
    }

    fn generate(&mut self, time: Fixed, count: u32, reset: bool, rules: &EconomyRules) {
        let was_generating = self.larvae < rules.larva_threshold;
        self.larvae = (self.larvae + count).min(rules.larva_cap);
        if reset {
            self.next_larva = time + rules.larva_interval;
            self.rebate = Fixed::ZERO;
        } else if was_generating && self.larvae >= rules.larva_threshold {
            let elapsed = time - (self.next_larva - rules.larva_interval);
            self.rebate = elapsed.clamp(Fixed::ZERO, rules.larva_interval);
        }
    }

    /// Next natural larva, or `Never` while generation is paused.
    #[must_use]
    pub fn next_generated(&self, rules: &EconomyRules) -> Time {
        if self.larvae < rules.larva_threshold {
            Time::At(self.next_larva)
        } else {
            Time::Never
        }
    }

    /// Next pending burst.
    #[must_use]
    pub fn next_burst(&self) -> Time {
        self.bursts.first().map_or(Time::Never, |t| Time::At(*t))
    }

    /// Time saved on the interval interrupted by the last burst.
    #[must_use]
    pub fn rebate(&self) -> Fixed {
        self.rebate
    }

    /// Whether the hatchery exists at `time`.
    #[must_use]
    pub fn alive_at(&self, time: Fixed) -> bool {
        self.created <= time && self.destroyed > Time::At(time)
    }

    /// Advance to `time`, applying generation and bursts in time order.
    pub fn update(&mut self, time: Fixed, rules: &EconomyRules) {
        let until = Time::At(time);
        while self.next_generated(rules) <= until || self.next_burst() <= until {
            let horizon = until.min(self.next_generated(rules));
            while let Some(&expiry) = self.bursts.first() {
                if Time::At(expiry) > horizon {
                    break;
                }
                self.bursts.remove(0);
                self.generate(expiry, rules.burst_larvae, false, rules);
            }
            if self.next_generated(rules) <= until {
                self.generate(self.next_larva, 1, true, rules);
            }
        }
        self.last_updated = self.created.max(time);
    }

    /// Larvae available at `time`, without changing this hatchery.
    #[must_use]
    pub fn surplus(&self, time: Fixed, rules: &EconomyRules) -> u32 {
        let mut probe = self.clone();
        probe.update(time, rules);
        probe.larvae
    }

    /// When a larva is next available. Pending bursts are not counted.
    #[must_use]
    pub fn when(&self) -> Time {
        if self.larvae > 0 {
            Time::At(self.last_updated)
        } else {
            Time::At(self.next_larva)
        }
    }

    /// When the last queued burst lands; Spawn Larvae can not be
    /// queued again before that.
    #[must_use]
    pub fn when_burst(&self) -> Time {
        Time::At(self.bursts.last().copied().unwrap_or(self.created))
    }

    /// Queue a burst landing at `expires`.
    pub fn queue_burst(&mut self, expires: Fixed) {
        let index = self.bursts.partition_point(|t| *t <= expires);
        self.bursts.insert(index, expires);
    }

    fn take_larva(&mut self, time: Fixed, rules: &EconomyRules) {
        if self.larvae == rules.larva_threshold {
            self.next_larva = time + rules.larva_interval - self.rebate;
        }
        self.larvae -= 1;
    }
}

/// All hatcheries of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hatcheries {
    rules: EconomyRules,
    hatcheries: Vec<Hatchery>,
    #[serde(with = "fixed_serde")]
    last_updated: Fixed,
}

impl Hatcheries {
    /// Create an empty set.
    #[must_use]
    pub fn new(rules: EconomyRules) -> Self {
        Self {
            rules,
            hatcheries: Vec::new(),
            last_updated: Fixed::ZERO,
        }
    }

    /// Add a hatchery completing at `created` with `larvae` larvae.
    pub fn add(&mut self, created: Fixed, larvae: u32, tag: Option<String>) {
        let mut hatchery = Hatchery::new(created, larvae, tag, &self.rules);
        hatchery.order = self.hatcheries.len() + 1;
        self.hatcheries.push(hatchery);
    }

    /// All hatcheries in creation order.
    #[must_use]
    pub fn hatcheries(&self) -> &[Hatchery] {
        &self.hatcheries
    }

    /// Whether there are no hatcheries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hatcheries.is_empty()
    }

    fn selected<'a>(
        &'a self,
        tags: Option<&'a [String]>,
    ) -> impl Iterator<Item = (usize, &'a Hatchery)> + 'a {
        self.hatcheries
            .iter()
            .enumerate()
            .filter(move |(_, h)| matches_tags(h.tag.as_deref(), tags))
    }

    /// Advance every hatchery to `time`.
    pub fn update(&mut self, time: Fixed) -> Result<()> {
        if time < self.last_updated {
            return Err(BuildError::TimeTravel {
                subsystem: "hatcheries",
                requested: Time::At(time),
                last: Time::At(self.last_updated),
            });
        }
        for hatchery in &mut self.hatcheries {
            hatchery.update(time, &self.rules);
        }
        self.last_updated = time;
        Ok(())
    }

    /// Spend `count` larvae at `time`, each from the hatchery holding the
    /// most. Ties go to the hatchery with the sooner burst, then the
    /// sooner natural larva.
    pub fn expend(&mut self, time: Fixed, count: u32, tags: Option<&[String]>) -> Result<()> {
        self.update(time)?;
        for _ in 0..count {
            let mut pick: Option<usize> = None;
            for (i, hatchery) in self.selected(tags) {
                if hatchery.larvae == 0 || !hatchery.alive_at(time) {
                    continue;
                }
                let better = match pick.map(|p| &self.hatcheries[p]) {
                    None => true,
                    Some(best) => {
                        let key = |h: &Hatchery| {
                            (
                                std::cmp::Reverse(h.larvae),
                                h.next_burst(),
                                h.next_generated(&self.rules),
                            )
                        };
                        key(hatchery) < key(best)
                    }
                };
                if better {
                    pick = Some(i);
                }
            }
            let index = pick.ok_or(BuildError::NoLarvaAvailable { time: Time::At(time) })?;
            self.hatcheries[index].take_larva(time, &self.rules);
        }
        Ok(())
    }

    /// Earliest time `count` larvae can be spent.
    ///
    /// For more than one larva this replays single draws on a copy, so
    /// the answer always agrees with spending them one at a time.
    pub fn when(&self, count: u32, tags: Option<&[String]>) -> Result<Time> {
        if count <= 1 {
            return Ok(self
                .selected(tags)
                .filter(|(_, h)| h.destroyed.is_never())
                .map(|(_, h)| h.when())
                .min()
                .unwrap_or(Time::Never));
        }

        let mut probe = self.clone();
        let mut time = Time::ZERO;
        for _ in 0..count {
            time = probe.when(1, tags)?;
            let Time::At(at) = time else {
                return Ok(Time::Never);
            };
            probe.expend(at, 1, tags)?;
        }
        Ok(time)
    }

    /// Earliest time a new Spawn Larvae can be queued.
    #[must_use]
    pub fn when_burst(&self) -> Time {
        self.hatcheries
            .iter()
            .filter(|h| h.destroyed.is_never())
            .map(Hatchery::when_burst)
            .min()
            .unwrap_or(Time::Never)
    }

    /// Queue a Spawn Larvae cast at `time` and landing `duration` later,
    /// on the hatchery that is free for it first.
    pub fn queue_burst(&mut self, time: Fixed, duration: Fixed) -> Result<()> {
        let index = self
            .hatcheries
            .iter()
            .enumerate()
            .filter(|(_, h)| h.alive_at(time))
            .min_by_key(|(_, h)| h.when_burst())
            .map(|(i, _)| i)
            .ok_or_else(|| {
                BuildError::InvalidState(format!("no hatchery to spawn larvae on at {}", Time::At(time)))
            })?;
        self.hatcheries[index].queue_burst(time + duration);
        Ok(())
    }

    /// Lose the hatchery with the fewest larvae at `time`.
    pub fn remove(&mut self, time: Fixed) -> bool {
        let found = self
            .hatcheries
            .iter_mut()
            .filter(|h| h.alive_at(time))
            .min_by_key(|h| h.larvae);
        match found {
            Some(hatchery) => {
                hatchery.destroyed = Time::At(time);
                true
            }
            None => false,
        }
    }

    /// Larvae per existing hatchery at `time`.
    #[must_use]
    pub fn surplus(&self, time: Fixed, tags: Option<&[String]>) -> Vec<u32> {
        self.selected(tags)
            .filter(|(_, h)| h.alive_at(time))
            .map(|(_, h)| h.surplus(time, &self.rules))
            .collect()
    }
}

/// Whether an entity with `tag` is selected by a required tag set.
#[must_use]
pub fn matches_tags(tag: Option<&str>, required: Option<&[String]>) -> bool {
    match required {
        None => true,
        Some(required) => tag.is_some_and(|tag| required.iter().any(|r| r == tag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn rules() -> EconomyRules {
        EconomyRules::default()
    }

    fn opening() -> Hatcheries {
        let mut hatcheries = Hatcheries::new(rules());
        hatcheries.add(Fixed::ZERO, 3, None);
        hatcheries
    }

    #[test]
    fn test_generation_pauses_at_threshold() {
        let mut hatcheries = opening();
        hatcheries.update(f(100)).unwrap();
        assert_eq!(hatcheries.hatcheries()[0].larvae, 3);
        assert_eq!(hatcheries.hatcheries()[0].next_generated(&rules()), Time::Never);
    }

    #[test]
    fn test_spending_from_threshold_restarts_timer() {
        let mut hatcheries = opening();
        hatcheries.expend(f(10), 1, None).unwrap();
        let hatchery = &hatcheries.hatcheries()[0];
        assert_eq!(hatchery.larvae, 2);
        assert_eq!(hatchery.next_generated(&rules()), Time::At(f(25)));
    }

    #[test]
    fn test_burst_rebate_shortens_next_larva() {
        let mut hatcheries = Hatcheries::new(rules());
        hatcheries.add(Fixed::ZERO, 0, None);
        // Larvae at 15 and 30; the timer restarts at 30.
        hatcheries.queue_burst(f(-5), f(40)).unwrap_err();
        hatcheries.queue_burst(f(0), f(35)).unwrap();
        hatcheries.update(f(35)).unwrap();
        let hatchery = &hatcheries.hatcheries()[0];
        assert_eq!(hatchery.larvae, 6);
        assert_eq!(hatchery.rebate(), f(5));

        // Back down to 2 at 50: the next larva comes 15 - 5 seconds later.
        hatcheries.expend(f(50), 4, None).unwrap();
        let hatchery = &hatcheries.hatcheries()[0];
        assert_eq!(hatchery.larvae, 2);
        assert_eq!(hatchery.next_generated(&rules()), Time::At(f(60)));
    }

    #[test]
    fn test_rebate_not_recounted_while_paused() {
        let mut hatcheries = opening();
        // Paused at 3 since 0; a burst at 40 must not credit 40 seconds.
        hatcheries.queue_burst(f(0), f(40)).unwrap();
        hatcheries.update(f(40)).unwrap();
        assert_eq!(hatcheries.hatcheries()[0].larvae, 7);
        assert_eq!(hatcheries.hatcheries()[0].rebate(), Fixed::ZERO);
    }

    #[test]
    fn test_larva_cap() {
        let mut hatcheries = opening();
        for i in 0..6 {
            hatcheries.queue_burst(f(i), f(40)).unwrap();
        }
        hatcheries.update(f(100)).unwrap();
        assert_eq!(hatcheries.hatcheries()[0].larvae, rules().larva_cap);
    }

    #[test]
    fn test_expend_prefers_fullest_hatchery() {
        let mut hatcheries = opening();
        hatcheries.add(Fixed::ZERO, 1, Some("natural".into()));
        hatcheries.expend(f(0), 3, None).unwrap();
        let counts: Vec<u32> = hatcheries.hatcheries().iter().map(|h| h.larvae).collect();
        // 3,1 -> 2,1 -> 1,1 -> 0,1
        assert_eq!(counts, vec![0, 1]);
    }

    #[test]
    fn test_tags_restrict_selection() {
        let mut hatcheries = opening();
        hatcheries.add(Fixed::ZERO, 1, Some("natural".into()));
        let tags = vec!["natural".to_string()];
        hatcheries.expend(f(0), 1, Some(&tags)).unwrap();
        let counts: Vec<u32> = hatcheries.hatcheries().iter().map(|h| h.larvae).collect();
        assert_eq!(counts, vec![3, 0]);
        assert!(hatcheries.expend(f(0), 1, Some(&tags)).is_err());
    }

    #[test]
    fn test_when_many_matches_sequential_draws() {
        let hatcheries = opening();
        let when_five = hatcheries.when(5, None).unwrap();

        let mut sequential = hatcheries.clone();
        let mut last = Time::ZERO;
        for _ in 0..5 {
            last = sequential.when(1, None).unwrap();
            sequential.expend(last.secs().unwrap(), 1, None).unwrap();
        }
        assert_eq!(when_five, last);
        // Three now, then one every 15 seconds from the first draw.
        assert_eq!(when_five, Time::At(f(30)));
    }

    #[test]
    fn test_update_in_the_past_is_fatal() {
        let mut hatcheries = opening();
        hatcheries.update(f(20)).unwrap();
        assert!(matches!(
            hatcheries.update(f(10)),
            Err(BuildError::TimeTravel { .. })
        ));
    }

    #[test]
    fn test_no_hatchery_means_never() {
        let hatcheries = Hatcheries::new(rules());
        assert_eq!(hatcheries.when(1, None).unwrap(), Time::Never);
        assert_eq!(hatcheries.when_burst(), Time::Never);
    }

    #[test]
    fn test_surplus_leaves_state_untouched() {
        let mut hatcheries = opening();
        hatcheries.expend(f(0), 3, None).unwrap();
        assert_eq!(hatcheries.surplus(f(31), None), vec![2]);
        assert_eq!(hatcheries.hatcheries()[0].larvae, 0);
    }
}

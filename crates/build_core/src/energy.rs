//! Casters: regenerating energy pools.
//!
//! The scheduler does not commit jobs in chronological order, so an
//! ability placed at a later time may be committed before a job that runs
//! earlier. Such uses are recorded as [`Reservation`]s: they count against
//! the free energy right away and are only debited once the caster has
//! been brought past their time.

use serde::{Deserialize, Serialize};

use crate::catalog::ObjectId;
use crate::config::EconomyRules;
use crate::error::{BuildError, Result};
use crate::larva::matches_tags;
use crate::math::{fixed_serde, round_whole, Fixed, Time};

/// Energy set aside for a future ability use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// When the energy is spent.
    #[serde(with = "fixed_serde")]
    pub time: Fixed,
    /// Energy spent.
    #[serde(with = "fixed_serde")]
    pub energy: Fixed,
}

/// One energy-generating unit or structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caster {
    /// Object type of the caster.
    pub caster_type: ObjectId,
    /// Completion time.
    #[serde(with = "fixed_serde")]
    pub created: Fixed,
    /// When the caster is lost.
    pub destroyed: Time,
    /// Tag for targeting this caster.
    pub tag: Option<String>,
    #[serde(with = "fixed_serde")]
    energy: Fixed,
    #[serde(with = "fixed_serde")]
    max: Fixed,
    reservations: Vec<Reservation>,
    #[serde(with = "fixed_serde")]
    last_updated: Fixed,
}

impl Caster {
    /// Create a caster completing at `created` with `start` energy.
    #[must_use]
    pub fn new(caster_type: ObjectId, created: Fixed, start: i32, max: i32, tag: Option<String>) -> Self {
        Self {
            caster_type,
            created,
            destroyed: Time::Never,
            tag,
            energy: Fixed::from_num(start),
            max: Fixed::from_num(max),
            reservations: Vec::new(),
            last_updated: created,
        }
    }

    /// Energy at the last update; with `only_free`, outstanding
    /// reservations are subtracted.
    #[must_use]
    pub fn energy(&self, only_free: bool) -> Fixed {
        if only_free {
            self.reservations
                .iter()
                .fold(self.energy, |acc, r| acc - r.energy)
        } else {
            self.energy
        }
    }

    /// Outstanding reservations.
    #[must_use]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    fn alive_at(&self, time: Fixed) -> bool {
        self.created <= time && self.destroyed >= Time::At(time)
    }

    /// Debit reservations that fell due before the last update, then
    /// regenerate up to `time`.
    pub fn update(&mut self, time: Fixed, rules: &EconomyRules) {
        let last = self.last_updated;
        let mut due = Fixed::ZERO;
        self.reservations.retain(|r| {
            let keep = r.time > last;
            if !keep {
                due += r.energy;
            }
            keep
        });
        self.energy -= due;

        if time > self.last_updated {
            let regenerated = (time - self.last_updated) * rules.energy_rate;
            self.energy = (self.energy + regenerated).min(self.max);
            self.last_updated = time;
        }
    }

    /// Energy at `time`, ignoring reservations due after it.
    #[must_use]
    pub fn surplus(&self, time: Fixed, rules: &EconomyRules) -> Fixed {
        let mut probe = self.clone();
        probe.update(time, rules);
        probe.energy(false)
    }

    /// When `amount` free energy is available.
    #[must_use]
    pub fn when(&self, amount: Fixed, rules: &EconomyRules) -> Time {
        let missing = (amount - self.energy(true)).max(Fixed::ZERO);
        let at = Time::At(self.last_updated + missing / rules.energy_rate);
        if at > self.destroyed {
            Time::Never
        } else {
            at
        }
    }
}

/// All casters of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casters {
    rules: EconomyRules,
    casters: Vec<Caster>,
}

impl Casters {
    /// Create an empty set.
    #[must_use]
    pub fn new(rules: EconomyRules) -> Self {
        Self {
            rules,
            casters: Vec::new(),
        }
    }

    /// Add a caster.
    pub fn add(&mut self, caster: Caster) {
        tracing::trace!(caster = caster.caster_type.index(), created = %Time::At(caster.created), "caster added");
        self.casters.push(caster);
    }

    /// All casters in creation order.
    #[must_use]
    pub fn casters(&self) -> &[Caster] {
        &self.casters
    }

    fn selected<'a>(
        &'a self,
        caster_type: Option<ObjectId>,
        tags: Option<&'a [String]>,
    ) -> impl Iterator<Item = (usize, &'a Caster)> + 'a {
        self.casters.iter().enumerate().filter(move |(_, c)| {
            caster_type.map_or(true, |t| c.caster_type == t) && matches_tags(c.tag.as_deref(), tags)
        })
    }

    /// The caster of `caster_type` alive at `time` with the most free
    /// energy; the first one wins ties.
    #[must_use]
    pub fn choose(&self, caster_type: ObjectId, time: Fixed, tags: Option<&[String]>) -> Option<usize> {
        let mut pick: Option<(usize, Fixed)> = None;
        for (i, caster) in self.selected(Some(caster_type), tags) {
            if !caster.alive_at(time) {
                continue;
            }
            let free = caster.energy(true);
            if pick.map_or(true, |(_, best)| free > best) {
                pick = Some((i, free));
            }
        }
        pick.map(|(i, _)| i)
    }

    /// Spend `amount` energy at `time` from the best caster.
    pub fn expend(
        &mut self,
        caster_type: ObjectId,
        amount: i32,
        time: Fixed,
        tags: Option<&[String]>,
    ) -> Result<usize> {
        let index = self
            .choose(caster_type, time, tags)
            .filter(|&i| round_whole(self.casters[i].energy(true)) >= amount)
            .ok_or_else(|| BuildError::NoCasterAvailable {
                caster: caster_type.to_string(),
                energy: amount,
                time: Time::At(time),
            })?;
        self.casters[index].energy -= Fixed::from_num(amount);
        Ok(index)
    }

    /// Reserve `amount` energy for use at `time` on the best caster.
    pub fn reserve(
        &mut self,
        caster_type: ObjectId,
        amount: i32,
        time: Fixed,
        tags: Option<&[String]>,
    ) -> Result<usize> {
        let index = self
            .choose(caster_type, time, tags)
            .ok_or_else(|| BuildError::NoCasterAvailable {
                caster: caster_type.to_string(),
                energy: amount,
                time: Time::At(time),
            })?;
        self.casters[index].reservations.push(Reservation {
            time,
            energy: Fixed::from_num(amount),
        });
        Ok(index)
    }

    /// Lose the caster of `caster_type` with the least free energy.
    pub fn remove(&mut self, caster_type: ObjectId, time: Fixed) -> Result<()> {
        let mut pick: Option<(usize, Fixed)> = None;
        for (i, caster) in self.selected(Some(caster_type), None) {
            if caster.created > time || !caster.destroyed.is_never() {
                continue;
            }
            let free = caster.energy(true);
            if pick.map_or(true, |(_, least)| free < least) {
                pick = Some((i, free));
            }
        }
        let (index, _) = pick.ok_or_else(|| {
            BuildError::InvalidState(format!("no caster {caster_type} to remove at {}", Time::At(time)))
        })?;
        self.casters[index].destroyed = Time::At(time);
        Ok(())
    }

    /// Whole energy per caster alive at `time`; all casters when
    /// `caster_type` is `None`.
    #[must_use]
    pub fn surplus(&self, caster_type: Option<ObjectId>, time: Fixed, tags: Option<&[String]>) -> Vec<i32> {
        self.selected(caster_type, tags)
            .filter(|(_, c)| c.alive_at(time))
            .map(|(_, c)| round_whole(c.surplus(time, &self.rules)))
            .collect()
    }

    /// Bring every caster up to `time`.
    pub fn update(&mut self, time: Fixed) {
        for caster in &mut self.casters {
            caster.update(time, &self.rules);
        }
    }

    /// Earliest time any matching caster has `amount` free energy.
    #[must_use]
    pub fn when(&self, caster_type: ObjectId, amount: i32, tags: Option<&[String]>) -> Time {
        self.selected(Some(caster_type), tags)
            .map(|(_, c)| c.when(Fixed::from_num(amount), &self.rules))
            .min()
            .unwrap_or(Time::Never)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn nexus() -> ObjectId {
        ObjectId::new(0)
    }

    fn pool() -> Casters {
        let mut casters = Casters::new(EconomyRules::default());
        casters.add(Caster::new(nexus(), Fixed::ZERO, 0, 100, None));
        casters
    }

    #[test]
    fn test_regeneration_is_capped() {
        let mut casters = pool();
        casters.update(f(400));
        assert_eq!(casters.casters()[0].energy(false), f(100));
    }

    #[test]
    fn test_when_closed_form() {
        let casters = pool();
        // 25 / 0.5625
        let expected = f(25) / Fixed::from_num(0.5625);
        assert_eq!(casters.when(nexus(), 25, None), Time::At(expected));
    }

    #[test]
    fn test_reservation_reduces_free_view_only() {
        let mut casters = pool();
        casters.update(f(80));
        casters.reserve(nexus(), 25, f(100), None).unwrap();
        let caster = &casters.casters()[0];
        assert_eq!(caster.energy(false), f(45));
        assert_eq!(caster.energy(true), f(20));
        assert!(caster.energy(false) >= caster.energy(true));
    }

    #[test]
    fn test_reservation_debited_once_due() {
        let mut casters = pool();
        casters.reserve(nexus(), 25, f(50), None).unwrap();
        casters.update(f(60));
        // Not due at the previous cursor yet.
        assert_eq!(casters.casters()[0].reservations().len(), 1);
        casters.update(f(70));
        let caster = &casters.casters()[0];
        assert!(caster.reservations().is_empty());
        assert_eq!(caster.energy(false), f(70) * Fixed::from_num(0.5625) - f(25));
    }

    #[test]
    fn test_expend_requires_enough_energy() {
        let mut casters = pool();
        casters.update(f(10));
        assert!(matches!(
            casters.expend(nexus(), 25, f(10), None),
            Err(BuildError::NoCasterAvailable { .. })
        ));
        casters.update(f(50));
        casters.expend(nexus(), 25, f(50), None).unwrap();
        assert_eq!(casters.surplus(None, f(50), None), vec![3]);
    }

    #[test]
    fn test_choose_prefers_most_free_energy() {
        let mut casters = pool();
        casters.add(Caster::new(nexus(), Fixed::ZERO, 50, 100, Some("main".into())));
        assert_eq!(casters.choose(nexus(), f(0), None), Some(1));
        casters.reserve(nexus(), 50, f(10), None).unwrap();
        assert_eq!(casters.choose(nexus(), f(0), None), Some(0));
    }

    #[test]
    fn test_destroyed_caster_is_never_ready() {
        let mut casters = pool();
        casters.remove(nexus(), f(20)).unwrap();
        assert_eq!(casters.when(nexus(), 50, None), Time::Never);
        assert_eq!(casters.when(nexus(), 5, None), Time::At(f(5) / Fixed::from_num(0.5625)));
    }

    #[test]
    fn test_unbuilt_caster_not_chosen() {
        let mut casters = Casters::new(EconomyRules::default());
        casters.add(Caster::new(nexus(), f(100), 50, 200, None));
        assert_eq!(casters.choose(nexus(), f(50), None), None);
        assert_eq!(casters.choose(nexus(), f(100), None), Some(0));
        assert_eq!(casters.when(nexus(), 50, None), Time::At(f(100)));
    }
}

//! Changes to the worker layout of the resource ledger.
//!
//! A [`Mutation`] is spliced into the [`ResourceLedger`] at its time and
//! rewrites every segment from there on. Worker moves spread themselves
//! over bases and extraction points the first time they touch a segment;
//! that per-source breakdown is then frozen and reused for every later
//! segment, so a worker taken off the busiest base stays off that base.
//!
//! [`ResourceLedger`]: crate::ledger::ResourceLedger

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::ledger::LedgerSegment;
use crate::math::Fixed;

/// What a mutation does to a ledger segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    /// Add or remove workers, balancing over the existing sources.
    Workers {
        /// Change in mineral workers.
        minerals: i32,
        /// Change in gas workers.
        gas: i32,
    },
    /// Move workers from the older sources to the newest one.
    Transfer {
        /// Mineral workers moved to the newest base.
        minerals: i32,
        /// Gas workers moved to the newest extraction point.
        gas: i32,
    },
    /// A base starts construction.
    BaseStarted,
    /// The oldest unfinished base becomes operational.
    BaseCompleted,
    /// An extraction point starts construction.
    ExtractorStarted,
    /// The oldest unfinished extraction point becomes operational.
    ExtractorCompleted,
    /// Add or remove MULEs.
    Mules(i32),
    /// A worker leaves the mineral line to scout.
    Scout,
}

impl MutationKind {
    /// Worker deltas moved by this kind, if it moves workers.
    const fn worker_change(self) -> Option<(i32, i32)> {
        match self {
            Self::Workers { minerals, gas } | Self::Transfer { minerals, gas } => {
                Some((minerals, gas))
            }
            Self::Scout => Some((-1, 0)),
            _ => None,
        }
    }

    /// Whether this kind puts workers on gas.
    #[must_use]
    pub fn adds_gas_workers(self) -> bool {
        matches!(self, Self::Workers { gas, .. } if gas > 0)
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Workers { minerals, gas } if gas == -minerals && gas > 0 => {
                write!(f, "Transfer {gas} workers to gas")
            }
            Self::Workers { minerals, gas } if gas == -minerals && minerals > 0 => {
                write!(f, "Transfer {minerals} workers to minerals")
            }
            Self::Workers { minerals, gas } => {
                let mut parts = Vec::new();
                if gas != 0 {
                    parts.push(format!("{gas:+} workers on gas"));
                }
                if minerals != 0 {
                    parts.push(format!("{minerals:+} workers on minerals"));
                }
                f.write_str(&parts.join(", "))
            }
            Self::Transfer { minerals, gas } => {
                if minerals != 0 {
                    write!(f, "Transfer {minerals} workers to new base")?;
                }
                if gas != 0 {
                    write!(f, "Transfer {gas} workers to new geyser")?;
                }
                Ok(())
            }
            Self::BaseStarted => f.write_str("Base started"),
            Self::BaseCompleted => f.write_str("Base completed"),
            Self::ExtractorStarted => f.write_str("Geyser started"),
            Self::ExtractorCompleted => f.write_str("Geyser completed"),
            Self::Mules(n) if n >= 0 => write!(f, "+{n} MULEs"),
            Self::Mules(n) => write!(f, "{n} MULEs"),
            Self::Scout => f.write_str("Send worker to scout"),
        }
    }
}

/// Per-source worker deltas, split into removals and additions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Distribution {
    mineral_negative: Vec<i32>,
    mineral_positive: Vec<i32>,
    gas_negative: Vec<i32>,
    gas_positive: Vec<i32>,
}

impl Distribution {
    fn split(changes: &[i32]) -> (Vec<i32>, Vec<i32>) {
        changes
            .iter()
            .map(|&c| (c.min(0), c.max(0)))
            .unzip()
    }
}

/// A time-stamped change to the ledger's worker layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// When the change takes effect.
    pub time: Fixed,
    /// Travel time between the removal and the addition of workers.
    pub delay: Option<Fixed>,
    /// The change itself.
    pub kind: MutationKind,
    distribution: Option<Distribution>,
}

impl Mutation {
    /// Create a mutation taking effect at `time`.
    #[must_use]
    pub fn new(kind: MutationKind, time: Fixed) -> Self {
        Self {
            time,
            delay: None,
            kind,
            distribution: None,
        }
    }

    /// Add or remove workers at `time`.
    #[must_use]
    pub fn workers(minerals: i32, gas: i32, time: Fixed) -> Self {
        Self::new(MutationKind::Workers { minerals, gas }, time)
    }

    /// Delay the positive half of the change by `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Option<Fixed>) -> Self {
        self.delay = delay.filter(|d| *d > Fixed::ZERO);
        self
    }

    /// Whether the change is split into a removal now and an addition later.
    #[must_use]
    pub fn is_delayed(&self) -> bool {
        self.delay.is_some() && self.kind.worker_change().is_some()
    }

    /// Apply the whole change to `segment`.
    pub fn apply(&mut self, segment: &mut LedgerSegment) -> Result<()> {
        match self.kind {
            MutationKind::BaseStarted => {
                segment.mineral_workers.push(0);
                segment.bases_operational.push(false);
                Ok(())
            }
            MutationKind::BaseCompleted => {
                complete_first(&mut segment.bases_operational, "base")
            }
            MutationKind::ExtractorStarted => {
                segment.gas_workers.push(0);
                segment.extractors_operational.push(false);
                Ok(())
            }
            MutationKind::ExtractorCompleted => {
                complete_first(&mut segment.extractors_operational, "extraction point")
            }
            MutationKind::Mules(n) => {
                segment.mules += n;
                Ok(())
            }
            MutationKind::Workers { .. } | MutationKind::Transfer { .. } | MutationKind::Scout => {
                self.apply_negative(segment)?;
                self.apply_positive(segment)
            }
        }
    }

    /// Take workers off their sources in `segment`.
    pub fn apply_negative(&mut self, segment: &mut LedgerSegment) -> Result<()> {
        let dist = self.distribute(segment)?;
        take(&mut segment.gas_workers, &dist.gas_negative, "extraction point")?;
        take(&mut segment.mineral_workers, &dist.mineral_negative, "base")
    }

    /// Put workers on their new sources in `segment`.
    pub fn apply_positive(&mut self, segment: &mut LedgerSegment) -> Result<()> {
        let dist = self.distribute(segment)?;
        for (workers, change) in segment.gas_workers.iter_mut().zip(&dist.gas_positive) {
            *workers += change;
        }
        for (workers, change) in segment.mineral_workers.iter_mut().zip(&dist.mineral_positive) {
            *workers += change;
        }
        Ok(())
    }

    /// Compute the per-source breakdown on first use and return it.
    fn distribute(&mut self, segment: &LedgerSegment) -> Result<Distribution> {
        if let Some(dist) = &self.distribution {
            return Ok(dist.clone());
        }

        let mut dist = Distribution::default();
        match self.kind {
            MutationKind::Transfer { minerals, gas } => {
                if gas != 0 {
                    let changes = transfer(&segment.gas_workers, gas, "geyser")?;
                    (dist.gas_negative, dist.gas_positive) = Distribution::split(&changes);
                }
                if minerals != 0 {
                    let changes = transfer(&segment.mineral_workers, minerals, "base")?;
                    (dist.mineral_negative, dist.mineral_positive) = Distribution::split(&changes);
                }
            }
            kind => {
                let (minerals, gas) = kind.worker_change().unwrap_or((0, 0));
                if gas != 0 {
                    let changes = match segment.gas_workers.len() {
                        0 => return Err(BuildError::NoExtractor),
                        1 => vec![gas],
                        _ => balance(&segment.gas_workers, None, gas),
                    };
                    (dist.gas_negative, dist.gas_positive) = Distribution::split(&changes);
                }
                if minerals != 0 {
                    let changes = match segment.mineral_workers.len() {
                        0 => return Err(BuildError::NoBase),
                        1 => vec![minerals],
                        _ => balance(
                            &segment.mineral_workers,
                            Some(&segment.bases_operational),
                            minerals,
                        ),
                    };
                    (dist.mineral_negative, dist.mineral_positive) =
                        Distribution::split(&changes);
                }
            }
        }

        tracing::trace!(mutation = %self.kind, ?dist, "distributed workers");
        self.distribution = Some(dist.clone());
        Ok(dist)
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

fn complete_first(operational: &mut [bool], site: &'static str) -> Result<()> {
    match operational.iter_mut().find(|op| !**op) {
        Some(op) => {
            *op = true;
            Ok(())
        }
        None => Err(BuildError::NothingToComplete(site)),
    }
}

fn take(workers: &mut [i32], changes: &[i32], site: &'static str) -> Result<()> {
    for (count, change) in workers.iter_mut().zip(changes) {
        if *count + change < 0 {
            return Err(BuildError::NegativeWorkers {
                site,
                requested: -change,
                available: *count,
            });
        }
        *count += change;
    }
    Ok(())
}

/// Spread `change` one worker at a time: removals come off the busiest
/// source, additions go to the idlest operational one.
fn balance(workers: &[i32], operational: Option<&[bool]>, change: i32) -> Vec<i32> {
    let mut changes = vec![0; workers.len()];
    let load = |changes: &[i32], i: usize| workers[i] + changes[i];
    let is_open = |i: usize| operational.map_or(true, |ops| ops.get(i).copied().unwrap_or(false));

    for _ in 0..change.unsigned_abs().max(1) {
        let mut pick = 0;
        for i in 1..workers.len() {
            if change < 0 {
                if load(&changes, i) > load(&changes, pick) {
                    pick = i;
                }
            } else if is_open(i) && load(&changes, i) < load(&changes, pick) {
                pick = i;
            }
        }
        changes[pick] += change.signum();
    }
    changes
}

/// Move `amount` workers from the busiest older sources onto the newest one.
fn transfer(workers: &[i32], amount: i32, site: &'static str) -> Result<Vec<i32>> {
    if workers.len() < 2 {
        return Err(BuildError::NothingToTransferFrom(site));
    }
    let newest = workers.len() - 1;
    let mut changes = vec![0; workers.len()];
    for _ in 0..amount.max(1) {
        let mut pick = 0;
        for i in 1..newest {
            if workers[i] + changes[i] > workers[pick] + changes[pick] {
                pick = i;
            }
        }
        changes[pick] -= 1;
    }
    changes[newest] += amount;
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Time;

    fn segment(minerals: Vec<i32>, gas: Vec<i32>) -> LedgerSegment {
        let mut seg = LedgerSegment::new(Fixed::ZERO, Time::Never);
        seg.bases_operational = vec![true; minerals.len()];
        seg.mineral_workers = minerals;
        seg.extractors_operational = vec![true; gas.len()];
        seg.gas_workers = gas;
        seg
    }

    #[test]
    fn test_single_base_takes_change_directly() {
        let mut seg = segment(vec![6], vec![]);
        Mutation::workers(3, 0, Fixed::ZERO).apply(&mut seg).unwrap();
        assert_eq!(seg.mineral_workers, vec![9]);
    }

    #[test]
    fn test_removal_comes_off_busiest_base() {
        let mut seg = segment(vec![10, 14], vec![]);
        Mutation::workers(-5, 0, Fixed::ZERO).apply(&mut seg).unwrap();
        // Four off the second base levels them at 10, then one more off the first.
        assert_eq!(seg.mineral_workers, vec![9, 10]);
    }

    #[test]
    fn test_addition_skips_unfinished_bases() {
        let mut seg = segment(vec![12, 0], vec![]);
        seg.bases_operational[1] = false;
        Mutation::workers(2, 0, Fixed::ZERO).apply(&mut seg).unwrap();
        assert_eq!(seg.mineral_workers, vec![14, 0]);
    }

    #[test]
    fn test_distribution_is_frozen() {
        let mut mutation = Mutation::workers(-1, 0, Fixed::ZERO);
        let mut first = segment(vec![5, 8], vec![]);
        mutation.apply(&mut first).unwrap();
        assert_eq!(first.mineral_workers, vec![5, 7]);

        // A later segment with a different layout still loses from base #1.
        let mut later = segment(vec![9, 8], vec![]);
        mutation.apply(&mut later).unwrap();
        assert_eq!(later.mineral_workers, vec![9, 7]);
    }

    #[test]
    fn test_negative_workers_is_fatal() {
        let mut seg = segment(vec![6], vec![0]);
        let err = Mutation::workers(0, -1, Fixed::ZERO).apply(&mut seg).unwrap_err();
        assert!(matches!(err, BuildError::NegativeWorkers { site: "extraction point", .. }));
    }

    #[test]
    fn test_gas_without_extractor_is_fatal() {
        let mut seg = segment(vec![6], vec![]);
        let err = Mutation::workers(-3, 3, Fixed::ZERO).apply(&mut seg).unwrap_err();
        assert!(matches!(err, BuildError::NoExtractor));
    }

    #[test]
    fn test_transfer_moves_to_newest_base() {
        let mut seg = segment(vec![16, 10, 0], vec![]);
        Mutation::new(MutationKind::Transfer { minerals: 4, gas: 0 }, Fixed::ZERO)
            .apply(&mut seg)
            .unwrap();
        assert_eq!(seg.mineral_workers, vec![12, 10, 4]);
    }

    #[test]
    fn test_transfer_needs_two_bases() {
        let mut seg = segment(vec![16], vec![]);
        let err = Mutation::new(MutationKind::Transfer { minerals: 4, gas: 0 }, Fixed::ZERO)
            .apply(&mut seg)
            .unwrap_err();
        assert!(matches!(err, BuildError::NothingToTransferFrom("base")));
    }

    #[test]
    fn test_base_lifecycle() {
        let mut seg = segment(vec![6], vec![]);
        Mutation::new(MutationKind::BaseStarted, Fixed::ZERO).apply(&mut seg).unwrap();
        assert_eq!(seg.bases_operational, vec![true, false]);
        Mutation::new(MutationKind::BaseCompleted, Fixed::ZERO).apply(&mut seg).unwrap();
        assert_eq!(seg.bases_operational, vec![true, true]);
        let err = Mutation::new(MutationKind::BaseCompleted, Fixed::ZERO)
            .apply(&mut seg)
            .unwrap_err();
        assert!(matches!(err, BuildError::NothingToComplete("base")));
    }

    #[test]
    fn test_scout_removes_one_mineral_worker() {
        let mut seg = segment(vec![6], vec![]);
        Mutation::new(MutationKind::Scout, Fixed::ZERO).apply(&mut seg).unwrap();
        assert_eq!(seg.mineral_workers, vec![5]);
    }

    #[test]
    fn test_descriptions() {
        let to_gas = MutationKind::Workers { minerals: -3, gas: 3 };
        assert_eq!(to_gas.to_string(), "Transfer 3 workers to gas");
        let off_gas = MutationKind::Workers { minerals: 2, gas: -2 };
        assert_eq!(off_gas.to_string(), "Transfer 2 workers to minerals");
        assert_eq!(MutationKind::Mules(1).to_string(), "+1 MULEs");
        assert!(to_gas.adds_gas_workers());
        assert!(!off_gas.adds_gas_workers());
    }
}

//! Piecewise-rate ledger of minerals and gas.
//!
//! Income is described by consecutive [`LedgerSegment`]s. Within a
//! segment the worker layout, and therefore the mining rate, is constant;
//! every [`Mutation`] splits the segment it lands in and rewrites the
//! layout from there on. The ledger keeps a stockpile that is brought up
//! to date with [`ResourceLedger::update`], and answers "when will I have
//! this much" by walking the segments forward.

use serde::{Deserialize, Serialize};

use crate::config::{EconomyRules, ScheduleOptions};
use crate::error::{BuildError, Result};
use crate::math::{fixed_serde, Fixed, Resources, Time};
use crate::mutation::Mutation;

/// A stretch of time with a constant worker layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSegment {
    /// Segment start.
    #[serde(with = "fixed_serde")]
    pub start: Fixed,
    /// Segment end.
    pub end: Time,
    /// Income up to this point has been moved into the stockpile.
    #[serde(with = "fixed_serde")]
    pub last_updated: Fixed,
    /// Mineral workers per base.
    pub mineral_workers: Vec<i32>,
    /// Whether each base is finished.
    pub bases_operational: Vec<bool>,
    /// Gas workers per extraction point.
    pub gas_workers: Vec<i32>,
    /// Whether each extraction point is finished.
    pub extractors_operational: Vec<bool>,
    /// MULEs mining.
    pub mules: i32,
}

impl LedgerSegment {
    /// Create an empty segment.
    #[must_use]
    pub fn new(start: Fixed, end: Time) -> Self {
        Self {
            start,
            end,
            last_updated: start,
            mineral_workers: Vec::new(),
            bases_operational: Vec::new(),
            gas_workers: Vec::new(),
            extractors_operational: Vec::new(),
            mules: 0,
        }
    }

    /// Minerals per second.
    #[must_use]
    pub fn mineral_rate(&self, rules: &EconomyRules) -> Fixed {
        let bases: Fixed = self
            .mineral_workers
            .iter()
            .zip(&self.bases_operational)
            .filter(|(_, operational)| **operational)
            .map(|(workers, _)| rules.base_income(*workers))
            .sum();
        bases + rules.mule_rate * Fixed::from_num(self.mules)
    }

    /// Gas per second.
    #[must_use]
    pub fn gas_rate(&self, rules: &EconomyRules) -> Fixed {
        self.gas_workers
            .iter()
            .zip(&self.extractors_operational)
            .filter(|(_, operational)| **operational)
            .map(|(workers, _)| rules.extractor_income(*workers))
            .sum()
    }

    fn rates(&self, rules: &EconomyRules) -> Resources {
        Resources::new(self.mineral_rate(rules), self.gas_rate(rules))
    }

    /// Time left between the update cursor and the end; `None` when endless.
    #[must_use]
    pub fn remaining(&self) -> Option<Fixed> {
        self.end.secs().map(|end| end - self.last_updated)
    }

    /// Income earned since the last update, up to `time`.
    ///
    /// A segment truncated behind its update cursor yields a negative
    /// amount, which takes back income credited at the old rate.
    #[must_use]
    pub fn surplus(&self, time: Fixed, rules: &EconomyRules) -> Resources {
        if self.last_updated > time {
            return Resources::ZERO;
        }
        let until = match self.end {
            Time::At(end) if end <= time => end,
            _ => time,
        };
        self.rates(rules).scaled(until - self.last_updated)
    }

    /// Move the update cursor to `time`, clamped to the segment.
    pub fn update(&mut self, time: Fixed) {
        let clamped = Time::At(time.max(self.start)).min(self.end);
        self.last_updated = clamped.secs().unwrap_or(time);
    }

    /// When `need` more minerals and gas will have been mined within this
    /// segment, per resource. `Never` means "not within this segment".
    #[must_use]
    pub fn when(&self, need: Resources, rules: &EconomyRules) -> (Time, Time) {
        if self.remaining() == Some(Fixed::ZERO) {
            return (Time::Never, Time::Never);
        }
        let solve = |need: Fixed, rate: Fixed| {
            if need <= Fixed::ZERO {
                Time::At(self.last_updated)
            } else if rate == Fixed::ZERO {
                Time::Never
            } else {
                let at = Time::At(self.last_updated + need / rate);
                if at > self.end {
                    Time::Never
                } else {
                    at
                }
            }
        };
        (
            solve(need.minerals, self.mineral_rate(rules)),
            solve(need.gas, self.gas_rate(rules)),
        )
    }

    /// Split at `time`: this segment ends there and the returned copy
    /// carries the same layout from `time` on.
    fn split_at(&mut self, time: Fixed) -> Self {
        let mut tail = self.clone();
        tail.start = time;
        tail.last_updated = time;
        self.end = Time::At(time);
        tail
    }

    /// Whether an extraction point here can take another gas worker.
    fn has_gas_room(&self, rules: &EconomyRules) -> bool {
        self.gas_workers
            .iter()
            .zip(&self.extractors_operational)
            .any(|(workers, operational)| *operational && *workers < rules.gas_saturation)
    }
}

/// Stockpile plus the income segments that feed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    rules: EconomyRules,
    initial: Resources,
    stored: Resources,
    #[serde(with = "fixed_serde")]
    last_updated: Fixed,
    segments: Vec<LedgerSegment>,
}

impl ResourceLedger {
    /// Create a ledger with a stockpile and no income.
    #[must_use]
    pub fn new(initial: Resources, rules: EconomyRules) -> Self {
        Self {
            rules,
            initial,
            stored: initial,
            last_updated: Fixed::ZERO,
            segments: Vec::new(),
        }
    }

    /// The standard opening: one base mined by the starting workers,
    /// which only becomes operational once the mining delay has passed.
    #[must_use]
    pub fn opening(options: &ScheduleOptions, rules: EconomyRules) -> Self {
        let mut ledger = Self::new(options.initial_resources(), rules);
        let delay = options.mining_delay();
        let mut segment = LedgerSegment::new(Fixed::ZERO, Time::Never);
        segment.mineral_workers = vec![options.initial_workers];
        segment.bases_operational = vec![true];

        if delay > Fixed::ZERO {
            let mut idle = segment.clone();
            idle.end = Time::At(delay);
            idle.bases_operational = vec![false];
            ledger.push(idle);
            segment.start = delay;
            segment.last_updated = delay;
        }
        ledger.push(segment);
        ledger
    }

    /// Append a segment after the existing ones.
    pub fn push(&mut self, segment: LedgerSegment) {
        self.segments.push(segment);
    }

    /// All segments in time order.
    #[must_use]
    pub fn segments(&self) -> &[LedgerSegment] {
        &self.segments
    }

    /// Economy constants in use.
    #[must_use]
    pub fn rules(&self) -> &EconomyRules {
        &self.rules
    }

    /// Current stockpile.
    #[must_use]
    pub fn stored(&self) -> Resources {
        self.stored
    }

    /// Time of the last update.
    #[must_use]
    pub fn last_updated(&self) -> Fixed {
        self.last_updated
    }

    /// Stockpile projected to `time`.
    #[must_use]
    pub fn surplus(&self, time: Fixed) -> Resources {
        self.segments
            .iter()
            .fold(self.stored, |acc, seg| acc + seg.surplus(time, &self.rules))
    }

    /// Move income up to `time` into the stockpile.
    pub fn update(&mut self, time: Fixed) {
        for seg in &mut self.segments {
            self.stored = self.stored + seg.surplus(time, &self.rules);
            seg.update(time);
        }
        self.last_updated = time;
    }

    /// Pay `cost`. The stockpile is rounded afterwards; a negative cost
    /// is a refund.
    pub fn expend(&mut self, cost: Resources) {
        self.stored = (self.stored - cost).rounded();
    }

    /// Earliest time the stockpile reaches `need`, per resource.
    #[must_use]
    pub fn when_each(&self, need: Resources) -> (Time, Time) {
        let mut need = need - self.stored;
        let mut minerals = None;
        let mut gas = None;

        for seg in &self.segments {
            let (m, g) = seg.when(need, &self.rules);
            let spent = seg
                .remaining()
                .map_or(Resources::ZERO, |d| seg.rates(&self.rules).scaled(d));

            if m.is_never() {
                need.minerals -= spent.minerals;
            } else if minerals.is_none() {
                minerals = Some(m);
            }
            if g.is_never() {
                need.gas -= spent.gas;
            } else if gas.is_none() {
                gas = Some(g);
            }
            if minerals.is_some() && gas.is_some() {
                break;
            }
        }

        (minerals.unwrap_or(Time::Never), gas.unwrap_or(Time::Never))
    }

    /// Earliest time the stockpile reaches `need`.
    #[must_use]
    pub fn when(&self, need: Resources) -> Time {
        let (minerals, gas) = self.when_each(need);
        minerals.max(gas)
    }

    /// Start of the first segment after `time` with an operational
    /// extraction point that can take another worker.
    #[must_use]
    pub fn when_gas_room(&self, time: Fixed) -> Time {
        self.segments
            .iter()
            .filter(|seg| seg.end > Time::At(time))
            .find(|seg| seg.has_gas_room(&self.rules))
            .map_or(Time::Never, |seg| Time::At(seg.start))
    }

    /// Splice a mutation into the segments.
    pub fn splice(&mut self, mut mutation: Mutation) -> Result<()> {
        tracing::trace!(mutation = %mutation, time = %Time::At(mutation.time), "splice");
        match mutation.delay {
            Some(delay) if mutation.is_delayed() => {
                let first = self.split(mutation.time)?;
                for seg in &mut self.segments[first..] {
                    mutation.apply_negative(seg)?;
                }
                let second = self.split(mutation.time + delay)?;
                for seg in &mut self.segments[second..] {
                    mutation.apply_positive(seg)?;
                }
            }
            _ => {
                let first = self.split(mutation.time)?;
                for seg in &mut self.segments[first..] {
                    mutation.apply(seg)?;
                }
            }
        }
        Ok(())
    }

    /// Split the segment running at `time`; returns the index of the new tail.
    fn split(&mut self, time: Fixed) -> Result<usize> {
        let index = self
            .segments
            .iter()
            .position(|seg| seg.end > Time::At(time))
            .ok_or_else(|| {
                BuildError::InvalidState(format!("no income segment runs at {}", Time::At(time)))
            })?;
        let tail = self.segments[index].split_at(time);
        self.segments.insert(index + 1, tail);
        Ok(index + 1)
    }

    /// Everything mined up to `time`, ignoring spending.
    #[must_use]
    pub fn total_mined(&self, time: Fixed) -> Resources {
        let until = Time::At(time);
        self.segments.iter().fold(self.initial, |acc, seg| {
            let end = seg.end.min(until).secs().unwrap_or(time);
            let start = seg.start.min(time);
            acc + seg.rates(&self.rules).scaled(end - start)
        })
    }
}

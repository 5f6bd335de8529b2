//! Production queues.
//!
//! Every structure (and a few units) that can produce something is a
//! queue: it is free from its `available` time on, and a job that uses it
//! pushes that time to its own completion.

use serde::{Deserialize, Serialize};

use crate::catalog::ObjectId;
use crate::error::{BuildError, Result};
use crate::larva::matches_tags;
use crate::math::{fixed_serde, option_fixed_serde, Fixed, Time};

/// One production queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionQueue {
    /// Object type of the queue.
    pub structure: ObjectId,
    /// Tag for targeting this queue.
    pub tag: Option<String>,
    /// When the queue came into existence.
    #[serde(with = "fixed_serde")]
    pub created: Fixed,
    /// When the queue was morphed away or lost.
    pub destroyed: Time,
    /// Total time spent producing.
    #[serde(with = "fixed_serde")]
    pub busy_time: Fixed,
    /// Start of the last boost, if ever boosted.
    #[serde(with = "option_fixed_serde")]
    pub boosted: Option<Fixed>,
    /// When the queue is next free.
    #[serde(with = "fixed_serde")]
    pub available: Fixed,
}

impl ProductionQueue {
    /// Create a queue that is free from `available` on.
    #[must_use]
    pub fn new(structure: ObjectId, available: Fixed, tag: Option<String>) -> Self {
        Self {
            structure,
            tag,
            created: available,
            destroyed: Time::Never,
            busy_time: Fixed::ZERO,
            boosted: None,
            available,
        }
    }

    /// Occupy the queue from `start` to `end`. Only productive use counts
    /// towards the busy time.
    pub fn occupy(&mut self, start: Fixed, end: Fixed, productive: bool) {
        self.available = end;
        if productive {
            self.busy_time += end - start;
        }
    }

    /// Whether the queue still exists.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.destroyed.is_never()
    }
}

/// Usage of one queue over the whole build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueUsage {
    /// Object type of the queue.
    pub structure: ObjectId,
    /// Queue tag.
    pub tag: Option<String>,
    /// Creation time.
    #[serde(with = "fixed_serde")]
    pub created: Fixed,
    /// Destruction time.
    pub destroyed: Time,
    /// Time spent producing.
    #[serde(with = "fixed_serde")]
    pub busy_time: Fixed,
    /// Busy time as a whole percentage of the queue's lifetime.
    pub busy_percent: i32,
}

/// All production queues of a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionQueues {
    queues: Vec<ProductionQueue>,
    #[serde(with = "fixed_serde")]
    last_updated: Fixed,
}

impl ProductionQueues {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a queue.
    pub fn add(&mut self, queue: ProductionQueue) {
        tracing::trace!(structure = queue.structure.index(), available = %Time::At(queue.available), "queue added");
        self.queues.push(queue);
    }

    /// All queues in creation order.
    #[must_use]
    pub fn queues(&self) -> &[ProductionQueue] {
        &self.queues
    }

    /// Queue by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ProductionQueue> {
        self.queues.get(index)
    }

    /// Mutable queue by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ProductionQueue> {
        self.queues.get_mut(index)
    }

    fn select<'a>(
        &'a self,
        structure: ObjectId,
        tags: Option<&'a [String]>,
    ) -> impl Iterator<Item = (usize, &'a ProductionQueue)> + 'a {
        self.queues.iter().enumerate().filter(move |(_, q)| {
            q.structure == structure && q.is_live() && matches_tags(q.tag.as_deref(), tags)
        })
    }

    /// Pick queues free at `time`.
    ///
    /// With `needs_all`, one queue of every listed type is returned;
    /// otherwise a single queue of any of the types. Among eligible
    /// queues the one boosted least recently wins, and a queue that was
    /// never boosted beats any boosted one.
    pub fn choose(
        &self,
        time: Fixed,
        types: &[ObjectId],
        needs_all: bool,
        tags: Option<&[String]>,
    ) -> Result<Vec<usize>> {
        let better = |candidate: &ProductionQueue, best: &ProductionQueue| match (candidate.boosted, best.boosted) {
            (None, Some(_)) => true,
            (Some(c), Some(b)) => c < b,
            _ => false,
        };

        let mut chosen = Vec::new();
        let mut pick: Option<usize> = None;
        for &structure in types {
            if needs_all {
                pick = None;
            }
            for (i, queue) in self.select(structure, tags) {
                if queue.available > time {
                    continue;
                }
                if pick.map_or(true, |p| better(queue, &self.queues[p])) {
                    pick = Some(i);
                }
            }
            if needs_all {
                chosen.push(pick.ok_or_else(|| self.unavailable(&[structure], time))?);
            }
        }

        if needs_all {
            Ok(chosen)
        } else {
            pick.map(|p| vec![p]).ok_or_else(|| self.unavailable(types, time))
        }
    }

    fn unavailable(&self, types: &[ObjectId], time: Fixed) -> BuildError {
        let names: Vec<String> = types.iter().map(ToString::to_string).collect();
        BuildError::NoQueueAvailable {
            types: names.join(" or "),
            time: Time::At(time),
        }
    }

    /// Replace queues in one step: `destroyed` queues end at
    /// `time_destroyed`, and a queue of every `Some` type in `created`
    /// appears at `time_created`. New queues take the tags of the
    /// destroyed ones position by position; extra new queues keep the
    /// last tag seen.
    pub fn morph(
        &mut self,
        destroyed: &[usize],
        time_destroyed: Fixed,
        created: &[Option<ObjectId>],
        time_created: Fixed,
    ) {
        for &index in destroyed {
            if let Some(queue) = self.queues.get_mut(index) {
                queue.destroyed = Time::At(time_destroyed);
            }
        }

        let mut tag = None;
        for (position, structure) in created.iter().enumerate() {
            if let Some(&index) = destroyed.get(position) {
                tag = self.queues.get(index).and_then(|q| q.tag.clone());
            }
            if let Some(structure) = structure {
                self.add(ProductionQueue::new(*structure, time_created, tag.clone()));
            }
        }
    }

    /// Move the update cursor.
    pub fn update(&mut self, time: Fixed) {
        self.last_updated = time;
    }

    /// When queues of `types` are free: the latest per-type time with
    /// `needs_all`, otherwise the earliest. `Never` comes with the types
    /// that have no live queue at all.
    #[must_use]
    pub fn when(&self, types: &[ObjectId], needs_all: bool, tags: Option<&[String]>) -> (Time, Vec<ObjectId>) {
        if types.is_empty() {
            return (Time::At(self.last_updated), Vec::new());
        }

        let mut missing = Vec::new();
        let mut combined = if needs_all { Time::ZERO } else { Time::Never };
        for &structure in types {
            let earliest = self
                .select(structure, tags)
                .map(|(_, q)| Time::At(q.available))
                .min()
                .unwrap_or(Time::Never);
            if earliest.is_never() {
                missing.push(structure);
            }
            combined = if needs_all {
                combined.max(earliest)
            } else {
                combined.min(earliest)
            };
        }

        if combined.is_never() {
            (Time::Never, missing)
        } else {
            (combined.max(Time::At(self.last_updated)), Vec::new())
        }
    }

    /// Usage of every queue that was ever busy, up to `end`.
    #[must_use]
    pub fn usage(&self, end: Fixed) -> Vec<QueueUsage> {
        self.queues
            .iter()
            .filter_map(|q| {
                let until = q.destroyed.secs().unwrap_or(end);
                let existed = until - q.created;
                if q.busy_time == Fixed::ZERO || existed <= Fixed::ZERO {
                    return None;
                }
                let percent = (q.busy_time * Fixed::from_num(100) / existed).round();
                Some(QueueUsage {
                    structure: q.structure,
                    tag: q.tag.clone(),
                    created: q.created,
                    destroyed: q.destroyed,
                    busy_time: q.busy_time,
                    busy_percent: percent.to_num(),
                })
            })
            .collect()
    }
}

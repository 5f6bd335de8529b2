//! Summary of a scheduled build order.
//!
//! Everything here is plain data, ready to be rendered or serialized.

use serde::{Deserialize, Serialize};

use crate::catalog::Race;
use crate::math::{fixed_serde, round_whole, Fixed, Time};
use crate::scheduler::Schedule;
use crate::timeline::Event;

/// A committed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// Position in commit order.
    pub pick_order: usize,
    /// Job label, with trigger.
    pub label: String,
    /// When the worker left for the build site, if sent early.
    pub initiated: Option<Time>,
    /// Start.
    pub started: Time,
    /// Completion.
    pub completed: Time,
}

/// One income segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRow {
    /// Position in the ledger.
    pub order: usize,
    /// Start.
    #[serde(with = "fixed_serde")]
    pub start: Fixed,
    /// End.
    pub end: Time,
    /// Mineral workers per base.
    pub mineral_workers: Vec<i32>,
    /// Gas workers per extraction point.
    pub gas_workers: Vec<i32>,
    /// MULEs mining.
    pub mules: i32,
    /// Minerals per second.
    #[serde(with = "fixed_serde")]
    pub mineral_rate: Fixed,
    /// Gas per second.
    #[serde(with = "fixed_serde")]
    pub gas_rate: Fixed,
}

/// One hatchery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HatcheryRow {
    /// Creation order, from 1.
    pub order: usize,
    /// Tag.
    pub tag: Option<String>,
    /// Completion.
    #[serde(with = "fixed_serde")]
    pub created: Fixed,
    /// When it was lost.
    pub destroyed: Time,
    /// Larvae held at the end of the build.
    pub larvae: u32,
}

/// Busy time of one production queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRow {
    /// Structure name.
    pub structure: String,
    /// Tag.
    pub tag: Option<String>,
    /// When the queue appeared.
    #[serde(with = "fixed_serde")]
    pub created: Fixed,
    /// When it was morphed away or lost.
    pub destroyed: Time,
    /// Time spent producing.
    #[serde(with = "fixed_serde")]
    pub busy_time: Fixed,
    /// Busy time over lifetime, in percent.
    pub busy_percent: i32,
}

/// Everything worth showing about a scheduled build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Race played.
    pub race: Race,
    /// Log of jobs and checkpoints.
    pub events: Vec<Event>,
    /// Jobs by start time.
    pub jobs: Vec<ScheduledJob>,
    /// Latest completion.
    #[serde(with = "fixed_serde")]
    pub end: Fixed,
    /// Minerals mined by the end, starting stock included.
    pub minerals_mined: i32,
    /// Gas mined by the end.
    pub gas_mined: i32,
    /// Income segments.
    pub segments: Vec<SegmentRow>,
    /// Hatcheries; empty unless Zerg.
    pub hatcheries: Vec<HatcheryRow>,
    /// Production queues that were ever busy.
    pub queues: Vec<QueueRow>,
}

impl BuildReport {
    /// Summarize `schedule`.
    #[must_use]
    pub fn new(schedule: &Schedule<'_>) -> Self {
        let timeline = &schedule.timeline;
        let catalog = timeline.catalog();
        let rules = timeline.rules();

        let end = schedule
            .jobs
            .iter()
            .filter_map(|job| job.time_completed.secs())
            .max()
            .unwrap_or(Fixed::ZERO);

        let mut jobs: Vec<ScheduledJob> = schedule
            .jobs
            .iter()
            .enumerate()
            .map(|(order, job)| ScheduledJob {
                pick_order: job.pick_order.unwrap_or(order),
                label: job.label(catalog),
                initiated: (job.initiate.is_some() && job.time_initiated != job.time_started)
                    .then_some(job.time_initiated),
                started: job.time_started,
                completed: job.time_completed,
            })
            .collect();
        jobs.sort_by_key(|job| (job.started, job.pick_order));

        let segments = timeline
            .ledger
            .segments()
            .iter()
            .enumerate()
            .map(|(order, seg)| SegmentRow {
                order,
                start: seg.start,
                end: seg.end,
                mineral_workers: seg.mineral_workers.clone(),
                gas_workers: seg.gas_workers.clone(),
                mules: seg.mules,
                mineral_rate: seg.mineral_rate(rules),
                gas_rate: seg.gas_rate(rules),
            })
            .collect();

        let hatcheries = timeline
            .hatcheries
            .hatcheries()
            .iter()
            .map(|h| HatcheryRow {
                order: h.order,
                tag: h.tag.clone(),
                created: h.created,
                destroyed: h.destroyed,
                larvae: if h.alive_at(end) { h.surplus(end, rules) } else { 0 },
            })
            .collect();

        let queues = timeline
            .queues
            .usage(end)
            .into_iter()
            .map(|usage| QueueRow {
                structure: catalog.name(usage.structure).to_string(),
                tag: usage.tag,
                created: usage.created,
                destroyed: usage.destroyed,
                busy_time: usage.busy_time,
                busy_percent: usage.busy_percent,
            })
            .collect();

        let mined = timeline.ledger.total_mined(end);

        Self {
            race: timeline.race(),
            events: timeline.events().to_vec(),
            jobs,
            end,
            minerals_mined: round_whole(mined.minerals),
            gas_mined: round_whole(mined.gas),
            segments,
            hatcheries,
            queues,
        }
    }

    /// Event with `description`, first match.
    #[must_use]
    pub fn event(&self, description: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.description == description)
    }
}

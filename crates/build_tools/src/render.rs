//! Report rendering.

use std::fmt::Write as _;

use build_core::math::Time;
use build_core::report::BuildReport;
use clap::ValueEnum;

use crate::{ToolError, ToolResult};

/// Output format of `calc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable tables.
    #[default]
    Text,
    /// Pretty-printed RON.
    Ron,
    /// Pretty-printed JSON.
    Json,
}

/// Render `report` in `format`.
///
/// # Errors
///
/// Returns an error if the serializer fails.
pub fn render(report: &BuildReport, format: Format) -> ToolResult<String> {
    match format {
        Format::Text => Ok(render_text(report)),
        Format::Ron => ron::ser::to_string_pretty(report, ron::ser::PrettyConfig::default()).map_err(|e| {
            ToolError::Encode {
                format: "RON",
                message: e.to_string(),
            }
        }),
        Format::Json => serde_json::to_string_pretty(report).map_err(|e| ToolError::Encode {
            format: "JSON",
            message: e.to_string(),
        }),
    }
}

/// Plain-text tables, one section per part of the report.
#[must_use]
pub fn render_text(report: &BuildReport) -> String {
    // Writing to a String never fails.
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} build, {} events, done at {}",
        report.race,
        report.events.len(),
        Time::At(report.end)
    );

    let _ = writeln!(out, "\n{:>6} {:>7} {:>8} {:>5}  Event", "Time", "Supply", "Minerals", "Gas");
    for event in &report.events {
        let _ = writeln!(
            out,
            "{:>6} {:>7} {:>8} {:>5}  {}",
            Time::At(event.time_started).to_string(),
            format!("{}/{}", event.supply_count, event.supply_capacity),
            event.minerals,
            event.gas,
            event.description
        );
    }

    let _ = writeln!(out, "\nJobs");
    for job in &report.jobs {
        let sent = job.initiated.map(|t| format!(" (sent {t})")).unwrap_or_default();
        let _ = writeln!(out, "{:>6} - {:>6}  {}{sent}", job.started.to_string(), job.completed.to_string(), job.label);
    }

    let _ = writeln!(out, "\nIncome");
    for seg in &report.segments {
        let _ = writeln!(
            out,
            "{:>6} - {:>6}  minerals {:?} gas {:?} mules {}  {:.2}/s {:.2}/s",
            Time::At(seg.start).to_string(),
            seg.end.to_string(),
            seg.mineral_workers,
            seg.gas_workers,
            seg.mules,
            seg.mineral_rate.to_num::<f64>(),
            seg.gas_rate.to_num::<f64>()
        );
    }

    if !report.hatcheries.is_empty() {
        let _ = writeln!(out, "\nHatcheries");
        for hatchery in &report.hatcheries {
            let tag = hatchery.tag.as_deref().map(|t| format!(" #{t}")).unwrap_or_default();
            let _ = writeln!(
                out,
                "{:>3}{tag}  from {} until {}, {} larvae",
                hatchery.order,
                Time::At(hatchery.created),
                hatchery.destroyed,
                hatchery.larvae
            );
        }
    }

    if !report.queues.is_empty() {
        let _ = writeln!(out, "\nProduction");
        for queue in &report.queues {
            let tag = queue.tag.as_deref().map(|t| format!(" #{t}")).unwrap_or_default();
            let _ = writeln!(
                out,
                "{:>4}%  {}{tag}  busy {} from {} until {}",
                queue.busy_percent,
                queue.structure,
                Time::At(queue.busy_time),
                Time::At(queue.created),
                queue.destroyed
            );
        }
    }

    let _ = writeln!(out, "\nMined {} minerals and {} gas", report.minerals_mined, report.gas_mined);
    out
}

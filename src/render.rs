//! Terminal rendering for calassist types.
//!
//! Times are shown in the configured zone, so floating and offset
//! timestamps line up with each other on screen.

use calassist_core::event::CalendarEvent;
use calassist_core::sync::PushReport;
use calassist_core::time::{EventTime, Normalizer};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self, normalizer: &Normalizer) -> String;
}

impl Render for CalendarEvent {
    fn render(&self, normalizer: &Normalizer) -> String {
        let mut line = format!(
            "{} {}",
            format_time_span(self, normalizer),
            self.title
        );
        if let Some(location) = &self.location {
            line.push_str(&format!(" {}", format!("@ {location}").dimmed()));
        }
        if self.is_remote() {
            line.push_str(&format!(" {}", "[remote]".cyan()));
        }
        line
    }
}

fn in_zone(time: &EventTime, normalizer: &Normalizer) -> Option<DateTime<Tz>> {
    normalizer
        .normalize(time)
        .instant()
        .map(|i| i.with_timezone(&normalizer.zone()))
}

/// "09:00-09:30", "all-day", or the raw text for unreadable timestamps.
fn format_time_span(event: &CalendarEvent, normalizer: &Normalizer) -> String {
    if let EventTime::Date(_) = event.start_time {
        return format!("{:>11}", "all-day");
    }

    match (
        in_zone(&event.start_time, normalizer),
        in_zone(&event.end_time, normalizer),
    ) {
        (Some(start), Some(end)) => {
            format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
        }
        _ => format!("{:>11}", event.start_time.to_string().red()),
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        -1 => "Yesterday".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

fn event_date(event: &CalendarEvent, normalizer: &Normalizer) -> Option<NaiveDate> {
    match &event.start_time {
        EventTime::Date(d) => Some(*d),
        other => in_zone(other, normalizer).map(|dt| dt.date_naive()),
    }
}

/// Events grouped under day headings. Expects events sorted by start.
pub fn render_listing(events: &[CalendarEvent], normalizer: &Normalizer, now: DateTime<Utc>) -> String {
    if events.is_empty() {
        return "No events found".dimmed().to_string();
    }

    let today = normalizer.local_date(now);
    let mut lines = Vec::new();
    let mut current: Option<Option<NaiveDate>> = None;

    for event in events {
        let date = event_date(event, normalizer);
        if current != Some(date) {
            if current.is_some() {
                lines.push(String::new());
            }
            let label = match date {
                Some(d) => format_date_label(d, today),
                None => "Unscheduled".to_string(),
            };
            lines.push(label.bold().to_string());
            current = Some(date);
        }
        lines.push(format!("  {}", event.render(normalizer)));
    }

    lines.join("\n")
}

/// Every field of one event.
pub fn render_detail(event: &CalendarEvent, normalizer: &Normalizer) -> String {
    let mut lines = vec![event.title.bold().to_string()];

    let field = |name: &str, value: String| format!("  {:<12} {}", name.dimmed(), value);

    lines.push(field("id", event.id.clone()));
    lines.push(field("start", describe_time(&event.start_time, normalizer)));
    lines.push(field("end", describe_time(&event.end_time, normalizer)));
    if let Some(location) = &event.location {
        lines.push(field("location", location.clone()));
    }
    if let Some(description) = &event.description {
        lines.push(field("description", description.clone()));
    }
    if !event.attendees.is_empty() {
        lines.push(field("attendees", event.attendees.join(", ")));
    }
    lines.push(field("created", event.created_at.to_rfc3339()));
    if let Some(updated) = event.updated_at {
        lines.push(field("updated", updated.to_rfc3339()));
    }
    if let Some(remote_id) = &event.remote_id {
        lines.push(field("remote id", remote_id.clone()));
    }

    lines.join("\n")
}

/// The stored text, plus the configured-zone reading when they differ.
fn describe_time(time: &EventTime, normalizer: &Normalizer) -> String {
    let raw = time.to_string();
    match (time, in_zone(time, normalizer)) {
        (EventTime::Invalid(_), _) | (_, None) => format!("{} {}", raw.red(), "(unreadable)".dimmed()),
        (EventTime::Date(_) | EventTime::Floating(_), Some(_)) => raw,
        (_, Some(local)) => {
            let shown = local.format("%Y-%m-%d %H:%M %Z").to_string();
            format!("{} {}", raw, format!("({shown})").dimmed())
        }
    }
}

pub fn render_conflicts(conflicts: &[&CalendarEvent], normalizer: &Normalizer) -> String {
    if conflicts.is_empty() {
        return "No conflicts".green().to_string();
    }

    let mut lines = vec![format!(
        "{} {}",
        conflicts.len().to_string().yellow().bold(),
        pluralize("conflict", conflicts.len()).yellow()
    )];
    for event in conflicts {
        lines.push(format!("  {} {}", "!".yellow(), event.render(normalizer)));
    }
    lines.join("\n")
}

pub fn render_push_report(report: &PushReport) -> String {
    let mut lines = Vec::new();

    if report.pushed == 0 && report.failed.is_empty() {
        lines.push("   No changes to push".dimmed().to_string());
    }
    if report.pushed > 0 {
        let label = format!("({} new {})", report.pushed, pluralize("event", report.pushed));
        lines.push(format!("   {} {}", "+".green(), label.green()));
    }
    for (id, error) in &report.failed {
        lines.push(format!("   {} {} {}", "x".red(), id.dimmed(), error.red()));
    }

    lines.join("\n")
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

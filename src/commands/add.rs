use std::io::IsTerminal;

use anyhow::{Context, Result};
use calassist_core::event::NewEvent;
use calassist_core::time::EventTime;
use calassist_core::{Config, EventStore};
use chrono::Duration;
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;

use crate::render;

pub struct AddArgs {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub force: bool,
}

pub fn run(config: &Config, args: AddArgs) -> Result<()> {
    let interactive = args.title.is_none() || args.start.is_none();
    if interactive && !std::io::stdin().is_terminal() {
        anyhow::bail!("A title and --start are required when not running interactively");
    }

    // --- Title ---
    let title = match args.title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    };

    // --- Start ---
    let start_time = match args.start {
        Some(s) => parse_time(&s)?,
        None => prompt_with_retry("  When?", parse_time)?,
    };

    // --- End ---
    let end_time = if let Some(end) = args.end {
        parse_time(&end)?
    } else if let Some(duration) = args.duration {
        apply_duration(&start_time, &duration)?
    } else if interactive {
        prompt_duration(&start_time, config.default_duration)?
    } else {
        start_time.try_shifted(config.default_duration)?
    };

    let mut fields = NewEvent::new(title, start_time, end_time).with_attendees(args.attendees);
    fields.description = args.description;
    fields.location = args.location;

    let mut store = EventStore::open(config);
    fields.validate(store.normalizer())?;

    let conflicts = store.conflicts(&fields.start_time, &fields.end_time, None);
    if !conflicts.is_empty() {
        println!("{}", render::render_conflicts(&conflicts, store.normalizer()));
        if !args.force {
            if !interactive {
                anyhow::bail!("Event overlaps existing events; use --force to create it anyway");
            }
            let confirmed = Confirm::new()
                .with_prompt("  Create anyway?")
                .default(false)
                .interact()?;
            if !confirmed {
                return Ok(());
            }
        }
    }

    let event = store.create(fields)?;

    if interactive {
        println!();
    }
    println!("{}", format!("  Created: {}", event.title).green());
    println!("  {}", event.id.dimmed());

    Ok(())
}

/// Read a timestamp as typed: with `Z`, with an offset, zone-less, or a bare date.
pub fn parse_time(input: &str) -> Result<EventTime> {
    Ok(EventTime::parse_strict(input)?)
}

/// Prompt the user with retry on parse errors.
fn prompt_with_retry<F>(prompt: &str, parse: F) -> Result<EventTime>
where
    F: Fn(&str) -> Result<EventTime>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

/// Prompt for duration/end with retry on parse errors. Empty input takes
/// the configured default length.
fn prompt_duration(start: &EventTime, default: Duration) -> Result<EventTime> {
    let hint = humantime::format_duration(default.to_std().unwrap_or_default());
    loop {
        let input: String = Input::new()
            .with_prompt(format!("  How long? ({hint})"))
            .default(String::new())
            .show_default(false)
            .interact_text()?;
        if input.is_empty() {
            return Ok(start.try_shifted(default)?);
        }
        match parse_end(&input, start) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

/// Parse an end input: a duration first (humantime), then a timestamp.
fn parse_end(input: &str, start: &EventTime) -> Result<EventTime> {
    if let Ok(event_time) = try_apply_duration(start, input) {
        return Ok(event_time);
    }

    let cleaned = input
        .strip_prefix("until ")
        .or_else(|| input.strip_prefix("to "))
        .unwrap_or(input);

    parse_time(cleaned)
}

/// Apply a duration string to a start time.
fn apply_duration(start: &EventTime, input: &str) -> Result<EventTime> {
    try_apply_duration(start, input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))
}

fn try_apply_duration(start: &EventTime, input: &str) -> Result<EventTime> {
    let std_dur = humantime::parse_duration(input).map_err(|e| anyhow::anyhow!("{}", e))?;
    let chrono_dur = Duration::from_std(std_dur).context("Duration too large")?;
    Ok(start.try_shifted(chrono_dur)?)
}

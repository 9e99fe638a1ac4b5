use anyhow::{Context, Result};
use calassist_core::date_range::DateRange;
use calassist_core::event::CalendarEvent;
use calassist_core::query::EventQuery;
use calassist_core::remote::Remote;
use calassist_core::sync;
use calassist_core::{Config, EventStore};
use chrono::{NaiveDate, Utc};

use crate::render;
use crate::utils::tui::create_spinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Day,
    Week,
    Month,
}

pub async fn run(
    config: &Config,
    from: Option<&str>,
    to: Option<&str>,
    query: Option<String>,
    with_remote: bool,
) -> Result<()> {
    let store = EventStore::open(config);
    let range = DateRange::from_args(from, to, store.normalizer())?;

    let events = match query {
        // Text search stays local; remote providers only filter by date.
        Some(text) => store.query(&EventQuery {
            text: Some(text),
            range,
        }),
        None => listing(config, &store, range, with_remote).await?,
    };

    println!("{}", render::render_listing(&events, store.normalizer(), Utc::now()));
    Ok(())
}

/// Day, week or month around `date` (default today).
pub async fn window(
    config: &Config,
    window: Window,
    date: Option<&str>,
    with_remote: bool,
) -> Result<()> {
    let store = EventStore::open(config);
    let normalizer = store.normalizer();

    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .with_context(|| format!("Expected a YYYY-MM-DD date, got \"{d}\""))?,
        None => normalizer.local_date(Utc::now()),
    };

    let range = match window {
        Window::Day => DateRange::day(date, normalizer),
        Window::Week => DateRange::week(date, normalizer),
        Window::Month => DateRange::month(date, normalizer),
    };

    let events = listing(config, &store, range, with_remote).await?;
    println!("{}", render::render_listing(&events, store.normalizer(), Utc::now()));
    Ok(())
}

async fn listing(
    config: &Config,
    store: &EventStore,
    range: DateRange,
    with_remote: bool,
) -> Result<Vec<CalendarEvent>> {
    if !with_remote {
        return Ok(store.query(&EventQuery::in_range(range)));
    }

    let remote = config
        .remote
        .as_ref()
        .context("No [remote] configured. Add one to the config file (see `calassist config`)")?;

    let spinner = create_spinner(format!("Fetching from {}", remote.provider.name()));
    let events = sync::merged_listing::<Remote>(store, Some(remote), range).await;
    spinner.finish_and_clear();

    Ok(events)
}

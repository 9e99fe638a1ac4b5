use anyhow::{Context, Result};
use calassist_core::date_range::DateRange;
use calassist_core::sync;
use calassist_core::{Config, EventStore};
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::render;
use crate::utils::tui::create_spinner;

/// Remote events are shown, not copied into the local store.
pub async fn run(config: &Config, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let remote = config
        .remote
        .as_ref()
        .context("No [remote] configured. Add one to the config file (see `calassist config`)")?;

    let now = Utc::now();
    let range = if from.is_none() && to.is_none() {
        DateRange::around(now, config.sync_days)
    } else {
        DateRange::from_args(from, to, &config.normalizer)?
    };

    let spinner = create_spinner(format!("Pulling from {}", remote.provider.name()));
    let result = sync::pull(remote, &range).await;
    spinner.finish_and_clear();

    println!("{}", remote.provider.name().bold());
    let mut events = result?;

    // Events this store already mirrored are marked as such.
    let store = EventStore::open(config);
    let linked = events
        .iter()
        .filter(|e| {
            store
                .events()
                .iter()
                .any(|local| local.remote_id.is_some() && local.remote_id == e.remote_id)
        })
        .count();

    events.sort_by_key(|e| e.start(&config.normalizer));
    println!("{}", render::render_listing(&events, &config.normalizer, now));
    println!(
        "\n{}",
        format!("Pulled {} events ({} linked to local events)", events.len(), linked).dimmed()
    );

    Ok(())
}

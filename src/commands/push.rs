use anyhow::{Context, Result};
use calassist_core::sync;
use calassist_core::{Config, EventStore};
use owo_colors::OwoColorize;

use crate::render;
use crate::utils::tui::create_spinner;

pub async fn run(config: &Config) -> Result<()> {
    let remote = config
        .remote
        .as_ref()
        .context("No [remote] configured. Add one to the config file (see `calassist config`)")?;

    let mut store = EventStore::open(config);

    let spinner = create_spinner(format!("Pushing to {}", remote.provider.name()));
    let result = sync::push(&mut store, remote).await;
    spinner.finish_and_clear();

    println!("{}", remote.provider.name().bold());
    let report = result?;
    println!("{}", render::render_push_report(&report));

    if report.pushed > 0 || !report.failed.is_empty() {
        println!(
            "\nPushed: {} created, {} failed, {} already linked",
            report.pushed,
            report.failed.len(),
            report.already_linked
        );
    }

    if !report.is_clean() {
        anyhow::bail!("Some events could not be pushed");
    }

    Ok(())
}

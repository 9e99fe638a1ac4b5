use anyhow::Result;
use calassist_core::query::QueryEngine;
use calassist_core::{Config, EventStore};
use chrono::Utc;

use crate::render;

pub fn run(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = EventStore::open(config);
    let now = Utc::now();

    let events: Vec<_> = QueryEngine::new(*store.normalizer())
        .upcoming(store.events(), now, limit.unwrap_or(config.upcoming_limit))
        .into_iter()
        .cloned()
        .collect();

    println!("{}", render::render_listing(&events, store.normalizer(), now));
    Ok(())
}

use anyhow::Result;
use calassist_core::{Config, EventStore};

use super::add::parse_time;
use crate::render;

pub fn run(config: &Config, start: &str, end: &str, exclude: Option<&str>) -> Result<()> {
    let start = parse_time(start)?;
    let end = parse_time(end)?;

    let store = EventStore::open(config);
    let conflicts = store.conflicts(&start, &end, exclude);

    println!("{}", render::render_conflicts(&conflicts, store.normalizer()));
    Ok(())
}

use anyhow::Result;
use calassist_core::{Config, EventStore};

use crate::render;

pub fn run(config: &Config, id: &str) -> Result<()> {
    let store = EventStore::open(config);
    let event = store.get(id)?;

    println!("{}", render::render_detail(event, store.normalizer()));

    Ok(())
}

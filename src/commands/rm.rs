use anyhow::Result;
use calassist_core::sync;
use calassist_core::{Config, EventStore};
use owo_colors::OwoColorize;

pub async fn run(config: &Config, id: &str) -> Result<()> {
    let mut store = EventStore::open(config);
    let removed = store.delete(id)?;

    println!("{}", format!("  Deleted: {}", removed.title).red());

    // The local delete stands even if the remote copy cannot be removed.
    if let Some(remote) = &config.remote {
        match sync::mirror_delete(remote, &removed).await {
            Ok(true) => println!("  {}", "Removed from remote".dimmed()),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(id = %removed.id, error = %e, "remote copy not deleted");
                eprintln!("  {}", format!("Remote not updated: {e}").yellow());
            }
        }
    }

    Ok(())
}

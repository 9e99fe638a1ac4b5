use std::io::Read;

use anyhow::{Context, Result};
use calassist_core::tools::{ToolCall, Toolbox};
use calassist_core::{Config, EventStore};

/// Reads the call from the argument, or from stdin when none is given.
/// Edits and deletes are mirrored when a remote is configured.
pub async fn run(config: &Config, call: Option<String>) -> Result<()> {
    let input = match call {
        Some(call) => call,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read tool call from stdin")?;
            buf
        }
    };

    let outcome = match ToolCall::parse(&input) {
        Ok(call) => {
            tracing::debug!(?call, "running tool call");
            let mut store = EventStore::open(config);
            let mut toolbox = Toolbox::new(&mut store, config);
            if let Some(remote) = &config.remote {
                toolbox = toolbox.with_remote(remote);
            }
            toolbox.handle(call).await
        }
        Err(outcome) => outcome,
    };

    println!("{}", outcome.to_json());
    Ok(())
}

use anyhow::Result;
use calassist_core::event::EventPatch;
use calassist_core::sync;
use calassist_core::{Config, EventStore};
use owo_colors::OwoColorize;

use super::add::parse_time;
use crate::render;

pub struct EditArgs {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
}

impl EditArgs {
    fn into_patch(self) -> Result<EventPatch> {
        Ok(EventPatch {
            title: self.title,
            start_time: self.start.as_deref().map(parse_time).transpose()?,
            end_time: self.end.as_deref().map(parse_time).transpose()?,
            description: self.description,
            location: self.location,
            attendees: (!self.attendees.is_empty()).then_some(self.attendees),
        })
    }
}

pub async fn run(config: &Config, id: &str, args: EditArgs) -> Result<()> {
    let patch = args.into_patch()?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one of --title, --start, --end, --description, --location, --attendee");
    }

    let mut store = EventStore::open(config);
    let updated = store.update(id, &patch)?;

    println!("{}", format!("  Updated: {}", updated.title).yellow());

    let conflicts = store.conflicts(&updated.start_time, &updated.end_time, Some(&updated.id));
    if !conflicts.is_empty() {
        println!("{}", render::render_conflicts(&conflicts, store.normalizer()));
    }

    if let Some(remote) = &config.remote {
        match sync::mirror_update(remote, &updated).await {
            Ok(Some(_)) => println!("  {}", "Updated on remote".dimmed()),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(id = %updated.id, error = %e, "remote copy not updated");
                eprintln!("  {}", format!("Remote not updated: {e}").yellow());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calassist_core::time::EventTime;

    fn args() -> EditArgs {
        EditArgs {
            title: None,
            start: None,
            end: None,
            description: None,
            location: None,
            attendees: Vec::new(),
        }
    }

    #[test]
    fn test_empty_args_make_empty_patch() {
        assert!(args().into_patch().unwrap().is_empty());
    }

    #[test]
    fn test_patch_parses_times_and_attendees() {
        let patch = EditArgs {
            start: Some("2025-06-02T12:00".into()),
            attendees: vec!["a@example.com".into()],
            ..args()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.start_time, Some(EventTime::parse("2025-06-02T12:00")));
        assert_eq!(patch.attendees, Some(vec!["a@example.com".to_string()]));
        assert_eq!(patch.end_time, None);

        let bad = EditArgs {
            end: Some("whenever".into()),
            ..args()
        };
        assert!(bad.into_patch().is_err());
    }
}

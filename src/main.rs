mod commands;
mod render;
mod utils;

use anyhow::Result;
use calassist_core::Config;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calassist", version)]
#[command(about = "Keep a local calendar, catch scheduling conflicts, and mirror to a remote calendar")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event (prompts for anything missing)
    Add {
        title: Option<String>,

        /// Start (e.g. "2025-03-20T15:00", "2025-03-20T15:00:00+01:00", "2025-03-20")
        #[arg(short, long)]
        start: Option<String>,

        /// End, same formats as --start
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Length instead of an end (e.g. "30m", "1h 30m")
        #[arg(short, long)]
        duration: Option<String>,

        #[arg(short = 'D', long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Attendee (repeatable)
        #[arg(short, long = "attendee")]
        attendees: Vec<String>,

        /// Create even if it overlaps existing events
        #[arg(short, long)]
        force: bool,
    },
    /// Show one event
    Show { id: String },
    /// Change fields of an event
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(short = 'D', long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Replace attendees (repeatable)
        #[arg(short, long = "attendee")]
        attendees: Vec<String>,
    },
    /// Delete an event
    Rm { id: String },
    /// List events, optionally filtered
    List {
        /// From this date (YYYY-MM-DD, a timestamp, or "start")
        #[arg(long)]
        from: Option<String>,

        /// Until this date (YYYY-MM-DD or a timestamp)
        #[arg(long)]
        to: Option<String>,

        /// Only events whose title or description contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Include events from the remote calendar
        #[arg(short, long)]
        remote: bool,
    },
    /// Today's events
    Today {
        #[arg(short, long)]
        remote: bool,
    },
    /// Events in the week (Monday to Sunday) containing a date
    Week {
        /// Any day of the week (YYYY-MM-DD, default today)
        date: Option<String>,

        #[arg(short, long)]
        remote: bool,
    },
    /// Events in the month containing a date
    Month {
        /// Any day of the month (YYYY-MM-DD, default today)
        date: Option<String>,

        #[arg(short, long)]
        remote: bool,
    },
    /// The next few events
    Upcoming {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Check a time range against existing events
    Conflicts {
        start: String,
        end: String,

        /// Ignore this event id
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Create unlinked local events on the remote calendar
    Push,
    /// Show events from the remote calendar
    Pull {
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },
    /// Run one JSON tool call (argument or stdin) and print the outcome
    Tool { call: Option<String> },
    /// Show config paths and effective settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Add {
            title,
            start,
            end,
            duration,
            description,
            location,
            attendees,
            force,
        } => commands::add::run(
            &config,
            commands::add::AddArgs {
                title,
                start,
                end,
                duration,
                description,
                location,
                attendees,
                force,
            },
        ),
        Commands::Show { id } => commands::show::run(&config, &id),
        Commands::Edit {
            id,
            title,
            start,
            end,
            description,
            location,
            attendees,
        } => {
            commands::edit::run(
                &config,
                &id,
                commands::edit::EditArgs {
                    title,
                    start,
                    end,
                    description,
                    location,
                    attendees,
                },
            )
            .await
        }
        Commands::Rm { id } => commands::rm::run(&config, &id).await,
        Commands::List {
            from,
            to,
            query,
            remote,
        } => commands::list::run(&config, from.as_deref(), to.as_deref(), query, remote).await,
        Commands::Today { remote } => {
            commands::list::window(&config, commands::list::Window::Day, None, remote).await
        }
        Commands::Week { date, remote } => {
            commands::list::window(&config, commands::list::Window::Week, date.as_deref(), remote)
                .await
        }
        Commands::Month { date, remote } => {
            commands::list::window(&config, commands::list::Window::Month, date.as_deref(), remote)
                .await
        }
        Commands::Upcoming { limit } => commands::upcoming::run(&config, limit),
        Commands::Conflicts {
            start,
            end,
            exclude,
        } => commands::conflicts::run(&config, &start, &end, exclude.as_deref()),
        Commands::Push => commands::push::run(&config).await,
        Commands::Pull { from, to } => {
            commands::pull::run(&config, from.as_deref(), to.as_deref()).await
        }
        Commands::Tool { call } => commands::tool::run(&config, call).await,
        Commands::Config => commands::config::run(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

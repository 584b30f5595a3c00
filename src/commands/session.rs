use chrono::Utc;
use clap::{Args, Subcommand};
use std::collections::BTreeMap;
use std::error::Error;
use uuid::Uuid;

use gain::{Config, Metric, MetricValue, SessionTracker, Store, WorkoutSession};

use super::{open_store, OutputFormat, SESSIONS};

#[derive(Args)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Start a live session
    Start,

    /// Pause the running session
    Pause {
        /// Session ID (defaults to the active session)
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// Resume a paused session
    Resume {
        /// Session ID (defaults to the active session)
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// Log a metric sample against a session
    Metric {
        /// Session ID (defaults to the active session)
        #[arg(long)]
        id: Option<Uuid>,

        /// Heart rate in bpm
        #[arg(long)]
        hr: Option<u32>,

        /// Power in watts
        #[arg(long)]
        power: Option<u32>,

        /// Cadence in rpm
        #[arg(long)]
        cadence: Option<u32>,

        /// Elapsed time in seconds
        #[arg(long)]
        elapsed: Option<u64>,
    },

    /// End a session
    End {
        /// Session ID (defaults to the active session)
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// List sessions, most recent first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl SessionCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        let store: Store<WorkoutSession> = open_store(config, SESSIONS).await;
        let tracker = SessionTracker::new(store, &config.device_id);

        match &self.command {
            SessionSubcommand::Start => {
                let session = tracker.start()?;
                println!("Started session {}", session.id);
            }
            SessionSubcommand::Pause { id } => {
                let id = resolve_id(&tracker, *id)?;
                match tracker.pause(id) {
                    Some(t) if t.applied => println!("Paused session {}", id),
                    Some(t) => println!("Session {} is {}, not running", id, t.session.status),
                    None => println!("No session with id {}", id),
                }
            }
            SessionSubcommand::Resume { id } => {
                let id = resolve_id(&tracker, *id)?;
                match tracker.resume(id) {
                    Some(t) if t.applied => println!("Resumed session {}", id),
                    Some(t) => println!("Session {} is {}, not paused", id, t.session.status),
                    None => println!("No session with id {}", id),
                }
            }
            SessionSubcommand::Metric {
                id,
                hr,
                power,
                cadence,
                elapsed,
            } => {
                let id = resolve_id(&tracker, *id)?;
                let mut metric = Metric::new();
                metric.heart_rate = *hr;
                metric.power = *power;
                metric.cadence = *cadence;
                metric.elapsed_seconds = *elapsed;
                match tracker.log_metric(id, metric) {
                    Some(t) if t.applied => {
                        println!("Logged metric ({} total)", t.session.metrics.len());
                    }
                    Some(_) => println!("Session {} has ended; metric dropped", id),
                    None => println!("No session with id {}", id),
                }
            }
            SessionSubcommand::End { id } => {
                let id = resolve_id(&tracker, *id)?;
                let final_metrics = tracker.store().get(id).map(|session| {
                    let duration = (Utc::now() - session.started_at).num_seconds().max(0);
                    let mut finals = BTreeMap::new();
                    finals.insert(
                        "duration".to_string(),
                        MetricValue::Number(duration as f64),
                    );
                    finals.insert(
                        "samples".to_string(),
                        MetricValue::Number(session.metrics.len() as f64),
                    );
                    finals
                });
                match tracker.end(id, final_metrics) {
                    Some(t) if t.applied => println!("Ended session {}", id),
                    Some(_) => println!("Session {} has already ended", id),
                    None => println!("No session with id {}", id),
                }
            }
            SessionSubcommand::List { format } => match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&tracker.store().all())?);
                }
                OutputFormat::Text => {
                    let sessions = tracker.store().all();
                    if sessions.is_empty() {
                        println!("No sessions yet");
                    }
                    for session in sessions {
                        println!("{}  ({})", session, session.id);
                    }
                }
            },
        }

        tracker.store().flush().await;
        Ok(())
    }
}

fn resolve_id(tracker: &SessionTracker, id: Option<Uuid>) -> Result<Uuid, Box<dyn Error>> {
    id.or_else(|| tracker.active_id())
        .ok_or_else(|| "No active session; pass --id".into())
}

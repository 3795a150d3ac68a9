//! Command-line observer: parses a command, drives the store and prints
//! what it sees.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::bail;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tokio::sync::broadcast;

use reactivities_shared::wire::{format_timestamp, parse_timestamp};
use reactivities_shared::{Activity, ActivityDraft};
use reactivities_store::{ActivityStore, DateBucket, StoreEvent};

#[derive(Debug, Parser)]
#[command(name = "reactivities", version, about = "Browse and manage activities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every activity, grouped by day.
    List,
    /// Show one activity.
    Show { id: String },
    /// Create an activity hosted by the configured user.
    Create(CreateArgs),
    /// Change fields of an existing activity.
    Edit(EditArgs),
    /// Delete an activity.
    Delete { id: String },
    /// Attend an activity as the configured user.
    Attend { id: String },
    /// Stop attending an activity.
    Unattend { id: String },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub category: String,
    /// ISO-8601 date, e.g. 2024-05-01T19:00
    #[arg(long, value_parser = parse_date)]
    pub date: DateTime<Utc>,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub venue: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub venue: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

impl EditArgs {
    fn apply(self, activity: &mut Activity) {
        if let Some(v) = self.title {
            activity.title = v;
        }
        if let Some(v) = self.category {
            activity.category = v;
        }
        if let Some(v) = self.date {
            activity.date = v;
        }
        if let Some(v) = self.city {
            activity.city = v;
        }
        if let Some(v) = self.venue {
            activity.venue = v;
        }
        if let Some(v) = self.description {
            activity.description = v;
        }
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value).map_err(|e| e.to_string())
}

/// Execute `command` against `store`, printing results to stdout and
/// failure notifications to stderr.
pub async fn run(store: Arc<ActivityStore>, command: Command) -> anyhow::Result<()> {
    let mut notifications = store.subscribe();

    let ok = match command {
        Command::List => {
            let ok = store.load_all().await;
            if ok {
                print!("{}", render_grouped(&store.activities_by_date()));
            }
            ok
        }
        Command::Show { id } => match store.load_one(&id).await {
            Some(activity) => {
                print!("{}", render_activity(&activity));
                true
            }
            None => false,
        },
        Command::Create(args) => {
            let activity = ActivityDraft {
                title: args.title,
                category: args.category,
                description: args.description,
                date: args.date,
                city: args.city,
                venue: args.venue,
            }
            .into_activity();
            let id = activity.id.clone();
            let ok = store.create(activity).await;
            if ok {
                println!("Created {id}");
            }
            ok
        }
        Command::Edit(args) => {
            let loaded = store.load_one(&args.id).await;
            match loaded {
                Some(mut activity) => {
                    args.apply(&mut activity);
                    let ok = store.edit(activity).await;
                    if let Some(updated) = store.selected().filter(|_| ok) {
                        print!("{}", render_activity(&updated));
                    }
                    ok
                }
                None => false,
            }
        }
        Command::Delete { id } => {
            let ok = store.delete(&id).await;
            if ok {
                println!("Deleted {id}");
            }
            ok
        }
        Command::Attend { id } => {
            store.load_one(&id).await.is_some()
                && store.attend().await
                && print_selected(&store)
        }
        Command::Unattend { id } => {
            store.load_one(&id).await.is_some()
                && store.unattend().await
                && print_selected(&store)
        }
    };

    let failures = drain_failures(&mut notifications);
    for message in &failures {
        eprintln!("error: {message}");
    }
    if !ok {
        bail!("{} operation(s) failed", failures.len().max(1));
    }
    Ok(())
}

fn print_selected(store: &ActivityStore) -> bool {
    if let Some(activity) = store.selected() {
        print!("{}", render_activity(&activity));
    }
    true
}

fn drain_failures(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(StoreEvent::OperationFailed { operation, message }) => {
                out.push(format!("could not {operation}: {message}"));
            }
            Ok(StoreEvent::Changed) => {}
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Notification receiver lagged");
            }
            Err(_) => break,
        }
    }
    out
}

/// One heading per day, one line per activity.
pub fn render_grouped(buckets: &[DateBucket]) -> String {
    let mut out = String::new();
    if buckets.is_empty() {
        out.push_str("No activities\n");
    }
    for (day, activities) in buckets {
        let _ = writeln!(out, "{day}");
        for a in activities {
            let marker = if a.is_host {
                " [hosting]"
            } else if a.is_going {
                " [going]"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "  {} {} ({}) @ {}, {}{}  [{}]",
                a.date.format("%H:%M"),
                a.title,
                a.category,
                a.venue,
                a.city,
                marker,
                a.id
            );
        }
    }
    out
}

pub fn render_activity(a: &Activity) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", a.title, a.id);
    let _ = writeln!(out, "  when:     {}", format_timestamp(&a.date));
    let _ = writeln!(out, "  where:    {}, {}", a.venue, a.city);
    let _ = writeln!(out, "  category: {}", a.category);
    if let Some(host) = a.host() {
        let _ = writeln!(out, "  host:     {}", host.display_name);
    }
    if !a.description.is_empty() {
        let _ = writeln!(out, "  {}", a.description);
    }
    let _ = writeln!(out, "  attendees ({}):", a.attendees.len());
    for attendee in &a.attendees {
        let host = if attendee.is_host { " (host)" } else { "" };
        let _ = writeln!(out, "    {} <{}>{}", attendee.display_name, attendee.username, host);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactivities_shared::{ActivityWire, CurrentUser};
    use reactivities_store::group_by_date;

    fn activity(id: &str, date: &str, title: &str) -> Activity {
        let wire: ActivityWire = serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "category": "music",
            "date": date,
            "city": "Berlin",
            "venue": "Club",
            "attendees": [{"username": "bob", "displayName": "Bob", "isHost": true}]
        }))
        .unwrap();
        wire.into_activity(&CurrentUser::new("bob", "Bob")).unwrap()
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "reactivities",
            "create",
            "--title",
            "Gig",
            "--category",
            "music",
            "--date",
            "2024-05-01T20:00",
            "--city",
            "Berlin",
            "--venue",
            "Club",
        ])
        .unwrap();
        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.title, "Gig");
                assert_eq!(format_timestamp(&args.date), "2024-05-01T20:00:00Z");
                assert!(args.description.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let result = Cli::try_parse_from(["reactivities", "edit", "1", "--date", "tomorrow"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_args_apply_only_given_fields() {
        let cli = Cli::try_parse_from(["reactivities", "edit", "1", "--venue", "Park"]).unwrap();
        let Command::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        let mut a = activity("1", "2024-05-01T20:00:00Z", "Gig");
        args.apply(&mut a);
        assert_eq!(a.venue, "Park");
        assert_eq!(a.title, "Gig");
    }

    #[test]
    fn test_render_grouped() {
        let input = [
            activity("2", "2024-05-02T09:00:00Z", "Brunch"),
            activity("1", "2024-05-01T20:00:00Z", "Gig"),
        ];
        let text = render_grouped(&group_by_date(&input));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2024-05-01");
        assert!(lines[1].contains("20:00 Gig"));
        assert!(lines[1].contains("[hosting]"));
        assert_eq!(lines[2], "2024-05-02");
        assert!(lines[3].contains("Brunch"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_grouped(&[]), "No activities\n");
    }

    #[test]
    fn test_render_activity_lists_host() {
        let text = render_activity(&activity("1", "2024-05-01T20:00:00Z", "Gig"));
        assert!(text.starts_with("Gig [1]"));
        assert!(text.contains("  host:     Bob\n"));
        assert!(text.contains("Bob <bob> (host)"));
    }
}
